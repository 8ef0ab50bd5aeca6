mod dispatch;
mod expr;
mod interp_errors;
mod stmt;
#[cfg(test)]
mod tests;

use tools::errors::{CodeErr, ReportCodeErr};
use tracing::debug;

pub use interp_errors::InterpreterError;

use crate::environment::{create_global_env, Env};
use crate::types::Registry;
use crate::values::RuntimeVal;
use frontend::ast::{ASTNode, ASTNodeKind, Block};


/// Outcome of running a statement. Loops consume `Break` and `Continue`,
/// function calls consume `Return`.
#[derive(Debug, PartialEq)]
pub(crate) enum Flow {
    Normal,
    Break,
    Continue,
    Return(RuntimeVal),
}

pub struct Interpreter {
    registry: Registry,
    output: String,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            output: String::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Output printed by the last `interpret` call, faulted or not.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Runs a program with fresh globals, builtins and output. A fault stops
    /// the run and is reported with the line of the top-level statement that
    /// raised it.
    pub fn interpret(&mut self, program: &[ASTNode]) -> Result<(), CodeErr> {
        let mut env = create_global_env(&self.registry);
        debug!(statements = program.len(), "interpret start");

        let res = self.execute_program(program, &mut env);
        self.output = env.take_output();

        debug!(output_len = self.output.len(), faulted = res.is_err(), "interpret end");
        res
    }

    fn execute_program(&self, nodes: &[ASTNode], env: &mut Env) -> Result<(), CodeErr> {
        for n in nodes {
            // Break, continue and return cannot reach the top level: they are
            // rejected where they appear
            self.interpret_node(&n.node, env).map_err(|e| e.to_glob_err(n.line))?;
        }

        Ok(())
    }

    fn interpret_node(&self, node: &ASTNodeKind, env: &mut Env) -> Result<Flow, InterpreterError> {
        match node {
            ASTNodeKind::Expression(expr) => {
                self.evaluate(expr, env)?;
                Ok(Flow::Normal)
            }
            ASTNodeKind::Statement(stmt) => self.execute(stmt, env),
        }
    }

    /// Runs statements until one of them diverts the flow.
    pub(crate) fn exec_block(&self, block: &Block, env: &mut Env) -> Result<Flow, InterpreterError> {
        for node in block {
            match self.interpret_node(node, env)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }

        Ok(Flow::Normal)
    }
}
