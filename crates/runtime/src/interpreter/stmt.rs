use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use super::{Flow, Interpreter, InterpreterError};
use crate::environment::{Context, Env};
use crate::types::TypeObject;
use crate::values::{FunctionVal, RuntimeVal};
use frontend::ast::{Block, StatementKind};

impl Interpreter {
    pub(super) fn execute(&self, stmt: &StatementKind, env: &mut Env) -> Result<Flow, InterpreterError> {
        match stmt {
            StatementKind::Assign { target, value } => {
                let value = self.evaluate(value, env)?;
                let location = self.locate(target, env)?;
                self.store(location, value, env)?;

                Ok(Flow::Normal)
            }
            StatementKind::Pass => Ok(Flow::Normal),
            StatementKind::Del { target } => {
                let location = self.locate(target, env)?;
                self.delete(location, env)?;

                Ok(Flow::Normal)
            }
            StatementKind::Return { value } => {
                if !env.in_function() {
                    return Err(InterpreterError::Syntax("'return' outside function".into()));
                }

                let value = match value {
                    Some(v) => self.evaluate(v, env)?,
                    None => RuntimeVal::None,
                };

                Ok(Flow::Return(value))
            }
            StatementKind::Break => {
                if env.loop_depth == 0 {
                    return Err(InterpreterError::Syntax("'break' outside loop".into()));
                }

                Ok(Flow::Break)
            }
            StatementKind::Continue => {
                if env.loop_depth == 0 {
                    return Err(InterpreterError::Syntax("'continue' not properly in loop".into()));
                }

                Ok(Flow::Continue)
            }
            StatementKind::Def { name, params, body } => {
                if env.in_function() {
                    return Err(InterpreterError::Syntax(format!(
                        "function '{}' cannot be defined inside a function body",
                        name
                    )));
                }

                let func = FunctionVal {
                    name: name.clone(),
                    params: params.iter().cloned().collect(),
                    body: Rc::new(body.clone()),
                    receiver: None,
                };
                env.assign_var(name, RuntimeVal::Function(Rc::new(func)));

                Ok(Flow::Normal)
            }
            StatementKind::Class { name, bases, body } => {
                if env.in_function() {
                    return Err(InterpreterError::Syntax(format!(
                        "class '{}' cannot be defined inside a function body",
                        name
                    )));
                }

                let class = self.create_class(name, bases, body, env)?;
                env.assign_var(name, RuntimeVal::Type(class));

                Ok(Flow::Normal)
            }
            StatementKind::For {
                target,
                iterable,
                body,
                else_body,
            } => {
                let iterable = self.evaluate(iterable, env)?;

                for item in self.iterate(&iterable)? {
                    let location = self.locate(target, env)?;
                    self.store(location, item, env)?;

                    match self.exec_loop_body(body, env)? {
                        Flow::Break => return Ok(Flow::Normal),
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }

                self.exec_block(else_body, env)
            }
            StatementKind::While {
                condition,
                body,
                else_body,
            } => {
                loop {
                    let test = self.evaluate(condition, env)?;
                    if !self.is_truthy(&test, env)? {
                        break;
                    }

                    match self.exec_loop_body(body, env)? {
                        Flow::Break => return Ok(Flow::Normal),
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }

                self.exec_block(else_body, env)
            }
            StatementKind::If {
                condition,
                body,
                elifs,
                else_body,
            } => {
                let test = self.evaluate(condition, env)?;
                if self.is_truthy(&test, env)? {
                    return self.exec_block(body, env);
                }

                for elif in elifs {
                    let test = self.evaluate(&elif.condition, env)?;
                    if self.is_truthy(&test, env)? {
                        return self.exec_block(&elif.body, env);
                    }
                }

                self.exec_block(else_body, env)
            }
        }
    }

    fn exec_loop_body(&self, body: &Block, env: &mut Env) -> Result<Flow, InterpreterError> {
        env.loop_depth += 1;
        let flow = self.exec_block(body, env);
        env.loop_depth -= 1;

        flow
    }

    // The body runs with the new type's members as the active context
    fn create_class(
        &self,
        name: &str,
        bases: &[frontend::ast::ExpressionKind],
        body: &Block,
        env: &mut Env,
    ) -> Result<Rc<TypeObject>, InterpreterError> {
        let mut base_types = vec![];
        for base in bases {
            match self.evaluate(base, env)? {
                RuntimeVal::Type(t) => base_types.push(t),
                other => {
                    return Err(InterpreterError::Type(format!(
                        "bases must be types, not '{}'",
                        other.type_name()
                    )))
                }
            }
        }

        if base_types.is_empty() {
            base_types.push(self.registry.object.clone());
        }

        trace!(
            class = name,
            bases = ?base_types.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
            "create class"
        );

        let class = Rc::new(TypeObject::new(name, base_types, IndexMap::new()));

        let saved = env.enter(Context::Class(class.clone()));
        let res = self.exec_block(body, env);
        env.leave(saved);
        res?;

        Ok(class)
    }
}
