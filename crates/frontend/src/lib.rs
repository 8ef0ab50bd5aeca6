pub mod ast;
pub mod dump;
pub mod lexer;
pub mod parser;

use tools::errors::{CodeErr, ReportCodeErr};

use ast::ASTNode;
use lexer::Lexer;
use parser::Parser;

/// Reads a program written in the prefix notation produced by [`dump::dump_program`].
pub fn read_program(source: &str) -> Result<Vec<ASTNode>, CodeErr> {
    let mut lexer: Lexer = Default::default();
    lexer.tokenize(source).map_err(|e| e.to_glob_err(0))?;

    let mut parser: Parser = Default::default();
    parser.build_ast(lexer.tokens)?;

    Ok(parser.ast_nodes)
}
