//! Source text in, typed program out.

use crate::error::TypeError;
use crate::symbols::GlobalCounts;
use crate::validator::Validator;
use bang_ast::ast::{Program, Statement};
use bang_ast::types::Type;
use bang_parser::ParseError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Type(#[from] TypeError),
}

impl CompileError {
    pub fn line(&self) -> Option<usize> {
        match self {
            CompileError::Parse(e) => e.line(),
            CompileError::Type(e) => Some(e.line()),
        }
    }
}

/// A validated program together with the global slot counters.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub program: Program,
    pub counts: GlobalCounts,
}

impl Analysis {
    /// Top-level bindings in order of first definition.
    pub fn bindings(&self) -> Vec<(&str, &Type)> {
        let mut out: Vec<(&str, &Type)> = Vec::new();
        for stmt in &self.program.body.statements {
            let Statement::Assignment(a) = stmt else { continue };
            for var in &a.variables {
                let Some(ty) = &var.ty else { continue };
                if !out.iter().any(|(name, _)| *name == var.identifier) {
                    out.push((var.identifier.as_str(), ty));
                }
            }
        }
        out
    }
}

pub fn compile(src: &str) -> Result<Program, CompileError> {
    Ok(analyze(src)?.program)
}

pub fn analyze(src: &str) -> Result<Analysis, CompileError> {
    let program = bang_parser::parse(src)?;
    let mut validator = Validator::new();
    let program = validator.validate(program)?;
    Ok(Analysis { program, counts: validator.symbols().counts() })
}
