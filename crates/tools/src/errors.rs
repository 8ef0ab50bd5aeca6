use std::fmt::Display;

/// Fault reported at the boundary of a run: the kind of fault, its message and
/// the line of the top-level statement that raised it.
#[derive(Debug, PartialEq, Clone)]
pub struct CodeErr {
    kind: String,
    message: String,
    line: u64,
}

impl CodeErr {
    pub fn new(kind: impl Into<String>, message: impl Into<String>, line: u64) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            line,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> u64 {
        self.line
    }
}

impl Display for CodeErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for CodeErr {}

pub trait ReportCodeErr: Display {
    fn kind(&self) -> &'static str {
        "Error"
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn to_glob_err(&self, line: u64) -> CodeErr {
        CodeErr::new(self.kind(), self.message(), line)
    }
}
