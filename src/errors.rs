use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptimizeError {
    #[error("Malformed statement at index {0}: {1}")]
    MalformedStatement(usize, String),

    #[error("No definition found for variable {0}")]
    UnresolvedVariable(String),

    #[error("Division by zero in statement {0}")]
    DivisionByZero(usize),

    #[error("Definition of {0} refers to itself")]
    CyclicDefinition(String),

    #[error("Program has no statements or never assigns output")]
    EmptyProgram,
}

#[derive(Error, Debug)]
pub enum PassError {
    #[error(transparent)]
    Optimize(#[from] OptimizeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
