use thiserror::Error;

#[derive(Error, Debug)]
pub enum SQLError {
    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("connection error: {0}")]
    Connection(String),

    /// A UNIQUE, FOREIGN KEY or NOT NULL constraint rejected the statement.
    /// The message is SQLite's, e.g. `UNIQUE constraint failed: tags.name`.
    #[error("constraint violation: {0}")]
    Constraint(String),
}
