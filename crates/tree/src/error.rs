use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Record {record} has {arity} columns, column {column} requested")]
    MissingColumn {
        record: usize,
        column: usize,
        arity: usize,
    },
}
