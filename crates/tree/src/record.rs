use crate::error::{Result, TreeError};
use locview_protocol::{Record, Scalar};

/// Column `column` of the `record_index`-th record.
pub fn cell(record: &Record, record_index: usize, column: usize) -> Result<&Scalar> {
    record.get(column).ok_or(TreeError::MissingColumn {
        record: record_index,
        column,
        arity: record.len(),
    })
}

pub fn cell_text(record: &Record, record_index: usize, column: usize) -> Result<String> {
    cell(record, record_index, column).map(ToString::to_string)
}
