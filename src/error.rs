use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Cannot parse timestamp '{value}' in row {row}")]
    Timestamp { row: usize, value: String },

    #[error("Column '{name}' not found")]
    MissingColumn { name: String },

    #[error("Unsupported value in column '{column}': {value}")]
    UnsupportedValue { column: String, value: String },
}

pub type ReportResult<T> = Result<T, ReportError>;
