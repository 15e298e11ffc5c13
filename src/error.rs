use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelgenError {
    #[error("Unable to list tables: {0}")]
    TableListing(String),

    #[error("Query failed: {message}\n{sql}")]
    Query { sql: String, message: String },

    #[error("Foreign key {table}.{column} is missing its target table")]
    MalformedForeignKey { table: String, column: String },

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    #[error("Unknown case option: {0}")]
    UnknownCase(String),

    #[error("Unknown output language: {0}")]
    UnknownLang(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
