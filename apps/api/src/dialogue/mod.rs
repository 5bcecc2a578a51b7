// Dialogue persistence: parses a two-speaker transcript into turns and writes
// it to a fixed file, overwriting whatever was there.

use thiserror::Error;

pub mod handlers;
pub mod parser;
pub mod store;

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("Could not infer two distinct speaker labels from the first two lines")]
    RoleInference,

    #[error("Failed to serialize transcript: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
