use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("payload is not a recognized archive, compressed blob, or JSON document")]
    UnrecognizedPayload,

    #[error("invalid archive: {0}")]
    InvalidArchive(#[from] zip::result::ZipError),

    #[error("failed to decompress payload: {0}")]
    Decompress(#[from] std::io::Error),

    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("decompressed data exceeds the {0} byte ceiling")]
    TooLarge(u64),
}
