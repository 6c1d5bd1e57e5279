use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("task id must not be empty")]
    EmptyTaskId,

    #[error("invalid base url: {0}")]
    BaseUrl(String),

    #[error("upload failed with status {status}")]
    Upload { status: u16 },

    #[error("status query failed with status {status}")]
    StatusQuery { status: u16 },

    #[error("result download failed with status {status}")]
    Download { status: u16 },

    #[error("malformed server response: {0}")]
    MalformedResponse(&'static str),

    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
