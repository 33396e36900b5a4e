use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("upstream reported an unsuccessful response for page {0}")]
    Unsuccessful(u32),

    #[error("page {page} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        page: u32,
        attempts: u32,
        #[source]
        source: Box<ScannerError>,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScannerResult<T> = std::result::Result<T, ScannerError>;
