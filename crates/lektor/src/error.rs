use thiserror::Error;

#[derive(Error, Debug)]
pub enum LektorError {
    #[error("Anti-automation challenge page received")]
    ChallengeDetected,

    #[error("Gateway timeout (error code: 524)")]
    Transient524,

    #[error("Invalid manifest: {0}")]
    ManifestParseError(String),

    #[error("Manifest has no {0} rendition")]
    SelectionError(&'static str),

    #[error("Failed to fetch segment {url}: {reason}")]
    SegmentFetchError { url: String, reason: String },

    #[error("Multiplexer failed: {0}")]
    MuxError(String),

    #[error("{} already exists, another job owns it or it was left by a killed run", .0.display())]
    EndpointInUse(std::path::PathBuf),

    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    RequestError(#[from] reqwest::Error),

    #[error(transparent)]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),

    #[error("Invalid init segment: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error(transparent)]
    MissingExecutable(#[from] which::Error),

    #[cfg(unix)]
    #[error(transparent)]
    NixError(#[from] nix::Error),
}

impl LektorError {
    /// Whether the error is one of the two conditions worth a delayed retry.
    pub fn is_challenge(&self) -> bool {
        matches!(self, Self::ChallengeDetected | Self::Transient524)
    }
}

pub type LektorResult<T> = Result<T, LektorError>;
