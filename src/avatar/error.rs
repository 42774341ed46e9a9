use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
}

#[derive(Debug, Error)]
#[error("giving up on {url} after {attempts} attempt(s)")]
pub struct FetchFailure {
    pub url: String,
    pub attempts: u32,
    #[source]
    pub last: FetchError,
}

#[derive(Debug, Error)]
pub enum ProcessingFailure {
    #[error("avatar bytes could not be decoded")]
    Decode(#[from] image::ImageError),
    #[error("avatar image has no pixels")]
    Empty,
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to write avatar {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode avatar {}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("{url:?} has no file name to cache under")]
    InvalidUrl { url: String },
    #[error(transparent)]
    Fetch(#[from] FetchFailure),
    #[error("failed to process {url}")]
    Processing {
        url: String,
        #[source]
        source: ProcessingFailure,
    },
    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[derive(Debug, Error)]
#[error("no avatar for {person_id}: {primary}; fallback {fallback_url}: {fallback}")]
pub struct AvatarUnresolved {
    pub person_id: String,
    pub fallback_url: String,
    pub primary: AvatarError,
    pub fallback: AvatarError,
}
