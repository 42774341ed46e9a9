mod cache;
mod error;
mod fetch;
mod process;
mod resolve;
mod retry;

pub use cache::{AvatarCache, CacheKey};
pub use error::{AvatarError, AvatarUnresolved, CacheError, FetchError, FetchFailure, ProcessingFailure};
pub use fetch::{FetchConfig, HttpSource, ImageFetcher, ImageSource};
pub use process::{CircularImage, make_circular};
pub use resolve::{AvatarArtifact, AvatarResolver, DEFAULT_FALLBACK_BASE, FallbackAvatars};
pub use retry::{Retry, RetryExhausted};
