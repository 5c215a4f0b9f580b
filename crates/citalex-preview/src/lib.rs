//! Preview layer: TTL/FIFO article cache, popup placement, and the
//! debounced, cancellable hover-preview controller.

pub mod cache;
pub mod config;
pub mod fetch;
#[cfg(feature = "http")]
pub mod http;
pub mod position;
pub mod session;

pub use cache::{CacheEntry, PreviewCache, SharedPreviewCache};
pub use config::PreviewConfig;
pub use fetch::{ArticleFetcher, FetchError};
#[cfg(feature = "http")]
pub use http::HttpArticleFetcher;
pub use position::{Placement, Position, Rect, Size, compute_position};
pub use session::{Key, Navigator, PreviewController, PreviewState};
