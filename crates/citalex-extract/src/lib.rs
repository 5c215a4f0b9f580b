//! Citation extraction: tiered pattern scanning over legal prose, span
//! allocation, and inline annotation markers.

pub mod allocator;
pub mod annotate;
pub mod extractor;
pub mod scrub;
pub mod tier;

pub use allocator::SpanAllocator;
pub use annotate::{MarkerPayload, annotate};
pub use extractor::{CitationExtractor, extract};
pub use scrub::scrub_markup;
pub use tier::{Candidate, Tier};
