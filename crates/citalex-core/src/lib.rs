pub mod citation;
pub mod key;
pub mod normalize;

pub use citation::{ArticleContent, ArticleRequest, CitationMatch, Context, ParsedCitation};
pub use key::cache_key;
pub use normalize::{normalize_act_type, normalize_article, normalize_year};
