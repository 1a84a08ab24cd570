pub mod browser;
pub mod candidate;
pub mod collect;
pub mod error;
pub mod normalize;
pub mod query_api;
pub mod selectors;
pub mod static_page;

pub use candidate::RawCandidate;
pub use collect::{build_http_client, collect_all, extract_source, ScrapeSettings, SourceBatch};
pub use error::ScrapeError;
pub use normalize::{normalize_batch, SourceContext};
