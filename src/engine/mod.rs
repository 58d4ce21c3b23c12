/// Search engine layer: matching, record walking, sources and scheduling.
pub mod errors;
pub mod matcher;
pub mod record;
pub mod remote;
pub mod report;
pub mod scheduler;
pub mod source;
pub mod walker;

pub use errors::SearchError;
pub use record::{MatchEntry, Record, SearchOutcome};
pub use remote::{HttpFetcher, RemoteFetch};
pub use report::Reporter;
pub use scheduler::{Keystroke, SearchController, SearchEvent, SearchOptions, SearchState};
pub use source::{HttpMethod, Source};
