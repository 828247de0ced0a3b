pub mod fetch;
pub mod merge;
pub mod report;
pub mod resolve;
pub mod stats;
pub mod sync;

pub use fetch::{FetchError, PageFetcher, DEFAULT_PAGE_SIZE};
pub use merge::merge_included;
pub use report::{LogReporter, NullReporter, SyncReporter};
pub use resolve::CustomFieldResolver;
pub use stats::{coverage_percentage, relationship_stats, report_relationship_coverage};
pub use sync::{ResourceOutcome, SyncRunner, SyncSummary};
