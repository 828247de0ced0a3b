pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod store;

// Export API client types
pub use api::{ApiError, HttpClient, PageRequest, ResourceApi};

// Export logic types
pub use logic::{
    coverage_percentage, merge_included, relationship_stats, CustomFieldResolver, FetchError,
    LogReporter, NullReporter, PageFetcher, ResourceOutcome, SyncReporter, SyncRunner,
    SyncSummary, DEFAULT_PAGE_SIZE,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{CustomFieldStore, MemoryStore, MirrorStore, PostgresStore, ResourceStore};
