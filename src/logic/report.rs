/// Structured progress sink for sync runs. Fetchers and orchestrators emit
/// through this seam instead of checking what kind of caller invoked them;
/// pass [`NullReporter`] to run silently.
pub trait SyncReporter: Send + Sync {
    fn page_fetched(&self, resource: &str, page: u32, count: usize);
    fn include_fallback(&self, resource: &str, page: u32, rejected: &str, next: &str);
    fn relationship_coverage(
        &self,
        resource: &str,
        relationship: &str,
        count: usize,
        total: usize,
        percentage: f64,
    );
    fn entity_resolved(&self, entity_type: &str, entity_id: &str, rows: usize);
    fn entity_failed(&self, entity_type: &str, entity_id: &str, message: &str);
}

/// Reporter backed by the `log` facade.
pub struct LogReporter;

impl SyncReporter for LogReporter {
    fn page_fetched(&self, resource: &str, page: u32, count: usize) {
        log::info!("{}: page {} returned {} records", resource, page, count);
    }

    fn include_fallback(&self, resource: &str, page: u32, rejected: &str, next: &str) {
        log::warn!(
            "{}: include '{}' rejected on page {}, retrying with '{}'",
            resource,
            rejected,
            page,
            next
        );
    }

    fn relationship_coverage(
        &self,
        resource: &str,
        relationship: &str,
        count: usize,
        total: usize,
        percentage: f64,
    ) {
        log::info!(
            "{}: relationship '{}' populated on {}/{} records ({:.2}%)",
            resource,
            relationship,
            count,
            total,
            percentage
        );
    }

    fn entity_resolved(&self, entity_type: &str, entity_id: &str, rows: usize) {
        log::debug!(
            "{} {}: resolved {} custom field values",
            entity_type,
            entity_id,
            rows
        );
    }

    fn entity_failed(&self, entity_type: &str, entity_id: &str, message: &str) {
        log::error!(
            "{} {}: custom field resolution failed: {}",
            entity_type,
            entity_id,
            message
        );
    }
}

/// Reporter that drops everything.
pub struct NullReporter;

impl SyncReporter for NullReporter {
    fn page_fetched(&self, _resource: &str, _page: u32, _count: usize) {}
    fn include_fallback(&self, _resource: &str, _page: u32, _rejected: &str, _next: &str) {}
    fn relationship_coverage(
        &self,
        _resource: &str,
        _relationship: &str,
        _count: usize,
        _total: usize,
        _percentage: f64,
    ) {
    }
    fn entity_resolved(&self, _entity_type: &str, _entity_id: &str, _rows: usize) {}
    fn entity_failed(&self, _entity_type: &str, _entity_id: &str, _message: &str) {}
}

pub(crate) static NULL_REPORTER: NullReporter = NullReporter;
pub(crate) static LOG_REPORTER: LogReporter = LogReporter;
