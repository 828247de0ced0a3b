use crate::api::{PageRequest, ResourceApi};
use crate::logic::merge::merge_included;
use crate::logic::report::{SyncReporter, NULL_REPORTER};
use crate::model::{Resource, ResourceConfig, ResourcePage};
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Terminal errors from fetching one resource collection.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The body had no `data` sequence (or a malformed primary record).
    /// Never retried.
    #[error("page {page}: response body has no 'data' sequence")]
    InvalidResponseFormat { page: u32 },

    /// Transport/HTTP failure that did not mention includes, or the include
    /// fallback ladder was exhausted.
    #[error("page {page}: {message}")]
    FetchFailed { page: u32, message: String },
}

/// Retrieves every page of one JSON:API resource collection, negotiating the
/// relationship include list down the fallback ladder when the server
/// rejects it.
///
/// Continuation is driven by page size alone: a page that comes back with
/// exactly `page_size` records always triggers one more request, so a total
/// count that is an exact multiple of the page size costs one trailing
/// empty-data request.
pub struct PageFetcher<'a, A: ResourceApi + ?Sized> {
    api: &'a A,
    page_size: usize,
    reporter: &'a dyn SyncReporter,
}

impl<'a, A: ResourceApi + ?Sized> PageFetcher<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            page_size: DEFAULT_PAGE_SIZE,
            reporter: &NULL_REPORTER,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_reporter(mut self, reporter: &'a dyn SyncReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Fetch all pages of `config`'s collection, merging each page's
    /// `included` side-table into its primary resources. Order preserved.
    ///
    /// When a request fails and the error message mentions `include`, the
    /// fallback ladder is walked (forward only, skipping rungs equal to the
    /// current parameter) and the same page is retried with the reduced
    /// include list. Any other failure, or a ladder with nothing left to
    /// try, aborts the whole fetch.
    pub async fn fetch_all(&self, config: &ResourceConfig) -> Result<Vec<Resource>, FetchError> {
        let mut include = config.includes.full_param();
        let mut ladder_cursor = 0usize;
        let mut page: u32 = 1;
        let mut accumulated = Vec::new();

        loop {
            let request = PageRequest {
                path: config.path.to_string(),
                include: include.clone(),
                page,
                page_size: self.page_size,
                sort: config.sort.map(str::to_string),
            };

            let body = match self.api.fetch_page(&request).await {
                Ok(body) => body,
                Err(err) => {
                    let message = err.to_string();
                    if message.contains("include") {
                        if let Some((next, cursor)) =
                            config.includes.next_fallback(ladder_cursor, include.as_deref())
                        {
                            self.reporter.include_fallback(
                                config.name,
                                page,
                                include.as_deref().unwrap_or("<none>"),
                                next.as_deref().unwrap_or("<none>"),
                            );
                            include = next;
                            ladder_cursor = cursor;
                            // Retry the same page with the reduced includes
                            continue;
                        }
                    }
                    return Err(FetchError::FetchFailed { page, message });
                }
            };

            let Some(mut parsed) = ResourcePage::from_body(body) else {
                return Err(FetchError::InvalidResponseFormat { page });
            };

            let count = parsed.data.len();
            merge_included(&mut parsed.data, &parsed.included);
            accumulated.append(&mut parsed.data);
            self.reporter.page_fetched(config.name, page, count);

            if count < self.page_size {
                break;
            }
            page += 1;
        }

        Ok(accumulated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::model::IncludeSpec;
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    /// Scripted API double: serves canned pages and rejects configured
    /// include parameters with an include-mentioning error.
    struct ScriptedApi {
        pages: Vec<Value>,
        rejected_includes: Vec<String>,
        failure: Option<String>,
        requests: Mutex<Vec<PageRequest>>,
    }

    impl ScriptedApi {
        fn serving(pages: Vec<Value>) -> Self {
            Self {
                pages,
                rejected_includes: Vec::new(),
                failure: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn rejecting_includes(mut self, includes: &[&str]) -> Self {
            self.rejected_includes = includes.iter().map(|s| s.to_string()).collect();
            self
        }

        fn failing_with(mut self, message: &str) -> Self {
            self.failure = Some(message.to_string());
            self
        }

        fn requests(&self) -> Vec<PageRequest> {
            self.requests.lock().clone()
        }
    }

    #[async_trait::async_trait]
    impl ResourceApi for ScriptedApi {
        async fn fetch_page(&self, request: &PageRequest) -> Result<Value, ApiError> {
            self.requests.lock().push(request.clone());

            if let Some(message) = &self.failure {
                return Err(ApiError::Status {
                    status: 500,
                    message: message.clone(),
                });
            }
            if let Some(include) = &request.include {
                if self.rejected_includes.iter().any(|r| r == include) {
                    return Err(ApiError::Status {
                        status: 400,
                        message: format!("Invalid include: {}", include),
                    });
                }
            }

            Ok(self
                .pages
                .get((request.page - 1) as usize)
                .cloned()
                .unwrap_or_else(|| json!({ "data": [] })))
        }
    }

    fn page_of(count: usize, offset: usize) -> Value {
        let data: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "id": (offset + i + 1).to_string(),
                    "type": "tasks",
                    "attributes": {"title": format!("task {}", offset + i + 1)}
                })
            })
            .collect();
        json!({ "data": data })
    }

    fn tasks_config(includes: &[&str]) -> ResourceConfig {
        let mut config = crate::model::find("tasks").unwrap();
        config.includes = if includes.is_empty() {
            IncludeSpec::none()
        } else {
            IncludeSpec::new(includes.iter().copied())
        };
        config.sort = None;
        config
    }

    #[tokio::test]
    async fn stops_after_short_page_and_preserves_order() {
        let api = ScriptedApi::serving(vec![page_of(100, 0), page_of(100, 100), page_of(47, 200)]);
        let fetcher = PageFetcher::new(&api);

        let resources = fetcher.fetch_all(&tasks_config(&[])).await.unwrap();

        assert_eq!(resources.len(), 247);
        assert_eq!(resources[0].id, "1");
        assert_eq!(resources[246].id, "247");
        let requests = api.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests.iter().map(|r| r.page).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn exact_multiple_costs_one_trailing_request() {
        let api = ScriptedApi::serving(vec![page_of(100, 0), page_of(100, 100)]);
        let fetcher = PageFetcher::new(&api);

        let resources = fetcher.fetch_all(&tasks_config(&[])).await.unwrap();

        assert_eq!(resources.len(), 200);
        // Two full pages, then the empty page that signals the end
        assert_eq!(api.requests().len(), 3);
    }

    #[tokio::test]
    async fn small_page_size_drives_continuation() {
        let api = ScriptedApi::serving(vec![page_of(10, 0), page_of(3, 10)]);
        let fetcher = PageFetcher::new(&api).with_page_size(10);

        let resources = fetcher.fetch_all(&tasks_config(&[])).await.unwrap();

        assert_eq!(resources.len(), 13);
        assert_eq!(api.requests().len(), 2);
    }

    #[tokio::test]
    async fn include_rejection_retries_same_page_with_next_rung() {
        let api = ScriptedApi::serving(vec![page_of(2, 0)])
            .rejecting_includes(&["creator,assignee"]);
        let fetcher = PageFetcher::new(&api);

        let resources = fetcher
            .fetch_all(&tasks_config(&["creator", "assignee"]))
            .await
            .unwrap();

        // Page retried, resources contributed exactly once
        assert_eq!(resources.len(), 2);
        let requests = api.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].page, 1);
        assert_eq!(requests[0].include.as_deref(), Some("creator,assignee"));
        assert_eq!(requests[1].page, 1);
        assert_eq!(requests[1].include.as_deref(), Some("creator"));
    }

    #[tokio::test]
    async fn ladder_walks_down_to_empty_include() {
        let api = ScriptedApi::serving(vec![page_of(1, 0)])
            .rejecting_includes(&["creator,assignee", "creator", "assignee"]);
        let fetcher = PageFetcher::new(&api);

        let resources = fetcher
            .fetch_all(&tasks_config(&["creator", "assignee"]))
            .await
            .unwrap();

        assert_eq!(resources.len(), 1);
        let requests = api.requests();
        let includes: Vec<Option<&str>> =
            requests.iter().map(|r| r.include.as_deref()).collect();
        assert_eq!(
            includes,
            vec![
                Some("creator,assignee"),
                Some("creator"),
                Some("assignee"),
                None
            ]
        );
    }

    #[tokio::test]
    async fn exhausted_ladder_aborts_the_fetch() {
        // Ladder bottom (no includes) cannot be rejected via the include
        // parameter, so use an empty spec and a failure that mentions
        // includes anyway.
        let api = ScriptedApi::serving(vec![page_of(1, 0)])
            .failing_with("cannot process include parameter");
        let fetcher = PageFetcher::new(&api);

        let err = fetcher.fetch_all(&tasks_config(&[])).await.unwrap_err();

        match err {
            FetchError::FetchFailed { page, message } => {
                assert_eq!(page, 1);
                assert!(message.contains("include"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(api.requests().len(), 1);
    }

    #[tokio::test]
    async fn non_include_error_is_fatal_without_retry() {
        let api = ScriptedApi::serving(vec![page_of(1, 0)]).failing_with("gateway timeout");
        let fetcher = PageFetcher::new(&api);

        let err = fetcher
            .fetch_all(&tasks_config(&["creator"]))
            .await
            .unwrap_err();

        match err {
            FetchError::FetchFailed { page, message } => {
                assert_eq!(page, 1);
                assert!(message.contains("gateway timeout"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(api.requests().len(), 1);
    }

    #[tokio::test]
    async fn malformed_body_is_terminal() {
        let api = ScriptedApi::serving(vec![json!({"data": "nope"})]);
        let fetcher = PageFetcher::new(&api);

        let err = fetcher.fetch_all(&tasks_config(&[])).await.unwrap_err();

        match err {
            FetchError::InvalidResponseFormat { page } => assert_eq!(page, 1),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(api.requests().len(), 1);
    }

    #[tokio::test]
    async fn included_side_table_is_merged_into_results() {
        let body = json!({
            "data": [{
                "id": "1",
                "type": "tasks",
                "attributes": {"title": "Fix login"},
                "relationships": {
                    "assignee": {"data": {"type": "people", "id": "9"}}
                }
            }],
            "included": [
                {"id": "9", "type": "people", "attributes": {"name": "Ada"}}
            ]
        });
        let api = ScriptedApi::serving(vec![body]);
        let fetcher = PageFetcher::new(&api);

        let resources = fetcher
            .fetch_all(&tasks_config(&["assignee"]))
            .await
            .unwrap();

        match &resources[0].relationships["assignee"].data {
            Some(crate::model::RelationshipData::One(reference)) => {
                assert_eq!(
                    reference.attributes.as_ref().unwrap()["name"],
                    json!("Ada")
                );
            }
            other => panic!("unexpected assignee shape: {:?}", other),
        }
    }
}
