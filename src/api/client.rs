use crate::api::ApiError;
use serde_json::Value;

/// Everything needed to request one page of a resource collection.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub path: String,
    pub include: Option<String>,
    pub page: u32,
    pub page_size: usize,
    pub sort: Option<String>,
}

/// The upstream API seam. The production implementation is [`HttpClient`];
/// tests script responses through this trait.
#[async_trait::async_trait]
pub trait ResourceApi: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Value, ApiError>;
}

/// Bearer-token JSON:API client over reqwest.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn collection_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl ResourceApi for HttpClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Value, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::with_capacity(4);
        if let Some(include) = &request.include {
            query.push(("include", include.clone()));
        }
        query.push(("page[number]", request.page.to_string()));
        query.push(("page[size]", request.page_size.to_string()));
        if let Some(sort) = &request.sort {
            query.push(("sort", sort.clone()));
        }

        let response = self
            .client
            .get(self.collection_url(&request.path))
            .bearer_auth(&self.token)
            .header("Content-Type", "application/vnd.api+json")
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_url_joins_without_duplicate_slashes() {
        let client = HttpClient::new("https://api.example.com/v2/", "token");
        assert_eq!(
            client.collection_url("/tasks"),
            "https://api.example.com/v2/tasks"
        );
        assert_eq!(
            client.collection_url("time_entries"),
            "https://api.example.com/v2/time_entries"
        );
    }

    #[test]
    fn status_error_message_is_visible_in_display() {
        let err = ApiError::Status {
            status: 400,
            message: "Invalid include: creator,assignee".to_string(),
        };
        assert!(err.to_string().contains("include"));
    }
}
