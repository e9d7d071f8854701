//! Job-related API endpoints

use crate::QueueClient;
use crate::error::{ClientError, Result};
use labelq_core::domain::job::{Job, JobId};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

impl QueueClient {
    // =============================================================================
    // Job Queue
    // =============================================================================

    /// Fetch the next pending job, if any
    ///
    /// The service answers 200 with a job object, or signals an empty queue
    /// with 204, an empty body, or an empty JSON value. All of those mean
    /// `Ok(None)`. Any other status is an [`ClientError::ApiError`].
    ///
    /// The request is bounded by the fetch timeout.
    pub async fn fetch_next_job(&self) -> Result<Option<Job>> {
        let url = self.fetch_url();
        let response = self
            .client
            .get(&url)
            .timeout(self.fetch_timeout)
            .send()
            .await?;

        let status = response.status();
        debug!("GET {} -> {}", url, status);

        match status {
            StatusCode::OK => {
                let body = response.text().await?;
                parse_job_body(&body)
            }
            StatusCode::NO_CONTENT => Ok(None),
            _ => {
                let message = response.text().await.unwrap_or_default();
                Err(ClientError::api_error(status.as_u16(), message))
            }
        }
    }

    /// Confirm a printed job so the service removes it from the queue
    ///
    /// Only a 200 answer counts as confirmed removal; anything else is
    /// returned as an [`ClientError::ApiError`] carrying the status.
    ///
    /// The request is bounded by the confirm timeout.
    pub async fn confirm_job(&self, id: &JobId) -> Result<()> {
        let url = self.confirm_url(id)?;
        let response = self
            .client
            .delete(url.clone())
            .timeout(self.confirm_timeout)
            .send()
            .await?;

        let status = response.status();
        debug!("DELETE {} -> {}", url, status);

        if status != StatusCode::OK {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::api_error(status.as_u16(), message));
        }

        Ok(())
    }
}

/// Decode a 200 response body into at most one job
fn parse_job_body(body: &str) -> Result<Option<Job>> {
    if body.trim().is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))?;

    if is_empty_value(&value) {
        return Ok(None);
    }

    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| ClientError::ParseError(format!("Invalid job object: {}", e)))
}

/// Values the service uses to say "nothing pending"
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_CONFIRM_PATH, DEFAULT_FETCH_PATH};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_fetch(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(DEFAULT_FETCH_PATH))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn test_empty_values() {
        assert!(is_empty_value(&json!(null)));
        assert!(is_empty_value(&json!({})));
        assert!(is_empty_value(&json!([])));
        assert!(is_empty_value(&json!("")));
        assert!(is_empty_value(&json!(false)));
        assert!(is_empty_value(&json!(0)));
        assert!(!is_empty_value(&json!({"id": 1})));
    }

    #[tokio::test]
    async fn test_fetch_returns_job() {
        let server = MockServer::start().await;
        mock_fetch(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 42, "zpl": "^XA^FDA-12^FS^XZ", "endereco": "A-12"})),
        )
        .await;

        let client = QueueClient::new(server.uri());
        let job = client.fetch_next_job().await.unwrap().unwrap();

        assert_eq!(job.id, JobId::new("42"));
        assert_eq!(job.address.as_deref(), Some("A-12"));
        assert_eq!(job.payload.as_str(), "^XA^FDA-12^FS^XZ");
    }

    #[tokio::test]
    async fn test_fetch_no_content_is_none() {
        let server = MockServer::start().await;
        mock_fetch(&server, ResponseTemplate::new(204)).await;

        let client = QueueClient::new(server.uri());
        assert!(client.fetch_next_job().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_empty_body_is_none() {
        let server = MockServer::start().await;
        mock_fetch(&server, ResponseTemplate::new(200)).await;

        let client = QueueClient::new(server.uri());
        assert!(client.fetch_next_job().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_empty_object_is_none() {
        let server = MockServer::start().await;
        mock_fetch(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

        let client = QueueClient::new(server.uri());
        assert!(client.fetch_next_job().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_unexpected_status() {
        let server = MockServer::start().await;
        mock_fetch(
            &server,
            ResponseTemplate::new(500).set_body_string("database down"),
        )
        .await;

        let client = QueueClient::new(server.uri());
        let err = client.fetch_next_job().await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("database down"));
    }

    #[tokio::test]
    async fn test_fetch_invalid_json() {
        let server = MockServer::start().await;
        mock_fetch(&server, ResponseTemplate::new(200).set_body_string("<html>")).await;

        let client = QueueClient::new(server.uri());
        let err = client.fetch_next_job().await.unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_fetch_job_without_id() {
        let server = MockServer::start().await;
        mock_fetch(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"zpl": "^XA^XZ"})),
        )
        .await;

        let client = QueueClient::new(server.uri());
        let err = client.fetch_next_job().await.unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        mock_fetch(
            &server,
            ResponseTemplate::new(204).set_delay(Duration::from_millis(500)),
        )
        .await;

        let client =
            QueueClient::new(server.uri()).with_fetch_timeout(Duration::from_millis(50));
        let err = client.fetch_next_job().await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_confirm_deletes_job_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{}/42", DEFAULT_CONFIRM_PATH)))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = QueueClient::new(server.uri());
        client.confirm_job(&JobId::new("42")).await.unwrap();
    }

    #[tokio::test]
    async fn test_confirm_sends_id_as_one_segment() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{}/a%2Fb%3Fx=1", DEFAULT_CONFIRM_PATH)))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = QueueClient::new(server.uri());
        client.confirm_job(&JobId::new("a/b?x=1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_confirm_requires_exact_ok() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{}/42", DEFAULT_CONFIRM_PATH)))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = QueueClient::new(server.uri());
        let err = client.confirm_job(&JobId::new("42")).await.unwrap_err();
        assert_eq!(err.status(), Some(202));
    }

    #[tokio::test]
    async fn test_confirm_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client =
            QueueClient::new(server.uri()).with_confirm_timeout(Duration::from_millis(50));
        let err = client.confirm_job(&JobId::new("42")).await.unwrap_err();
        assert!(err.is_timeout());
    }
}
