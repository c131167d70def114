//! Hosted-table HTTP client
//!
//! Talks to the hosted backend's REST surface. Every route takes the same
//! JSON parameter objects the port defines and answers with a
//! `TableResponse` envelope:
//!
//! - `POST   {base}/tables/{table}/records/query`       fetch_records
//! - `POST   {base}/tables/{table}/records/{id}/query`  get_record_by_id
//! - `POST   {base}/tables/{table}/records`             create_record
//! - `PUT    {base}/tables/{table}/records`             update_record
//! - `DELETE {base}/tables/{table}/records`             delete_record
//!
//! Credentials travel as the `x-project-id` and `x-public-key` headers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::RecordId;
use crate::ports::{DeleteParams, FetchParams, HostedTableClient, TableResponse, WriteParams};

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the hosted backend
#[derive(Debug, Clone)]
pub struct HttpClientSettings {
    pub base_url: String,
    pub project_id: String,
    pub public_key: String,
    pub timeout: Duration,
}

/// Hosted-table backend client over HTTP
#[derive(Debug)]
pub struct HttpTableClient {
    client: Client,
    base_url: String,
    project_id: String,
    public_key: String,
    timeout_secs: u64,
}

impl HttpTableClient {
    /// Create a client; both credentials must be non-empty
    pub fn new(settings: &HttpClientSettings) -> Result<Self> {
        if settings.project_id.trim().is_empty() {
            return Err(Error::config("project id cannot be empty"));
        }
        if settings.public_key.trim().is_empty() {
            return Err(Error::config("public key cannot be empty"));
        }
        Url::parse(&settings.base_url)
            .map_err(|e| Error::config(format!("invalid base URL '{}': {}", settings.base_url, e)))?;

        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            project_id: settings.project_id.clone(),
            public_key: settings.public_key.clone(),
            timeout_secs: settings.timeout.as_secs(),
        })
    }

    fn records_url(&self, table: &str) -> String {
        format!("{}/tables/{}/records", self.base_url, table)
    }

    async fn send<P: Serialize + ?Sized>(
        &self,
        method: Method,
        url: String,
        params: &P,
    ) -> Result<TableResponse> {
        let response = self
            .client
            .request(method, &url)
            .header("x-project-id", &self.project_id)
            .header("x-public-key", &self.public_key)
            .json(params)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.read_envelope(response).await
    }

    /// Decode the response envelope
    ///
    /// Error statuses that still carry an envelope (the backend explaining
    /// why it refused) are returned as that envelope so its message reaches
    /// the caller. Anything else maps to a transport error by status.
    async fn read_envelope(&self, response: Response) -> Result<TableResponse> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_request_error(e))?;

        match serde_json::from_str::<TableResponse>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(status_error(status)),
            Err(e) => Err(Error::Decode(format!(
                "unexpected response from hosted backend: {}",
                e
            ))),
        }
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::transport(format!(
                "Connection timed out after {} seconds",
                self.timeout_secs
            ))
        } else if error.is_connect() {
            Error::transport("Unable to connect to the hosted backend")
        } else {
            Error::transport(format!("Request failed: {}", error))
        }
    }
}

fn status_error(status: StatusCode) -> Error {
    match status.as_u16() {
        401 => Error::transport("Authentication failed. Check the project id and public key."),
        403 => Error::transport("Access denied. The public key lacks permission for this table."),
        404 => Error::transport("Hosted backend endpoint not found."),
        429 => Error::transport("Rate limit exceeded. Please wait a moment and try again."),
        code => Error::transport(format!("Hosted backend error: HTTP {}", code)),
    }
}

#[async_trait]
impl HostedTableClient for HttpTableClient {
    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<TableResponse> {
        let url = format!("{}/query", self.records_url(table));
        self.send(Method::POST, url, params).await
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        params: &FetchParams,
    ) -> Result<TableResponse> {
        let url = format!("{}/{}/query", self.records_url(table), id);
        self.send(Method::POST, url, params).await
    }

    async fn create_record(&self, table: &str, params: &WriteParams) -> Result<TableResponse> {
        self.send(Method::POST, self.records_url(table), params).await
    }

    async fn update_record(&self, table: &str, params: &WriteParams) -> Result<TableResponse> {
        self.send(Method::PUT, self.records_url(table), params).await
    }

    async fn delete_record(&self, table: &str, params: &DeleteParams) -> Result<TableResponse> {
        self.send(Method::DELETE, self.records_url(table), params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::table_mock::{MockReply, MockTableServer};
    use crate::ports::FieldSpec;
    use serde_json::json;

    fn settings(base_url: &str) -> HttpClientSettings {
        HttpClientSettings {
            base_url: base_url.to_string(),
            project_id: "proj_test".to_string(),
            public_key: "pk_test".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_reject_empty_credentials() {
        let mut s = settings("http://localhost");
        s.public_key = String::new();
        let err = HttpTableClient::new(&s).unwrap_err();
        assert!(err.to_string().contains("public key cannot be empty"));

        let mut s = settings("http://localhost");
        s.project_id = "  ".to_string();
        assert!(HttpTableClient::new(&s).is_err());
    }

    #[test]
    fn test_reject_invalid_base_url() {
        let err = HttpTableClient::new(&settings("not a url")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpTableClient::new(&settings("http://localhost/api/")).unwrap();
        assert_eq!(client.records_url("profiles_c"), "http://localhost/api/tables/profiles_c/records");
    }

    #[tokio::test]
    async fn test_fetch_sends_credentials_and_params() {
        let server = MockTableServer::start(vec![MockReply::ok(json!({
            "success": true,
            "data": [{"Id": 1}]
        }))])
        .unwrap();

        let client = HttpTableClient::new(&settings(&server.base_url())).unwrap();
        let params = FetchParams::new(vec![FieldSpec::column("Id")]);
        let response = client.fetch_records("profiles_c", &params).await.unwrap();
        assert_eq!(response.data, Some(json!([{"Id": 1}])));

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/tables/profiles_c/records/query");
        assert_eq!(requests[0].header("x-project-id"), Some("proj_test"));
        assert_eq!(requests[0].header("x-public-key"), Some("pk_test"));
        assert_eq!(requests[0].json(), json!({"fields": [{"field": {"Name": "Id"}}]}));
    }

    #[tokio::test]
    async fn test_routes_per_operation() {
        let ok = || MockReply::ok(json!({"success": true}));
        let server = MockTableServer::start(vec![ok(), ok(), ok(), ok()]).unwrap();
        let client = HttpTableClient::new(&settings(&server.base_url())).unwrap();

        client
            .get_record_by_id("t", 7, &FetchParams::default())
            .await
            .unwrap();
        client
            .create_record("t", &WriteParams::single(json!({"Name": "a"})))
            .await
            .unwrap();
        client
            .update_record("t", &WriteParams::single(json!({"Id": 7})))
            .await
            .unwrap();
        client
            .delete_record("t", &DeleteParams::single(7))
            .await
            .unwrap();

        let seen: Vec<(String, String)> = server
            .requests()
            .into_iter()
            .map(|r| (r.method.clone(), r.path.clone()))
            .collect();
        assert_eq!(
            seen,
            vec![
                ("POST".to_string(), "/tables/t/records/7/query".to_string()),
                ("POST".to_string(), "/tables/t/records".to_string()),
                ("PUT".to_string(), "/tables/t/records".to_string()),
                ("DELETE".to_string(), "/tables/t/records".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_error_status_with_envelope_keeps_backend_message() {
        let server = MockTableServer::start(vec![MockReply::status(
            400,
            json!({"success": false, "message": "table not found"}),
        )])
        .unwrap();
        let client = HttpTableClient::new(&settings(&server.base_url())).unwrap();

        let response = client
            .fetch_records("missing", &FetchParams::default())
            .await
            .unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("table not found"));
    }

    #[tokio::test]
    async fn test_error_status_without_envelope_maps_to_transport() {
        let server = MockTableServer::start(vec![MockReply::raw(401, "denied")]).unwrap();
        let client = HttpTableClient::new(&settings(&server.base_url())).unwrap();

        let err = client
            .fetch_records("t", &FetchParams::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Authentication failed"));
    }

    #[tokio::test]
    async fn test_unparseable_success_body_is_decode_error() {
        let server = MockTableServer::start(vec![MockReply::raw(200, "<html>")]).unwrap();
        let client = HttpTableClient::new(&settings(&server.base_url())).unwrap();

        let err = client
            .fetch_records("t", &FetchParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port nothing listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = HttpTableClient::new(&settings(&format!("http://127.0.0.1:{}", port))).unwrap();

        let err = client
            .fetch_records("t", &FetchParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
