//! REST client for the hosted record table.
//!
//! Rows are addressed by the `Node ID` column. Lookups use a filter formula,
//! so at most one row per node is assumed but not enforced.

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::domain::{AppError, NodeRecord, RecordStore, Result, Settings, WriteOp, WriteOutcome};

/// Column the lookup filters on.
const NODE_ID_FIELD: &str = "Node ID";

#[derive(Debug, Deserialize)]
struct RecordList {
    #[serde(default)]
    records: Vec<RecordRef>,
}

#[derive(Debug, Deserialize)]
struct RecordRef {
    id: String,
}

#[derive(Debug, Serialize)]
struct FieldsPayload<'a> {
    fields: &'a NodeRecord,
}

/// Record store backed by the Airtable REST API.
#[derive(Debug, Clone)]
pub struct AirtableClient {
    http: Client,
    settings: Settings,
}

impl AirtableClient {
    /// Create a client for the table named in `settings`.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }

    /// `{api}/{base}/{table}[/{record}]` with each segment percent-encoded.
    fn table_url(&self, record_id: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.settings.api_url).map_err(|e| AppError::Config {
            message: format!("Invalid AIRTABLE_API_URL {}: {e}", self.settings.api_url),
        })?;

        {
            let mut segments = url.path_segments_mut().map_err(|()| AppError::Config {
                message: format!("AIRTABLE_API_URL cannot be a base: {}", self.settings.api_url),
            })?;
            segments
                .pop_if_empty()
                .push(&self.settings.base_id)
                .push(&self.settings.table_name);
            if let Some(id) = record_id {
                segments.push(id);
            }
        }

        Ok(url)
    }

    async fn write(
        &self,
        op: WriteOp,
        request: RequestBuilder,
        record: &NodeRecord,
    ) -> Result<WriteOutcome> {
        let payload = FieldsPayload { fields: record };

        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Ok(body) = serde_json::to_string_pretty(&payload) {
                tracing::debug!(%op, "Sending record payload:\n{body}");
            }
        }

        let response = request
            .bearer_auth(&self.settings.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::http(format!("Request failed while {op} record"), e))?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(WriteOutcome::Accepted);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(%op, error = %e, "Failed to read rejection body");
                format!("<unreadable response body: {e}>")
            }
        };
        tracing::debug!(%op, status = status.as_u16(), "Record store rejected write");

        Ok(WriteOutcome::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// Filter formula matching rows whose node id equals `node_id`.
///
/// The id is embedded verbatim; a `'` inside it breaks the formula.
fn node_id_formula(node_id: &str) -> String {
    format!("{{{NODE_ID_FIELD}}} = '{node_id}'")
}

impl RecordStore for AirtableClient {
    async fn find_by_node_id(&self, node_id: &str) -> Result<Option<String>> {
        let url = self.table_url(None)?;

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.settings.api_key)
            .query(&[("filterByFormula", node_id_formula(node_id))])
            .send()
            .await
            .map_err(|e| AppError::http("Record lookup failed", e))?;

        if response.status() != StatusCode::OK {
            tracing::debug!(
                status = response.status().as_u16(),
                "Record lookup returned no match"
            );
            return Ok(None);
        }

        let list: RecordList = response
            .json()
            .await
            .map_err(|e| AppError::http("Invalid record lookup response", e))?;

        let record_id = list.records.into_iter().next().map(|r| r.id);
        tracing::debug!(node_id, ?record_id, "Record lookup finished");

        Ok(record_id)
    }

    async fn update(&self, record_id: &str, record: &NodeRecord) -> Result<WriteOutcome> {
        let url = self.table_url(Some(record_id))?;
        self.write(WriteOp::Update, self.http.patch(url), record).await
    }

    async fn create(&self, record: &NodeRecord) -> Result<WriteOutcome> {
        let url = self.table_url(None)?;
        self.write(WriteOp::Create, self.http.post(url), record).await
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn settings(api_url: String, table: &str) -> Settings {
        Settings {
            api_key: "patTEST".into(),
            base_id: "appBASE".into(),
            table_name: table.into(),
            api_url,
        }
    }

    async fn setup() -> (MockServer, AirtableClient) {
        let server = MockServer::start().await;
        let client = AirtableClient::new(settings(format!("{}/v0", server.uri()), "Nodes"));
        (server, client)
    }

    fn record() -> NodeRecord {
        NodeRecord {
            node_id: "!a1b2c3d4".into(),
            long_name: "Hilltop Relay".into(),
            short_name: "HTR1".into(),
            role: "ROUTER".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_formula() {
        assert_eq!(node_id_formula("!a1b2c3d4"), "{Node ID} = '!a1b2c3d4'");
    }

    #[test]
    fn test_table_url_encodes_segments() {
        let client =
            AirtableClient::new(settings("https://api.airtable.com/v0".into(), "Mesh Nodes"));
        assert_eq!(
            client.table_url(Some("rec1")).unwrap().as_str(),
            "https://api.airtable.com/v0/appBASE/Mesh%20Nodes/rec1"
        );
    }

    #[test]
    fn test_invalid_api_url_is_config_error() {
        let client = AirtableClient::new(settings("not a url".into(), "Nodes"));
        assert!(client.table_url(None).unwrap_err().is_config());
    }

    #[tokio::test]
    async fn test_find_returns_first_match() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/v0/appBASE/Nodes"))
            .and(query_param("filterByFormula", "{Node ID} = '!a1b2c3d4'"))
            .and(header("authorization", "Bearer patTEST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [
                    { "id": "recFIRST", "fields": { "Node ID": "!a1b2c3d4" } },
                    { "id": "recDUP", "fields": { "Node ID": "!a1b2c3d4" } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let found = client.find_by_node_id("!a1b2c3d4").await.unwrap();
        assert_eq!(found.as_deref(), Some("recFIRST"));
    }

    #[tokio::test]
    async fn test_find_without_rows() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/v0/appBASE/Nodes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
            .mount(&server)
            .await;

        assert_eq!(client.find_by_node_id("!a1b2c3d4").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_non_200_is_not_found() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(422).set_body_string("INVALID_FILTER_BY_FORMULA"))
            .mount(&server)
            .await;

        assert_eq!(client.find_by_node_id("it's").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_transport_failure_is_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = format!("http://127.0.0.1:{port}/v0");

        let client = AirtableClient::new(settings(url, "Nodes"));
        let err = client.find_by_node_id("!a1b2c3d4").await.unwrap_err();
        assert!(matches!(err, AppError::Http { .. }));
    }

    #[tokio::test]
    async fn test_update_sends_fields() {
        let (server, client) = setup().await;
        let rec = record();

        Mock::given(method("PATCH"))
            .and(path("/v0/appBASE/Nodes/recFIRST"))
            .and(header("authorization", "Bearer patTEST"))
            .and(body_json(json!({ "fields": serde_json::to_value(&rec).unwrap() })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "recFIRST" })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client.update("recFIRST", &rec).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Accepted);
    }

    #[tokio::test]
    async fn test_create_rejected() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v0/appBASE/Nodes"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_string(r#"{"error":{"type":"UNKNOWN_FIELD_NAME"}}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client.create(&record()).await.unwrap();
        assert_eq!(
            outcome,
            WriteOutcome::Rejected {
                status: 422,
                body: r#"{"error":{"type":"UNKNOWN_FIELD_NAME"}}"#.into(),
            }
        );
    }

    /// Serves one rejection whose body ends before its declared length.
    fn truncated_rejection_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&request).to_lowercase();
                if let Some(end) = text.find("\r\n\r\n") {
                    let declared = text[..end]
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + declared {
                        break;
                    }
                }
            }
            socket
                .write_all(b"HTTP/1.1 422 Unprocessable Entity\r\ncontent-length: 64\r\n\r\n{\"err")
                .unwrap();
        });

        format!("http://{addr}/v0")
    }

    #[tokio::test]
    async fn test_unreadable_rejection_body_is_reported() {
        let client = AirtableClient::new(settings(truncated_rejection_server(), "Nodes"));

        let outcome = client.create(&record()).await.unwrap();

        let WriteOutcome::Rejected { status, body } = outcome else {
            panic!("expected Rejected, got {outcome:?}");
        };
        assert_eq!(status, 422);
        assert!(
            body.starts_with("<unreadable response body:"),
            "unexpected body {body}"
        );
    }
}
