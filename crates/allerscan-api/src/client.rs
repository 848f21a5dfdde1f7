// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP implementation of the backend port.
//
// Every request is built against `server_url + api_prefix + path`, carries
// the stored bearer token when one exists, and goes through `send`, which
// turns non-2xx replies into `AllerscanError::Backend` with the response
// body as the message.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use allerscan_core::analysis::HistoryEntry;
use allerscan_core::config::AppConfig;
use allerscan_core::error::{AllerscanError, Result};
use allerscan_core::types::{ImageUpload, VoiceNote};

use crate::backend::Backend;
use crate::store::SessionStore;
use crate::wire::{
    AllergenFlags, AnalyzeRequest, AnalyzeResponse, BarcodeRequest, HistoryAdd, LoginRequest,
    LoginResponse, ProfileRecord, RegisterRequest, ScanResponse,
};

/// Message used when a failed response has an empty body.
const GENERIC_FAILURE: &str = "Request failed";

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// The response declared a JSON content type.
    Json(serde_json::Value),
    /// Anything else, kept as text.
    Text(String),
}

impl Body {
    fn into_json<T: DeserializeOwned>(self, endpoint: &str) -> Result<T> {
        match self {
            Body::Json(value) => serde_json::from_value(value)
                .map_err(|e| AllerscanError::MalformedResponse(format!("{endpoint}: {e}"))),
            Body::Text(_) => Err(AllerscanError::MalformedResponse(format!(
                "{endpoint}: expected a JSON body"
            ))),
        }
    }
}

/// reqwest-backed gateway to the Allerscan backend.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: AppConfig,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: AppConfig, session: Arc<SessionStore>) -> Self {
        Self {
            http: Client::new(),
            config,
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        self.authorize(self.http.request(method, self.config.endpoint_url(path)))
    }

    fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self.session.token()? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send and decode. JSON is parsed only when the content type says so.
    #[instrument(skip(self, builder))]
    async fn send(&self, path: &str, builder: RequestBuilder) -> Result<Body> {
        let response = builder
            .send()
            .await
            .map_err(|e| AllerscanError::Transport(e.to_string()))?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let text = response
            .text()
            .await
            .map_err(|e| AllerscanError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = if text.trim().is_empty() {
                GENERIC_FAILURE.to_owned()
            } else {
                text
            };
            warn!(status = status.as_u16(), %message, "backend rejected request");
            return Err(AllerscanError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = status.as_u16(), is_json, "backend responded");
        if is_json && !text.trim().is_empty() {
            let value = serde_json::from_str(&text)
                .map_err(|e| AllerscanError::MalformedResponse(format!("{path}: {e}")))?;
            Ok(Body::Json(value))
        } else {
            Ok(Body::Text(text))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self.request(Method::GET, path)?;
        self.send(path, builder).await?.into_json(path)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path)?.json(body);
        self.send(path, builder).await?.into_json(path)
    }

    /// For endpoints whose success body carries nothing we use.
    async fn call<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: serde::Serialize + Sync,
    {
        let mut builder = self.request(method, path)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(path, builder).await?;
        Ok(())
    }
}

/// `/users/history/{id}` with the id as one percent-encoded path segment.
fn history_entry_url(config: &AppConfig, id: &str) -> Result<Url> {
    let mut url = Url::parse(&config.endpoint_url("/users/history"))
        .map_err(|e| AllerscanError::Transport(format!("invalid server url: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| AllerscanError::Transport("server url cannot carry a path".into()))?
        .pop_if_empty()
        .push(id);
    Ok(url)
}

#[async_trait]
impl Backend for ApiClient {
    #[instrument(skip_all, fields(email = %request.email))]
    async fn register(&self, request: RegisterRequest) -> Result<()> {
        self.call(Method::POST, "/users/register", Some(&request)).await
    }

    #[instrument(skip_all, fields(email = %request.email))]
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        self.post_json("/users/login", &request).await
    }

    async fn get_profile(&self) -> Result<ProfileRecord> {
        self.get_json("/users/profile").await
    }

    async fn update_profile(&self, record: ProfileRecord) -> Result<()> {
        self.call(Method::PUT, "/users/profile", Some(&record)).await
    }

    async fn get_allergens(&self) -> Result<AllergenFlags> {
        self.get_json("/users/allergens").await
    }

    async fn update_allergens(&self, flags: AllergenFlags) -> Result<()> {
        self.call(Method::PUT, "/users/allergens", Some(&flags)).await
    }

    #[instrument(skip_all, fields(file = %upload.file_name, bytes = upload.bytes.len()))]
    async fn scan_image(&self, upload: ImageUpload) -> Result<ScanResponse> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(upload.kind.mime_type())
            .map_err(|e| AllerscanError::ImageError(format!("invalid mime type: {e}")))?;
        let form = Form::new().part("file", part);
        let path = "/scan/image";
        let builder = self.request(Method::POST, path)?.multipart(form);
        self.send(path, builder).await?.into_json(path)
    }

    #[instrument(skip(self))]
    async fn scan_barcode(&self, barcode: String) -> Result<ScanResponse> {
        self.post_json("/scan/barcode", &BarcodeRequest { barcode }).await
    }

    async fn scan_voice(&self, note: VoiceNote) -> Result<serde_json::Value> {
        let path = "/scan/voice";
        let builder = self.request(Method::POST, path)?.json(&note);
        Ok(match self.send(path, builder).await? {
            Body::Json(value) => value,
            Body::Text(text) => serde_json::Value::String(text),
        })
    }

    #[instrument(skip_all, fields(food = %request.food_name))]
    async fn analyze_food(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse> {
        self.post_json("/scan/analyze", &request).await
    }

    /// Entries that do not parse as an analysis are skipped, not fatal.
    async fn get_history(&self) -> Result<Vec<HistoryEntry>> {
        let raw: Vec<serde_json::Value> = self.get_json("/users/history").await?;
        let total = raw.len();
        let entries: Vec<HistoryEntry> = raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable history entry");
                    None
                }
            })
            .collect();
        debug!(total, kept = entries.len(), "history fetched");
        Ok(entries)
    }

    async fn add_history(&self, entry: HistoryAdd) -> Result<()> {
        self.call(Method::POST, "/users/history", Some(&entry)).await
    }

    #[instrument(skip(self))]
    async fn delete_history_entry(&self, id: String) -> Result<()> {
        let url = history_entry_url(&self.config, &id)?;
        let path = url.path().to_owned();
        let builder = self.authorize(self.http.request(Method::DELETE, url))?;
        self.send(&path, builder).await.map(drop)
    }

    async fn clear_history(&self) -> Result<()> {
        self.call::<()>(Method::DELETE, "/users/history", None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allerscan_core::types::ImageKind;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer, token: Option<&str>) -> ApiClient {
        let session = Arc::new(SessionStore::in_memory());
        if let Some(token) = token {
            session.set_token(token).expect("set token");
        }
        let config = AppConfig {
            server_url: server.base_url(),
            ..AppConfig::default()
        };
        ApiClient::new(config, session)
    }

    #[tokio::test]
    async fn attaches_bearer_token_and_prefix() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/users/profile")
                    .header("authorization", "Bearer tok-123");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"name": "Ada", "age": "25-34"}));
            })
            .await;

        let client = client_for(&server, Some("tok-123"));
        let profile = client.get_profile().await.expect("profile");
        mock.assert_async().await;
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.age.as_deref(), Some("25-34"));
    }

    #[tokio::test]
    async fn error_body_becomes_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/v1/users/history/h1");
                then.status(404).body("History entry not found");
            })
            .await;

        let err = client_for(&server, Some("t"))
            .delete_history_entry("h1".into())
            .await
            .expect_err("404");
        match err {
            AllerscanError::Backend { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "History entry not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn history_id_is_one_encoded_segment() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE)
                    .path("/api/v1/users/history/a%2Fb%3Fc")
                    .header("authorization", "Bearer t");
                then.status(204);
            })
            .await;

        client_for(&server, Some("t"))
            .delete_history_entry("a/b?c".into())
            .await
            .expect("delete");
        mock.assert_async().await;
    }

    #[test]
    fn history_entry_url_escapes_reserved_characters() {
        let config = AppConfig {
            server_url: "https://api.example.test/".into(),
            ..AppConfig::default()
        };
        let url = history_entry_url(&config, "x y#1").expect("url");
        assert_eq!(url.as_str(), "https://api.example.test/api/v1/users/history/x%20y%231");
        assert!(url.query().is_none());
    }

    #[tokio::test]
    async fn empty_error_body_uses_generic_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/v1/users/history");
                then.status(500);
            })
            .await;

        let err = client_for(&server, Some("t"))
            .clear_history()
            .await
            .expect_err("500");
        assert_eq!(err.to_string(), "Request failed");
    }

    #[tokio::test]
    async fn non_json_success_body_is_not_parsed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/scan/barcode");
                then.status(200)
                    .header("content-type", "text/plain")
                    .body("{\"food_details\": {}}");
            })
            .await;

        let err = client_for(&server, None)
            .scan_barcode("0123".into())
            .await
            .expect_err("text body");
        assert!(matches!(err, AllerscanError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let config = AppConfig {
            server_url: "http://127.0.0.1:9".into(),
            ..AppConfig::default()
        };
        let client = ApiClient::new(config, Arc::new(SessionStore::in_memory()));
        let err = client.get_history().await.expect_err("no server");
        assert!(matches!(err, AllerscanError::Transport(_)));
    }

    #[tokio::test]
    async fn image_is_sent_as_multipart_file_field() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/scan/image")
                    .body_contains("name=\"file\"")
                    .body_contains("camera-capture.jpg");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"food_details": {"food_name": "Pad Thai", "ingredients": ["peanuts"]}}));
            })
            .await;

        let upload = ImageUpload {
            file_name: "camera-capture.jpg".into(),
            kind: ImageKind::Jpeg,
            bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
        };
        let res = client_for(&server, Some("t")).scan_image(upload).await.expect("scan");
        mock.assert_async().await;
        let details = res.food_details.expect("details");
        assert_eq!(details.food_name.as_deref(), Some("Pad Thai"));
        assert_eq!(details.ingredients, vec!["peanuts".to_owned()]);
    }

    #[tokio::test]
    async fn history_add_body_shape() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/users/history")
                    .json_body_partial(r#"{"scan_type": "barcode", "analysis": {"dishName": "Granola", "verdict": "SAFE"}}"#);
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"message": "History entry added successfully", "id": "h9"}));
            })
            .await;

        let analysis = allerscan_core::analysis::AnalysisResult {
            dish_name: "Granola".into(),
            verdict: allerscan_core::analysis::Verdict::Safe,
            confidence: 65,
            detected_allergens: vec![],
            risky_ingredients: vec![],
            substitutions: vec![],
            alternative_dishes: vec![],
            explanation: String::new(),
            nutrition: None,
            image_url: None,
        };
        client_for(&server, Some("t"))
            .add_history(HistoryAdd {
                analysis,
                scan_type: "barcode".into(),
            })
            .await
            .expect("add");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreadable_history_entries_are_skipped() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/users/history");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!([
                        {"id": "a", "timestamp": "2026-03-01T10:00:00", "dishName": "Soup", "verdict": "SAFE", "confidence": 70},
                        {"id": "b", "timestamp": "2026-03-01T09:00:00"}
                    ]));
            })
            .await;

        let history = client_for(&server, Some("t")).get_history().await.expect("history");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, "a");
        assert_eq!(history[0].result.dish_name, "Soup");
    }
}
