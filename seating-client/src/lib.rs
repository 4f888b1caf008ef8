//! HTTP client for the seating planner's REST layout API.
//!
//! [`HttpLayouts`] implements [`LayoutRepository`], so an editor can save to
//! and load from a remote `seating-server` exactly as it would from the
//! local adapters.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use seating_core::{
    normalize_layout_name, Element, ElementId, LayoutDocument, LayoutRepository,
    PersistenceError, PersistenceResult,
};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised by the HTTP transport itself.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL is unusable.
    #[error("invalid layout API URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed (connection, timeout, body decoding).
    #[error("layout API request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a status the client does not map.
    #[error("layout API returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, if any.
        message: String,
    },
}

impl From<ClientError> for PersistenceError {
    fn from(e: ClientError) -> Self {
        Self::Backend(e.to_string())
    }
}

/// Error body returned by the layout API.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    error: String,
    kind: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignSeatRequest<'a> {
    seat_id: String,
    guest_name: &'a str,
}

/// A [`LayoutRepository`] backed by the REST layout API.
#[derive(Debug, Clone)]
pub struct HttpLayouts {
    http: Client,
    base: Url,
}

impl HttpLayouts {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// `base_url` may be the API root itself (`http://host:5000/api`) or just
    /// the host, in which case `/api` is appended.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the URL is malformed and
    /// [`ClientError::Http`] if the HTTP client fails to build.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(concat!("seating-client/", env!("CARGO_PKG_VERSION")))
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Self::with_client(base_url, http)
    }

    /// Create a client reusing an existing `reqwest` client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the URL is malformed or cannot
    /// carry path segments.
    pub fn with_client(base_url: impl AsRef<str>, http: Client) -> Result<Self, ClientError> {
        let mut base =
            Url::parse(base_url.as_ref()).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base.to_string()));
        }
        if base.path().is_empty() || base.path() == "/" {
            base.set_path("/api");
        }
        Ok(Self { http, base })
    }

    /// The API root requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// URL of `segments` below the API root. Each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Turn a non-success response into the matching persistence error.
    async fn failure(response: Response, layout: &str, seat: Option<ElementId>) -> PersistenceError {
        let status = response.status();
        let body: ErrorBody = response.json().await.unwrap_or_default();
        tracing::debug!(%status, kind = ?body.kind, "Layout API error: {}", body.error);
        match (status, body.kind.as_deref(), seat) {
            (StatusCode::NOT_FOUND, Some("seat_not_found"), Some(seat)) => {
                PersistenceError::SeatNotFound(seat.to_string())
            }
            (StatusCode::NOT_FOUND, _, _) => PersistenceError::LayoutNotFound(layout.to_string()),
            (StatusCode::CONFLICT, _, _) => PersistenceError::SaveInProgress(layout.to_string()),
            (StatusCode::BAD_REQUEST, Some("invalid_name"), _) => {
                PersistenceError::InvalidName(layout.to_string())
            }
            (StatusCode::BAD_REQUEST, _, _) => PersistenceError::Serialization(body.error),
            _ => ClientError::Status {
                status: status.as_u16(),
                message: body.error,
            }
            .into(),
        }
    }
}

fn transport(e: reqwest::Error) -> PersistenceError {
    ClientError::Http(e).into()
}

#[async_trait]
impl LayoutRepository for HttpLayouts {
    #[tracing::instrument(skip(self))]
    async fn list_layout_names(&self) -> PersistenceResult<Vec<String>> {
        let url = self.endpoint(&["layouts"])?;
        let response = self.http.get(url).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(Self::failure(response, "", None).await);
        }
        response.json().await.map_err(transport)
    }

    #[tracing::instrument(skip(self))]
    async fn get_layout(&self, name: &str) -> PersistenceResult<Vec<Element>> {
        let name = normalize_layout_name(name)?;
        let url = self.endpoint(&["layouts", &name])?;
        let response = self.http.get(url).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(Self::failure(response, &name, None).await);
        }
        let doc: LayoutDocument = response.json().await.map_err(transport)?;
        doc.into_elements()
            .map_err(|e| PersistenceError::Serialization(e.to_string()))
    }

    #[tracing::instrument(skip(self, elements), fields(count = elements.len()))]
    async fn save_layout(&self, name: &str, elements: &[Element]) -> PersistenceResult<()> {
        let name = normalize_layout_name(name)?;
        let url = self.endpoint(&["layouts"])?;
        let doc = LayoutDocument::from_elements(name.clone(), elements);
        let response = self
            .http
            .post(url)
            .json(&doc)
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(Self::failure(response, &name, None).await);
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_layout(&self, name: &str) -> PersistenceResult<()> {
        let name = normalize_layout_name(name)?;
        let url = self.endpoint(&["layouts", &name])?;
        let response = self.http.delete(url).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(Self::failure(response, &name, None).await);
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn assign_guest_to_seat(
        &self,
        layout: &str,
        seat: ElementId,
        guest: &str,
    ) -> PersistenceResult<()> {
        let name = normalize_layout_name(layout)?;
        let url = self.endpoint(&["layouts", &name, "assign-seat"])?;
        let body = AssignSeatRequest {
            seat_id: seat.to_string(),
            guest_name: guest,
        };
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(Self::failure(response, &name, Some(seat)).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seating_core::ElementType;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpLayouts {
        HttpLayouts::new(format!("{}/api", server.uri())).expect("client")
    }

    #[test]
    fn invalid_urls_are_rejected() {
        match HttpLayouts::new("not-a-valid-url") {
            Err(ClientError::InvalidUrl(_)) => {}
            other => panic!("Expected InvalidUrl error, got: {other:?}"),
        }
        assert!(matches!(
            HttpLayouts::new("mailto:planner@example.com"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn bare_host_gets_api_root() {
        let client = HttpLayouts::new("http://localhost:5000").expect("client");
        assert_eq!(client.base_url().path(), "/api");
        let url = client.endpoint(&["layouts", "Spring Gala"]).expect("url");
        assert_eq!(url.path(), "/api/layouts/Spring%20Gala");

        let client = HttpLayouts::new("http://localhost:5000/api/").expect("client");
        let url = client.endpoint(&["layouts"]).expect("url");
        assert_eq!(url.path(), "/api/layouts");
    }

    #[tokio::test]
    async fn lists_layout_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/layouts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Brunch", "Gala"])))
            .mount(&server)
            .await;

        let names = client_for(&server).list_layout_names().await.expect("list");
        assert_eq!(names, vec!["Brunch".to_string(), "Gala".to_string()]);
    }

    #[tokio::test]
    async fn get_layout_decodes_elements() {
        let server = MockServer::start().await;
        let table = Element::new(ElementType::Table).at(10.0, 20.0);
        let doc = LayoutDocument::from_elements("Spring Gala", std::slice::from_ref(&table));
        Mock::given(method("GET"))
            .and(path("/api/layouts/Spring%20Gala"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&doc))
            .mount(&server)
            .await;

        let elements = client_for(&server)
            .get_layout(" Spring Gala ")
            .await
            .expect("get");
        assert_eq!(elements, vec![table]);
    }

    #[tokio::test]
    async fn missing_layout_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/layouts/Nope"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": "Layout not found: Nope",
                "kind": "layout_not_found"
            })))
            .mount(&server)
            .await;

        match client_for(&server).get_layout("Nope").await {
            Err(PersistenceError::LayoutNotFound(name)) => assert_eq!(name, "Nope"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn save_posts_layout_document() {
        let server = MockServer::start().await;
        let chair = Element::new(ElementType::Chair).at(5.0, 5.0);
        let doc = LayoutDocument::from_elements("Gala", std::slice::from_ref(&chair));
        Mock::given(method("POST"))
            .and(path("/api/layouts"))
            .and(body_json(&doc))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Layout saved",
                "name": "Gala"
            })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .save_layout("Gala", &[chair])
            .await
            .expect("save");
    }

    #[tokio::test]
    async fn blank_names_never_reach_the_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        assert!(matches!(
            client_for(&server).save_layout("   ", &[]).await,
            Err(PersistenceError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn conflict_maps_to_save_in_progress() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/layouts"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": "A save for layout \"Gala\" is already in progress",
                "kind": "save_in_progress"
            })))
            .mount(&server)
            .await;

        assert!(matches!(
            client_for(&server).save_layout("Gala", &[]).await,
            Err(PersistenceError::SaveInProgress(_))
        ));
    }

    #[tokio::test]
    async fn assign_seat_sends_camel_case_body() {
        let server = MockServer::start().await;
        let seat = ElementId::new();
        Mock::given(method("POST"))
            .and(path("/api/layouts/Gala/assign-seat"))
            .and(body_json(json!({ "seatId": seat.to_string(), "guestName": "Ada" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .assign_guest_to_seat("Gala", seat, "Ada")
            .await
            .expect("assign");
    }

    #[tokio::test]
    async fn unknown_seat_maps_to_seat_not_found() {
        let server = MockServer::start().await;
        let seat = ElementId::new();
        Mock::given(method("POST"))
            .and(path("/api/layouts/Gala/assign-seat"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": "Seat not found",
                "kind": "seat_not_found"
            })))
            .mount(&server)
            .await;

        match client_for(&server).assign_guest_to_seat("Gala", seat, "Ada").await {
            Err(PersistenceError::SeatNotFound(id)) => assert_eq!(id, seat.to_string()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_errors_become_backend_errors() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/layouts/Gala"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        match client_for(&server).delete_layout("Gala").await {
            Err(PersistenceError::Backend(message)) => assert!(message.contains("500")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
