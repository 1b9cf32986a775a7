//! OpenProject API client implementation.
//!
//! This module provides the client for the OpenProject REST API v3.
//! It handles authentication, request/response processing, and error
//! classification. Every operation performs exactly one outbound HTTP
//! request; failures are never retried and propagate to the caller.

use std::time::Duration;

use reqwest::{header, Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

use super::auth::Auth;
use super::error::{ApiError, Result};
use super::types::{Collection, NewWorkPackage, Project, User, WorkPackage, WorkPackageType};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Versioned path prefix of the OpenProject REST API.
const API_PREFIX: &str = "api/v3";

/// Markup format used for outbound description payloads.
const DESCRIPTION_FORMAT: &str = "textile";

/// The OpenProject API client.
///
/// Holds the normalized base URL and the encoded credential; stateless
/// beyond that. Construction performs no network call.
#[derive(Debug)]
pub struct OpenProjectClient {
    /// The HTTP client.
    client: Client,
    /// The base URL of the OpenProject instance.
    base_url: String,
    /// Authentication credentials.
    auth: Auth,
}

impl OpenProjectClient {
    /// Create a new client for an OpenProject instance.
    ///
    /// Strips a single trailing slash from `base_url` if present.
    /// Credentials are only checked once a request is issued.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, apikey: &str) -> Result<Self> {
        Self::with_timeout(base_url, apikey, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new client with an explicit request timeout.
    ///
    /// The remote service is treated as unbounded in latency unless
    /// capped, so every request carries this timeout.
    pub fn with_timeout(base_url: &str, apikey: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            auth: Auth::new(apikey),
        })
    }

    /// Perform an authenticated JSON request against the v3 API.
    ///
    /// `path` is relative to the `/api/v3/` prefix; leading slashes are
    /// stripped so the joined URL never contains a double slash.
    /// Redirects are followed by the transport.
    #[instrument(skip(self, body, params), fields(path = %path))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.api_url(path);
        debug!(url = %url, "sending request");

        let mut req = self
            .client
            .request(method, url)
            .header(header::AUTHORIZATION, self.auth.header_value())
            .header(header::ACCEPT, "application/json");

        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(ApiError::Network)?;
        self.handle_response(response).await
    }

    /// Fetch a work package by id.
    ///
    /// Calls `GET /api/v3/work_packages/{id}`.
    #[instrument(skip(self))]
    pub async fn get_work_package(&self, id: i64) -> Result<WorkPackage> {
        self.request(Method::GET, &format!("work_packages/{}", id), None, &[])
            .await
    }

    /// Create a work package in a project.
    ///
    /// Calls `POST /api/v3/projects/{project}/work_packages`. The type and
    /// optional assignee are referenced through `_links` hrefs; the extra
    /// overlay is merged into the payload last.
    #[instrument(skip(self, wp), fields(project = %project, title = %wp.title))]
    pub async fn create_work_package(
        &self,
        project: &str,
        wp: &NewWorkPackage,
    ) -> Result<WorkPackage> {
        let payload = work_package_payload(wp);
        self.request(
            Method::POST,
            &format!("projects/{}/work_packages", project),
            Some(&payload),
            &notify_param(wp.notify),
        )
        .await
    }

    /// Add a comment to a work package.
    ///
    /// Calls `POST /api/v3/work_packages/{id}/activities/`. The returned
    /// activity document is passed through undecoded.
    #[instrument(skip(self, comment, extra))]
    pub async fn create_comment(
        &self,
        work_package_id: i64,
        comment: &str,
        notify: bool,
        extra: Option<&Map<String, Value>>,
    ) -> Result<Value> {
        let payload = comment_payload(comment, extra);
        self.request(
            Method::POST,
            &format!("work_packages/{}/activities/", work_package_id),
            Some(&payload),
            &notify_param(notify),
        )
        .await
    }

    /// List the users available as assignees in a project.
    ///
    /// Calls `GET /api/v3/projects/{project}/available_assignees`.
    #[instrument(skip(self))]
    pub async fn list_assignees(&self, project: &str) -> Result<Collection<User>> {
        self.request(
            Method::GET,
            &format!("projects/{}/available_assignees", project),
            None,
            &[],
        )
        .await
    }

    /// List the visible projects.
    ///
    /// Calls `GET /api/v3/projects`.
    #[instrument(skip(self))]
    pub async fn list_projects(&self) -> Result<Collection<Project>> {
        self.request(Method::GET, "projects", None, &[]).await
    }

    /// List the work package types available in a project.
    ///
    /// Calls `GET /api/v3/projects/{project}/types`.
    #[instrument(skip(self))]
    pub async fn list_project_types(&self, project: &str) -> Result<Collection<WorkPackageType>> {
        self.request(Method::GET, &format!("projects/{}/types", project), None, &[])
            .await
    }

    /// Search work packages in a project by a subject substring.
    ///
    /// Calls `GET /api/v3/projects/{project}/work_packages` with the
    /// API's native filter expression.
    #[instrument(skip(self), fields(project = %project, query = %query))]
    pub async fn search_work_packages(
        &self,
        project: &str,
        query: &str,
    ) -> Result<Collection<WorkPackage>> {
        self.request(
            Method::GET,
            &format!("projects/{}/work_packages", project),
            None,
            &[("filters", subject_filter(query))],
        )
        .await
    }

    /// Build the absolute URL for an API path.
    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            API_PREFIX,
            path.trim_start_matches('/')
        )
    }

    /// Check the response status and decode the JSON body.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            response.json::<T>().await.map_err(|e| {
                ApiError::InvalidResponse(format!("failed to decode response: {}", e))
            })
        } else {
            let text = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "error response");
            Err(ApiError::from_status(status, text))
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Build the JSON payload for creating a work package.
///
/// The extra overlay is merged at the top level after the type/assignee
/// links are set, so overlay keys win.
fn work_package_payload(wp: &NewWorkPackage) -> Value {
    let mut links = Map::new();
    links.insert(
        "type".to_string(),
        json!({"href": format!("/{}/types/{}", API_PREFIX, wp.type_id)}),
    );
    if let Some(assignee_id) = wp.assignee_id {
        links.insert(
            "assignee".to_string(),
            json!({"href": format!("/{}/users/{}", API_PREFIX, assignee_id)}),
        );
    }

    let mut payload = Map::new();
    payload.insert("subject".to_string(), Value::String(wp.title.clone()));
    payload.insert(
        "description".to_string(),
        json!({"format": DESCRIPTION_FORMAT, "raw": &wp.description}),
    );
    payload.insert("_links".to_string(), Value::Object(links));

    if let Some(extra) = &wp.extra {
        payload.extend(extra.clone());
    }

    Value::Object(payload)
}

/// Build the JSON payload for commenting on a work package.
fn comment_payload(comment: &str, extra: Option<&Map<String, Value>>) -> Value {
    let mut payload = Map::new();
    payload.insert("comment".to_string(), json!({"raw": comment}));

    if let Some(extra) = extra {
        payload.extend(extra.clone());
    }

    Value::Object(payload)
}

/// Encode the subject substring-match filter as the API's filter JSON.
fn subject_filter(query: &str) -> String {
    json!([{"subject": {"operator": "~", "values": [query]}}]).to_string()
}

/// Encode the notify flag as a query parameter.
fn notify_param(notify: bool) -> [(&'static str, String); 1] {
    let value = if notify { "true" } else { "false" };
    [("notify", value.to_string())]
}

/// Normalize the base URL by removing a single trailing slash.
fn normalize_base_url(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}
