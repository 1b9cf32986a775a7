//! OpenProject API request and response types.
//!
//! These types model the slice of the OpenProject REST API v3 (HAL+JSON)
//! that the plugin consumes: work packages, the collections returned by
//! the project-scoped listing endpoints, and the parameters for creating
//! a work package.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Formattable text as OpenProject represents it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Description {
    /// The markup format, e.g. "textile".
    pub format: String,
    /// The raw markup source.
    #[serde(default)]
    pub raw: Option<String>,
}

/// A work package - OpenProject's issue/task entity.
///
/// Returned by `GET /api/v3/work_packages/{id}` and as search results.
/// Create responses can be sparse, so everything beyond the id defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkPackage {
    /// The work package id.
    pub id: i64,
    /// The title of the work package.
    #[serde(default)]
    pub subject: String,
    /// The description, if any.
    #[serde(default)]
    pub description: Option<Description>,
}

impl WorkPackage {
    /// Get the raw description text, or an empty string if not set.
    pub fn description_text(&self) -> &str {
        self.description
            .as_ref()
            .and_then(|d| d.raw.as_deref())
            .unwrap_or("")
    }
}

/// A HAL collection as the v3 API returns it.
///
/// The elements live under `_embedded.elements`.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Collection<T> {
    /// Total number of matching elements, when reported.
    #[serde(default)]
    pub total: Option<u32>,
    /// Number of elements in this page, when reported.
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(rename = "_embedded", default)]
    embedded: Embedded<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Embedded<T> {
    #[serde(default)]
    elements: Vec<T>,
}

impl<T> Default for Embedded<T> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
        }
    }
}

impl<T> Collection<T> {
    /// The embedded elements.
    pub fn elements(&self) -> &[T] {
        &self.embedded.elements
    }

    /// Consume the collection, returning the embedded elements.
    pub fn into_elements(self) -> Vec<T> {
        self.embedded.elements
    }
}

/// A user as listed by the `available_assignees` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// The user id.
    pub id: i64,
    /// The user's display name.
    pub name: String,
}

/// A work package type.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkPackageType {
    /// The type id.
    pub id: i64,
    /// The type name (e.g. "Task", "Bug").
    pub name: String,
}

/// A project.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    /// The project id.
    pub id: i64,
    /// The project slug used in URLs.
    #[serde(default)]
    pub identifier: String,
    /// The project name.
    pub name: String,
}

/// Parameters for creating a work package.
#[derive(Debug, Clone)]
pub struct NewWorkPackage {
    /// The work package title.
    pub title: String,
    /// The work package type id.
    pub type_id: i64,
    /// Optional description markup.
    pub description: Option<String>,
    /// Optional assignee user id.
    pub assignee_id: Option<i64>,
    /// Whether tracker users are notified of the creation.
    pub notify: bool,
    /// Extra fields merged into the payload after the type/assignee links
    /// are set, so they can override any generated field.
    pub extra: Option<Map<String, Value>>,
}

impl NewWorkPackage {
    /// Create parameters for a new work package with notifications on.
    pub fn new(title: impl Into<String>, type_id: i64) -> Self {
        Self {
            title: title.into(),
            type_id,
            description: None,
            assignee_id: None,
            notify: true,
            extra: None,
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the assignee.
    pub fn assignee(mut self, assignee_id: i64) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Set the notify flag.
    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    /// Set the extra-fields overlay.
    pub fn extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = Some(extra);
        self
    }
}
