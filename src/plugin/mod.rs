//! The issue-tracker plugin contract.
//!
//! This module defines the callbacks the host error-tracking platform
//! invokes on a tracker integration, together with the form descriptor
//! and value types those callbacks exchange. The host constructs an
//! integration once and calls into it per request; integrations hold no
//! cross-request state.

pub mod openproject;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::OptionStore;
use crate::error::Result;

pub use openproject::OpenProjectPlugin;

/// The kind of input a field descriptor renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Single-line text input.
    Text,
    /// Masked credential input.
    Secret,
    /// URL input.
    Url,
    /// Numeric input.
    Number,
    /// Multi-line text input.
    TextArea,
    /// Choice among fixed options.
    Select,
}

/// Describes one form field for the host to render.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    /// Field name, used as the form data key.
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// Input kind.
    pub kind: FieldKind,
    /// Whether the field must be filled in.
    pub required: bool,
    /// Help text shown next to the field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Placeholder shown in an empty field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Prefilled value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// `(value, label)` pairs for select fields.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<(String, String)>,
    /// Whether the host should serve the field through the autocomplete
    /// endpoint instead of a fixed choice list.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub autocomplete: bool,
}

impl FieldDescriptor {
    /// Create a required field of the given kind.
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: true,
            help: None,
            placeholder: None,
            default: None,
            choices: Vec::new(),
            autocomplete: false,
        }
    }

    /// Mark the field as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set the help text.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Set the placeholder.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the prefilled value.
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the select choices.
    pub fn choices(mut self, choices: Vec<(String, String)>) -> Self {
        self.choices = choices;
        self
    }

    /// Serve the field through the autocomplete endpoint.
    pub fn autocomplete(mut self) -> Self {
        self.autocomplete = true;
        self
    }
}

/// Submitted form data for creating an issue.
#[derive(Debug, Clone)]
pub struct NewIssueForm {
    /// Issue title.
    pub title: String,
    /// Issue description markup.
    pub description: Option<String>,
    /// Selected work package type id.
    pub type_id: i64,
    /// Selected assignee id, if any.
    pub assignee_id: Option<i64>,
}

/// Submitted form data for linking an existing issue.
#[derive(Debug, Clone)]
pub struct LinkIssueForm {
    /// Id of the existing issue in the external tracker.
    pub issue_id: i64,
    /// Optional comment to leave on the linked issue.
    pub comment: Option<String>,
}

/// The record returned for a successfully linked issue.
#[derive(Debug, Clone, Serialize)]
pub struct LinkedIssue {
    /// Title of the issue in the external tracker.
    pub title: String,
}

/// An autocomplete request from the host UI.
#[derive(Debug, Clone)]
pub struct AutocompleteQuery {
    /// The form field being completed.
    pub field: String,
    /// The text typed so far.
    pub query: String,
}

/// One autocomplete match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutocompleteItem {
    /// Id of the matched issue.
    pub id: i64,
    /// Display text for the match.
    pub text: String,
}

/// The autocomplete response.
///
/// This path serves an interactive UI, so failures are reported through
/// `error` as a soft validation message instead of a hard failure.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AutocompleteResponse {
    /// The matches.
    pub items: Vec<AutocompleteItem>,
    /// A validation-style error message, when the search failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AutocompleteResponse {
    /// A response carrying matches.
    pub fn items(items: Vec<AutocompleteItem>) -> Self {
        Self { items, error: None }
    }

    /// A degraded response carrying only an error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Host-supplied context about the event group an issue is created for.
#[derive(Debug, Clone)]
pub struct IssueContext {
    /// Title of the event group.
    pub title: String,
    /// Absolute URL of the group on the host platform.
    pub url: String,
    /// Rendered event body, if available.
    pub body: Option<String>,
}

/// Prefilled values for the new-issue form.
#[derive(Debug, Clone)]
pub struct IssueDefaults {
    /// Prefilled title.
    pub title: String,
    /// Prefilled description.
    pub description: String,
}

/// The callback contract an issue-tracker integration implements.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Stable identifier of the integration.
    fn slug(&self) -> &str;

    /// Human-readable name of the integration.
    fn title(&self) -> &str;

    /// Whether all required settings are present for the project.
    fn is_configured(&self, store: &dyn OptionStore) -> bool;

    /// Fields of the configuration form.
    fn configuration_fields(&self) -> Vec<FieldDescriptor>;

    /// Fields of the new-issue form.
    ///
    /// Fetches the selectable types and assignees from the tracker, so
    /// this requires a complete configuration.
    async fn new_issue_fields(&self, store: &dyn OptionStore) -> Result<Vec<FieldDescriptor>>;

    /// Fields of the link-issue form.
    fn link_issue_fields(&self) -> Vec<FieldDescriptor>;

    /// Heading for the new-issue form.
    fn new_issue_title(&self) -> String {
        "Create Issue".to_string()
    }

    /// Create an issue in the external tracker, returning its id.
    async fn create_issue(&self, store: &dyn OptionStore, form: &NewIssueForm) -> Result<i64>;

    /// Link an existing issue, optionally leaving a comment on it.
    async fn link_issue(&self, store: &dyn OptionStore, form: &LinkIssueForm)
        -> Result<LinkedIssue>;

    /// Short label for a linked issue.
    fn issue_label(&self, issue_id: i64) -> String;

    /// Absolute URL of an issue in the external tracker.
    fn issue_url(&self, store: &dyn OptionStore, issue_id: i64) -> Result<String>;

    /// Serve interactive autocomplete for the link-issue form.
    async fn view_autocomplete(
        &self,
        store: &dyn OptionStore,
        query: &AutocompleteQuery,
    ) -> AutocompleteResponse;
}
