//! The OpenProject issue-tracker integration.
//!
//! Implements the [`IssueTracker`] contract by composing
//! [`OpenProjectClient`] calls. Every callback builds a fresh client from
//! the project's stored configuration, performs at most two HTTP
//! exchanges, and maps the result into the shape the host expects.

use async_trait::async_trait;
use tracing::instrument;
use url::Url;

use crate::api::client::OpenProjectClient;
use crate::api::types::NewWorkPackage;
use crate::config::{
    OptionStore, PluginConfig, OPT_APIKEY, OPT_ASSIGNEE_ID, OPT_PROJECT_SLUG, OPT_URL,
};
use crate::error::{PluginError, Result};

use super::{
    AutocompleteItem, AutocompleteQuery, AutocompleteResponse, FieldDescriptor, FieldKind,
    IssueContext, IssueDefaults, IssueTracker, LinkIssueForm, LinkedIssue, NewIssueForm,
};

/// The form field served through autocomplete.
const ISSUE_ID_FIELD: &str = "issue_id";

/// Sentry-style issue-tracker integration for OpenProject.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenProjectPlugin;

impl OpenProjectPlugin {
    /// Stable identifier of the integration.
    pub const SLUG: &'static str = "openproject";
    /// Human-readable name.
    pub const TITLE: &'static str = "OpenProject";
    /// Integration version.
    pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
    /// Integration author.
    pub const AUTHOR: &'static str = "HBEE";
    /// `(label, url)` pairs shown on the integration page.
    pub const RESOURCE_LINKS: [(&'static str, &'static str); 2] = [
        (
            "Bug Tracker",
            "https://github.com/HBEE/sentry-openproject/issues",
        ),
        ("Source", "https://github.com/HBEE/sentry-openproject"),
    ];

    /// Create the integration.
    pub fn new() -> Self {
        Self
    }

    /// Load the project's configuration from the host store.
    fn config(&self, store: &dyn OptionStore) -> Result<PluginConfig> {
        PluginConfig::load(store).map_err(PluginError::from)
    }

    /// Build an API client from a loaded configuration.
    ///
    /// No network call is attempted here; the configuration was already
    /// validated by [`PluginConfig::load`].
    fn client_for(&self, config: &PluginConfig) -> Result<OpenProjectClient> {
        OpenProjectClient::new(&config.url, &config.apikey).map_err(PluginError::from)
    }

    /// List selectable assignees for the configured project.
    ///
    /// The embedded collection is reshaped into ordered `(id, label)`
    /// pairs, prefixed with the explicit "Unassigned" option.
    #[instrument(skip(self, store))]
    pub async fn allowed_assignees(&self, store: &dyn OptionStore) -> Result<Vec<(String, String)>> {
        let config = self.config(store)?;
        let client = self.client_for(&config)?;
        let users = client.list_assignees(&config.project_slug).await?;

        let mut choices = vec![(String::new(), "Unassigned".to_string())];
        choices.extend(
            users
                .into_elements()
                .into_iter()
                .map(|user| (user.id.to_string(), user.name)),
        );
        Ok(choices)
    }

    /// List selectable work package types for the configured project.
    #[instrument(skip(self, store))]
    pub async fn allowed_types(&self, store: &dyn OptionStore) -> Result<Vec<(String, String)>> {
        let config = self.config(store)?;
        let client = self.client_for(&config)?;
        let types = client.list_project_types(&config.project_slug).await?;

        Ok(types
            .into_elements()
            .into_iter()
            .map(|t| (t.id.to_string(), t.name))
            .collect())
    }

    /// Default form values for an issue created from an event group.
    ///
    /// The title carries the host platform prefix; the description links
    /// back to the group and quotes the event body when present.
    pub fn initial_new_issue_form(&self, ctx: &IssueContext) -> IssueDefaults {
        IssueDefaults {
            title: format!("Sentry:{}", ctx.title),
            description: group_description(ctx),
        }
    }

    /// Search work packages by subject and reshape into autocomplete items.
    async fn search_issues(
        &self,
        store: &dyn OptionStore,
        query: &str,
    ) -> Result<Vec<AutocompleteItem>> {
        let config = self.config(store)?;
        let client = self.client_for(&config)?;
        let matches = client
            .search_work_packages(&config.project_slug, query)
            .await?;

        Ok(matches
            .into_elements()
            .into_iter()
            .map(|wp| AutocompleteItem {
                id: wp.id,
                text: format!("(#{}) {}", wp.id, wp.subject),
            })
            .collect())
    }
}

#[async_trait]
impl IssueTracker for OpenProjectPlugin {
    fn slug(&self) -> &str {
        Self::SLUG
    }

    fn title(&self) -> &str {
        Self::TITLE
    }

    fn is_configured(&self, store: &dyn OptionStore) -> bool {
        PluginConfig::is_complete(store)
    }

    fn configuration_fields(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new(OPT_URL, "OpenProject Host URL", FieldKind::Url)
                .placeholder("e.g. https://bugs.example.com")
                .help("The URL to your OpenProject instance"),
            FieldDescriptor::new(OPT_APIKEY, "OpenProject API key", FieldKind::Secret)
                .help("API key of the OpenProject user who will author new issues"),
            FieldDescriptor::new(OPT_PROJECT_SLUG, "OpenProject Project Slug", FieldKind::Text)
                .help("Slug of the project on OpenProject"),
            FieldDescriptor::new(OPT_ASSIGNEE_ID, "OpenProject Assignee ID", FieldKind::Number)
                .optional()
                .help("ID of the OpenProject user who will be the default assignee"),
        ]
    }

    async fn new_issue_fields(&self, store: &dyn OptionStore) -> Result<Vec<FieldDescriptor>> {
        let types = self.allowed_types(store).await?;
        let assignees = self.allowed_assignees(store).await?;

        Ok(vec![
            FieldDescriptor::new("title", "Title", FieldKind::Text),
            FieldDescriptor::new("description", "Description", FieldKind::TextArea).optional(),
            FieldDescriptor::new("type", "Type", FieldKind::Select).choices(types),
            FieldDescriptor::new("assignee", "Assignee", FieldKind::Select)
                .optional()
                .choices(assignees),
        ])
    }

    fn link_issue_fields(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new(ISSUE_ID_FIELD, "Work Package", FieldKind::Select)
                .autocomplete()
                .help("Start typing to search for a work package by subject"),
            FieldDescriptor::new("comment", "Comment", FieldKind::TextArea)
                .optional()
                .help("Leave a comment on the linked work package"),
        ]
    }

    fn new_issue_title(&self) -> String {
        "Create OpenProject Task".to_string()
    }

    #[instrument(skip(self, store, form), fields(title = %form.title))]
    async fn create_issue(&self, store: &dyn OptionStore, form: &NewIssueForm) -> Result<i64> {
        let config = self.config(store)?;
        let client = self.client_for(&config)?;

        let mut wp = NewWorkPackage::new(&form.title, form.type_id);
        if let Some(description) = &form.description {
            wp = wp.description(description);
        }
        // The form's assignee wins over the configured default
        if let Some(assignee_id) = form.assignee_id.or(config.assignee_id) {
            wp = wp.assignee(assignee_id);
        }

        let created = client.create_work_package(&config.project_slug, &wp).await?;
        Ok(created.id)
    }

    #[instrument(skip(self, store, form), fields(issue_id = form.issue_id))]
    async fn link_issue(
        &self,
        store: &dyn OptionStore,
        form: &LinkIssueForm,
    ) -> Result<LinkedIssue> {
        let config = self.config(store)?;
        let client = self.client_for(&config)?;

        // Validates the work package exists and yields its title. The
        // fetch has no side effect; if the comment step below fails there
        // is nothing to roll back.
        let wp = client.get_work_package(form.issue_id).await?;

        if let Some(comment) = form.comment.as_deref().filter(|c| !c.is_empty()) {
            client
                .create_comment(form.issue_id, comment, true, None)
                .await?;
        }

        Ok(LinkedIssue { title: wp.subject })
    }

    fn issue_label(&self, issue_id: i64) -> String {
        format!("WP#{}", issue_id)
    }

    fn issue_url(&self, store: &dyn OptionStore, issue_id: i64) -> Result<String> {
        let config = self.config(store)?;
        let base = Url::parse(&config.url)
            .map_err(|e| PluginError::Configuration(format!("invalid OpenProject URL: {}", e)))?;
        let url = base
            .join(&format!("/work_packages/{}", issue_id))
            .map_err(|e| PluginError::Configuration(format!("invalid OpenProject URL: {}", e)))?;
        Ok(url.to_string())
    }

    async fn view_autocomplete(
        &self,
        store: &dyn OptionStore,
        query: &AutocompleteQuery,
    ) -> AutocompleteResponse {
        // Only the issue-id field is served, and only for a non-empty
        // query; anything else returns empty without a network call.
        if query.field != ISSUE_ID_FIELD || query.query.is_empty() {
            return AutocompleteResponse::default();
        }

        match self.search_issues(store, &query.query).await {
            Ok(items) => AutocompleteResponse::items(items),
            Err(err) => AutocompleteResponse::error(err.message()),
        }
    }
}

/// Build the default issue description for an event group.
///
/// The group URL comes first; the event body, when present, follows in a
/// `<pre>` block separated by a blank line.
fn group_description(ctx: &IssueContext) -> String {
    let mut output = vec![ctx.url.clone()];
    if let Some(body) = ctx.body.as_deref().filter(|b| !b.is_empty()) {
        output.extend([
            String::new(),
            "<pre>".to_string(),
            body.to_string(),
            "</pre>".to_string(),
        ]);
    }
    output.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryOptionStore;

    fn configured_store() -> MemoryOptionStore {
        MemoryOptionStore::new()
            .with(OPT_URL, "https://op.example.com")
            .with(OPT_APIKEY, "1234567890abcdef")
            .with(OPT_PROJECT_SLUG, "demo")
    }

    #[test]
    fn test_metadata() {
        let plugin = OpenProjectPlugin::new();
        assert_eq!(plugin.slug(), "openproject");
        assert_eq!(plugin.title(), "OpenProject");
    }

    #[test]
    fn test_is_configured_requires_all_three() {
        let plugin = OpenProjectPlugin::new();
        assert!(plugin.is_configured(&configured_store()));

        for key in [OPT_URL, OPT_APIKEY, OPT_PROJECT_SLUG] {
            let store = configured_store().with(key, "");
            assert!(!plugin.is_configured(&store));
        }

        assert!(!plugin.is_configured(&MemoryOptionStore::new()));
    }

    #[test]
    fn test_issue_label() {
        let plugin = OpenProjectPlugin::new();
        assert_eq!(plugin.issue_label(1), "WP#1");
        assert_eq!(plugin.issue_label(4211), "WP#4211");
    }

    #[test]
    fn test_issue_url() {
        let plugin = OpenProjectPlugin::new();
        let url = plugin.issue_url(&configured_store(), 1).unwrap();
        assert_eq!(url, "https://op.example.com/work_packages/1");
    }

    #[test]
    fn test_issue_url_base_with_trailing_slash() {
        let plugin = OpenProjectPlugin::new();
        let store = configured_store().with(OPT_URL, "https://op.example.com/");
        let url = plugin.issue_url(&store, 7).unwrap();
        assert_eq!(url, "https://op.example.com/work_packages/7");
    }

    #[test]
    fn test_issue_url_unconfigured() {
        let plugin = OpenProjectPlugin::new();
        let err = plugin.issue_url(&MemoryOptionStore::new(), 1).unwrap_err();
        assert!(matches!(err, PluginError::Configuration(_)));
    }

    #[test]
    fn test_configuration_fields() {
        let fields = OpenProjectPlugin::new().configuration_fields();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["url", "apikey", "project_slug", "assignee_id"]);

        // Only the default assignee is optional
        assert!(fields.iter().filter(|f| f.required).count() == 3);
        assert!(!fields[3].required);
    }

    #[test]
    fn test_link_issue_fields_serve_autocomplete() {
        let fields = OpenProjectPlugin::new().link_issue_fields();
        assert_eq!(fields[0].name, ISSUE_ID_FIELD);
        assert!(fields[0].autocomplete);
        assert!(!fields[1].required);
    }

    #[test]
    fn test_new_issue_title() {
        assert_eq!(
            OpenProjectPlugin::new().new_issue_title(),
            "Create OpenProject Task"
        );
    }

    #[test]
    fn test_initial_new_issue_form() {
        let plugin = OpenProjectPlugin::new();
        let defaults = plugin.initial_new_issue_form(&IssueContext {
            title: "ValueError: bad input".to_string(),
            url: "https://sentry.example.com/org/project/issues/1/".to_string(),
            body: Some("Traceback (most recent call last):".to_string()),
        });

        assert_eq!(defaults.title, "Sentry:ValueError: bad input");
        assert_eq!(
            defaults.description,
            "https://sentry.example.com/org/project/issues/1/\n\n<pre>\nTraceback (most recent call last):\n</pre>"
        );
    }

    #[test]
    fn test_initial_new_issue_form_without_body() {
        let plugin = OpenProjectPlugin::new();
        let defaults = plugin.initial_new_issue_form(&IssueContext {
            title: "Crash".to_string(),
            url: "https://sentry.example.com/i/1/".to_string(),
            body: None,
        });

        assert_eq!(defaults.description, "https://sentry.example.com/i/1/");
    }

    #[tokio::test]
    async fn test_autocomplete_empty_query_skips_network() {
        let plugin = OpenProjectPlugin::new();
        // The URL points nowhere; an attempted request would error, so an
        // empty response proves no call was made
        let store = configured_store().with(OPT_URL, "http://127.0.0.1:1");

        let response = plugin
            .view_autocomplete(
                &store,
                &AutocompleteQuery {
                    field: ISSUE_ID_FIELD.to_string(),
                    query: String::new(),
                },
            )
            .await;

        assert!(response.items.is_empty());
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_autocomplete_wrong_field_skips_network() {
        let plugin = OpenProjectPlugin::new();
        let store = configured_store().with(OPT_URL, "http://127.0.0.1:1");

        let response = plugin
            .view_autocomplete(
                &store,
                &AutocompleteQuery {
                    field: "assignee".to_string(),
                    query: "crash".to_string(),
                },
            )
            .await;

        assert!(response.items.is_empty());
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_autocomplete_unconfigured_is_soft_error() {
        let plugin = OpenProjectPlugin::new();

        let response = plugin
            .view_autocomplete(
                &MemoryOptionStore::new(),
                &AutocompleteQuery {
                    field: ISSUE_ID_FIELD.to_string(),
                    query: "crash".to_string(),
                },
            )
            .await;

        assert!(response.items.is_empty());
        assert!(response.error.is_some());
    }

    #[tokio::test]
    async fn test_create_issue_unconfigured() {
        let plugin = OpenProjectPlugin::new();
        let err = plugin
            .create_issue(
                &MemoryOptionStore::new(),
                &NewIssueForm {
                    title: "Crash".to_string(),
                    description: None,
                    type_id: 1,
                    assignee_id: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PluginError::Configuration(_)));
    }
}
