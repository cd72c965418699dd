use serde::Deserialize;

/// Issue projection returned by the search and issue endpoints when only `summary` is requested.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
}

impl Issue {
    pub fn summary(&self) -> &str {
        self.fields.summary.as_deref().unwrap_or_default()
    }
}

/// Envelope of `GET /rest/api/2/search`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub issues: Vec<Issue>,
}
