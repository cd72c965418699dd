use std::time::Duration;

use crate::config::JiraConfig;
use crate::date::{convert_date, format_date};
use crate::error::{JiraError, Result};
use crate::models::{Issue, SearchResults, UserProfile};
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

const API_PREFIX: &str = "/rest/api/2";
const EVER_ASSIGNED_JQL: &str = "assignee was in (currentUser()) ORDER BY updated DESC";
const ISSUE_SUMMARY_FIELDS: &str = "summary";
/// Worklogs are stamped at 18:00 UTC on the chosen day.
const WORKLOG_START_TIME: &str = "T18:00:00.000+0000";
/// Highest status Jira answers with on success (226 IM Used).
const LAST_SUCCESS_STATUS: u16 = 226;

#[derive(Clone)]
pub struct JiraClient {
    http: HttpClient,
    config: JiraConfig,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self { http, config })
    }

    /// Verifies the token by fetching the current user.
    pub async fn check_auth(&self) -> Result<UserProfile> {
        self.get(&["myself"], &[]).await
    }

    /// Creates a worklog on `issue_key`. `date` accepts `today`, `yest` or `YYYY-MM-DD`.
    pub async fn add_worklog(
        &self,
        issue_key: &str,
        date: &str,
        spent: Duration,
        comment: &str,
    ) -> Result<()> {
        let day = convert_date(date)?;
        let issue_key = issue_segment(issue_key)?;
        let payload = WorklogCreateRequest::new(day, spent, comment);
        tracing::debug!(
            "worklog body: {}",
            serde_json::to_string(&payload).unwrap_or_default()
        );
        let request = self
            .request(Method::POST, &["issue", issue_key, "worklog"])?
            .json(&payload);
        let response = request.send().await?;
        Self::ensure_success(response).await
    }

    /// Issues that were ever assigned to the current user, most recently updated first.
    pub async fn ever_assigned_issues(&self, limit: u32) -> Result<Vec<Issue>> {
        let max_results = limit.to_string();
        let results: SearchResults = self
            .get(
                &["search"],
                &[
                    ("jql", EVER_ASSIGNED_JQL),
                    ("fields", ISSUE_SUMMARY_FIELDS),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;
        Ok(results.issues)
    }

    pub async fn issue(&self, issue_key: &str) -> Result<Issue> {
        let issue_key = issue_segment(issue_key)?;
        self.get(&["issue", issue_key], &[("fields", ISSUE_SUMMARY_FIELDS)])
            .await
    }

    async fn get<T>(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut request = self.request(Method::GET, segments)?;
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        Self::parse_json(response).await
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url_for(segments)?;
        tracing::debug!("{} {}", method, url.path());
        Ok(self.http.request(method, url))
    }

    /// Each segment is percent-encoded on its own, so user-supplied keys
    /// cannot add path components or a query string.
    fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}/", self.config.base_url(), API_PREFIX))
            .map_err(|err| JiraError::Other(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| JiraError::Other("jira host cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(JiraError::from)
    }

    async fn ensure_success(response: Response) -> Result<()> {
        let response = Self::check_status(response).await?;
        // drain the body so the connection can be reused
        let _ = response.bytes().await?;
        Ok(())
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if is_success(status) {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::warn!("jira rejected request with {}: {}", status, body);
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(JiraError::Authentication(format!(
                "Access denied ({}) - {}",
                status, body
            )))
        } else {
            Err(JiraError::http(status, body))
        }
    }
}

/// Dot segments are dropped by URL normalization, so they are refused outright.
fn issue_segment(issue_key: &str) -> Result<&str> {
    let key = issue_key.trim();
    if matches!(key, "" | "." | "..") {
        return Err(JiraError::InvalidIssueKey(issue_key.to_string()));
    }
    Ok(key)
}

fn is_success(status: StatusCode) -> bool {
    (200..=LAST_SUCCESS_STATUS).contains(&status.as_u16())
}

fn build_http_client(config: &JiraConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();

    let mut auth_value = header_value(format!("Bearer {}", config.token))?;
    auth_value.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth_value);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| JiraError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| JiraError::Other(err.to_string()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorklogCreateRequest<'a> {
    time_spent_seconds: u64,
    started: String,
    comment: &'a str,
}

impl<'a> WorklogCreateRequest<'a> {
    fn new(day: NaiveDate, spent: Duration, comment: &'a str) -> Self {
        Self {
            time_spent_seconds: spent.as_secs(),
            started: format!("{}{}", format_date(day), WORKLOG_START_TIME),
            comment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{is_success, JiraClient, WorklogCreateRequest};
    use crate::config::JiraConfig;
    use crate::error::JiraError;
    use chrono::NaiveDate;
    use mockito::{Matcher, Server};
    use reqwest::StatusCode;
    use serde_json::json;
    use std::time::Duration;

    fn client_for(server: &Server) -> JiraClient {
        let config = JiraConfig::new(server.url(), "secret-token");
        JiraClient::new(config).expect("client should build")
    }

    #[test]
    fn worklog_body_uses_seconds_and_evening_start() {
        let day = NaiveDate::from_ymd_opt(2024, 4, 17).unwrap();
        let payload = WorklogCreateRequest::new(day, Duration::from_secs(2 * 3600), "say \"hi\"");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "timeSpentSeconds": 7200,
                "started": "2024-04-17T18:00:00.000+0000",
                "comment": "say \"hi\""
            })
        );
    }

    #[test]
    fn success_range_ends_at_im_used() {
        assert!(is_success(StatusCode::OK));
        assert!(is_success(StatusCode::CREATED));
        assert!(is_success(StatusCode::IM_USED));
        assert!(!is_success(StatusCode::BAD_REQUEST));
        assert!(!is_success(StatusCode::from_u16(299).unwrap()));
    }

    #[tokio::test]
    async fn add_worklog_accepts_created() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/api/2/issue/INT-18/worklog")
            .match_header("authorization", "Bearer secret-token")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "timeSpentSeconds": 5400,
                "started": "2024-04-17T18:00:00.000+0000",
                "comment": "standup sync"
            })))
            .with_status(201)
            .with_body(r#"{"id": "10001"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        client
            .add_worklog("INT-18", "2024-04-17", Duration::from_secs(90 * 60), "standup sync")
            .await
            .expect("worklog should be created");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn add_worklog_reports_status_and_body_on_rejection() {
        for (status, body) in [
            (400, r#"{"errorMessages":["Worklog must not be null."]}"#),
            (500, "internal failure"),
        ] {
            let mut server = Server::new_async().await;
            server
                .mock("POST", "/rest/api/2/issue/INT-18/worklog")
                .with_status(status)
                .with_body(body)
                .create_async()
                .await;

            let err = client_for(&server)
                .add_worklog("INT-18", "2024-04-17", Duration::from_secs(3600), "")
                .await
                .expect_err("rejection should surface");
            let text = err.to_string();
            assert!(text.contains(&status.to_string()), "{text}");
            assert!(text.contains(body), "{text}");
            assert_eq!(err.status().map(|s| s.as_u16()), Some(status as u16));
        }
    }

    #[tokio::test]
    async fn add_worklog_rejects_bad_date_without_calling_jira() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = client_for(&server)
            .add_worklog("INT-18", "17/04/2024", Duration::from_secs(60), "")
            .await
            .expect_err("date should be rejected");
        assert!(matches!(err, JiraError::DateFormat));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn issue_key_separators_stay_inside_one_segment() {
        let mut server = Server::new_async().await;
        let escaped = server
            .mock("POST", "/rest/api/2/myself/worklog")
            .expect(0)
            .create_async()
            .await;
        let issue_itself = server
            .mock("POST", "/rest/api/2/issue/INT-18")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let encoded = server
            .mock(
                "POST",
                Matcher::Regex(r"^/rest/api/2/issue/[^/]*%2F[^/]*/worklog$".to_string()),
            )
            .with_status(404)
            .with_body("Issue Does Not Exist")
            .expect(1)
            .create_async()
            .await;
        let encoded_query = server
            .mock("POST", "/rest/api/2/issue/INT-18%3Fx/worklog")
            .with_status(404)
            .with_body("Issue Does Not Exist")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let spent = Duration::from_secs(3600);
        let traversal = client
            .add_worklog("X/../../myself", "2024-04-17", spent, "")
            .await;
        let query = client.add_worklog("INT-18?x", "2024-04-17", spent, "").await;

        assert_eq!(traversal.unwrap_err().status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(query.unwrap_err().status(), Some(StatusCode::NOT_FOUND));
        escaped.assert_async().await;
        issue_itself.assert_async().await;
        encoded.assert_async().await;
        encoded_query.assert_async().await;
    }

    #[tokio::test]
    async fn dot_and_empty_issue_keys_are_refused_locally() {
        let mut server = Server::new_async().await;
        let post = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let get = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server);
        for key in ["", ".", ".."] {
            let err = client
                .add_worklog(key, "2024-04-17", Duration::from_secs(60), "")
                .await
                .expect_err(key);
            assert!(matches!(err, JiraError::InvalidIssueKey(_)), "{err:?}");
        }
        assert!(matches!(
            client.issue("..").await,
            Err(JiraError::InvalidIssueKey(_))
        ));
        post.assert_async().await;
        get.assert_async().await;
    }

    #[tokio::test]
    async fn check_auth_maps_unauthorized() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/rest/api/2/myself")
            .with_status(401)
            .with_body("token expired")
            .create_async()
            .await;

        let err = client_for(&server).check_auth().await.expect_err("should fail");
        match err {
            JiraError::Authentication(message) => assert!(message.contains("token expired")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn check_auth_returns_profile() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/rest/api/2/myself")
            .match_header("authorization", "Bearer secret-token")
            .with_status(200)
            .with_body(r#"{"name": "jdoe", "displayName": "Jane Doe"}"#)
            .create_async()
            .await;

        let profile = client_for(&server).check_auth().await.unwrap();
        assert_eq!(profile.label(), Some("Jane Doe"));
    }

    #[tokio::test]
    async fn ever_assigned_issues_preserves_order() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/2/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded(
                    "jql".into(),
                    "assignee was in (currentUser()) ORDER BY updated DESC".into(),
                ),
                Matcher::UrlEncoded("maxResults".into(), "50".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"issues": [
                    {"key": "INT-18", "fields": {"summary": "Meetings"}},
                    {"key": "OPS-7", "fields": {"summary": "Release train"}}
                ]}"#,
            )
            .create_async()
            .await;

        let issues = client_for(&server).ever_assigned_issues(50).await.unwrap();
        let pairs: Vec<_> = issues
            .iter()
            .map(|issue| (issue.key.as_str(), issue.summary()))
            .collect();
        assert_eq!(pairs, vec![("INT-18", "Meetings"), ("OPS-7", "Release train")]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_search_payload_is_serialization_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/rest/api/2/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>login</html>")
            .create_async()
            .await;

        let err = client_for(&server).ever_assigned_issues(10).await.unwrap_err();
        assert!(matches!(err, JiraError::Serialization(_)), "{err:?}");
    }

    #[tokio::test]
    async fn issue_lookup_returns_summary() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/rest/api/2/issue/INT-18")
            .match_query(Matcher::UrlEncoded("fields".into(), "summary".into()))
            .with_status(200)
            .with_body(r#"{"key": "INT-18", "fields": {"summary": "Meetings"}}"#)
            .create_async()
            .await;

        let issue = client_for(&server).issue("INT-18").await.unwrap();
        assert_eq!(issue.summary(), "Meetings");
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let mut config = JiraConfig::new("http://127.0.0.1:9", "token");
        config.connect_timeout = Duration::from_millis(500);
        let client = JiraClient::new(config).unwrap();
        let err = client.check_auth().await.unwrap_err();
        assert!(
            matches!(err, JiraError::Network(_) | JiraError::Timeout(_)),
            "{err:?}"
        );
    }
}
