use super::{BugPatch, SavedSearch, Tracker};
use crate::error::{BugwatchError, Result};
use crate::model::Bug;
use crate::http;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const API_KEY_HEADER: &str = "X-BUGZILLA-API-KEY";

/// Bugzilla error codes that mean the credential is missing or bad.
const AUTH_ERROR_CODES: &[i64] = &[306, 307, 410];

#[derive(Deserialize)]
struct BugList {
    #[serde(default)]
    bugs: Vec<Bug>,
}

/// Bugzilla 5 REST client.
pub struct BugzillaClient {
    base: Url,
    api_key: String,
    http: Client,
}

impl BugzillaClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url).map_err(|e| {
            BugwatchError::Config(format!("invalid tracker URL '{}': {}", base_url, e))
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = http::client(timeout)?;

        Ok(Self {
            base,
            api_key: api_key.to_string(),
            http,
        })
    }

    /// Browser link for a bug.
    pub fn bug_url(&self, id: u64) -> String {
        let mut url = self.endpoint("show_bug.cgi");
        url.query_pairs_mut().append_pair("id", &id.to_string());
        url.to_string()
    }

    fn endpoint(&self, path: &str) -> Url {
        // `base` always ends in '/', so joining a relative path cannot fail.
        self.base.join(path).unwrap_or_else(|_| self.base.clone())
    }
}

fn check(operation: &str, response: Response) -> Result<Value> {
    let status = response.status();
    let body = response.text()?;
    classify(operation, status, &body)
}

/// Turn a status and body into the decoded JSON or the matching error.
/// Credential problems become `Auth`; everything else is a `Remote` failure.
fn classify(operation: &str, status: StatusCode, body: &str) -> Result<Value> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(BugwatchError::Auth(format!("{} returned {}", operation, status)));
    }

    // Bugzilla reports most failures as a JSON body with `error: true`,
    // sometimes with a 200 status.
    let value: Value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).map_err(|e| {
            if status.is_success() {
                BugwatchError::remote(operation, format!("unreadable response: {}", e))
            } else {
                BugwatchError::remote(operation, format!("{}: {}", status, truncate(body)))
            }
        })?
    };

    if let Some((code, message)) = api_error(&value) {
        if AUTH_ERROR_CODES.contains(&code) {
            return Err(BugwatchError::Auth(message));
        }
        return Err(BugwatchError::remote(
            operation,
            format!("error {}: {}", code, message),
        ));
    }

    if !status.is_success() {
        return Err(BugwatchError::remote(
            operation,
            format!("{}: {}", status, truncate(body)),
        ));
    }

    Ok(value)
}

fn api_error(value: &Value) -> Option<(i64, String)> {
    if value.get("error").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    let code = value.get("code").and_then(Value::as_i64).unwrap_or_default();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    Some((code, message))
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((i, _)) => &body[..i],
        None => body,
    }
}

impl Tracker for BugzillaClient {
    fn authenticate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(BugwatchError::Auth("no API key configured".to_string()));
        }

        let response = self
            .http
            .get(self.endpoint("rest/whoami"))
            .header(API_KEY_HEADER, &self.api_key)
            .send()?;
        let who = check("authenticate", response)?;

        match who.get("name").and_then(Value::as_str) {
            Some(name) => {
                tracing::info!(user = %name, "Logged into the bug tracker");
                Ok(())
            }
            None => Err(BugwatchError::Auth("the tracker did not identify the API key".to_string())),
        }
    }

    fn query(&self, search: &SavedSearch) -> Result<Vec<Bug>> {
        let mut url = self.endpoint("rest/bug");
        url.query_pairs_mut()
            .extend_pairs(search.params().iter().map(|(k, v)| (k.as_str(), v.as_str())));

        tracing::debug!(url = %url.path(), params = search.params().len(), "Querying bugs");
        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()?;
        let value = check("query", response)?;

        let mut bugs = serde_json::from_value::<BugList>(value)?.bugs;
        for bug in &mut bugs {
            if bug.web_url.is_empty() {
                bug.web_url = self.bug_url(bug.id);
            }
        }
        Ok(bugs)
    }

    fn update(&self, bug_id: u64, patch: &BugPatch) -> Result<()> {
        let response = self
            .http
            .put(self.endpoint(&format!("rest/bug/{}", bug_id)))
            .header(API_KEY_HEADER, &self.api_key)
            .json(patch)
            .send()?;
        check("update", response)?;
        Ok(())
    }

    fn add_comment(&self, bug_id: u64, text: &str) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint(&format!("rest/bug/{}/comment", bug_id)))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&serde_json::json!({ "comment": text }))
            .send()?;
        check("comment", response)?;
        Ok(())
    }
}
