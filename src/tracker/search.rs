use crate::error::{BugwatchError, Result};
use url::Url;

/// A saved search, kept as the query-string parameters of a `buglist.cgi`
/// URL. The parameters are handed to the REST search endpoint untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSearch {
    params: Vec<(String, String)>,
}

impl SavedSearch {
    /// Accepts either a full `buglist.cgi?...` URL or a bare query string.
    pub fn parse(search: &str) -> Result<Self> {
        let search = search.trim();
        if search.is_empty() {
            return Err(BugwatchError::Config("saved search is empty".to_string()));
        }

        let params: Vec<(String, String)> = if search.contains("://") {
            let url = Url::parse(search).map_err(|e| {
                BugwatchError::Config(format!("invalid saved search URL: {}", e))
            })?;
            url.query_pairs().into_owned().collect()
        } else {
            url::form_urlencoded::parse(search.trim_start_matches('?').as_bytes())
                .into_owned()
                .collect()
        };

        if params.is_empty() {
            return Err(BugwatchError::Config(format!(
                "saved search has no parameters: {}",
                search
            )));
        }

        Ok(Self { params })
    }

    /// Replace the list of fields the tracker returns.
    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.params.retain(|(k, _)| k != "include_fields");
        self.params
            .push(("include_fields".to_string(), fields.join(",")));
        self
    }

    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        if let Some(limit) = limit {
            self.params.retain(|(k, _)| k != "limit" && k != "offset");
            self.params.push(("limit".to_string(), limit.to_string()));
            self.params.push(("offset".to_string(), "0".to_string()));
        }
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
