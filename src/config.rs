use crate::error::{BugwatchError, Result};
use crate::retry::RetryPolicy;
use crate::roster::{self, Roster};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Settings file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "bugwatch.yml";

pub const TEAM_MEMBERS_ENV: &str = "TEAM_MEMBERS";
pub const TEAM_VACATIONS_ENV: &str = "TEAM_VACATIONS";
pub const SLACK_HOOK_ENV: &str = "SLACK_HOOK";
pub const API_KEY_ENV: &str = "BUGZILLA_API_KEY";

const PRETRIAGE_QUERY: &str = "https://bugzilla.redhat.com/buglist.cgi?bug_status=__open__&f1=component&\
f10=component&f11=component&f12=component&f13=CP&f15=CP&f17=CP&f18=keywords&f19=assigned_to&f2=OP&\
f3=rh_sub_components&f4=rh_sub_components&f5=rh_sub_components&f6=rh_sub_components&f7=OP&f8=short_desc&\
f9=OP&j2=OR&j9=OR&list_id=12150483&o1=notequals&o10=equals&o11=equals&o12=equals&o18=nowords&o19=equals&\
o3=equals&o4=equals&o5=equals&o6=equals&o8=anywords&query_format=advanced&v1=Documentation&v10=Installer&\
v11=Machine%20Config%20Operator&v12=Cloud%20Compute&v18=Triaged&\
v19=shiftstack-bugwatcher%40bot.bugzilla.redhat.com&v3=OpenShift%20on%20OpenStack&\
v4=OpenStack%20CSI%20Drivers&v5=OpenStack%20Provider&v6=platform-openstack&v8=osp%20openstack";

const POSTTRIAGE_QUERY: &str = "https://bugzilla.redhat.com/buglist.cgi?bug_status=NEW&bug_status=ASSIGNED&\
bug_status=POST&bug_status=MODIFIED&bug_status=ON_DEV&bug_status=ON_QA&bug_status=VERIFIED&f1=component&\
f10=OP&f11=component&f12=component&f13=component&f14=CP&f16=CP&f18=CP&f19=keywords&f2=OP&\
f3=rh_sub_components&f4=rh_sub_components&f5=rh_sub_components&f6=rh_sub_components&f7=rh_sub_components&\
f8=OP&f9=short_desc&j10=OR&j2=OR&list_id=12471031&o1=notequals&o11=equals&o12=equals&o13=equals&\
o19=substring&o3=equals&o4=equals&o5=equals&o6=equals&o7=equals&o9=anywords&query_format=advanced&\
v1=Documentation&v11=Installer&v12=Machine%20Config%20Operator&v13=Cloud%20Compute&v19=Triaged&\
v3=OpenShift%20on%20OpenStack&v4=OpenStack%20CSI%20Drivers&v5=OpenStack%20Provider&v6=platform-openstack&\
v7=kuryr&v9=osp%20openstack";

const DOCTEXT_QUERY: &str = "https://bugzilla.redhat.com/buglist.cgi?bug_status=ON_QA&bug_status=VERIFIED&\
f1=component&f10=OP&f11=component&f12=component&f13=component&f14=CP&f16=CP&f18=CP&f19=cf_doc_type&f2=OP&\
f3=rh_sub_components&f4=rh_sub_components&f5=rh_sub_components&f6=rh_sub_components&f7=rh_sub_components&\
f8=OP&f9=short_desc&j10=OR&j2=OR&list_id=12471057&o1=notequals&o11=equals&o12=equals&o13=equals&\
o19=equals&o3=equals&o4=equals&o5=equals&o6=equals&o7=equals&o9=anywords&query_format=advanced&\
v1=Documentation&v11=Installer&v12=Machine%20Config%20Operator&v13=Cloud%20Compute&\
v19=If%20docs%20needed%2C%20set%20a%20value&v3=OpenShift%20on%20OpenStack&v4=OpenStack%20CSI%20Drivers&\
v5=OpenStack%20Provider&v6=platform-openstack&v7=kuryr&v9=osp%20openstack";

/// Non-secret tuning, read from YAML. Every field has a default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub tracker: TrackerSettings,

    #[serde(default)]
    pub queries: QuerySettings,

    #[serde(default)]
    pub chat: ChatSettings,

    #[serde(default)]
    pub time: TimeSettings,

    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSettings {
    #[serde(default = "default_tracker_url")]
    pub url: String,

    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_triaged_keyword")]
    pub triaged_keyword: String,

    /// Page size for the posttriage query. `None` leaves paging to the tracker.
    #[serde(default = "default_page_limit")]
    pub page_limit: Option<u32>,
}

fn default_tracker_url() -> String {
    "https://bugzilla.redhat.com".to_string()
}

fn default_http_timeout() -> u64 {
    30
}

fn default_triaged_keyword() -> String {
    "Triaged".to_string()
}

fn default_page_limit() -> Option<u32> {
    Some(1000)
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            url: default_tracker_url(),
            timeout_secs: default_http_timeout(),
            triaged_keyword: default_triaged_keyword(),
            page_limit: default_page_limit(),
        }
    }
}

impl TrackerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Saved searches, as `buglist.cgi` URLs or bare query strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySettings {
    #[serde(default = "default_pretriage_query")]
    pub pretriage: String,

    #[serde(default = "default_posttriage_query")]
    pub posttriage: String,

    #[serde(default = "default_doctext_query")]
    pub doctext: String,
}

fn default_pretriage_query() -> String {
    PRETRIAGE_QUERY.to_string()
}

fn default_posttriage_query() -> String {
    POSTTRIAGE_QUERY.to_string()
}

fn default_doctext_query() -> String {
    DOCTEXT_QUERY.to_string()
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            pretriage: default_pretriage_query(),
            posttriage: default_posttriage_query(),
            doctext: default_doctext_query(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Group mentioned when a bug's assignee is not on the roster.
    #[serde(default = "default_team_id")]
    pub team_id: String,

    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

fn default_team_id() -> String {
    "!subteam^SKW6QC31Q".to_string()
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            team_id: default_team_id(),
            timeout_secs: default_http_timeout(),
        }
    }
}

impl ChatSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSettings {
    #[serde(default = "default_time_server")]
    pub server: String,

    #[serde(default = "default_time_timeout")]
    pub timeout_secs: u64,
}

fn default_time_server() -> String {
    "pool.ntp.org:123".to_string()
}

fn default_time_timeout() -> u64 {
    5
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            server: default_time_server(),
            timeout_secs: default_time_timeout(),
        }
    }
}

impl TimeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One call site's retry policy. A field left out of the file keeps the
/// value of that call site's default policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySettings {
    pub attempts: u32,

    pub backoff_secs: u64,

    pub reraise: bool,
}

impl PolicySettings {
    const fn new(attempts: u32, backoff_secs: u64) -> Self {
        Self {
            attempts,
            backoff_secs,
            reraise: true,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts, Duration::from_secs(self.backoff_secs))
            .with_reraise(self.reraise)
    }
}

/// Partial policy as written in the settings file.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct PolicyOverride {
    attempts: Option<u32>,
    backoff_secs: Option<u64>,
    reraise: Option<bool>,
}

impl PolicyOverride {
    fn over(self, base: PolicySettings) -> PolicySettings {
        PolicySettings {
            attempts: self.attempts.unwrap_or(base.attempts),
            backoff_secs: self.backoff_secs.unwrap_or(base.backoff_secs),
            reraise: self.reraise.unwrap_or(base.reraise),
        }
    }
}

fn fetch_policy<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<PolicySettings, D::Error> {
    Ok(PolicyOverride::deserialize(d)?.over(default_fetch_policy()))
}

fn mutate_policy<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<PolicySettings, D::Error> {
    Ok(PolicyOverride::deserialize(d)?.over(default_mutate_policy()))
}

fn notify_policy<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<PolicySettings, D::Error> {
    Ok(PolicyOverride::deserialize(d)?.over(default_notify_policy()))
}

fn time_policy<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<PolicySettings, D::Error> {
    Ok(PolicyOverride::deserialize(d)?.over(default_time_policy()))
}

/// One retry policy per call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_fetch_policy", deserialize_with = "fetch_policy")]
    pub fetch: PolicySettings,

    #[serde(default = "default_mutate_policy", deserialize_with = "mutate_policy")]
    pub mutate: PolicySettings,

    #[serde(default = "default_notify_policy", deserialize_with = "notify_policy")]
    pub notify: PolicySettings,

    #[serde(default = "default_time_policy", deserialize_with = "time_policy")]
    pub time: PolicySettings,
}

fn default_fetch_policy() -> PolicySettings {
    PolicySettings::new(10, 5)
}

fn default_mutate_policy() -> PolicySettings {
    PolicySettings::new(5, 5)
}

fn default_notify_policy() -> PolicySettings {
    PolicySettings::new(2, 60)
}

fn default_time_policy() -> PolicySettings {
    PolicySettings::new(10, 5)
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            fetch: default_fetch_policy(),
            mutate: default_mutate_policy(),
            notify: default_notify_policy(),
            time: default_time_policy(),
        }
    }
}

impl Settings {
    /// Load settings. An explicit path must exist; otherwise `bugwatch.yml`
    /// in the working directory is used when present, and defaults when not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) if !p.exists() => {
                return Err(BugwatchError::Config(format!(
                    "settings file not found: {}",
                    p.display()
                )));
            }
            Some(p) => p.to_path_buf(),
            None => {
                let p = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !p.exists() {
                    tracing::debug!("No settings file, using defaults");
                    return Ok(Self::default());
                }
                p
            }
        };

        let content = std::fs::read_to_string(&path)?;
        let settings = Self::from_yaml(&content)?;
        tracing::debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Everything a run needs: settings plus the values taken from the
/// environment. Built once at startup and passed by reference.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub settings: Settings,
    pub api_key: Option<String>,
    pub webhook_url: Option<String>,
    pub team_json: Option<String>,
    pub vacations_json: Option<String>,
}

/// Values a subcommand cannot run without.
#[derive(Debug, Clone, Copy, Default)]
pub struct Requirements {
    pub team: bool,
    pub api_key: bool,
    pub webhook: bool,
}

impl RunConfig {
    pub fn new(
        settings: Settings,
        api_key: Option<String>,
        webhook_url: Option<String>,
        team_json: Option<String>,
        vacations_json: Option<String>,
    ) -> Self {
        Self {
            settings,
            api_key: non_blank(api_key),
            webhook_url: non_blank(webhook_url),
            team_json: non_blank(team_json),
            vacations_json: non_blank(vacations_json),
        }
    }

    /// Fail with one error naming every missing variable, then check that a
    /// required webhook is a usable URL.
    pub fn require(&self, needs: Requirements) -> Result<()> {
        let mut missing = Vec::new();
        if needs.team && self.team_json.is_none() {
            missing.push(TEAM_MEMBERS_ENV);
        }
        if needs.webhook && self.webhook_url.is_none() {
            missing.push(SLACK_HOOK_ENV);
        }
        if needs.api_key && self.api_key.is_none() {
            missing.push(API_KEY_ENV);
        }

        if !missing.is_empty() {
            return Err(BugwatchError::Config(format!(
                "Required environment variable not found: {}",
                missing.join(", ")
            )));
        }

        if needs.webhook {
            self.webhook_url()?;
        }
        Ok(())
    }

    pub fn roster(&self) -> Result<Roster> {
        let team = self.team_json.as_deref().ok_or_else(|| {
            BugwatchError::Config(format!(
                "the JSON object describing the team is required. Set the {} environment variable.",
                TEAM_MEMBERS_ENV
            ))
        })?;
        let vacations = roster::parse_vacations(self.vacations_json.as_deref())?;
        Roster::from_json(team, &vacations)
    }

    pub fn webhook_url(&self) -> Result<&str> {
        let raw = self.webhook_url.as_deref().ok_or_else(|| {
            BugwatchError::Config(format!(
                "Required environment variable not found: {}",
                SLACK_HOOK_ENV
            ))
        })?;
        validate_webhook(raw)?;
        Ok(raw)
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            BugwatchError::Config(format!(
                "Required environment variable not found: {}",
                API_KEY_ENV
            ))
        })
    }
}

/// A webhook must be an absolute http(s) URL with a host.
fn validate_webhook(raw: &str) -> Result<()> {
    let invalid = |why: &str| {
        BugwatchError::Config(format!("{} is not a valid webhook URL: {}", SLACK_HOOK_ENV, why))
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(&format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
