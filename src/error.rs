use thiserror::Error;

/// Where to get a tracker credential, shown whenever authentication fails.
pub const AUTH_REMEDIATION: &str = "Get an API key here: \
https://bugzilla.redhat.com/userprefs.cgi?tab=apikey then set the BUGZILLA_API_KEY environment variable.";

#[derive(Error, Debug)]
pub enum BugwatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("You are not logged into the bug tracker ({0}). {remediation}", remediation = AUTH_REMEDIATION)]
    Auth(String),

    #[error("Remote call '{operation}' failed: {message}")]
    Remote { operation: String, message: String },

    #[error("Notification rejected: {0}")]
    Notification(String),

    #[error("Time service error: {0}")]
    Time(String),

    #[error("No eligible assignee for bug {bug_id}")]
    NoEligibleAssignee { bug_id: u64 },

    #[error("'{operation}' still failing after {attempts} attempts: {last}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        last: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl BugwatchError {
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        BugwatchError::Remote {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Transient failures of a remote service. Everything else short-circuits
    /// the retry loop.
    pub fn is_retryable(&self) -> bool {
        match self {
            BugwatchError::Remote { .. }
            | BugwatchError::Notification(_)
            | BugwatchError::Time(_)
            | BugwatchError::Io(_)
            | BugwatchError::Json(_) => true,
            BugwatchError::Config(_)
            | BugwatchError::Auth(_)
            | BugwatchError::NoEligibleAssignee { .. }
            | BugwatchError::RetriesExhausted { .. }
            | BugwatchError::Yaml(_) => false,
            // A request that cannot even be built fails the same way every time.
            BugwatchError::Http(e) => !e.is_builder(),
        }
    }

    /// Process exit code for an error that reaches the top level.
    pub fn exit_code(&self) -> i32 {
        match self {
            // EX_USAGE
            BugwatchError::Config(_) | BugwatchError::Yaml(_) => 64,
            // EX_NOPERM
            BugwatchError::Auth(_) => 77,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, BugwatchError>;
