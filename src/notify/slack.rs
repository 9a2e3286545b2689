use super::{Notification, Notifier};
use crate::error::{BugwatchError, Result};
use crate::http;
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct Payload<'a> {
    link_names: bool,
    text: &'a str,
}

/// Slack incoming-webhook sender.
///
/// Slack answers a delivered message with the literal body `ok`. Any other
/// body (`invalid_token`, `channel_not_found`, ...) is treated as a failed
/// delivery even when the status is 2xx.
pub struct SlackWebhook {
    http: Client,
}

impl SlackWebhook {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http::client(timeout)?,
        })
    }
}

impl Notifier for SlackWebhook {
    fn send(&self, webhook_url: &str, notification: &Notification) -> Result<()> {
        let text = notification.render();
        let response = self
            .http
            .post(webhook_url)
            .json(&Payload {
                link_names: true,
                text: &text,
            })
            .send()?;

        let status = response.status();
        let body = response.text()?;
        acknowledge(status.as_u16(), &body)
    }
}

fn acknowledge(status: u16, body: &str) -> Result<()> {
    if body.trim() == "ok" {
        Ok(())
    } else if body.trim().is_empty() {
        Err(BugwatchError::Notification(format!("HTTP {}", status)))
    } else {
        Err(BugwatchError::Notification(format!(
            "HTTP {}: {}",
            status,
            body.trim()
        )))
    }
}
