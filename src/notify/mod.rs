//! Chat notifications.
//!
//! A [`Notification`] names the chat ids to mention and carries the message
//! text. [`Notifier`] implementations deliver it to an incoming webhook.

mod slack;

pub use slack::SlackWebhook;

use crate::error::Result;
use serde::Serialize;

/// A message addressed to one or more chat users or groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub mentions: Vec<String>,
    pub text: String,
}

impl Notification {
    pub fn new(mention: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            mentions: vec![mention.into()],
            text: text.into(),
        }
    }

    /// Message body with the mentions in front, as the chat service expects it.
    pub fn render(&self) -> String {
        let mut out = self
            .mentions
            .iter()
            .map(|id| mention(id))
            .collect::<Vec<_>>()
            .join(" ");
        if !self.text.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&self.text);
        }
        out
    }
}

/// Mention markup for a user id, or for a group id (`!subteam^...`).
pub fn mention(chat_id: &str) -> String {
    if chat_id.starts_with('!') {
        format!("<{}>", chat_id)
    } else {
        format!("<@{}>", chat_id)
    }
}

/// Link markup with a custom label.
pub fn link(url: &str, label: &str) -> String {
    format!("<{}|{}>", url, label)
}

/// Message telling a member they own the triage of a bug.
pub fn assignment(chat_id: &str, bug_url: &str) -> Notification {
    Notification::new(
        chat_id,
        format!("you have been assigned the triage of this bug: {}", bug_url),
    )
}

/// Message asking a member to fill in release-note text for some bugs.
pub fn doc_text_reminder<'a>(
    chat_id: &str,
    bugs: impl IntoIterator<Item = (u64, &'a str)>,
) -> Notification {
    let links = bugs
        .into_iter()
        .map(|(id, url)| link(url, &id.to_string()))
        .collect::<Vec<_>>()
        .join(" ");
    Notification::new(
        chat_id,
        format!("please check the doctext for these bugs: {}", links),
    )
}

/// Delivers notifications to a chat webhook.
pub trait Notifier {
    fn send(&self, webhook_url: &str, notification: &Notification) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_user_and_group() {
        assert_eq!(mention("U0123"), "<@U0123>");
        assert_eq!(mention("!subteam^SKW6QC31Q"), "<!subteam^SKW6QC31Q>");
    }

    #[test]
    fn test_assignment_message() {
        let n = assignment("U1", "https://bugzilla.example.com/show_bug.cgi?id=7");
        assert_eq!(
            n.render(),
            "<@U1> you have been assigned the triage of this bug: https://bugzilla.example.com/show_bug.cgi?id=7"
        );
    }

    #[test]
    fn test_doc_text_reminder_lists_links() {
        let n = doc_text_reminder("U2", [(1, "https://b/1"), (2, "https://b/2")]);
        assert_eq!(
            n.render(),
            "<@U2> please check the doctext for these bugs: <https://b/1|1> <https://b/2|2>"
        );
    }

    #[test]
    fn test_render_without_mentions() {
        let n = Notification {
            mentions: vec![],
            text: "hello".into(),
        };
        assert_eq!(n.render(), "hello");
    }
}
