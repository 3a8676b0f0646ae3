use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Index every observation lands in.
pub const INDEX: &str = "sshdev-index";

/// A public key offered during authentication, in authorized-keys form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferedKey {
    pub key: String,
    #[serde(rename = "type")]
    pub key_type: String,
}

/// One observed behavior. Serialized untagged as the `fields` sub-document;
/// the discriminant travels separately as the document's `action`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Event {
    Login { username: String },
    Logout { username: String },
    CommandRun { command: String },
    TriedPassword { password: String },
    TriedPubkey { key: String },
}

impl Event {
    pub fn action(&self) -> &'static str {
        match self {
            Event::Login { .. } => "login",
            Event::Logout { .. } => "logout",
            Event::CommandRun { .. } => "command_run",
            Event::TriedPassword { .. } => "tried_password",
            Event::TriedPubkey { .. } => "tried_pubkey",
        }
    }
}

/// Identity of the session an event belongs to.
pub struct SessionMeta<'a> {
    pub session_id: &'a str,
    pub username: &'a str,
    pub remote_addr: Option<SocketAddr>,
}

/// The annotated record shipped to the index: the event payload plus the
/// session's credential history and location at the time it fired.
#[derive(Debug, Serialize)]
pub struct EventDoc {
    pub action: &'static str,
    #[serde(rename = "sourceIP")]
    pub source_ip: String,
    #[serde(rename = "sourcePort")]
    pub source_port: String,
    pub cwd: String,
    pub passwords: Vec<String>,
    pub keys: Vec<OfferedKey>,
    pub fields: Event,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub username: String,
    #[serde(rename = "@timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl EventDoc {
    pub fn annotate(
        event: Event,
        meta: &SessionMeta<'_>,
        cwd: String,
        passwords: Vec<String>,
        keys: Vec<OfferedKey>,
    ) -> Self {
        let (source_ip, source_port) = split_remote_addr(meta.remote_addr);
        Self {
            action: event.action(),
            source_ip,
            source_port,
            cwd,
            passwords,
            keys,
            fields: event,
            session_id: meta.session_id.to_string(),
            username: meta.username.to_string(),
            timestamp: Utc::now(),
        }
    }
}

// The remote address splits at the last colon so bracketed IPv6 peers keep
// their address intact; anything unsplittable reports empty strings.
fn split_remote_addr(addr: Option<SocketAddr>) -> (String, String) {
    let Some(addr) = addr else {
        return (String::new(), String::new());
    };
    match addr.to_string().rsplit_once(':') {
        Some((ip, port)) => (ip.to_string(), port.to_string()),
        None => (String::new(), String::new()),
    }
}

/// Ships event documents to the JSON index backend. Failures are logged and
/// swallowed; nothing downstream of the attacker ever sees them.
pub struct EventSink {
    client: reqwest::Client,
    index_url: String,
}

impl EventSink {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            index_url: format!("{}/{}/_doc", base_url.trim_end_matches('/'), INDEX),
        }
    }

    pub async fn ship(&self, doc: EventDoc) {
        let action = doc.action;
        let result = self
            .client
            .post(&self.index_url)
            .query(&[("refresh", "true")])
            .json(&doc)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(action, status = %response.status(), "indexed event");
            }
            Ok(response) => {
                tracing::error!(action, status = %response.status(), "error indexing event");
            }
            Err(err) => {
                tracing::error!(action, error = %err, "error reaching index backend");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(addr: Option<SocketAddr>) -> SessionMeta<'static> {
        SessionMeta {
            session_id: "sess-1",
            username: "root",
            remote_addr: addr,
        }
    }

    #[test]
    fn test_action_tags() {
        assert_eq!(
            Event::Login {
                username: "a".into()
            }
            .action(),
            "login"
        );
        assert_eq!(
            Event::CommandRun {
                command: "ls".into()
            }
            .action(),
            "command_run"
        );
        assert_eq!(
            Event::TriedPubkey { key: "k".into() }.action(),
            "tried_pubkey"
        );
    }

    #[test]
    fn test_document_field_names() {
        let doc = EventDoc::annotate(
            Event::TriedPassword {
                password: "hunter2".into(),
            },
            &meta("203.0.113.9:51522".parse().ok()),
            "/".into(),
            vec!["hunter2".into()],
            vec![OfferedKey {
                key: "ssh-ed25519 AAAA".into(),
                key_type: "ssh-ed25519".into(),
            }],
        );
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["action"], "tried_password");
        assert_eq!(value["sourceIP"], "203.0.113.9");
        assert_eq!(value["sourcePort"], "51522");
        assert_eq!(value["fields"]["password"], "hunter2");
        assert_eq!(value["sessionId"], "sess-1");
        assert_eq!(value["keys"][0]["type"], "ssh-ed25519");
        assert!(value.get("@timestamp").is_some());
    }

    #[test]
    fn test_fields_subdocument_per_action() {
        let login = serde_json::to_value(Event::Login {
            username: "admin".into(),
        })
        .unwrap();
        assert_eq!(login, serde_json::json!({ "username": "admin" }));

        let run = serde_json::to_value(Event::CommandRun {
            command: "ls^C".into(),
        })
        .unwrap();
        assert_eq!(run, serde_json::json!({ "command": "ls^C" }));
    }

    #[test]
    fn test_missing_remote_addr_is_empty() {
        let doc = EventDoc::annotate(
            Event::Logout {
                username: "root".into(),
            },
            &meta(None),
            "/".into(),
            vec![],
            vec![],
        );
        assert_eq!(doc.source_ip, "");
        assert_eq!(doc.source_port, "");
    }

    #[test]
    fn test_ipv6_splits_at_last_colon() {
        let doc = EventDoc::annotate(
            Event::Login {
                username: "root".into(),
            },
            &meta("[2001:db8::1]:2222".parse().ok()),
            "/".into(),
            vec![],
            vec![],
        );
        assert_eq!(doc.source_ip, "[2001:db8::1]");
        assert_eq!(doc.source_port, "2222");
    }
}
