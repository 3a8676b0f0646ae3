use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::events::OfferedKey;
use crate::fs::NodeId;

/// Everything remembered about one SSH session: where the fake shell is, and
/// every credential the client offered on the way in.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub cwd: NodeId,
    /// Every password offered, duplicates preserved in attempt order.
    pub passwords: Vec<String>,
    /// Every public key offered.
    pub keys: Vec<OfferedKey>,
}

impl SessionState {
    pub fn new(root: NodeId) -> Self {
        Self {
            cwd: root,
            passwords: Vec::new(),
            keys: Vec::new(),
        }
    }
}

/// Process-wide mapping from session id to state. Auth callbacks and the
/// session handler for one connection run in sequence, but first touches
/// from different connections race on the map itself.
pub struct Registry {
    root: NodeId,
    sessions: Mutex<HashMap<String, SessionState>>,
}

impl Registry {
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` against the session's state, creating it on first touch with
    /// `cwd` at the filesystem root.
    pub async fn with_state<R>(&self, id: &str, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut sessions = self.sessions.lock().await;
        let state = sessions
            .entry(id.to_string())
            .or_insert_with(|| SessionState::new(self.root));
        f(state)
    }

    pub async fn record_password(&self, id: &str, password: &str) {
        self.with_state(id, |state| state.passwords.push(password.to_string()))
            .await;
    }

    pub async fn record_key(&self, id: &str, key: OfferedKey) {
        self.with_state(id, |state| state.keys.push(key)).await;
    }

    pub async fn cwd(&self, id: &str) -> NodeId {
        self.with_state(id, |state| state.cwd).await
    }

    /// Copy of the fields an event document annotates.
    pub async fn snapshot(&self, id: &str) -> (NodeId, Vec<String>, Vec<OfferedKey>) {
        self.with_state(id, |state| {
            (state.cwd, state.passwords.clone(), state.keys.clone())
        })
        .await
    }

    pub async fn remove(&self, id: &str) {
        self.sessions.lock().await.remove(id);
    }

    #[cfg(test)]
    pub async fn contains(&self, id: &str) -> bool {
        self.sessions.lock().await.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_password_attempts_keep_order_and_duplicates() {
        let registry = Registry::new(NodeId(0));
        registry.record_password("s1", "admin").await;
        registry.record_password("s1", "123456").await;
        registry.record_password("s1", "admin").await;

        let (_, passwords, keys) = registry.snapshot("s1").await;
        assert_eq!(passwords, vec!["admin", "123456", "admin"]);
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let registry = Registry::new(NodeId(0));
        registry.record_password("a", "one").await;
        registry.record_password("b", "two").await;

        let (_, a, _) = registry.snapshot("a").await;
        let (_, b, _) = registry.snapshot("b").await;
        assert_eq!(a, vec!["one"]);
        assert_eq!(b, vec!["two"]);
    }

    #[tokio::test]
    async fn test_remove_destroys_state() {
        let registry = Registry::new(NodeId(0));
        registry.record_password("gone", "pw").await;
        registry.remove("gone").await;
        assert!(!registry.contains("gone").await);

        // First touch after removal starts fresh.
        let (_, passwords, _) = registry.snapshot("gone").await;
        assert!(passwords.is_empty());
    }
}
