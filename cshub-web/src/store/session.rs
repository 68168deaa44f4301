//! Authoritative session holder
//!
//! One process-wide cell owns the current auth session. Components that
//! care about sign-in state subscribe to the broadcast channel instead of
//! keeping their own copies of "current user" with parallel subscription
//! lifecycles.

use cshub_common::{Error, Result};
use tokio::sync::{broadcast, RwLock};

use super::auth::{AuthUser, Session};

/// Auth state change notification
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(AuthUser),
    SignedOut,
}

/// Shared holder for the current session
pub struct SessionHolder {
    current: RwLock<Option<Session>>,
    event_tx: broadcast::Sender<AuthEvent>,
}

impl SessionHolder {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(16);
        Self {
            current: RwLock::new(None),
            event_tx,
        }
    }

    /// Install a new session and notify subscribers
    pub async fn set(&self, session: Session) {
        let user = session.user.clone();
        *self.current.write().await = Some(session);
        // Ignore send errors (no receivers is OK)
        let _ = self.event_tx.send(AuthEvent::SignedIn(user));
    }

    /// Drop the current session and notify subscribers
    pub async fn clear(&self) {
        let had_session = self.current.write().await.take().is_some();
        if had_session {
            let _ = self.event_tx.send(AuthEvent::SignedOut);
        }
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<AuthUser> {
        self.current.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn access_token(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Signed-in user, or `AuthRequired` for unauthenticated callers
    pub async fn require_user(&self) -> Result<AuthUser> {
        self.current_user().await.ok_or(Error::AuthRequired)
    }

    /// Subscribe to auth state changes
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.event_tx.subscribe()
    }
}

impl Default for SessionHolder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_session() -> Session {
        Session {
            access_token: "token-abc".to_string(),
            refresh_token: None,
            expires_in: Some(3600),
            user: AuthUser {
                id: Uuid::new_v4(),
                email: Some("taro@example.com".to_string()),
            },
        }
    }

    #[tokio::test]
    async fn test_unauthenticated_is_rejected() {
        let holder = SessionHolder::new();
        assert!(matches!(
            holder.require_user().await,
            Err(Error::AuthRequired)
        ));
    }

    #[tokio::test]
    async fn test_set_and_clear() {
        let holder = SessionHolder::new();
        let session = test_session();
        let user_id = session.user.id;

        holder.set(session).await;
        assert_eq!(holder.require_user().await.unwrap().id, user_id);
        assert_eq!(holder.access_token().await.as_deref(), Some("token-abc"));

        holder.clear().await;
        assert!(holder.current().await.is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_sign_in_and_out() {
        let holder = SessionHolder::new();
        let mut rx = holder.subscribe();

        holder.set(test_session()).await;
        holder.clear().await;

        assert!(matches!(rx.recv().await.unwrap(), AuthEvent::SignedIn(_)));
        assert!(matches!(rx.recv().await.unwrap(), AuthEvent::SignedOut));
    }

    #[tokio::test]
    async fn test_clear_without_session_is_silent() {
        let holder = SessionHolder::new();
        let mut rx = holder.subscribe();
        holder.clear().await;
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
