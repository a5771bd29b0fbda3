use crate::error::Error;
use crate::storage::KeyValueStorage;
use crate::types::{AuthToken, Session, User};

/// Storage key holding the raw bearer token.
pub const TOKEN_KEY: &str = "auth_token";
/// Storage key holding the JSON-serialized user profile.
pub const USER_KEY: &str = "user";

/// Single source of truth for the persisted session.
///
/// Token and profile are written and cleared together. [`read`](Self::read)
/// never returns a session it cannot fully reconstruct: a lone key, an
/// unparsable profile or a failing substrate all read as "no session" and
/// wipe both keys.
pub struct CredentialStore {
    storage: Box<dyn KeyValueStorage>,
}

impl CredentialStore {
    #[must_use]
    pub fn new(storage: impl KeyValueStorage) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// Load the stored session, self-healing on partial or corrupt data.
    #[must_use]
    pub fn read(&self) -> Option<Session> {
        match self.try_read() {
            Ok(session) => session,
            Err(reason) => {
                tracing::warn!(reason = %reason, "Stored session unusable; clearing credentials");
                if let Err(e) = self.clear() {
                    tracing::warn!(error = %e, "Failed to clear unusable credentials");
                }
                None
            }
        }
    }

    fn try_read(&self) -> Result<Option<Session>, String> {
        let token = self.storage.get(TOKEN_KEY).map_err(|e| e.to_string())?;
        let user = self.storage.get(USER_KEY).map_err(|e| e.to_string())?;

        match (token.filter(|t| !t.is_empty()), user) {
            (None, None) => Ok(None),
            (Some(token), Some(raw_user)) => {
                let user: User = serde_json::from_str(&raw_user)
                    .map_err(|e| format!("corrupt user profile: {e}"))?;
                Ok(Some(Session::new(AuthToken::new(token), user)))
            }
            (Some(_), None) => Err("token stored without user profile".into()),
            (None, Some(_)) => Err("user profile stored without token".into()),
        }
    }

    /// The stored token, if a full session is present.
    #[must_use]
    pub fn token(&self) -> Option<AuthToken> {
        self.read().map(|s| s.into_parts().0)
    }

    /// Persist both halves of `session`, replacing whatever was stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] or [`Error::Json`] if either write fails. In
    /// that case both keys are cleared so no half session remains.
    pub fn write(&self, session: &Session) -> Result<(), Error> {
        let user_json = serde_json::to_string(session.user())?;
        let result = self
            .storage
            .set(TOKEN_KEY, session.token().as_str())
            .and_then(|()| self.storage.set(USER_KEY, &user_json));

        if let Err(e) = result {
            // best-effort rollback
            let _ = self.clear();
            return Err(e);
        }
        Ok(())
    }

    /// Delete both keys. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns the first substrate error; the second key is still attempted.
    pub fn clear(&self) -> Result<(), Error> {
        let token = self.storage.remove(TOKEN_KEY);
        let user = self.storage.remove(USER_KEY);
        token.and(user)
    }
}
