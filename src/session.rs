//! Session controller: the `Anonymous` / `Authenticated` state machine.
//!
//! One controller is built at startup and shared (`Arc`) with everything
//! that needs the session. Consumers observe it through a
//! [`watch`](tokio::sync::watch) channel for the current state and a
//! [`broadcast`](tokio::sync::broadcast) channel for transition events.

use tokio::sync::{broadcast, watch};

use crate::error::Error;
use crate::store::CredentialStore;
use crate::types::{AuthToken, Session, UserId};

const EVENT_CAPACITY: usize = 16;

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Stored credentials have not been read yet. Protected UI must not
    /// render and no protected call should fire.
    Loading,
    Anonymous,
    Authenticated(Session),
}

impl SessionState {
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            Self::Loading | Self::Anonymous => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    UserRequested,
    Expired,
}

/// Transition notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(UserId),
    /// "You have been signed out."
    SignedOut(SignOutReason),
    /// Navigate to the sign-in entry point.
    RedirectToSignIn,
}

/// Owns the credential store and publishes session state.
pub struct SessionController {
    store: CredentialStore,
    state: watch::Sender<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    /// Create a controller in the [`SessionState::Loading`] phase.
    ///
    /// Call [`restore`](Self::restore) to load persisted credentials.
    #[must_use]
    pub fn new(store: CredentialStore) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            state,
            events,
        }
    }

    /// Read persisted credentials and leave the loading phase.
    pub fn restore(&self) -> SessionState {
        let next = match self.store.read() {
            Some(session) => {
                tracing::info!(user_id = %session.user_id(), "Restored stored session");
                SessionState::Authenticated(session)
            }
            None => SessionState::Anonymous,
        };
        self.state.send_replace(next.clone());
        next
    }

    /// Current state snapshot.
    #[must_use]
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Current session, if authenticated.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    /// Session currently held by the credential store.
    ///
    /// Read from storage rather than the published state, so it is accurate
    /// during [`SessionState::Loading`] too.
    #[must_use]
    pub fn stored(&self) -> Option<Session> {
        self.store.read()
    }

    /// Token currently held by the credential store.
    #[must_use]
    pub fn token(&self) -> Option<AuthToken> {
        self.store.token()
    }

    /// Subscribe to state changes. The receiver sees the current value first.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Subscribe to transition events emitted after this call.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// `Anonymous -> Authenticated` after a successful sign-in or sign-up.
    ///
    /// # Errors
    ///
    /// Returns the credential store error if persisting fails. The store
    /// clears both keys on a failed write, so any previous session is gone
    /// and the published state drops to [`SessionState::Anonymous`].
    pub fn login(&self, session: Session) -> Result<(), Error> {
        if let Err(e) = self.store.write(&session) {
            tracing::warn!(error = %e, "Failed to persist session");
            let mut was_authenticated = false;
            self.state.send_if_modified(|state| {
                was_authenticated = state.is_authenticated();
                let changed = !matches!(state, SessionState::Anonymous);
                *state = SessionState::Anonymous;
                changed
            });
            if was_authenticated {
                self.emit(SessionEvent::SignedOut(SignOutReason::Expired));
            }
            return Err(e);
        }
        let user_id = session.user_id().clone();
        tracing::info!(user_id = %user_id, "Signed in");
        self.state.send_replace(SessionState::Authenticated(session));
        self.emit(SessionEvent::SignedIn(user_id));
        Ok(())
    }

    /// Explicit sign-out.
    pub fn logout(&self) {
        self.end(SignOutReason::UserRequested);
    }

    /// Forced sign-out after a [`SessionExpired`](crate::ErrorKind::SessionExpired) result.
    pub fn expire(&self) {
        self.end(SignOutReason::Expired);
    }

    fn end(&self, reason: SignOutReason) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear stored credentials");
        }
        tracing::info!(?reason, "Signed out");
        self.state.send_replace(SessionState::Anonymous);
        self.emit(SessionEvent::SignedOut(reason));
        self.emit(SessionEvent::RedirectToSignIn);
    }

    fn emit(&self, event: SessionEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}

/// What a protected view should do for a given session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Still loading: show a placeholder, fire nothing.
    Wait,
    Render,
    RedirectToSignIn,
}

/// Route guard for protected views.
pub struct RouteGuard;

impl RouteGuard {
    #[must_use]
    pub fn decide(state: &SessionState) -> GuardDecision {
        match state {
            SessionState::Loading => GuardDecision::Wait,
            SessionState::Anonymous => GuardDecision::RedirectToSignIn,
            SessionState::Authenticated(_) => GuardDecision::Render,
        }
    }
}
