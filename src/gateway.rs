use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use url::Url;

use crate::classify::classify;
use crate::error::{AUTH_REQUIRED_MESSAGE, ApiError, ApiResult, ErrorKind};
use crate::notify::{Notifier, TracingNotifier};
use crate::request::{CallDescriptor, Method, build_request};
use crate::session::SessionController;
use crate::transport::Transport;
use crate::types::{Session, UserId};

const UNEXPECTED_FORMAT_MESSAGE: &str = "Unexpected response format";

/// The single entry point for calls to the service.
///
/// Every call goes request builder -> transport -> classifier. A
/// `SessionExpired` outcome signs the user out before the error is returned,
/// and every failure is reported to the [`Notifier`] once, whether or not
/// the caller looks at it. No call is retried.
pub struct Gateway<T> {
    base_url: Url,
    transport: T,
    session: Arc<SessionController>,
    notifier: Arc<dyn Notifier>,
}

impl<T: Transport> Gateway<T> {
    /// Create a gateway reporting failures through [`TracingNotifier`].
    #[must_use]
    pub fn new(base_url: Url, transport: T, session: Arc<SessionController>) -> Self {
        Self {
            base_url,
            transport,
            session,
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Route failure notifications elsewhere (e.g. a UI channel).
    #[must_use]
    pub fn with_notifier(mut self, notifier: impl Notifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// The shared session controller.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionController> {
        &self.session
    }

    /// Base URL every endpoint is joined onto.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Perform one call and return the raw JSON payload.
    pub async fn call(&self, descriptor: CallDescriptor) -> ApiResult<JsonValue> {
        self.dispatch(&descriptor).await.map_err(|e| self.report(e))
    }

    /// Perform one call and decode the payload into `R`.
    ///
    /// A payload that does not fit `R` is an [`ErrorKind::Unknown`] failure.
    pub async fn call_as<R: DeserializeOwned>(&self, descriptor: CallDescriptor) -> ApiResult<R> {
        self.dispatch(&descriptor)
            .await
            .and_then(|payload| decode(descriptor.endpoint(), payload))
            .map_err(|e| self.report(e))
    }

    /// `GET endpoint`, decoded into `R`.
    pub async fn get<R: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<R> {
        self.call_as(CallDescriptor::new(Method::GET, endpoint)).await
    }

    /// `POST endpoint` with a JSON body, decoded into `R`.
    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<R> {
        let descriptor = self.with_body(Method::POST, endpoint, body)?;
        self.call_as(descriptor).await
    }

    /// `PUT endpoint` with a JSON body, decoded into `R`.
    pub async fn put<B: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<R> {
        let descriptor = self.with_body(Method::PUT, endpoint, body)?;
        self.call_as(descriptor).await
    }

    /// `PATCH endpoint` with a JSON body, decoded into `R`.
    pub async fn patch<B: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<R> {
        let descriptor = self.with_body(Method::PATCH, endpoint, body)?;
        self.call_as(descriptor).await
    }

    /// `DELETE endpoint`, decoded into `R` (`()` or `JsonValue` for an empty reply).
    pub async fn delete<R: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<R> {
        self.call_as(CallDescriptor::new(Method::DELETE, endpoint)).await
    }

    /// Persist a freshly issued session (`Anonymous -> Authenticated`).
    pub(crate) fn establish(&self, session: Session) -> ApiResult<()> {
        self.session.login(session).map_err(|e| {
            self.report(ApiError::new(
                ErrorKind::Unknown,
                format!("Could not save session: {e}"),
            ))
        })
    }

    /// The signed-in user's id, for user-scoped endpoints.
    ///
    /// Fails with `AuthRejected` without touching the network when no session
    /// is stored.
    pub(crate) fn require_user(&self) -> ApiResult<UserId> {
        self.session
            .stored()
            .map(|s| s.user_id().clone())
            .ok_or_else(|| self.report(ApiError::new(ErrorKind::AuthRejected, AUTH_REQUIRED_MESSAGE)))
    }

    fn with_body<B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<CallDescriptor> {
        let body = serde_json::to_value(body).map_err(|e| {
            self.report(ApiError::new(
                ErrorKind::Unknown,
                format!("Invalid request body: {e}"),
            ))
        })?;
        Ok(CallDescriptor::new(method, endpoint).with_body(body))
    }

    async fn dispatch(&self, descriptor: &CallDescriptor) -> ApiResult<JsonValue> {
        // captured before the await; a concurrent call may change it meanwhile
        let token = self.session.token();
        let request = build_request(&self.base_url, descriptor, token.as_ref())
            .map_err(|e| ApiError::new(ErrorKind::Unknown, e.to_string()))?;
        let category = request.category;
        let had_token = request.had_token;

        tracing::debug!(
            method = %request.method,
            endpoint = %descriptor.endpoint(),
            ?category,
            bearer = had_token,
            "Dispatching API call"
        );

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(endpoint = %descriptor.endpoint(), error = %e, "No response");
                return Err(ApiError::transport());
            }
        };

        let body = (!response.body.is_empty()).then_some(response.body.as_slice());
        let result = classify(category, response.status, body, had_token);

        if matches!(&result, Err(e) if e.is_session_expired()) {
            self.session.expire();
        }
        result
    }

    fn report(&self, error: ApiError) -> ApiError {
        self.notifier.notify(&error);
        error
    }
}

fn decode<R: DeserializeOwned>(endpoint: &str, payload: JsonValue) -> ApiResult<R> {
    serde_json::from_value(payload).map_err(|e| {
        tracing::debug!(endpoint, error = %e, "Response did not match expected shape");
        ApiError::new(ErrorKind::Unknown, UNEXPECTED_FORMAT_MESSAGE)
    })
}

#[cfg(feature = "http")]
mod from_config {
    use std::sync::Arc;

    use super::Gateway;
    use crate::config::ClientConfig;
    use crate::error::Error;
    use crate::session::SessionController;
    use crate::storage::{FileStorage, MemoryStorage};
    use crate::store::CredentialStore;
    use crate::transport::ReqwestTransport;

    impl Gateway<ReqwestTransport> {
        /// Wire a reqwest-backed gateway from configuration.
        ///
        /// The session starts in [`Loading`](crate::SessionState::Loading);
        /// call `gateway.session().restore()` once the app is ready.
        ///
        /// # Errors
        ///
        /// Returns [`Error::Http`] if the HTTP client cannot be built.
        pub fn from_config(config: &ClientConfig) -> Result<Self, Error> {
            let store = match config.storage_path() {
                Some(path) => CredentialStore::new(FileStorage::new(path)),
                None => CredentialStore::new(MemoryStorage::new()),
            };
            let transport = ReqwestTransport::build(config.user_agent(), config.timeout())?;
            Ok(Self::new(
                config.base_url().clone(),
                transport,
                Arc::new(SessionController::new(store)),
            ))
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::request::PreparedRequest;
    use crate::storage::MemoryStorage;
    use crate::store::CredentialStore;
    use crate::transport::{RawResponse, TransportError};

    /// Transport replaying canned replies and recording what was sent.
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedTransport {
        replies: Arc<Mutex<VecDeque<Result<RawResponse, String>>>>,
        pub(crate) sent: Arc<Mutex<Vec<PreparedRequest>>>,
    }

    impl ScriptedTransport {
        pub(crate) fn reply(&self, status: u16, body: &str) -> &Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Ok(RawResponse::new(status, body.as_bytes())));
            self
        }

        pub(crate) fn fail(&self) -> &Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Err("connection refused".into()));
            self
        }

        pub(crate) fn sent(&self) -> Vec<PreparedRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
            self.sent.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted request")
                .map_err(TransportError)
        }
    }

    #[derive(Clone, Default)]
    pub(crate) struct RecordingNotifier(pub(crate) Arc<Mutex<Vec<ApiError>>>);

    impl RecordingNotifier {
        pub(crate) fn seen(&self) -> Vec<ApiError> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, error: &ApiError) {
            self.0.lock().unwrap().push(error.clone());
        }
    }

    pub(crate) fn gateway() -> (Gateway<ScriptedTransport>, ScriptedTransport, RecordingNotifier) {
        let transport = ScriptedTransport::default();
        let notifier = RecordingNotifier::default();
        let session = Arc::new(SessionController::new(CredentialStore::new(
            MemoryStorage::new(),
        )));
        session.restore();
        let gateway = Gateway::new(
            "https://api.example.com".parse().unwrap(),
            transport.clone(),
            session,
        )
        .with_notifier(notifier.clone());
        (gateway, transport, notifier)
    }
}
