#![doc = include_str!("../README.md")]

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod request;
pub mod session;
pub mod storage;
pub mod store;
pub mod transport;
pub mod types;

// Re-exports for convenient access
pub use classify::{classify, error_message};
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult, Error, ErrorKind};
pub use gateway::Gateway;
pub use notify::{ChannelNotifier, Notifier, TracingNotifier};
pub use request::{CallDescriptor, EndpointCategory, Method, PreparedRequest, build_request};
pub use session::{
    GuardDecision, RouteGuard, SessionController, SessionEvent, SessionState, SignOutReason,
};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::CredentialStore;
#[cfg(feature = "http")]
pub use transport::ReqwestTransport;
pub use transport::{RawResponse, Transport, TransportError};
pub use types::{AuthToken, ConversationId, Session, TaskId, User, UserId};
