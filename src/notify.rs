use tokio::sync::mpsc;

use crate::error::{ApiError, ErrorKind};

/// Receives every failed gateway call, exactly once per failure.
///
/// Implemented by whatever surfaces messages to the user (toasts, a status
/// line, a log).
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, error: &ApiError);
}

/// Reports failures through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, error: &ApiError) {
        match error.kind() {
            ErrorKind::Unknown => {
                tracing::error!(kind = %error.kind(), message = %error.message(), "API call failed");
            }
            _ => {
                tracing::warn!(kind = %error.kind(), message = %error.message(), "API call failed");
            }
        }
    }
}

/// Forwards failures to a channel drained by the UI layer.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<ApiError>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver the UI drains.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ApiError>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, error: &ApiError) {
        if self.tx.send(error.clone()).is_err() {
            tracing::debug!(message = %error.message(), "Notification receiver dropped");
        }
    }
}
