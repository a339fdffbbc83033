//! Notification Sink.
//!
//! Transient user-facing messages are fire-and-forget: the controller
//! calls [`Notifier::notify`] and never consumes a return value. The UI
//! embedding the engine supplies the implementation; [`LogNotifier`]
//! routes messages to `tracing` for headless use.

/// Severity of a transient message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
    Warning,
}

/// Sink for transient success/failure messages.
pub trait Notifier: Send + Sync {
    /// Display a transient message. Fire-and-forget.
    fn notify(&self, message: &str, severity: Severity);
}

/// Notifier that logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Success | Severity::Info => tracing::info!(%message, "notification"),
            Severity::Warning => tracing::warn!(%message, "notification"),
            Severity::Error => tracing::error!(%message, "notification"),
        }
    }
}
