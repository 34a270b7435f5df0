//! External collaborator interfaces.
//!
//! # Responsibilities
//! - Define the narrow seams through which the listener drives the host:
//!   UI automation (`AutomationController`) and credential delivery
//!   (`NotificationSink`)
//! - Provide the channel-backed sink and logging controller used by the
//!   standalone binary
//!
//! # Design Decisions
//! - Trait objects injected into the router; tests swap in doubles
//! - Credential delivery is a channel publish, not a platform broadcast
//! - Collaborator failures surface as 500 at the handler boundary

use thiserror::Error;
use tokio::sync::mpsc;

/// Errors raised by host collaborators.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The host automation capability rejected or failed the request.
    #[error("automation failure: {0}")]
    Automation(String),

    /// The credential consumer has gone away.
    #[error("notification channel closed")]
    SinkClosed,
}

/// Capability for driving the host platform's automation surface.
pub trait AutomationController: Send + Sync {
    /// Bring up the host's accessibility settings UI.
    fn open_settings_ui(&self) -> Result<(), ControlError>;
}

/// Consumer of credential payloads received over `/data`.
pub trait NotificationSink: Send + Sync {
    /// Deliver a received credential to the rest of the application.
    fn publish(&self, password_type: &str, password: &str) -> Result<(), ControlError>;
}

/// A credential payload as delivered to a [`NotificationSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialEvent {
    pub password_type: String,
    pub password: String,
}

/// Channel-backed sink: publishes credential events onto an unbounded
/// mpsc channel whose receiver is handed to the host.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<CredentialEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver the host drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CredentialEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn publish(&self, password_type: &str, password: &str) -> Result<(), ControlError> {
        self.tx
            .send(CredentialEvent {
                password_type: password_type.to_string(),
                password: password.to_string(),
            })
            .map_err(|_| ControlError::SinkClosed)
    }
}

/// Controller that only records the request; stands in for platform
/// automation when the agent runs outside a host integration.
#[derive(Debug, Default)]
pub struct LoggingController;

impl AutomationController for LoggingController {
    fn open_settings_ui(&self) -> Result<(), ControlError> {
        tracing::info!("open settings UI requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_sink_delivers_events() {
        let (sink, mut rx) = ChannelSink::new();
        sink.publish("pin", "1234").unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.password_type, "pin");
        assert_eq!(event.password, "1234");
    }

    #[test]
    fn channel_sink_reports_closed_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        assert!(matches!(
            sink.publish("pin", "1234"),
            Err(ControlError::SinkClosed)
        ));
    }
}
