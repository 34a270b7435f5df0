//! Route lookup and dispatch.
//!
//! Four recognized routes plus a 404 default:
//!
//! | Path          | Auth | Behavior                                        |
//! |---------------|------|-------------------------------------------------|
//! | `/set-secret` | no   | Store a non-blank pairing secret                |
//! | `/data`       | yes  | Forward credentials to the notification sink    |
//! | `/command`    | yes  | Dispatch a named automation action              |
//! | anything else | n/a  | 404                                             |
//!
//! `/set-secret` is deliberately unauthenticated: it is the first-use
//! pairing bootstrap, and overwriting an existing secret is allowed at
//! any time.

use std::sync::Arc;

use crate::auth::{AuthOutcome, Authenticator};
use crate::control::{AutomationController, NotificationSink};
use crate::http::request::Payload;
use crate::http::response::Response;
use crate::store::{SecretStore, SECRET_KEY};

/// Dispatches validated requests to the agent's operations.
pub struct Router {
    store: Arc<dyn SecretStore>,
    auth: Authenticator,
    controller: Arc<dyn AutomationController>,
    sink: Arc<dyn NotificationSink>,
}

impl Router {
    pub fn new(
        store: Arc<dyn SecretStore>,
        controller: Arc<dyn AutomationController>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let auth = Authenticator::new(Arc::clone(&store));
        Self {
            store,
            auth,
            controller,
            sink,
        }
    }

    /// Dispatch a decoded request to its operation.
    ///
    /// The caller has already handled method rejection and JSON decoding,
    /// so every failure from here on is an operation-level response.
    pub fn dispatch(&self, path: &str, payload: &Payload) -> Response {
        match path {
            "/set-secret" => self.set_secret(payload),
            "/data" => self.authorized(payload, |router| router.receive_data(payload)),
            "/command" => self.authorized(payload, |router| router.run_command(payload)),
            _ => {
                tracing::debug!(path, "no matching endpoint");
                Response::not_found("Endpoint not found.")
            }
        }
    }

    /// Run `operation` only if the payload carries the stored secret.
    fn authorized(&self, payload: &Payload, operation: impl FnOnce(&Self) -> Response) -> Response {
        match self.auth.authorize(payload) {
            AuthOutcome::NotConfigured => {
                tracing::warn!("rejecting request: no secret configured");
                Response::forbidden("Secret key not configured on device.")
            }
            AuthOutcome::Unauthorized => {
                tracing::warn!("rejecting request: invalid secret key");
                Response::unauthorized("Invalid secret key.")
            }
            AuthOutcome::Authorized => operation(self),
        }
    }

    fn set_secret(&self, payload: &Payload) -> Response {
        if payload.secret_key.trim().is_empty() {
            tracing::warn!("attempted to set an empty secret key");
            return Response::bad_request("Secret key cannot be empty.");
        }

        self.store.set(SECRET_KEY, &payload.secret_key);
        tracing::info!("secret key set");
        Response::ok("Secret key set.")
    }

    fn receive_data(&self, payload: &Payload) -> Response {
        tracing::info!(password_type = %payload.password_type, "credential payload received");

        match self.sink.publish(&payload.password_type, &payload.password) {
            Ok(()) => Response::ok("Password data received."),
            Err(err) => {
                tracing::error!(error = %err, "failed to deliver credential payload");
                Response::internal_error(format!("Server error: {err}"))
            }
        }
    }

    fn run_command(&self, payload: &Payload) -> Response {
        tracing::info!(action = %payload.action, "command received");

        match payload.action.as_str() {
            // Dialog taps are driven by the host's accessibility events;
            // the command only needs acknowledging here.
            "triggerAdbDialogTap" => Response::ok("ADB dialog tap command acknowledged."),
            "openAccessibilitySettings" => match self.controller.open_settings_ui() {
                Ok(()) => Response::ok("Opened Accessibility Settings."),
                Err(err) => {
                    tracing::error!(error = %err, "failed to open settings UI");
                    Response::internal_error(format!("Server error: {err}"))
                }
            },
            other => {
                tracing::warn!(action = %other, "unknown command action");
                Response::bad_request("Unknown command action.")
            }
        }
    }
}
