//! Global reaction to rejected credentials.
//!
//! Listens to the session's events; when the backend invalidates the
//! credential, tells the user once and sends them back to the login entry.

use crate::notice::Notice;
use jifeng_networking::{Session, SessionEvent};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Screens of the client apps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Exchange,
    Records,
    AdminProducts,
    AdminExchanges,
}

/// What the guard did with an invalidation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardAction {
    Redirected,
    AlreadyAtLogin,
}

pub struct SessionGuard {
    session: Arc<Session>,
    route: watch::Sender<Route>,
    notices: mpsc::UnboundedSender<Notice>,
}

impl SessionGuard {
    /// Returns the guard and the receiving end of its notice sink
    pub fn new(session: Arc<Session>, initial: Route) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (route, _) = watch::channel(initial);
        let (notices, rx) = mpsc::unbounded_channel();
        (
            Self {
                session,
                route,
                notices,
            },
            rx,
        )
    }

    pub fn route(&self) -> Route {
        *self.route.borrow()
    }

    pub fn navigate(&self, route: Route) {
        self.route.send_replace(route);
    }

    pub fn subscribe_route(&self) -> watch::Receiver<Route> {
        self.route.subscribe()
    }

    /// Notify and redirect to login.
    ///
    /// The session stays disarmed until the next login, so later rejections
    /// of the same stale credential raise nothing.
    pub fn handle_invalidated(&self, message: &str) -> GuardAction {
        let detail = if message.trim().is_empty() {
            "Your session has expired. Please log in again.".to_string()
        } else {
            message.to_string()
        };
        let _ = self.notices.send(Notice::warning("Signed out", detail));

        let action = if self.route() == Route::Login {
            GuardAction::AlreadyAtLogin
        } else {
            info!("Session invalidated, redirecting to login");
            self.navigate(Route::Login);
            GuardAction::Redirected
        };

        action
    }

    /// Run the guard until `cancel` fires or the session is dropped
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let mut events = self.session.subscribe();

        tokio::spawn(async move {
            loop {
                // Events already queued are handled before a cancel
                let event = tokio::select! {
                    biased;
                    event = events.recv() => event,
                    _ = cancel.cancelled() => break,
                };

                match event {
                    Ok(SessionEvent::Invalidated { message }) => {
                        self.handle_invalidated(&message);
                    }
                    Ok(other) => debug!("Session event: {:?}", other),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Session guard lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("Session guard stopped");
        })
    }
}
