use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use payloads::ClientError;

/// Fallback shown when a load fails without a usable server message.
pub const LOAD_ERROR_MESSAGE: &str = "Erreur lors du chargement des données";

/// User-visible notification sink shared by every grid of a screen.
///
/// Implementations queue messages; callers may notify from several grids at
/// once.
pub trait Notifier {
    fn show_error(&self, message: &str);

    fn show_success(&self, _message: &str) {}

    fn show_warning(&self, _message: &str) {}
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn show_error(&self, _message: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

/// Queues notifications on an unbounded channel, in the order they were
/// raised.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded();
        (Self { sender }, receiver)
    }

    fn push(&self, level: Level, message: &str) {
        let notification = Notification {
            level,
            message: message.to_owned(),
        };
        if self.sender.unbounded_send(notification).is_err() {
            tracing::debug!("Notification dropped, receiver is gone: {message}");
        }
    }
}

impl Notifier for ChannelNotifier {
    fn show_error(&self, message: &str) {
        self.push(Level::Error, message);
    }

    fn show_success(&self, message: &str) {
        self.push(Level::Success, message);
    }

    fn show_warning(&self, message: &str) {
        self.push(Level::Warning, message);
    }
}

/// Message to show for a failed load: the server's own message when it sent
/// one, otherwise the generic fallback.
pub fn failure_message(error: &ClientError) -> String {
    match error {
        ClientError::APIError(_, body) | ClientError::Validation(_, body) => {
            body.message().unwrap_or(LOAD_ERROR_MESSAGE).to_owned()
        }
        ClientError::Unauthorized
        | ClientError::Timeout
        | ClientError::Network(_)
        | ClientError::Cancelled => LOAD_ERROR_MESSAGE.to_owned(),
    }
}
