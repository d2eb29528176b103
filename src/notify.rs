use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::TelegramConfig;

/// Bound on a single outbound send so a slow channel cannot hold a request
/// or the dispatcher open indefinitely.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(10);

const QUEUE_DEPTH: usize = 256;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("channel transport failed: {0}")]
    Transport(String),

    #[error("channel rejected the message: {0}")]
    Rejected(String),

    #[error("send timed out")]
    Timeout,
}

/// A templated outbound message. The configured channel decides how each
/// variant is delivered; callers only name the audience.
#[derive(Debug, Clone)]
pub enum Notification {
    AdminAlert {
        subject: String,
        body: String,
    },
    Customer {
        email: String,
        subject: String,
        body: String,
    },
    Chat {
        text: String,
    },
}

impl Notification {
    pub fn render_text(&self) -> String {
        match self {
            Notification::AdminAlert { subject, body } => format!("[admin] {subject}\n{body}"),
            Notification::Customer {
                email,
                subject,
                body,
            } => format!("[to {email}] {subject}\n{body}"),
            Notification::Chat { text } => text.clone(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, note: &Notification) -> Result<(), NotifyError>;
}

/// Fallback channel when no external one is configured: delivery is a log
/// line and always succeeds.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, note: &Notification) -> Result<(), NotifyError> {
        tracing::info!(notification = %note.render_text(), "notification (log channel)");
        Ok(())
    }
}

pub struct TelegramNotifier {
    http: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, note: &Notification) -> Result<(), NotifyError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let resp = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": self.chat_id,
                "text": note.render_text(),
            }))
            .send()
            .await
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        if !resp.status().is_success() {
            return Err(NotifyError::Rejected(resp.status().to_string()));
        }
        Ok(())
    }
}

/// Cloneable handle services use to emit notifications. `enqueue` is
/// fire-and-forget through the dispatcher queue; `deliver` awaits the channel
/// directly for flows whose outcome gates the HTTP response.
#[derive(Clone)]
pub struct NotifyHandle {
    tx: mpsc::Sender<Notification>,
    channel: Arc<dyn Notifier>,
}

impl NotifyHandle {
    pub fn enqueue(&self, note: Notification) {
        if let Err(err) = self.tx.try_send(note) {
            tracing::warn!(error = %err, "notification queue unavailable, dropping message");
        }
    }

    pub async fn deliver(&self, note: &Notification) -> Result<(), NotifyError> {
        match tokio::time::timeout(SEND_TIMEOUT, self.channel.send(note)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout),
        }
    }
}

/// Spawn the dispatcher task draining the queue. Failures are logged, never
/// retried, and never reach the request that queued the message.
pub fn spawn_dispatcher(channel: Arc<dyn Notifier>) -> NotifyHandle {
    let (tx, mut rx) = mpsc::channel::<Notification>(QUEUE_DEPTH);
    let handle = NotifyHandle {
        tx,
        channel: Arc::clone(&channel),
    };

    tokio::spawn(async move {
        while let Some(note) = rx.recv().await {
            match tokio::time::timeout(SEND_TIMEOUT, channel.send(&note)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => tracing::warn!(error = %err, "notification delivery failed"),
                Err(_) => tracing::warn!("notification delivery timed out"),
            }
        }
        tracing::debug!("notification dispatcher stopped");
    });

    handle
}
