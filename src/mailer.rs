use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

#[derive(Debug, Clone)]
pub struct Message {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound email. Only password reset mails are sent today.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: Message) -> Result<(), MailError>;
}

/// Writes messages to the log instead of delivering them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: Message) -> Result<(), MailError> {
        tracing::info!(to = %message.to, subject = %message.subject, body = %message.body, "Outbound email");
        Ok(())
    }
}

pub fn reset_password_message(to: &str, reset_url: &str) -> Message {
    Message {
        to: to.to_string(),
        subject: "Password reset token".to_string(),
        body: format!(
            "You are receiving this email because you (or someone else) has requested the reset of a password. \
             Please make a PUT request to: \n\n {}",
            reset_url
        ),
    }
}
