/// Outgoing account emails
///
/// Registration and password reset hand a one-time token to a [`Mailer`].
/// [`LogMailer`] records the message through `tracing` instead of
/// delivering it; a real transport implements the same trait.

use async_trait::async_trait;
use tracing::info;

/// A message ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Email {
    pub fn verification(to: &str, token: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Verify your TaskQuest email".to_string(),
            body: format!(
                "Welcome to TaskQuest!\n\nYour verification code is: {}\n\n\
                 Submit it with your email address to verify your account.",
                token
            ),
        }
    }

    pub fn password_reset(to: &str, token: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Reset your TaskQuest password".to_string(),
            body: format!(
                "Someone asked to reset the password for this account.\n\n\
                 Your reset code is: {}\n\n\
                 If this wasn't you, ignore this email.",
                token
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to send email to {to}: {reason}")]
pub struct MailerError {
    pub to: String,
    pub reason: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailerError>;
}

/// Mailer that writes each message to the log
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailerError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.body,
            "Outgoing email"
        );
        Ok(())
    }
}
