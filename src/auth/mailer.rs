/**
 * Verification Mailer
 *
 * Delivery of the email-verification link. `SmtpMailer` sends real mail
 * when SMTP is configured; `LogMailer` is the fallback that logs the
 * confirmation link instead, which keeps local development and tests free
 * of mail infrastructure.
 */

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::AuthError;
use crate::server::config::SmtpConfig;

#[async_trait]
pub trait VerificationMailer: Send + Sync {
    async fn send(&self, to: &str, link: &str) -> Result<(), AuthError>;
}

/// Logs the confirmation link at `info` instead of sending mail.
pub struct LogMailer;

#[async_trait]
impl VerificationMailer for LogMailer {
    async fn send(&self, to: &str, link: &str) -> Result<(), AuthError> {
        tracing::info!("verification link for {}: {}", to, link);
        Ok(())
    }
}

/// Sends the confirmation link over authenticated async SMTP.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, AuthError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| AuthError::SendFailed(e.to_string()))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| AuthError::SendFailed(format!("invalid SMTP_FROM: {}", e)))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl VerificationMailer for SmtpMailer {
    async fn send(&self, to: &str, link: &str) -> Result<(), AuthError> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|e| AuthError::SendFailed(e.to_string()))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Verify your email address")
            .body(format!(
                "Welcome! Confirm your email address by opening this link:\n\n{}\n",
                link
            ))
            .map_err(|e| AuthError::SendFailed(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AuthError::SendFailed(e.to_string()))?;
        Ok(())
    }
}
