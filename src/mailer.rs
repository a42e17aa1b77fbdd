use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::config::SmtpConfig;

/// Outbound notification channel. Failures are the caller's to log;
/// nothing here retries.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .port(config.port)
            .build();
        Ok(Self {
            transport,
            from: config.username.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let email = Message::builder()
            .from(format!("Global Wellness <{}>", self.from).parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        self.transport.send(email).await?;
        info!(to = %to, "email sent");
        Ok(())
    }
}

/// Plain-text body for the password-reset email.
pub fn reset_email_body(frontend_url: &str, token: &str) -> String {
    let reset_link = format!("{}/reset_password?token={}", frontend_url, token);
    format!(
        "Hi,\n\n\
        We received a request to reset your password.\n\
        Click the link below to reset it:\n\n\
        {}\n\n\
        If you didn't request this, you can ignore this email.\n\n\
        Best,\n\
        Global Wellness Team",
        reset_link
    )
}

#[cfg(test)]
pub use test_support::{RecordingMailer, SentEmail};
