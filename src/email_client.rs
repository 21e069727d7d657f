//! Delivery of messages to the mail relay.
//!
//! [`MailTransport`] is the seam between the contact relay and the network.
//! [`SmtpRelay`] is the real implementation, tests provide their own.

use crate::{configuration::EmailSettings, email_templates::RenderedEmail};
use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver a single message.
    async fn send(&self, message: Message) -> Result<(), SendEmailError>;
}

/// Sends messages through an authenticated SMTP relay.
///
/// A new connection is opened for every message.
#[derive(Debug)]
pub struct SmtpRelay {
    host: String,
    port: u16,
    use_tls: bool,
    username: Option<String>,
    password: Option<Secret<String>>,
    timeout: Duration,
}

impl SmtpRelay {
    pub fn new(settings: &EmailSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            use_tls: settings.use_tls,
            username: settings.username.clone(),
            password: settings
                .password
                .as_ref()
                .map(|p| Secret::new(p.expose_secret().clone())),
            timeout: settings.timeout(),
        }
    }

    fn transport(
        &self,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, lettre::transport::smtp::Error> {
        let mut builder = if self.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
        }
        .port(self.port)
        .timeout(Some(self.timeout));

        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.expose_secret().clone(),
            ));
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl MailTransport for SmtpRelay {
    #[tracing::instrument(
        name = "Send email through SMTP relay",
        skip(self, message),
        fields(relay = %self.host)
    )]
    async fn send(&self, message: Message) -> Result<(), SendEmailError> {
        let transport = self
            .transport()
            .map_err(|e| SendEmailError::Transport(e.into()))?;
        // lettre's own timeout only covers connecting, not a relay that
        // accepts the connection and then stays silent.
        let response = tokio::time::timeout(self.timeout, transport.send(message))
            .await
            .map_err(|_| {
                SendEmailError::Transport(anyhow::anyhow!(
                    "Mail relay did not answer within {:?}",
                    self.timeout
                ))
            })?
            .map_err(|e| SendEmailError::Transport(e.into()))?;
        tracing::debug!("Relay accepted message with code {}", response.code());

        Ok(())
    }
}

/// Assemble a `multipart/alternative` message with a plain text and an HTML
/// part.
pub fn build_message(
    from: Mailbox,
    to: Mailbox,
    reply_to: Option<Mailbox>,
    email: RenderedEmail,
) -> Result<Message, SendEmailError> {
    let mut builder = Message::builder().from(from).to(to);
    if let Some(reply_to) = reply_to {
        builder = builder.reply_to(reply_to);
    }

    Ok(builder
        .subject(email.subject)
        .multipart(MultiPart::alternative_plain_html(email.text, email.html))?)
}

#[derive(thiserror::Error)]
pub enum SendEmailError {
    #[error("Failed to render the email body")]
    Render(#[from] askama::Error),
    #[error("Failed to build the email message")]
    Build(#[from] lettre::error::Error),
    #[error("The mail relay did not accept the message")]
    Transport(#[source] anyhow::Error),
}
