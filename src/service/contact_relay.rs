use crate::{
    configuration::{ConfigurationError, EmailSettings, RelayIdentity},
    domain::Submission,
    email_client::{build_message, MailTransport, SendEmailError},
    email_templates::{self, RECEIVED_AT_FORMAT},
};
use chrono::Local;
use lettre::message::Mailbox;
use std::sync::Arc;
use utoipa::ToSchema;

/// Relays contact form submissions to the site owner and back to the
/// submitter.
pub struct ContactRelay {
    settings: EmailSettings,
    transport: Arc<dyn MailTransport>,
}

/// Which of the two emails of a submission made it to the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, ToSchema)]
pub struct DeliveryReport {
    pub notification_sent: bool,
    pub confirmation_sent: bool,
}

impl ContactRelay {
    pub fn new(settings: EmailSettings, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    /// Notify the site owner about `submission`, then confirm receipt to the
    /// submitter.
    ///
    /// Only the notification is required to succeed. A failed confirmation is
    /// logged and reported through [`DeliveryReport::confirmation_sent`].
    #[tracing::instrument(
        name = "Relay contact submission",
        skip(self, submission),
        fields(
            submitter_email = %submission.email(),
            subject = %submission.subject(),
        )
    )]
    pub async fn submit(&self, submission: &Submission) -> Result<DeliveryReport, RelayError> {
        let identity = self.settings.relay_identity()?;

        self.send_notification(&identity, submission)
            .await
            .map_err(RelayError::NotificationSend)?;
        tracing::info!("Notification email has been sent");

        let confirmation_sent = match self.send_confirmation(&identity, submission).await {
            Ok(()) => {
                tracing::info!("Confirmation email has been sent");
                true
            }
            Err(error) => {
                tracing::warn!(
                    error.cause_chain = ?error,
                    "Failed to send confirmation email"
                );
                false
            }
        };

        Ok(DeliveryReport {
            notification_sent: true,
            confirmation_sent,
        })
    }

    #[tracing::instrument(name = "Send notification email", skip_all)]
    async fn send_notification(
        &self,
        identity: &RelayIdentity,
        submission: &Submission,
    ) -> Result<(), SendEmailError> {
        let received_at = Local::now().format(RECEIVED_AT_FORMAT).to_string();
        let email = email_templates::notification(submission, &received_at)?;
        let message = build_message(
            identity.sender.clone(),
            identity.recipient.clone(),
            Some(submitter_mailbox(submission)),
            email,
        )?;

        self.transport.send(message).await
    }

    #[tracing::instrument(name = "Send confirmation email", skip_all)]
    async fn send_confirmation(
        &self,
        identity: &RelayIdentity,
        submission: &Submission,
    ) -> Result<(), SendEmailError> {
        let email = email_templates::confirmation(submission)?;
        let message = build_message(
            identity.sender.clone(),
            submitter_mailbox(submission),
            None,
            email,
        )?;

        self.transport.send(message).await
    }
}

/// The submitter's bare address. Their name never ends up in a header.
fn submitter_mailbox(submission: &Submission) -> Mailbox {
    Mailbox::new(None, submission.email().address().clone())
}

#[derive(thiserror::Error)]
pub enum RelayError {
    #[error("Email configuration is incomplete")]
    Configuration(#[from] ConfigurationError),
    #[error("Failed to send the notification email")]
    NotificationSend(#[source] SendEmailError),
}
