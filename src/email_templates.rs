//! Fixed email bodies sent for every submission.
//!
//! Templates live in `templates/`. The HTML ones are escaped by askama, so
//! submitted text can never inject markup into the emails.

use crate::domain::Submission;
use askama::Template;

pub const NOTIFICATION_SUBJECT_PREFIX: &str = "🔔 New Contact Form: ";
pub const CONFIRMATION_SUBJECT: &str = "✅ Thanks for reaching out!";

/// Format used for the time a submission was received, e.g.
/// `October 18, 2026 at 02:05 PM`.
pub const RECEIVED_AT_FORMAT: &str = "%B %d, %Y at %I:%M %p";

/// A rendered email, ready to be put into a message.
#[derive(Debug)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Template)]
#[template(path = "notification.html")]
struct NotificationHtml<'a> {
    submission: &'a Submission,
    received_at: &'a str,
}

#[derive(Template)]
#[template(path = "notification.txt")]
struct NotificationText<'a> {
    submission: &'a Submission,
    received_at: &'a str,
}

#[derive(Template)]
#[template(path = "confirmation.html")]
struct ConfirmationHtml<'a> {
    submission: &'a Submission,
}

#[derive(Template)]
#[template(path = "confirmation.txt")]
struct ConfirmationText<'a> {
    submission: &'a Submission,
}

/// Render the email telling the site owner about a new submission.
pub fn notification(
    submission: &Submission,
    received_at: &str,
) -> Result<RenderedEmail, askama::Error> {
    Ok(RenderedEmail {
        subject: format!("{NOTIFICATION_SUBJECT_PREFIX}{}", submission.subject()),
        html: NotificationHtml {
            submission,
            received_at,
        }
        .render()?,
        text: NotificationText {
            submission,
            received_at,
        }
        .render()?,
    })
}

/// Render the email acknowledging a submission to whoever sent it.
pub fn confirmation(submission: &Submission) -> Result<RenderedEmail, askama::Error> {
    Ok(RenderedEmail {
        subject: CONFIRMATION_SUBJECT.to_string(),
        html: ConfirmationHtml { submission }.render()?,
        text: ConfirmationText { submission }.render()?,
    })
}
