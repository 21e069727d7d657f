use crate::{
    configuration::ConfigurationError,
    domain::Submission,
    email_client::SendEmailError,
    service::contact_relay::{ContactRelay, DeliveryReport, RelayError},
    state::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use utoipa::ToSchema;

pub const SUCCESS_MESSAGE: &str = "Your message has been sent successfully!";
pub const UNEXPECTED_ERROR_MESSAGE: &str =
    "An unexpected error occurred. Please try again later.";

/// Create a router to serve endpoints.
pub fn create_router() -> Router<AppState> {
    Router::new().route("/contact", post(submit_contact_form))
}

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct ContactForm {
    name: String,
    email: String,
    #[serde(default)]
    company: String,
    subject: String,
    message: String,
}

impl TryFrom<ContactForm> for Submission {
    type Error = String;

    fn try_from(value: ContactForm) -> Result<Self, Self::Error> {
        Submission::parse(
            value.name,
            value.email,
            value.company,
            value.subject,
            value.message,
        )
    }
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ContactResponse {
    success: bool,
    message: String,
    details: DeliveryReport,
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ErrorBody {
    detail: String,
}

impl ErrorBody {
    /// Build a JSON error response with the given status.
    pub fn response(status: StatusCode, detail: impl Into<String>) -> Response {
        (
            status,
            Json(Self {
                detail: detail.into(),
            }),
        )
            .into_response()
    }
}

/// Relay a contact form submission to the site owner and confirm it to the
/// submitter.
#[tracing::instrument(
    name = "Handle contact form submission",
    skip(contact_relay, payload)
)]
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactForm,
    responses(
        (status = OK, description = "The owner has been notified", body = ContactResponse),
        (status = UNPROCESSABLE_ENTITY, description = "The submission is invalid", body = ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "The submission could not be relayed", body = ErrorBody),
    )
)]
pub async fn submit_contact_form(
    State(contact_relay): State<Arc<ContactRelay>>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<ContactResponse>, ContactError> {
    let Json(form) = payload?;
    let submission: Submission = form.try_into().map_err(ContactError::Validation)?;

    let details = contact_relay.submit(&submission).await?;

    Ok(Json(ContactResponse {
        success: true,
        message: SUCCESS_MESSAGE.to_string(),
        details,
    }))
}

/// Represent the different possible errors that can happen while handling a
/// submission. The `Display` output is what the caller gets to see.
#[derive(thiserror::Error)]
pub enum ContactError {
    #[error("{}", .0.body_text())]
    InvalidPayload(#[from] JsonRejection),
    #[error("{0}")]
    Validation(String),
    #[error("Email configuration is incomplete. Check your environment variables.")]
    Configuration(#[source] ConfigurationError),
    #[error("Failed to send notification email. Please try again.")]
    NotificationSend(#[source] SendEmailError),
}

impl From<RelayError> for ContactError {
    fn from(value: RelayError) -> Self {
        match value {
            RelayError::Configuration(e) => Self::Configuration(e),
            RelayError::NotificationSend(e) => Self::NotificationSend(e),
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidPayload(rejection) => rejection.status(),
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Configuration(_) | Self::NotificationSend(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error.cause_chain = ?self, "Failed to relay submission");
        } else {
            tracing::info!(error.cause_chain = ?self, "Rejected submission");
        }

        ErrorBody::response(status, self.to_string())
    }
}
