use config::{Config, Environment, File, FileFormat};
use lettre::{address::AddressError, message::Mailbox};
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::{deserialize_bool_from_anything, deserialize_number_from_string};
use std::time::Duration;

/// Retrieve the configuration for the application.
///
/// Sources are layered: built-in defaults, an optional `configuration.yaml`,
/// `APP_`-prefixed environment variables (`APP_EMAIL__PASSWORD`) and finally
/// the plain `EMAIL_*`/`RECIPIENT_EMAIL` variables.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8000)?
        .set_default(
            "application.allowed_origins",
            vec!["http://localhost:5173", "http://127.0.0.1:3000"],
        )?
        .set_default("email.host", "smtp.gmail.com")?
        .set_default("email.port", 587)?
        .set_default("email.use_tls", true)?
        .set_default("email.timeout_milliseconds", 15_000)?
        .add_source(File::new("configuration.yaml", FileFormat::Yaml).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("application.allowed_origins")
                .try_parsing(true),
        )
        .set_override_option("email.host", std::env::var("EMAIL_HOST").ok())?
        .set_override_option("email.port", std::env::var("EMAIL_PORT").ok())?
        .set_override_option("email.username", std::env::var("EMAIL_USER").ok())?
        .set_override_option("email.password", std::env::var("EMAIL_PASSWORD").ok())?
        .set_override_option("email.recipient", std::env::var("RECIPIENT_EMAIL").ok())?
        .build()?
        .try_deserialize()
}

#[derive(Debug, serde::Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email: EmailSettings,
}

#[derive(Debug, serde::Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    /// Origins allowed to call the API from a browser.
    pub allowed_origins: Vec<String>,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings for the SMTP relay used to deliver both emails of a submission.
///
/// Credentials and the recipient are optional here so that the server can
/// start without them; they are checked on every submission instead.
#[derive(Debug, serde::Deserialize)]
pub struct EmailSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    #[serde(deserialize_with = "deserialize_bool_from_anything")]
    pub use_tls: bool,
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
    /// `From` address. Falls back to `username` when not set.
    pub sender: Option<String>,
    /// Where notifications about new submissions are sent.
    pub recipient: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

/// The addresses every submission is relayed between.
#[derive(Debug, Clone)]
pub struct RelayIdentity {
    pub sender: Mailbox,
    pub recipient: Mailbox,
}

impl EmailSettings {
    /// Check that everything needed to relay a submission is configured.
    pub fn relay_identity(&self) -> Result<RelayIdentity, ConfigurationError> {
        let username =
            non_empty(self.username.as_deref()).ok_or(ConfigurationError::MissingUsername)?;
        // Passwords are taken verbatim, surrounding whitespace may be part of them.
        self.password
            .as_ref()
            .filter(|p| !p.expose_secret().is_empty())
            .ok_or(ConfigurationError::MissingPassword)?;
        let recipient =
            non_empty(self.recipient.as_deref()).ok_or(ConfigurationError::MissingRecipient)?;
        let sender = non_empty(self.sender.as_deref()).unwrap_or(username);

        Ok(RelayIdentity {
            sender: sender
                .parse()
                .map_err(|e| ConfigurationError::InvalidAddress("sender", e))?,
            recipient: recipient
                .parse()
                .map_err(|e| ConfigurationError::InvalidAddress("recipient", e))?,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(thiserror::Error)]
pub enum ConfigurationError {
    #[error("Mail relay username is not configured")]
    MissingUsername,
    #[error("Mail relay password is not configured")]
    MissingPassword,
    #[error("Notification recipient is not configured")]
    MissingRecipient,
    #[error("The configured {0} address is invalid")]
    InvalidAddress(&'static str, #[source] AddressError),
}
