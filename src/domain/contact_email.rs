use lettre::Address;
use std::fmt::Display;
use validator::validate_email;

/// Represents a valid email address of someone submitting the contact form.
#[derive(Debug, Clone)]
pub struct ContactEmail(Address);

impl ContactEmail {
    pub fn parse(s: String) -> Result<Self, String> {
        let invalid = || format!("{s} is not a valid email address.");

        if !validate_email(&s) {
            return Err(invalid());
        }
        // The SMTP layer has its own, slightly stricter, notion of an address.
        s.parse::<Address>().map(Self).map_err(|_| invalid())
    }

    pub fn address(&self) -> &Address {
        &self.0
    }
}

impl Display for ContactEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ContactEmail {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}
