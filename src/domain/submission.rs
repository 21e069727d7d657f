use super::{ContactEmail, RequiredText};
use derive_getters::Getters;
use unicode_segmentation::UnicodeSegmentation;

const MAX_NAME_LENGTH: usize = 256;
const MAX_COMPANY_LENGTH: usize = 256;
const MAX_SUBJECT_LENGTH: usize = 256;
const MAX_MESSAGE_LENGTH: usize = 10_000;

/// A validated contact form submission.
///
/// Only lives for the duration of the request that created it.
#[derive(Debug, Clone, Getters)]
pub struct Submission {
    name: RequiredText,
    email: ContactEmail,
    /// Empty when the submitter did not give one.
    company: String,
    subject: RequiredText,
    message: RequiredText,
}

impl Submission {
    pub fn parse(
        name: String,
        email: String,
        company: String,
        subject: String,
        message: String,
    ) -> Result<Self, String> {
        let company = company.trim().to_string();
        if company.graphemes(true).count() > MAX_COMPANY_LENGTH {
            return Err(format!(
                "Company must be at most {MAX_COMPANY_LENGTH} characters long."
            ));
        }

        Ok(Self {
            name: RequiredText::parse("Name", name, MAX_NAME_LENGTH)?,
            email: ContactEmail::parse(email)?,
            company,
            subject: RequiredText::parse("Subject", subject, MAX_SUBJECT_LENGTH)?,
            message: RequiredText::parse("Message", message, MAX_MESSAGE_LENGTH)?,
        })
    }
}
