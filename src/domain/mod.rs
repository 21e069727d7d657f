mod contact_email;
mod required_text;
mod submission;

pub use contact_email::ContactEmail;
pub use required_text::RequiredText;
pub use submission::Submission;
