use std::fmt::Display;
use unicode_segmentation::UnicodeSegmentation;

/// A piece of user supplied text that must contain something other than
/// whitespace and stay within a length limit.
///
/// The limit is counted in graphemes, as some characters are perceived as a
/// single character but are composed of several code points.
#[derive(Debug, Clone)]
pub struct RequiredText(String);

impl RequiredText {
    /// Returns an instance of `RequiredText` if `s` is not blank and at most
    /// `max_graphemes` long. `field` is only used in the error message.
    pub fn parse(field: &str, s: String, max_graphemes: usize) -> Result<Self, String> {
        if s.trim().is_empty() {
            Err(format!("{field} must not be empty."))
        } else if s.graphemes(true).count() > max_graphemes {
            Err(format!(
                "{field} must be at most {max_graphemes} characters long."
            ))
        } else {
            Ok(Self(s))
        }
    }
}

impl Display for RequiredText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RequiredText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
