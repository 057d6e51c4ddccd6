use std::collections::BTreeMap;

use crate::error::ApiError;

/// Collects per-field messages while a request body is checked, then turns
/// them into a single 400 response listing every problem at once.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Required, non-blank text with an optional length cap. Returns the
    /// trimmed value when it passes.
    pub fn required_text(
        &mut self,
        field: &str,
        value: Option<String>,
        missing: &str,
        max_len: Option<usize>,
    ) -> Option<String> {
        match value.map(|v| v.trim().to_string()) {
            Some(v) if !v.is_empty() => self.max_len(field, v, max_len),
            _ => {
                self.add(field, missing);
                None
            }
        }
    }

    /// Optional text: `None` stays `None`, present values must be non-blank.
    pub fn optional_text(
        &mut self,
        field: &str,
        value: Option<String>,
        max_len: Option<usize>,
    ) -> Option<String> {
        let v = value?.trim().to_string();
        if v.is_empty() {
            self.add(field, format!("{} cannot be empty", field));
            return None;
        }
        self.max_len(field, v, max_len)
    }

    fn max_len(&mut self, field: &str, value: String, max_len: Option<usize>) -> Option<String> {
        match max_len {
            Some(max) if value.chars().count() > max => {
                self.add(field, format!("{} can not be more than {} characters", field, max));
                None
            }
            _ => Some(value),
        }
    }

    pub fn email(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let v = value?.trim().to_lowercase();
        if is_email(&v) {
            Some(v)
        } else {
            self.add(field, "Please add a valid email");
            None
        }
    }

    pub fn url(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let v = value?.trim().to_string();
        match url::Url::parse(&v) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Some(v),
            _ => {
                self.add(field, "Please use a valid URL with HTTP or HTTPS");
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let message = self.errors.values().cloned().collect::<Vec<_>>().join(", ");
        Err(ApiError::validation_error(message, Some(self.errors)))
    }
}

pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

/// URL-safe slug: lowercase ascii alphanumerics joined by single dashes.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Devworks Bootcamp"), "devworks-bootcamp");
        assert_eq!(slugify("  ModernTech -- Bootcamp!! "), "moderntech-bootcamp");
        assert_eq!(slugify("UI/UX 101"), "ui-ux-101");
    }

    #[test]
    fn email_shapes() {
        assert!(is_email("john@gmail.com"));
        assert!(!is_email("john@gmail"));
        assert!(!is_email("@gmail.com"));
        assert!(!is_email("jo hn@gmail.com"));
        assert!(!is_email("john@@gmail.com"));
    }

    #[test]
    fn collects_all_problems() {
        let mut errors = FieldErrors::new();
        errors.required_text("name", None, "Please add a name", Some(50));
        errors.required_text("description", Some("x".repeat(501)), "Please add a description", Some(500));
        errors.url("website", Some("ftp://example.com".to_string()));
        let err = errors.finish().unwrap_err();
        match err {
            ApiError::ValidationError { field_errors: Some(fields), message } => {
                assert_eq!(fields.len(), 3);
                assert!(message.contains("Please add a name"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn optional_text_passes_through_absent_values() {
        let mut errors = FieldErrors::new();
        assert_eq!(errors.optional_text("phone", None, Some(20)), None);
        assert_eq!(errors.optional_text("phone", Some(" 555 ".into()), Some(20)), Some("555".into()));
        assert!(errors.finish().is_ok());
    }
}
