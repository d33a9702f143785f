//! Per-form validation contracts for the public submission endpoints.
//!
//! Each contract sanitizes every field first and then measures the
//! *sanitized* value against the business rules, collecting all failures
//! instead of stopping at the first one. An oversized message sanitizes to
//! the empty string and correctly fails the "required" check even though
//! the raw input looked substantial.

use serde::{Deserialize, Serialize};

use crate::{sanitize_email, sanitize_message, sanitize_name, sanitize_phone};

/// Minimum length of a contact-form message, measured after sanitization.
pub const MIN_MESSAGE_CHARS: usize = 10;

/// Minimum length of a job-application cover letter, measured after
/// sanitization.
pub const MIN_COVER_LETTER_CHARS: usize = 50;

/// Raw contact-form fields as received from the client. Missing fields
/// deserialize to empty strings rather than failing the request, so they
/// surface as ordinary "required" validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: String,
    pub message: String,
}

/// Raw job-application fields as received from the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobApplicationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub cover_letter: String,
}

/// Sanitized contact-form payload, safe to embed in emails or dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: String,
    pub message: String,
}

/// Sanitized job-application payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedApplication {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub cover_letter: String,
}

/// Outcome of running a form contract: the sanitized payload plus every
/// human-readable rule violation. The payload is always populated — an
/// invalid submission still carries its cleaned fields so the caller can
/// log or echo them safely.
#[derive(Debug, Clone)]
pub struct ValidationOutcome<T> {
    pub payload: T,
    pub errors: Vec<String>,
}

impl<T> ValidationOutcome<T> {
    /// True exactly when no rule failed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates a contact-form submission.
///
/// Required fields: first name, last name, email, company, message. The
/// message must be at least [`MIN_MESSAGE_CHARS`] characters once
/// sanitized; an empty message reports only the "required" error.
pub fn validate_contact_form(form: &ContactForm) -> ValidationOutcome<SanitizedContact> {
    let mut errors = Vec::new();

    let first_name = sanitize_name(&form.first_name);
    let last_name = sanitize_name(&form.last_name);
    let company = sanitize_name(&form.company);
    let message = sanitize_message(&form.message);
    let email = sanitize_email(&form.email);

    if first_name.is_empty() {
        errors.push("First name is required".to_owned());
    }
    if last_name.is_empty() {
        errors.push("Last name is required".to_owned());
    }
    if !email.is_valid {
        errors.push("Valid email is required".to_owned());
    }
    if company.is_empty() {
        errors.push("Company is required".to_owned());
    }
    if message.is_empty() {
        errors.push("Message is required".to_owned());
    } else if message.chars().count() < MIN_MESSAGE_CHARS {
        errors.push(format!(
            "Message must be at least {MIN_MESSAGE_CHARS} characters long"
        ));
    }

    ValidationOutcome {
        payload: SanitizedContact {
            first_name,
            last_name,
            email: email.email,
            company,
            message,
        },
        errors,
    }
}

/// Validates a job-application submission.
///
/// Required fields: first name, last name, email, cover letter. The phone
/// number is optional — it is sanitized but never produces an error.
pub fn validate_job_application(
    form: &JobApplicationForm,
) -> ValidationOutcome<SanitizedApplication> {
    let mut errors = Vec::new();

    let first_name = sanitize_name(&form.first_name);
    let last_name = sanitize_name(&form.last_name);
    let phone = sanitize_phone(&form.phone);
    let cover_letter = sanitize_message(&form.cover_letter);
    let email = sanitize_email(&form.email);

    if first_name.is_empty() {
        errors.push("First name is required".to_owned());
    }
    if last_name.is_empty() {
        errors.push("Last name is required".to_owned());
    }
    if !email.is_valid {
        errors.push("Valid email is required".to_owned());
    }
    if cover_letter.is_empty() {
        errors.push("Cover letter is required".to_owned());
    } else if cover_letter.chars().count() < MIN_COVER_LETTER_CHARS {
        errors.push(format!(
            "Cover letter must be at least {MIN_COVER_LETTER_CHARS} characters long"
        ));
    }

    ValidationOutcome {
        payload: SanitizedApplication {
            first_name,
            last_name,
            email: email.email,
            phone,
            cover_letter,
        },
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_contact() -> ContactForm {
        ContactForm {
            first_name: "John".to_owned(),
            last_name: "Doe".to_owned(),
            email: "john@x.com".to_owned(),
            company: "Acme".to_owned(),
            message: "Hello there, this is long enough.".to_owned(),
        }
    }

    fn valid_application() -> JobApplicationForm {
        JobApplicationForm {
            first_name: "Jane".to_owned(),
            last_name: "Roe".to_owned(),
            email: "jane@example.org".to_owned(),
            phone: "+49 89 1234567".to_owned(),
            cover_letter: "I have spent the last decade engineering bacteriophages \
                           and would love to join the team."
                .to_owned(),
        }
    }

    // === contact form ===

    #[test]
    fn test_contact_valid_submission() {
        let outcome = validate_contact_form(&valid_contact());
        assert!(outcome.is_valid());
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.payload.first_name, "John");
        assert_eq!(outcome.payload.email, "john@x.com");
    }

    #[test]
    fn test_contact_all_fields_empty_yields_five_errors() {
        let outcome = validate_contact_form(&ContactForm::default());
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors.len(), 5);
        assert!(outcome.errors.contains(&"First name is required".to_owned()));
        assert!(outcome.errors.contains(&"Last name is required".to_owned()));
        assert!(outcome.errors.contains(&"Valid email is required".to_owned()));
        assert!(outcome.errors.contains(&"Company is required".to_owned()));
        assert!(outcome.errors.contains(&"Message is required".to_owned()));
    }

    #[test]
    fn test_contact_short_message_reports_only_length_error() {
        let mut form = valid_contact();
        form.message = "too short".to_owned(); // 9 characters
        let outcome = validate_contact_form(&form);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("at least 10 characters"));
    }

    #[test]
    fn test_contact_markup_message_is_escaped_but_measured_after() {
        let mut form = valid_contact();
        form.message = "<script>alert(document.cookie)</script>".to_owned();
        let outcome = validate_contact_form(&form);
        assert!(outcome.is_valid());
        assert!(!outcome.payload.message.contains('<'));
        assert!(outcome.payload.message.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_contact_oversized_message_reports_required() {
        let mut form = valid_contact();
        // Past the generic cutoff the whole field collapses to empty, which
        // surfaces as the ordinary "required" error.
        form.message = "a".repeat(2001);
        let outcome = validate_contact_form(&form);
        assert_eq!(outcome.errors, vec!["Message is required".to_owned()]);
    }

    #[test]
    fn test_contact_invalid_email_keeps_other_fields() {
        let mut form = valid_contact();
        form.email = "nope".to_owned();
        let outcome = validate_contact_form(&form);
        assert_eq!(outcome.errors, vec!["Valid email is required".to_owned()]);
        assert_eq!(outcome.payload.email, "nope");
        assert_eq!(outcome.payload.company, "Acme");
    }

    #[test]
    fn test_contact_email_is_normalized() {
        let mut form = valid_contact();
        form.email = "  John@X.COM ".to_owned();
        let outcome = validate_contact_form(&form);
        assert!(outcome.is_valid());
        assert_eq!(outcome.payload.email, "john@x.com");
    }

    #[test]
    fn test_contact_name_injection_is_neutralized() {
        let mut form = valid_contact();
        form.first_name = "John<script>alert(1)</script>".to_owned();
        let outcome = validate_contact_form(&form);
        assert!(outcome.is_valid());
        assert!(!outcome.payload.first_name.contains('<'));
        assert!(!outcome.payload.first_name.contains('>'));
    }

    #[test]
    fn test_contact_missing_fields_deserialize_to_empty() {
        let form: ContactForm =
            serde_json::from_str(r#"{"firstName":"John","email":"john@x.com"}"#).unwrap();
        assert_eq!(form.last_name, "");
        assert_eq!(form.company, "");
        let outcome = validate_contact_form(&form);
        assert!(!outcome.is_valid());
    }

    // === job application form ===

    #[test]
    fn test_application_valid_submission() {
        let outcome = validate_job_application(&valid_application());
        assert!(outcome.is_valid(), "errors: {:?}", outcome.errors);
        assert_eq!(outcome.payload.phone, "+49 89 1234567");
    }

    #[test]
    fn test_application_phone_is_optional() {
        let mut form = valid_application();
        form.phone = String::new();
        let outcome = validate_job_application(&form);
        assert!(outcome.is_valid());
        assert_eq!(outcome.payload.phone, "");
    }

    #[test]
    fn test_application_phone_letters_are_stripped_without_error() {
        let mut form = valid_application();
        form.phone = "call me at 555-0100".to_owned();
        let outcome = validate_job_application(&form);
        assert!(outcome.is_valid());
        assert_eq!(outcome.payload.phone, "555-0100");
    }

    #[test]
    fn test_application_cover_letter_minimum() {
        let mut form = valid_application();
        form.cover_letter = "I am interested.".to_owned();
        let outcome = validate_job_application(&form);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("at least 50 characters"));
    }

    #[test]
    fn test_application_empty_cover_letter_reports_required_only() {
        let mut form = valid_application();
        form.cover_letter = "   ".to_owned();
        let outcome = validate_job_application(&form);
        assert_eq!(outcome.errors, vec!["Cover letter is required".to_owned()]);
    }

    #[test]
    fn test_application_all_empty() {
        let outcome = validate_job_application(&JobApplicationForm::default());
        assert!(!outcome.is_valid());
        // first name, last name, email, cover letter — phone never errors.
        assert_eq!(outcome.errors.len(), 4);
    }
}
