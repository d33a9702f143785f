//! Input sanitization and validation for untrusted form submissions.
//!
//! Every public function in this crate fails closed: bad input degrades to
//! an empty string or an invalid flag, never a panic or an error return.
//! Callers therefore see oversized or malicious input as "field empty",
//! which downstream validation reports as an ordinary field error.
//!
//! # Security Features
//!
//! - HTML entity encoding for plain-text fields
//! - Tag whitelisting for the rare fields that allow inline formatting
//! - Character whitelist filters for names and phone numbers
//! - Email normalization and format validation
//! - Hard pre-sanitization length cutoff for generic strings

pub mod forms;

/// Hard cutoff applied before any sanitization work is done.
///
/// Input longer than this is rejected outright rather than escaped, so an
/// attacker cannot make the service spend time rewriting megabytes of junk.
pub const MAX_INPUT_CHARS: usize = 2000;

/// Maximum length of a name-like field after filtering.
pub const MAX_NAME_CHARS: usize = 100;

/// Maximum length of a free-text field (message, cover letter).
pub const MAX_MESSAGE_CHARS: usize = 5000;

/// Inline formatting tags preserved when HTML is explicitly allowed.
const ALLOWED_TAGS: [&str; 6] = ["b", "i", "em", "strong", "p", "br"];

/// Escapes HTML entities so the result can never form markup.
///
/// Replaces the reserved characters with their entity equivalents:
/// - `&` -> `&amp;`
/// - `<` -> `&lt;`
/// - `>` -> `&gt;`
/// - `"` -> `&quot;`
/// - `'` -> `&#x27;`
/// - `/` -> `&#x2F;`
/// - `` ` `` -> `&#x60;`
///
/// # Examples
///
/// ```
/// use sanitization::escape_html;
///
/// let input = "<script>alert('xss')</script>";
/// assert_eq!(
///     escape_html(input),
///     "&lt;script&gt;alert(&#x27;xss&#x27;)&lt;&#x2F;script&gt;"
/// );
/// ```
pub fn escape_html(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            '/' => result.push_str("&#x2F;"),
            '`' => result.push_str("&#x60;"),
            _ => result.push(c),
        }
    }
    result
}

/// Strips markup down to the whitelist of inline formatting tags.
///
/// Allowed tags are re-emitted in normalized form with every attribute
/// dropped; disallowed tags disappear entirely while their text content is
/// kept. An unterminated tag swallows the rest of the input, which fails
/// closed for truncated payloads.
fn filter_markup(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('<') {
        result.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let Some(end) = tail.find('>') else {
            return result;
        };
        let inner = tail[..end].trim();
        let closing = inner.starts_with('/');
        let name: String = inner
            .trim_start_matches('/')
            .trim_start()
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();
        if ALLOWED_TAGS.contains(&name.as_str()) {
            if closing {
                result.push_str("</");
            } else {
                result.push('<');
            }
            result.push_str(&name);
            result.push('>');
        }
        rest = &tail[end + 1..];
    }
    result.push_str(rest);
    result
}

/// Sanitizes a generic string field.
///
/// Input longer than [`MAX_INPUT_CHARS`] yields an empty string before any
/// other processing. Surrounding whitespace is trimmed. With
/// `allow_html = false` (the default posture for plain-text fields) every
/// reserved character is entity-escaped; with `allow_html = true` markup is
/// reduced to the fixed whitelist of inline formatting tags and all
/// attributes are removed.
///
/// # Examples
///
/// ```
/// use sanitization::sanitize_string;
///
/// assert_eq!(sanitize_string("  hello  ", false), "hello");
/// assert_eq!(sanitize_string("<b onclick=x>hi</b>", true), "<b>hi</b>");
/// assert_eq!(sanitize_string(&"a".repeat(2001), false), "");
/// ```
pub fn sanitize_string(input: &str, allow_html: bool) -> String {
    if input.chars().count() > MAX_INPUT_CHARS {
        return String::new();
    }

    let trimmed = input.trim();
    if allow_html {
        filter_markup(trimmed)
    } else {
        escape_html(trimmed)
    }
}

/// Result of [`sanitize_email`]: the normalized address plus its validity.
///
/// An invalid address keeps its sanitized text so the caller can decide how
/// to report it; validity is a separate fact, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCheck {
    pub email: String,
    pub is_valid: bool,
}

/// Sanitizes and validates an email address.
///
/// The address is escaped, trimmed, and lower-cased before validation. The
/// grammar check is a practical one rather than full RFC 5322: exactly one
/// `@`, a 1-64 character local part, a dotted domain with non-empty labels
/// and a TLD of at least two characters, 254 characters overall.
///
/// # Examples
///
/// ```
/// use sanitization::sanitize_email;
///
/// let check = sanitize_email("TEST@Example.COM");
/// assert_eq!(check.email, "test@example.com");
/// assert!(check.is_valid);
///
/// assert!(!sanitize_email("not-an-email").is_valid);
/// ```
pub fn sanitize_email(input: &str) -> EmailCheck {
    let email = sanitize_string(input, false).to_lowercase();
    let is_valid = is_valid_email(&email);
    EmailCheck { email, is_valid }
}

fn is_valid_email(candidate: &str) -> bool {
    const MAX_EMAIL_LEN: usize = 254;

    if candidate.is_empty() || candidate.len() > MAX_EMAIL_LEN {
        return false;
    }

    let mut parts = candidate.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() || local.len() > 64 {
        return false;
    }
    if !local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c))
    {
        return false;
    }

    if domain.is_empty() || !domain.contains('.') {
        return false;
    }
    if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || ".-".contains(c))
    {
        return false;
    }
    let mut labels = domain.split('.').peekable();
    let mut last_len = 0;
    while let Some(label) = labels.next() {
        if label.is_empty() {
            return false;
        }
        if labels.peek().is_none() {
            last_len = label.len();
        }
    }

    // TLD must be at least two characters.
    last_len >= 2
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic()
        || ('\u{C0}'..='\u{FF}').contains(&c)
        || c.is_whitespace()
        || matches!(c, '-' | '\'' | '.')
}

/// Sanitizes a name-like field (first name, last name, company name).
///
/// After generic sanitization, every character outside the whitelist of
/// letters (ASCII and Latin-1 supplement), whitespace, hyphens, apostrophes
/// and periods is removed, and the result is capped at [`MAX_NAME_CHARS`].
/// Whitelisting is deliberately stricter than stripping known-bad
/// characters: anything unexpected simply does not survive.
///
/// # Examples
///
/// ```
/// use sanitization::sanitize_name;
///
/// assert_eq!(sanitize_name("John Doe"), "John Doe");
/// assert_eq!(sanitize_name("Renée O-Brien"), "Renée O-Brien");
/// assert_eq!(sanitize_name("Bobby; DROP TABLE--"), "Bobby DROP TABLE--");
/// ```
pub fn sanitize_name(input: &str) -> String {
    let sanitized = sanitize_string(input, false);
    let filtered: String = sanitized.chars().filter(|c| is_name_char(*c)).collect();
    filtered.trim().chars().take(MAX_NAME_CHARS).collect()
}

/// Sanitizes a phone number.
///
/// Keeps digits, whitespace, `+`, `-`, `(` and `)`; everything else is
/// removed. Empty input yields an empty string. No cap is applied beyond
/// what the character set naturally allows.
pub fn sanitize_phone(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '+' | '-' | '(' | ')'))
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Sanitizes a free-text field (message, cover letter).
///
/// HTML is never interpreted here: the text is escaped, then capped at
/// [`MAX_MESSAGE_CHARS`]. Newlines survive so multi-paragraph messages stay
/// readable.
pub fn sanitize_message(input: &str) -> String {
    sanitize_string(input, false)
        .chars()
        .take(MAX_MESSAGE_CHARS)
        .collect()
}
