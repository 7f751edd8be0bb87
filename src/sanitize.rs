//! Text sanitization for form-sourced fields.
//!
//! Input is reduced to a safe subset (ASCII printable, common whitespace and
//! Latin extended letters) before storage so downstream encoding never fails.

use crate::error::StoreError;

fn is_safe(c: char) -> bool {
    if matches!(c, '\n' | '\r' | '\t') {
        return true;
    }
    if c.is_control() {
        return false;
    }
    c.is_ascii() || ('\u{00A0}'..='\u{024F}').contains(&c)
}

/// Strips characters outside the safe subset. Never errors on its own; use
/// [`sanitize_required`] for fields that must survive sanitization.
pub fn sanitize(input: &str) -> String {
    input.chars().filter(|c| is_safe(*c)).collect::<String>().trim().to_string()
}

pub fn sanitize_optional(input: Option<&str>) -> Option<String> {
    input.map(sanitize).filter(|s| !s.is_empty())
}

/// A required field that is empty is a validation failure; one that becomes
/// empty only after sanitization is an encoding failure.
pub fn sanitize_required(field: &'static str, input: &str) -> Result<String, StoreError> {
    let cleaned = sanitize(input);
    if !cleaned.is_empty() {
        return Ok(cleaned);
    }
    if input.trim().is_empty() {
        Err(StoreError::Validation(format!("{field} is required")))
    } else {
        Err(StoreError::Encoding(format!(
            "{field} contains no storable characters"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_latin_and_whitespace() {
        assert_eq!(sanitize("Pisang Cavendish segar"), "Pisang Cavendish segar");
        assert_eq!(sanitize("café résumé"), "café résumé");
        assert_eq!(sanitize("line1\nline2"), "line1\nline2");
    }

    #[test]
    fn test_strips_unsafe_characters() {
        assert_eq!(sanitize("abc\u{0000}def"), "abcdef");
        assert_eq!(sanitize("harga 🍌 murah"), "harga  murah");
    }

    #[test]
    fn test_required_field_errors() {
        assert!(matches!(
            sanitize_required("name", "   "),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            sanitize_required("name", "🍌🍌"),
            Err(StoreError::Encoding(_))
        ));
        assert_eq!(sanitize_required("name", " ok ").unwrap(), "ok");
    }
}
