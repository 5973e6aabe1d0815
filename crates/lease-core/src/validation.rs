//! Field validation shared by the core and its transports.
//!
//! Every check returns the normalized value (trimmed strings, lowercased
//! emails) so callers store exactly what was validated.

use crate::core::{CoreError, CoreResult};

pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;
pub const REVIEW_COMMENT_LEN: (usize, usize) = (10, 500);
pub const MESSAGE_CONTENT_LEN: (usize, usize) = (1, 1000);
pub const DISPLAY_NAME_LEN: (usize, usize) = (2, 50);
pub const TITLE_LEN: (usize, usize) = (3, 100);
pub const DESCRIPTION_LEN: (usize, usize) = (10, 2000);
pub const ADDRESS_LEN: (usize, usize) = (5, 200);
pub const ZIP_CODE_LEN: (usize, usize) = (3, 10);
pub const COUNTRY_LEN: (usize, usize) = (2, 50);
pub const LEASE_DURATION_LEN: (usize, usize) = (1, 50);
pub const MAX_PRICE: f64 = 50_000.0;
pub const MAX_BEDROOMS: i64 = 20;
pub const MAX_DISTANCE: f64 = 100.0;
pub const MAX_IMAGES: usize = 10;

fn invalid(field: &'static str, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidInput {
        field,
        reason: reason.into(),
    }
}

/// Trim `value` and check its length in characters against `(min, max)`.
pub fn text(field: &'static str, value: &str, (min, max): (usize, usize)) -> CoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(field, "cannot be empty"));
    }
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(invalid(
            field,
            format!("must be between {min} and {max} characters (got {len})"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Check that a review rating is a whole number of stars in 1..=5.
pub fn rating(value: i64) -> CoreResult<i64> {
    if (RATING_MIN..=RATING_MAX).contains(&value) {
        Ok(value)
    } else {
        Err(invalid(
            "rating",
            format!("must be between {RATING_MIN} and {RATING_MAX} (got {value})"),
        ))
    }
}

pub fn review_comment(value: &str) -> CoreResult<String> {
    text("comment", value, REVIEW_COMMENT_LEN)
}

pub fn message_content(value: &str) -> CoreResult<String> {
    text("content", value, MESSAGE_CONTENT_LEN)
}

pub fn display_name(value: &str) -> CoreResult<String> {
    text("display_name", value, DISPLAY_NAME_LEN)
}

/// Check that `value` is an address on `domain` or one of its subdomains.
///
/// Returns the trimmed, lowercased address.
pub fn institutional_email(value: &str, domain: &str) -> CoreResult<String> {
    let email = value.trim().to_ascii_lowercase();
    let Some((local, host)) = email.split_once('@') else {
        return Err(invalid("email", "must be an email address"));
    };
    if local.is_empty() || host.is_empty() || host.contains('@') || local.contains(' ') {
        return Err(invalid("email", "must be an email address"));
    }

    let domain = domain.trim().to_ascii_lowercase();
    let on_domain = host == domain
        || host
            .strip_suffix(domain.as_str())
            .is_some_and(|sub| sub.ends_with('.') && sub.len() > 1);
    if !on_domain {
        return Err(invalid("email", format!("must be an @{domain} address")));
    }
    Ok(email)
}

fn bounded_f64(field: &'static str, value: f64, max: f64) -> CoreResult<f64> {
    if value.is_finite() && (0.0..=max).contains(&value) {
        Ok(value)
    } else {
        Err(invalid(field, format!("must be a number between 0 and {max}")))
    }
}

pub fn price(value: f64) -> CoreResult<f64> {
    bounded_f64("price", value, MAX_PRICE)
}

pub fn distance(value: f64) -> CoreResult<f64> {
    bounded_f64("distance_from_campus", value, MAX_DISTANCE)
}

pub fn bedrooms(value: i64) -> CoreResult<i64> {
    if (0..=MAX_BEDROOMS).contains(&value) {
        Ok(value)
    } else {
        Err(invalid(
            "bedrooms",
            format!("must be a whole number between 0 and {MAX_BEDROOMS}"),
        ))
    }
}

/// Normalize listing image references: blanks are dropped and only the
/// first ten are kept.
#[must_use]
pub fn images(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|image| image.trim())
        .filter(|image| !image.is_empty())
        .take(MAX_IMAGES)
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;

    #[test]
    fn test_rating_bounds() {
        assert_eq!(rating(1).unwrap(), 1);
        assert_eq!(rating(5).unwrap(), 5);
        assert_eq!(rating(0).unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(rating(6).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_comment_is_trimmed_before_length_check() {
        assert_eq!(
            review_comment("   Decent place overall  ").unwrap(),
            "Decent place overall"
        );
        // 9 visible characters padded with spaces is still too short.
        assert!(review_comment("  too short ").is_err());
        assert!(review_comment("          ").is_err());
        assert!(review_comment(&"x".repeat(501)).is_err());
        assert!(review_comment(&"x".repeat(500)).is_ok());
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // Ten multi-byte characters.
        assert!(review_comment("éééééééééé").is_ok());
    }

    #[test]
    fn test_message_content() {
        assert_eq!(message_content(" hi ").unwrap(), "hi");
        assert!(message_content("   ").is_err());
        assert!(message_content(&"y".repeat(1001)).is_err());
    }

    #[test]
    fn test_institutional_email() {
        assert_eq!(
            institutional_email(" Joe.Bruin@UCLA.edu ", "ucla.edu").unwrap(),
            "joe.bruin@ucla.edu"
        );
        assert!(institutional_email("joe@g.ucla.edu", "ucla.edu").is_ok());
        assert!(institutional_email("joe@notucla.edu", "ucla.edu").is_err());
        assert!(institutional_email("joe@gmail.com", "ucla.edu").is_err());
        assert!(institutional_email("joe.ucla.edu", "ucla.edu").is_err());
        assert!(institutional_email("@ucla.edu", "ucla.edu").is_err());
    }

    #[test]
    fn test_numeric_listing_fields() {
        assert!(price(0.0).is_ok());
        assert!(price(50_000.0).is_ok());
        assert!(price(-1.0).is_err());
        assert!(price(f64::NAN).is_err());
        assert!(bedrooms(21).is_err());
        assert!(distance(0.5).is_ok());
    }

    #[test]
    fn test_images_keep_first_ten_non_blank() {
        let mut input: Vec<String> = (0..12).map(|i| format!("img-{i}.jpg")).collect();
        input.insert(0, "  ".to_string());
        let kept = images(&input);
        assert_eq!(kept.len(), 10);
        assert_eq!(kept[0], "img-0.jpg");
        assert_eq!(kept[9], "img-9.jpg");
    }
}
