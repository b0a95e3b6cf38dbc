//! Phone number predicate, backed by libphonenumber metadata.
//!
//! The country field is an ISO 3166-1 alpha-2 code. When it is known it
//! serves as the region for numbers written without a `+` prefix; numbers
//! in international form are checked against their own calling code.

use phonenumber::country;

/// Region hint for the selected country, if it is a known alpha-2 code.
pub fn region(country: &str) -> Option<country::Id> {
    country.trim().to_ascii_uppercase().parse::<country::Id>().ok()
}

/// Whether `phone` is a valid, dialable number.
pub fn is_valid_phone(phone: &str, country: &str) -> bool {
    let phone = phone.trim();
    if phone.is_empty() {
        return false;
    }

    match phonenumber::parse(region(country), phone) {
        Ok(number) => phonenumber::is_valid(&number),
        Err(e) => {
            tracing::debug!(error = ?e, "Unparsable phone number");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_real_numbers() {
        assert!(is_valid_phone("+44 7911 123456", "GB"));
        assert!(is_valid_phone("+1 650 253 0000", "US"));
        assert!(is_valid_phone("+1 (650) 253-0000", "us"));
    }

    #[test]
    fn rejects_impossible_numbers() {
        assert!(!is_valid_phone("+4400000000", "GB"));
        assert!(!is_valid_phone("+1234567", "US"));
        assert!(!is_valid_phone("+15555555", "US"));
        assert!(!is_valid_phone("+999 1234567", "KE"));
        assert!(!is_valid_phone("", "GB"));
    }

    #[test]
    fn national_form_needs_a_known_region() {
        assert!(is_valid_phone("07911 123456", "GB"));
        assert!(!is_valid_phone("07911 123456", ""));
        assert!(!is_valid_phone("07911 123456", "Atlantis"));
    }

    #[test]
    fn region_accepts_alpha2_only() {
        assert_eq!(region(" gb "), Some(country::Id::GB));
        assert_eq!(region("United Kingdom"), None);
    }
}
