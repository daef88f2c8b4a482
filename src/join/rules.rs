//! Answer validation for the join conversation.
//!
//! The email check is a coarse syntactic filter, not address validation.

use crate::core::config::join::{CITIES, SCHOOLS};

/// Case-insensitive "yes".
pub fn is_yes(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("yes")
}

/// Case-insensitive "no".
pub fn is_no(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("no")
}

/// Free-text answers are accepted unless they are blank.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Longer than four characters and contains both `@` and `.`.
pub fn is_plausible_email(text: &str) -> bool {
    text.trim().chars().count() > 4 && text.contains('@') && text.contains('.')
}

/// One of the quick-reply cities, in any letter case.
pub fn is_listed_city(text: &str) -> bool {
    let city = text.trim().to_lowercase();
    CITIES.contains(&city.as_str())
}

/// Returns the upper-cased school code when `text` names a known school.
pub fn school_code(text: &str) -> Option<String> {
    let school = text.trim().to_lowercase();
    SCHOOLS
        .contains(&school.as_str())
        .then(|| school.to_uppercase())
}
