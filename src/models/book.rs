//! Book editions
//!
//! Books travel as multipart forms because of the cover image, so the
//! payload is checked on the form itself.

use crate::backend::FormPayload;

pub const COVER_FIELD: &str = "coverImage";

const REQUIRED_FIELDS: [(&str, &str); 3] = [
    ("title", "Title is required"),
    ("isbn", "ISBN is required"),
    ("categoryId", "Category is required"),
];

/// First missing required field and its message
pub fn missing_field(form: &FormPayload) -> Option<(&'static str, &'static str)> {
    REQUIRED_FIELDS
        .iter()
        .find(|(name, _)| form.text_value(name).map_or(true, |value| value.trim().is_empty()))
        .copied()
}

/// ISBN-10 or ISBN-13, hyphens and spaces ignored
pub fn is_valid_isbn(raw: &str) -> bool {
    let digits: Vec<char> = raw.chars().filter(|c| !matches!(c, '-' | ' ')).collect();
    match digits.len() {
        10 => {
            let sum = digits.iter().enumerate().try_fold(0u32, |acc, (i, c)| {
                let value = match (i, *c) {
                    (9, 'X') | (9, 'x') => 10,
                    _ => c.to_digit(10)?,
                };
                Some(acc + value * (10 - i as u32))
            });
            sum.is_some_and(|sum| sum % 11 == 0)
        }
        13 => {
            let sum = digits.iter().enumerate().try_fold(0u32, |acc, (i, c)| {
                let weight = if i % 2 == 0 { 1 } else { 3 };
                Some(acc + c.to_digit(10)? * weight)
            });
            sum.is_some_and(|sum| sum % 10 == 0)
        }
        _ => false,
    }
}
