//! Defaulting for absent backend fields.
//!
//! A missing field and an empty string are the same thing here.

pub(crate) const NOT_AVAILABLE: &str = "N/A";

pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub(crate) fn or_default(value: Option<String>, default: &str) -> String {
    present(value).unwrap_or_else(|| default.to_string())
}

pub(crate) fn or_empty(value: Option<String>) -> String {
    present(value).unwrap_or_default()
}

pub(crate) fn or_na(value: Option<String>) -> String {
    or_default(value, NOT_AVAILABLE)
}

pub(crate) fn amount(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}
