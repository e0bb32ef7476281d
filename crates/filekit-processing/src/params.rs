//! Typed access to free-form form fields.
//!
//! Every value a handler passes to a library goes through one of these
//! accessors. Missing or unparsable values fall back to the default and
//! out-of-range numbers are clamped, so a handler never sees a value outside
//! its documented range.

use std::collections::HashMap;

const MAX_TEXT_LEN: usize = 200;

#[derive(Debug, Clone, Default)]
pub struct ToolParams(HashMap<String, String>);

impl ToolParams {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self(fields)
    }

    fn raw(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn int(&self, name: &str, default: i64, min: i64, max: i64) -> i64 {
        match self.raw(name).and_then(|v| v.parse::<i64>().ok()) {
            Some(v) => v.clamp(min, max),
            None => default,
        }
    }

    pub fn float(&self, name: &str, default: f64, min: f64, max: f64) -> f64 {
        match self
            .raw(name)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
        {
            Some(v) => v.clamp(min, max),
            None => default,
        }
    }

    /// Like [`ToolParams::float`] but `None` when the field is absent.
    pub fn opt_float(&self, name: &str, min: f64, max: f64) -> Option<f64> {
        self.raw(name)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(min, max))
    }

    /// Case-insensitive pick from `allowed`; always returns a member of `allowed`
    /// (or `default`).
    pub fn choice(&self, name: &str, allowed: &[&'static str], default: &'static str) -> &'static str {
        self.raw(name)
            .and_then(|v| allowed.iter().find(|a| a.eq_ignore_ascii_case(v)).copied())
            .unwrap_or(default)
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(
            self.raw(name).map(|v| v.to_ascii_lowercase()).as_deref(),
            Some("true" | "on" | "1" | "yes")
        )
    }

    pub fn text(&self, name: &str, default: &str) -> String {
        match self.raw(name) {
            Some(v) => v.chars().take(MAX_TEXT_LEN).collect(),
            None => default.to_string(),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.raw(name).is_some()
    }
}

impl From<HashMap<String, String>> for ToolParams {
    fn from(fields: HashMap<String, String>) -> Self {
        Self(fields)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ToolParams {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_clamps_to_range() {
        let params = ToolParams::from([("width", "999999"), ("height", "-4")]);
        assert_eq!(params.int("width", 100, 10, 5000), 5000);
        assert_eq!(params.int("height", 100, 10, 5000), 10);
    }

    #[test]
    fn test_unparsable_and_missing_fall_back_to_default() {
        let params = ToolParams::from([("quality", "best"), ("angle", "  ")]);
        assert_eq!(params.int("quality", 85, 10, 100), 85);
        assert_eq!(params.int("angle", 90, -360, 360), 90);
        assert_eq!(params.float("radius", 2.0, 0.1, 50.0), 2.0);
    }

    #[test]
    fn test_float_rejects_non_finite() {
        let params = ToolParams::from([("opacity", "NaN"), ("speed_factor", "inf")]);
        assert_eq!(params.float("opacity", 0.5, 0.0, 1.0), 0.5);
        assert_eq!(params.float("speed_factor", 1.0, 0.5, 2.0), 1.0);
    }

    #[test]
    fn test_choice_is_case_insensitive_with_default() {
        let params = ToolParams::from([("format", "WEBP"), ("direction", "diagonal")]);
        assert_eq!(params.choice("format", &["jpeg", "png", "webp"], "jpeg"), "webp");
        assert_eq!(
            params.choice("direction", &["horizontal", "vertical"], "horizontal"),
            "horizontal"
        );
    }

    #[test]
    fn test_flag_and_text() {
        let params = ToolParams::from([("maintainAspect", "on"), ("watermark_text", "  DRAFT ")]);
        assert!(params.flag("maintainAspect"));
        assert!(!params.flag("missing"));
        assert_eq!(params.text("watermark_text", "CONFIDENTIAL"), "DRAFT");
        assert_eq!(params.text("other", "CONFIDENTIAL"), "CONFIDENTIAL");
    }

    #[test]
    fn test_opt_float() {
        let params = ToolParams::from([("duration", "90")]);
        assert_eq!(params.opt_float("duration", 0.1, 60.0), Some(60.0));
        assert_eq!(params.opt_float("start", 0.0, 60.0), None);
    }
}
