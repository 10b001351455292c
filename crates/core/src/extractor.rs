//! Password extraction from announcement HTML.
//!
//! The daily code is published inside a rich-text announcement body. Three
//! strategies run in order, most precise first:
//!
//! 1. the styled span the campaign editor uses (orange `rgb(231, 95, 51)`
//!    at `24px`),
//! 2. the first tag content following the "今日资格码" label,
//! 3. any styled span/strong text as a last resort.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::debug;

static STYLED_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<span[^>]*style="([^"]*)"[^>]*>([^<]+)</span>"#)
        .expect("styled span regex")
});

static LABELLED_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"今日资格码[:：\s]*<[^>]*>([^<]+)").expect("labelled code regex")
});

static STYLED_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<(?:span|strong)[^>]*style="([^"]*)"[^>]*>([^<]+)</(?:span|strong)>"#)
        .expect("styled tag regex")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

fn has_target_color(style: &str) -> bool {
    style.contains("rgb(231, 95, 51)") || style.contains("rgb(231,95,51)")
}

/// Extracts the redemption password from announcement HTML.
#[derive(Debug, Default, Clone)]
pub struct PasswordExtractor;

impl PasswordExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Try all strategies in order; `None` when the body does not contain
    /// the code yet.
    pub fn extract(&self, html: &str) -> Option<String> {
        if html.is_empty() {
            return None;
        }

        if let Some(password) = self.by_style(html) {
            debug!("password extracted via styled span");
            return Some(password);
        }
        if let Some(password) = self.by_label(html) {
            debug!("password extracted via label regex");
            return Some(password);
        }
        if let Some(password) = self.by_fallback(html) {
            debug!("password extracted via fallback scan");
            return Some(password);
        }

        None
    }

    /// Strategy 1: span with the exact editor style (target color + 24px).
    fn by_style(&self, html: &str) -> Option<String> {
        for caps in STYLED_SPAN.captures_iter(html) {
            let style = caps.get(1)?.as_str();
            if has_target_color(style) && style.contains("24px") {
                let text = caps.get(2)?.as_str().trim();
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
        }
        None
    }

    /// Strategy 2: first tag content after the "今日资格码" label.
    fn by_label(&self, html: &str) -> Option<String> {
        let flattened = WHITESPACE.replace_all(html, " ");
        let caps = LABELLED_CODE.captures(&flattened)?;
        let text = caps.get(1)?.as_str().trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    /// Strategy 3: first styled span/strong long enough to be a code.
    fn by_fallback(&self, html: &str) -> Option<String> {
        for caps in STYLED_TAG.captures_iter(html) {
            let style = caps.get(1)?.as_str();
            let text = caps.get(2)?.as_str().trim();
            if text.chars().count() > 2
                && (has_target_color(style) || style.contains("font-size: 24px"))
            {
                return Some(text.to_string());
            }
        }
        None
    }
}
