use regex::Regex;
use std::sync::LazyLock;

static BANGLA_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{0980}-\u{09FF}]").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Bangla,
    English,
}

/// Classifies text by script. Any Bangla code point wins; everything else,
/// including empty input, is English.
pub fn detect(text: &str) -> Locale {
    if BANGLA_BLOCK.is_match(text) {
        Locale::Bangla
    } else {
        Locale::English
    }
}

impl Locale {
    pub fn error_notice(&self, reason: &str) -> String {
        match self {
            Locale::Bangla => format!("❌ একটি ত্রুটি ঘটেছে!\nকারণ: {}", reason),
            Locale::English => format!("❌ An error occurred!\nReason: {}", reason),
        }
    }
}
