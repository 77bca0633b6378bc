use crate::error::{Result, MangaBatchError};

/// Backend code used when the source language should be detected
pub const AUTO_DETECT: &str = "auto";

const LANGUAGE_CODES: &[(&str, &str)] = &[
    ("CHS", "zh-CN"),
    ("CHT", "zh-TW"),
    ("CSY", "cs"),
    ("NLD", "nl"),
    ("ENG", "en"),
    ("FRA", "fr"),
    ("DEU", "de"),
    ("HUN", "hu"),
    ("ITA", "it"),
    ("JPN", "ja"),
    ("KOR", "ko"),
    ("PLK", "pl"),
    ("PTB", "pt"),
    ("ROM", "ro"),
    ("RUS", "ru"),
    ("ESP", "es"),
    ("TRK", "tr"),
    ("UKR", "uk"),
    ("VIN", "vi"),
    ("CNR", "sr-ME"),
    ("SRP", "sr"),
    ("HRV", "hr"),
    ("ARA", "ar"),
    ("THA", "th"),
    ("IND", "id"),
];

/// Supported `(tag, backend code)` pairs
pub fn supported_languages() -> &'static [(&'static str, &'static str)] {
    LANGUAGE_CODES
}

/// Map a language tag such as `JPN` to the backend's code
pub fn backend_code(tag: &str) -> Result<&'static str> {
    let tag = tag.trim();
    LANGUAGE_CODES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(tag))
        .map(|(_, code)| *code)
        .ok_or_else(|| MangaBatchError::UnsupportedLanguage(tag.to_string()))
}

/// Like [`backend_code`], but also accepts `auto`
pub fn source_code(tag: &str) -> Result<&'static str> {
    if tag.trim().eq_ignore_ascii_case(AUTO_DETECT) {
        return Ok(AUTO_DETECT);
    }
    backend_code(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags() {
        assert_eq!(backend_code("CHS").unwrap(), "zh-CN");
        assert_eq!(backend_code("cht").unwrap(), "zh-TW");
        assert_eq!(backend_code(" FRA ").unwrap(), "fr");
        assert_eq!(backend_code("CNR").unwrap(), "sr-ME");
        assert_eq!(supported_languages().len(), 25);
    }

    #[test]
    fn test_unknown_tag() {
        assert!(matches!(backend_code("KLI"), Err(MangaBatchError::UnsupportedLanguage(t)) if t == "KLI"));
    }

    #[test]
    fn test_auto_only_for_source() {
        assert_eq!(source_code("auto").unwrap(), AUTO_DETECT);
        assert_eq!(source_code("JPN").unwrap(), "ja");
        assert!(backend_code("auto").is_err());
    }
}
