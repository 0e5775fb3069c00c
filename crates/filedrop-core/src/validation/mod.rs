//! Validation of client-supplied upload parameters

use regex::Regex;
use std::sync::LazyLock;

pub const MAX_FILE_NAME_LENGTH: usize = 255;
pub const MAX_CONTENT_TYPE_LENGTH: usize = 100;

/// Word characters, hyphen, plus, dot and slash. ASCII only.
static CONTENT_TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_\-+./]+$").expect("content type pattern is a valid regex")
});

/// Validate a display file name.
///
/// Must be present, non-empty, at most 255 characters and free of path separators.
pub fn validate_file_name(file_name: Option<&str>) -> Result<&str, String> {
    let file_name = file_name.ok_or_else(|| "fileName is required".to_string())?;

    if file_name.is_empty() {
        return Err("fileName must not be empty".to_string());
    }
    if file_name.chars().count() > MAX_FILE_NAME_LENGTH {
        return Err(format!(
            "fileName must be at most {} characters",
            MAX_FILE_NAME_LENGTH
        ));
    }
    if file_name.contains('/') || file_name.contains('\\') {
        return Err("fileName must not contain path separators".to_string());
    }

    Ok(file_name)
}

/// Validate a declared MIME type against the restrictive token grammar.
pub fn validate_content_type(content_type: Option<&str>) -> Result<&str, String> {
    let content_type = content_type.ok_or_else(|| "contentType is required".to_string())?;

    if content_type.len() > MAX_CONTENT_TYPE_LENGTH {
        return Err(format!(
            "contentType must be at most {} characters",
            MAX_CONTENT_TYPE_LENGTH
        ));
    }
    if !CONTENT_TYPE_PATTERN.is_match(content_type) {
        return Err("contentType contains invalid characters".to_string());
    }

    Ok(content_type)
}

/// Validate a file identifier taken from a request path.
pub fn validate_file_id(file_id: &str) -> Result<&str, String> {
    if file_id.trim().is_empty() {
        return Err("fileId must not be empty".to_string());
    }
    Ok(file_id)
}

/// Plain SQL identifier: letter or underscore first, then alphanumerics or underscores.
/// Postgres truncates identifiers past 63 bytes.
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_rules() {
        assert_eq!(validate_file_name(Some("report.pdf")), Ok("report.pdf"));
        assert_eq!(
            validate_file_name(Some("my holiday photo (1).jpg")),
            Ok("my holiday photo (1).jpg")
        );

        assert!(validate_file_name(None).is_err());
        assert!(validate_file_name(Some("")).is_err());
        assert!(validate_file_name(Some("../etc/passwd")).is_err());
        assert!(validate_file_name(Some("dir/file.txt")).is_err());
        assert!(validate_file_name(Some("dir\\file.txt")).is_err());

        let at_limit = "a".repeat(MAX_FILE_NAME_LENGTH);
        assert!(validate_file_name(Some(&at_limit)).is_ok());
        let too_long = "a".repeat(MAX_FILE_NAME_LENGTH + 1);
        assert!(validate_file_name(Some(&too_long)).is_err());
    }

    #[test]
    fn test_file_name_length_counts_characters() {
        let name = "é".repeat(MAX_FILE_NAME_LENGTH);
        assert!(validate_file_name(Some(&name)).is_ok());
    }

    #[test]
    fn test_content_type_rules() {
        for ok in [
            "image/jpeg",
            "application/pdf",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "image/svg+xml",
            "video/x-matroska",
        ] {
            assert_eq!(validate_content_type(Some(ok)), Ok(ok));
        }

        for bad in [
            "",
            "image/jpeg; charset=utf-8",
            "text/html\r\nX-Injected: 1",
            "image/<script>",
            "vidéo/mp4",
        ] {
            assert!(validate_content_type(Some(bad)).is_err(), "{bad:?}");
        }

        assert!(validate_content_type(None).is_err());
        let too_long = format!("application/{}", "x".repeat(MAX_CONTENT_TYPE_LENGTH));
        assert!(validate_content_type(Some(&too_long)).is_err());
    }

    #[test]
    fn test_sql_identifier() {
        assert!(is_sql_identifier("files"));
        assert!(is_sql_identifier("_uploads_2024"));
        assert!(!is_sql_identifier("2files"));
        assert!(!is_sql_identifier("files; DROP TABLE users"));
        assert!(!is_sql_identifier("public.files"));
        assert!(!is_sql_identifier(""));
        assert!(!is_sql_identifier(&"a".repeat(64)));
    }

    #[test]
    fn test_file_id_rules() {
        assert!(validate_file_id("0b7c6f1e-7c55-4a43-9b0e-8d4c3a1f2e10").is_ok());
        assert!(validate_file_id("").is_err());
        assert!(validate_file_id("   ").is_err());
    }
}
