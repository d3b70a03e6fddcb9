// src/utils.rs
use anyhow::Result;
use std::collections::BTreeSet;

/// Normalize email for lookups and uniqueness checks
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal shape check, the identity provider owns real verification
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        anyhow::bail!("Invalid email address: {}", email);
    };

    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
        anyhow::bail!("Invalid email address: {}", email);
    }

    Ok(())
}

/// Normalize a skill label: trimmed, lowercase, inner whitespace collapsed
pub fn normalize_skill(skill: &str) -> String {
    skill
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Skills are a set; order and duplicates carry no meaning
pub fn normalize_skills<S: AsRef<str>>(skills: &[S]) -> BTreeSet<String> {
    skills
        .iter()
        .map(|s| normalize_skill(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Treat blank strings as absent
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane@example.com").is_ok());
        assert!(validate_email("jane@localhost").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("no-at-sign").is_err());
    }

    #[test]
    fn test_normalize_skills() {
        let skills = normalize_skills(&["React", " react ", "Node  JS", ""]);
        assert_eq!(skills.len(), 2);
        assert!(skills.contains("react"));
        assert!(skills.contains("node js"));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  ")), None);
        assert_eq!(non_empty(Some(" x ")), Some("x".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
