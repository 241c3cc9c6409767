//! Artifact lifecycle rules: TTLs, daily caps, content sanitization, and
//! flag escalation. Pure domain logic — no database access.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::status::ArtifactKind;
use crate::types::Timestamp;

/// Maximum content length after whitespace collapsing, characters.
pub const MAX_CONTENT_CHARS: usize = 500;

/// Flags needed before a clean artifact escalates to `Flagged`.
pub const FLAG_ESCALATION_THRESHOLD: i32 = 3;

// Contact-info and link patterns are rejected outright. The feed is
// anonymous-adjacent by design; off-platform contact exchange goes through
// matches, not public drops.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://").expect("valid regex"));
static WWW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)www\.").expect("valid regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}[-. ]?\d{3}[-. ]?\d{4}\b").expect("valid regex"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").expect("valid regex")
});
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Time-to-live for a freshly created artifact of the given kind.
pub fn ttl(kind: ArtifactKind) -> chrono::Duration {
    match kind {
        ArtifactKind::Chat => chrono::Duration::minutes(45),
        ArtifactKind::BoardPost => chrono::Duration::hours(48),
        ArtifactKind::Announce => chrono::Duration::hours(2),
    }
}

/// Maximum artifacts of the given kind a user may create per UTC day.
pub fn daily_cap(kind: ArtifactKind) -> i64 {
    match kind {
        ArtifactKind::Chat => 30,
        ArtifactKind::BoardPost => 10,
        ArtifactKind::Announce => 15,
    }
}

/// Expiry timestamp for an artifact of `kind` created at `created_at`.
pub fn expires_at(kind: ArtifactKind, created_at: Timestamp) -> Timestamp {
    created_at + ttl(kind)
}

/// Sanitize user-submitted artifact content.
///
/// Rejects links, phone numbers, and email addresses; collapses runs of
/// whitespace; enforces 1..=[`MAX_CONTENT_CHARS`] characters after trimming.
pub fn sanitize_content(raw: &str) -> Result<String, CoreError> {
    if URL_RE.is_match(raw)
        || WWW_RE.is_match(raw)
        || PHONE_RE.is_match(raw)
        || EMAIL_RE.is_match(raw)
    {
        return Err(CoreError::Validation(
            "Content contains disallowed contact or link information".to_string(),
        ));
    }

    let clean = WHITESPACE_RE.replace_all(raw.trim(), " ").to_string();
    let chars = clean.chars().count();
    if chars == 0 {
        return Err(CoreError::Validation("Content must not be empty".to_string()));
    }
    if chars > MAX_CONTENT_CHARS {
        return Err(CoreError::Validation(format!(
            "Content must be at most {MAX_CONTENT_CHARS} characters, got {chars}"
        )));
    }
    Ok(clean)
}

/// Whether a new flag total escalates a clean artifact to `Flagged`.
pub fn escalates_on_flag(flag_count: i32) -> bool {
    flag_count >= FLAG_ESCALATION_THRESHOLD
}
