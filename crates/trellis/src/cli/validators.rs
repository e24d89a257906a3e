//! Input validators shared by the clap argument parsers.

/// Maximum allowed title length
const MAX_TITLE_LENGTH: usize = 200;

/// Validate task ID prefix format.
///
/// Requirements:
/// - 2-20 characters
/// - Alphanumeric only (letters and digits)
/// - No special characters or spaces
///
/// # Errors
///
/// Returns a message describing the violated requirement.
pub fn validate_prefix(s: &str) -> std::result::Result<String, String> {
    let s = s.trim();

    if s.len() < 2 {
        return Err("Prefix must be at least 2 characters".to_string());
    }

    if s.len() > 20 {
        return Err("Prefix cannot exceed 20 characters".to_string());
    }

    if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Prefix must contain only alphanumeric characters".to_string());
    }

    Ok(s.to_string())
}

/// Validate task ID format.
///
/// Expected format: `prefix-suffix` where both parts are non-empty and
/// alphanumeric. Examples: `task-a1b2`, `work-9xk`.
///
/// # Errors
///
/// Returns a message describing the violated requirement.
pub fn validate_task_id(s: &str) -> std::result::Result<String, String> {
    validate_id(s, "Task ID")
}

/// Validate dependency edge ID format, same shape as task IDs.
///
/// # Errors
///
/// Returns a message describing the violated requirement.
pub fn validate_dep_id(s: &str) -> std::result::Result<String, String> {
    validate_id(s, "Dependency ID")
}

fn validate_id(s: &str, kind: &str) -> std::result::Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err(format!("{kind} cannot be empty"));
    }

    let Some((prefix, suffix)) = s.split_once('-') else {
        return Err(format!(
            "{kind} must have the format 'prefix-suffix' (e.g., 'task-a1b2')"
        ));
    };

    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!("{kind} prefix must be alphanumeric"));
    }
    if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!("{kind} suffix must be alphanumeric"));
    }

    Ok(s.to_string())
}

/// Validate a task title.
///
/// # Errors
///
/// Returns a message if the title is empty or too long.
pub fn validate_title(s: &str) -> std::result::Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Title cannot be empty".to_string());
    }

    if s.len() > MAX_TITLE_LENGTH {
        return Err(format!("Title cannot exceed {MAX_TITLE_LENGTH} characters"));
    }

    Ok(s.to_string())
}
