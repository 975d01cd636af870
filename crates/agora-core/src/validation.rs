use agora_types::{ForumError, ForumResult};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Loose format check: an '@' with a '.' somewhere after it.
pub fn is_valid_email(email: &str) -> bool {
    match email.find('@') {
        Some(at) => email[at + 1..].contains('.'),
        None => false,
    }
}

pub fn require(field: &str, value: &str) -> ForumResult<()> {
    if value.is_empty() {
        return Err(ForumError::validation(format!("{field} is required")));
    }
    Ok(())
}

pub fn validate_registration(username: &str, email: &str, password: &str) -> ForumResult<()> {
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ForumError::validation(
            "username, email, and password are required",
        ));
    }
    if !is_valid_email(email) {
        return Err(ForumError::validation("invalid email format"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ForumError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Upload file names become the last segment of an object key.
pub fn validate_file_name(file_name: &str) -> ForumResult<()> {
    require("file_name", file_name)?;
    if file_name.contains('/') || file_name == "." || file_name == ".." {
        return Err(ForumError::validation("file_name must be a plain file name"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_needs_dot_after_at() {
        assert!(is_valid_email("a@b.c"));
        assert!(is_valid_email("first.last@example.co.uk"));
        assert!(!is_valid_email("a.b@c"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn registration_rules() {
        assert!(validate_registration("alice", "alice@example.com", "password1").is_ok());
        assert!(validate_registration("", "alice@example.com", "password1").is_err());
        assert!(validate_registration("alice", "alice-at-example", "password1").is_err());

        let short = validate_registration("alice", "alice@example.com", "short").unwrap_err();
        assert_eq!(short.message(), "password must be at least 8 characters");
    }

    #[test]
    fn file_names_are_single_segments() {
        assert!(validate_file_name("avatar.png").is_ok());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("../etc/passwd").is_err());
        assert!(validate_file_name("..").is_err());
    }
}
