use crate::error::{AppError, Result};

/// RFC 5322 `atext` specials permitted in the local part, besides
/// alphanumerics and dots.
const LOCAL_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-";

/// Validates the shape of an email address before it is allowed anywhere
/// near storage.
///
/// This is the usual RFC-5322-ish check: a non-empty local part of permitted
/// characters, one `@`, and a dot-separated domain of alphanumeric labels
/// (hyphens allowed inside), 254 characters total at most.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() || email.len() > 254 {
        return Err(AppError::InvalidEmailFormat);
    }

    let (local, domain) = email.split_once('@').ok_or(AppError::InvalidEmailFormat)?;

    if local.is_empty()
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || LOCAL_SPECIALS.contains(c))
    {
        return Err(AppError::InvalidEmailFormat);
    }

    if domain.is_empty() {
        return Err(AppError::InvalidEmailFormat);
    }

    for label in domain.split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err(AppError::InvalidEmailFormat);
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(AppError::InvalidEmailFormat);
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(AppError::InvalidEmailFormat);
        }
    }

    Ok(())
}

/// Validates that a submitted password is present at all.
///
/// Strength is the hasher's problem; emptiness is a form error.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(AppError::EmptyPassword);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_emails() {
        for good in [
            "u@example.com",
            "first.last@example.co.uk",
            "odd+tag!{box}@mail-server.example",
            "a@b.c",
        ] {
            assert!(validate_email(good).is_ok(), "input: {:?}", good);
        }
    }

    #[test]
    fn rejects_non_emails() {
        for bad in [
            "",
            "not-an-email",
            "@example.com",
            "user@",
            "user@@example.com",
            "user@.example.com",
            "user@example..com",
            "user@-example.com",
            "user@example-.com",
            "user@exa mple.com",
            "us er@example.com",
        ] {
            assert!(
                matches!(validate_email(bad), Err(AppError::InvalidEmailFormat)),
                "input: {:?}",
                bad
            );
        }
    }

    #[test]
    fn rejects_overlong_emails() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert!(email.len() > 254);
        assert!(matches!(
            validate_email(&email),
            Err(AppError::InvalidEmailFormat)
        ));
    }

    #[test]
    fn boundary_length_is_accepted() {
        let email = format!("{}@example.com", "a".repeat(254 - "@example.com".len()));
        assert_eq!(email.len(), 254);
        assert!(validate_email(&email).is_ok());
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(matches!(validate_password(""), Err(AppError::EmptyPassword)));
        assert!(validate_password("pw").is_ok());
    }
}
