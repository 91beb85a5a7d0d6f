//! Password strength checks for new accounts.

use std::fmt::{Debug, Display};

use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A password that is strong enough to create an account with.
#[derive(Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check that `raw_password` is hard to guess.
    ///
    /// `email` is passed to the strength estimator so that passwords built
    /// from the user's own email are penalised.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] with suggestions for a stronger password if
    /// the password is considered too weak.
    pub fn new(raw_password: &str, email: &str) -> Result<Self, Error> {
        let user_inputs: Vec<&str> = email
            .split(['@', '.', '_', '-', '+'])
            .filter(|part| !part.is_empty())
            .collect();
        let password_analysis = zxcvbn(raw_password, &user_inputs);

        match password_analysis.score() {
            Score::Three | Score::Four => Ok(Self(raw_password.to_owned())),
            _ => Err(Error::TooWeak(
                password_analysis
                    .feedback()
                    .unwrap_or(&Feedback::default())
                    .to_string(),
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

impl Debug for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ValidatedPassword").field(&"********").finish()
    }
}

#[cfg(test)]
mod validated_password_tests {
    use crate::Error;

    use super::ValidatedPassword;

    #[test]
    fn new_fails_on_empty() {
        let result = ValidatedPassword::new("", "me@example.com");

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn new_fails_on_common_password() {
        let result = ValidatedPassword::new("password123", "me@example.com");

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn new_fails_on_email_based_password() {
        let result = ValidatedPassword::new("janedoe2025", "janedoe@example.com");

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn new_succeeds_on_strong_password() {
        let result = ValidatedPassword::new("turtle-velvet-harbor-quill-42", "me@example.com");

        assert!(result.is_ok());
    }

    #[test]
    fn password_is_hidden_when_printed() {
        let password =
            ValidatedPassword::new("turtle-velvet-harbor-quill-42", "me@example.com").unwrap();

        assert_eq!(password.to_string(), "********");
        assert!(!format!("{password:?}").contains("turtle"));
    }
}
