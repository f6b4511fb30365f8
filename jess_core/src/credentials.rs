use std::fmt;

/// Opaque bearer token, resolved before any dialog starts.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials(String);

impl Credentials {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn bearer_token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_token() {
        let credentials = Credentials::new("sk-secret");
        assert_eq!(credentials.bearer_token(), "sk-secret");
        assert!(!format!("{credentials:?}").contains("sk-secret"));
    }
}
