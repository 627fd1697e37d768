use std::fmt;

/// User-supplied API key, kept in memory only
///
/// Deliberately not `Serialize`; `Debug` and `Display` never show the secret.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Read from an environment variable, ignoring unset or blank values.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(Self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.is_empty() { "<empty>" } else { "<redacted>" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_prints_the_secret() {
        let key = Credential::new("AIza-secret");
        assert!(!format!("{key:?}").contains("AIza"));
        assert!(!key.to_string().contains("AIza"));
        assert_eq!(key.expose(), "AIza-secret");
    }

    #[test]
    fn default_is_empty() {
        assert!(Credential::default().is_empty());
        assert_eq!(format!("{:?}", Credential::default()), "Credential(<empty>)");
    }
}
