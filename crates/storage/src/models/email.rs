use validator::ValidateEmail;

/// A newtype that ensures email addresses are stored trimmed and lowercased
/// so that invitations sent to "Ana@Example.com" and "ana@example.com" resolve
/// to the same judge slot and account.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedEmail(String);

impl NormalizedEmail {
    /// Normalizes and validates an address. Returns `None` for blank or
    /// malformed input.
    ///
    /// # Examples
    ///
    /// ```
    /// use storage::models::NormalizedEmail;
    ///
    /// let a = NormalizedEmail::parse("  Judge@Example.COM ").unwrap();
    /// let b = NormalizedEmail::parse("judge@example.com").unwrap();
    ///
    /// assert_eq!(a, b);
    /// assert!(NormalizedEmail::parse("   ").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();

        if normalized.is_empty() || !normalized.validate_email() {
            return None;
        }

        Some(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
