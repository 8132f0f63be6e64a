//! Permanent Account Number (PAN) type.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static PAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]{1}$").expect("Invalid regex"));

/// Errors that can occur when parsing a [`Pan`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PanError {
    /// The input string is empty.
    #[error("PAN cannot be empty")]
    Empty,
    /// The input is not 5 uppercase letters, 4 digits and 1 uppercase letter.
    #[error("PAN must be 5 letters, 4 digits and 1 letter (e.g. ABCDE1234F)")]
    Malformed,
}

/// A 10-character Permanent Account Number.
///
/// ## Constraints
///
/// - Exactly 10 ASCII characters
/// - Positions 1-5: uppercase letters
/// - Positions 6-9: digits
/// - Position 10: uppercase letter
///
/// Lowercase input is rejected rather than normalized; the lookup service
/// treats case as significant.
///
/// ## Examples
///
/// ```
/// use customer_desk_core::Pan;
///
/// assert!(Pan::parse("ABCDE1234F").is_ok());
/// assert!(Pan::parse("abcde1234f").is_err());
/// assert!(Pan::parse("ABCD12345F").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Pan(String);

impl Pan {
    /// Length of every PAN.
    pub const LENGTH: usize = 10;

    /// Parse a `Pan` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or does not match the PAN layout.
    pub fn parse(s: &str) -> Result<Self, PanError> {
        if s.is_empty() {
            return Err(PanError::Empty);
        }

        if !Self::is_well_formed(s) {
            return Err(PanError::Malformed);
        }

        Ok(Self(s.to_owned()))
    }

    /// Whether `s` has the PAN layout.
    #[must_use]
    pub fn is_well_formed(s: &str) -> bool {
        PAN_RE.is_match(s)
    }

    /// Returns the PAN as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Pan {
    type Err = PanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Pan {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
