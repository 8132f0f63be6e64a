//! Six-digit postcode type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Postcode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PostcodeError {
    /// The input is not exactly six ASCII digits.
    #[error("postcode must be {expected} digits")]
    Malformed {
        /// Required number of digits.
        expected: usize,
    },
}

/// A six-digit numeric postcode used to resolve state and city.
///
/// ```
/// use customer_desk_core::Postcode;
///
/// assert!(Postcode::parse("560001").is_ok());
/// assert!(Postcode::parse("56001").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Postcode(String);

impl Postcode {
    /// Number of digits in a postcode.
    pub const LENGTH: usize = 6;

    /// Parse a `Postcode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PostcodeError> {
        if Self::is_well_formed(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(PostcodeError::Malformed {
                expected: Self::LENGTH,
            })
        }
    }

    /// Whether `s` is exactly six ASCII digits.
    #[must_use]
    pub fn is_well_formed(s: &str) -> bool {
        s.len() == Self::LENGTH && s.bytes().all(|b| b.is_ascii_digit())
    }

    /// Returns the postcode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Postcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
