//! Mobile number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`MobileNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MobileNumberError {
    /// The input does not have exactly ten characters.
    #[error("mobile number must be {expected} digits (got {actual} characters)")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
        /// Number of characters supplied.
        actual: usize,
    },
    /// The input contains something other than ASCII digits.
    #[error("mobile number must contain only digits")]
    NonNumeric,
}

/// A ten-digit mobile number, stored without country prefix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Number of digits in a mobile number.
    pub const LENGTH: usize = 10;

    /// Parse a `MobileNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly ten ASCII digits.
    pub fn parse(s: &str) -> Result<Self, MobileNumberError> {
        let actual = s.chars().count();
        if actual != Self::LENGTH {
            return Err(MobileNumberError::WrongLength {
                expected: Self::LENGTH,
                actual,
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MobileNumberError::NonNumeric);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
