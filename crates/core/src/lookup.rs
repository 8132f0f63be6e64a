//! Request and response shapes of the two remote lookups.
//!
//! Both endpoints speak JSON. The response types default every field so an
//! incomplete body decodes into a negative result rather than an error.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Body of a PAN verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPanRequest {
    pub pan_number: String,
}

/// Result of a PAN verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanVerification {
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Body of a postcode lookup request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostcodeRequest {
    pub postcode: String,
}

/// Identifier of a state or city option. The service sends numbers, but
/// string ids are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionId {
    Number(i64),
    Text(String),
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A selectable state or city returned by the postcode lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOption {
    pub id: OptionId,
    pub name: String,
}

/// Result of a postcode lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostcodeDetails {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub state: Vec<LookupOption>,
    #[serde(default)]
    pub city: Vec<LookupOption>,
}

impl PostcodeDetails {
    /// Status value the service reports for a resolved postcode.
    pub const SUCCESS: &'static str = "Success";

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }

    /// Name of the first state option, or empty when there is none.
    #[must_use]
    pub fn default_state(&self) -> &str {
        self.state.first().map_or("", |option| option.name.as_str())
    }

    /// Name of the first city option, or empty when there is none.
    #[must_use]
    pub fn default_city(&self) -> &str {
        self.city.first().map_or("", |option| option.name.as_str())
    }
}
