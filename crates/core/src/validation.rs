//! Form validation rules.
//!
//! [`validate_record`] checks a draft against the field-format rules and
//! returns a [`FormErrors`] map keyed by [`FieldKey`]. An empty map means the
//! draft may be persisted. There are no cross-field or cross-record rules.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{CustomerRecord, Email, MobileNumber, Pan, Postcode};

/// Maximum length of a full name, in UTF-16 code units.
///
/// Characters outside the Basic Multilingual Plane count twice.
pub const FULL_NAME_MAX_UNITS: usize = 140;

pub const PAN_FORMAT_MESSAGE: &str = "Invalid PAN format";
pub const FULL_NAME_MESSAGE: &str = "Full Name is required and must be less than 140 characters";
pub const EMAIL_MESSAGE: &str = "Invalid email format";
pub const MOBILE_NUMBER_MESSAGE: &str = "Mobile Number must be 10 digits";
pub const ADDRESS_LINE1_MESSAGE: &str = "Address Line 1 is required";
pub const POSTCODE_FORMAT_MESSAGE: &str = "Postcode must be 6 digits";

/// Set on the PAN field when the PAN fails its check on blur.
pub const PAN_REJECTED_MESSAGE: &str = "Please Enter valid PAN Number";
/// Set on an address's postcode when the postcode lookup fails.
pub const POSTCODE_LOOKUP_MESSAGE: &str = "Error fetching postcode details";

/// Key of a form field that can carry an error.
///
/// The string form (`pan`, `fullName`, `addressLine1_0`, `postcode_2`, ...)
/// is what clients see in the error map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Pan,
    FullName,
    Email,
    MobileNumber,
    AddressLine1(usize),
    Postcode(usize),
}

impl FieldKey {
    /// Index of the address this key belongs to, if any.
    #[must_use]
    pub const fn address_index(self) -> Option<usize> {
        match self {
            Self::AddressLine1(i) | Self::Postcode(i) => Some(i),
            _ => None,
        }
    }

    /// Where this key lands after the address at `removed` is taken out.
    ///
    /// Keys of the removed address map to `None`; keys of later addresses
    /// move down by one.
    #[must_use]
    pub const fn after_address_removed(self, removed: usize) -> Option<Self> {
        match self {
            Self::AddressLine1(i) if i == removed => None,
            Self::Postcode(i) if i == removed => None,
            Self::AddressLine1(i) if i > removed => Some(Self::AddressLine1(i - 1)),
            Self::Postcode(i) if i > removed => Some(Self::Postcode(i - 1)),
            other => Some(other),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pan => f.write_str("pan"),
            Self::FullName => f.write_str("fullName"),
            Self::Email => f.write_str("email"),
            Self::MobileNumber => f.write_str("mobileNumber"),
            Self::AddressLine1(i) => write!(f, "addressLine1_{i}"),
            Self::Postcode(i) => write!(f, "postcode_{i}"),
        }
    }
}

/// Error returned when a string is not a known field key.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown field key: {0}")]
pub struct UnknownFieldKey(String);

impl FromStr for FieldKey {
    type Err = UnknownFieldKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownFieldKey(s.to_owned());
        match s {
            "pan" => return Ok(Self::Pan),
            "fullName" => return Ok(Self::FullName),
            "email" => return Ok(Self::Email),
            "mobileNumber" => return Ok(Self::MobileNumber),
            _ => {}
        }

        let (name, index) = s.rsplit_once('_').ok_or_else(unknown)?;
        let index: usize = index.parse().map_err(|_| unknown())?;
        match name {
            "addressLine1" => Ok(Self::AddressLine1(index)),
            "postcode" => Ok(Self::Postcode(index)),
            _ => Err(unknown()),
        }
    }
}

impl Serialize for FieldKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-field error messages of a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<FieldKey, String>);

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: FieldKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn insert(&mut self, key: FieldKey, message: impl Into<String>) {
        self.0.insert(key, message.into());
    }

    pub fn remove(&mut self, key: FieldKey) -> Option<String> {
        self.0.remove(&key)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        self.0.iter().map(|(key, message)| (*key, message.as_str()))
    }

    /// Drop the errors of the address at `removed` and renumber later ones.
    pub fn remove_address(&mut self, removed: usize) {
        self.0 = std::mem::take(&mut self.0)
            .into_iter()
            .filter_map(|(key, message)| {
                key.after_address_removed(removed)
                    .map(|moved| (moved, message))
            })
            .collect();
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{key}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Check a draft against the field-format rules.
#[must_use]
pub fn validate_record(record: &CustomerRecord) -> FormErrors {
    let mut errors = FormErrors::new();

    if !Pan::is_well_formed(&record.pan) {
        errors.insert(FieldKey::Pan, PAN_FORMAT_MESSAGE);
    }

    let name_len = record.full_name.encode_utf16().count();
    if name_len == 0 || name_len > FULL_NAME_MAX_UNITS {
        errors.insert(FieldKey::FullName, FULL_NAME_MESSAGE);
    }

    if !Email::is_well_formed(&record.email) {
        errors.insert(FieldKey::Email, EMAIL_MESSAGE);
    }

    if MobileNumber::parse(&record.mobile_number).is_err() {
        errors.insert(FieldKey::MobileNumber, MOBILE_NUMBER_MESSAGE);
    }

    for (i, address) in record.addresses.iter().enumerate() {
        if address.address_line1.is_empty() {
            errors.insert(FieldKey::AddressLine1(i), ADDRESS_LINE1_MESSAGE);
        }
        if !Postcode::is_well_formed(&address.postcode) {
            errors.insert(FieldKey::Postcode(i), POSTCODE_FORMAT_MESSAGE);
        }
    }

    errors
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Address;

    fn jane() -> CustomerRecord {
        CustomerRecord {
            id: None,
            pan: "ABCDE1234F".to_string(),
            full_name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            mobile_number: "9876543210".to_string(),
            addresses: vec![Address {
                address_line1: "1 Rd".to_string(),
                address_line2: String::new(),
                postcode: "560001".to_string(),
                state: "Karnataka".to_string(),
                city: "Bengaluru".to_string(),
            }],
        }
    }

    #[test]
    fn test_valid_record_has_no_errors() {
        assert!(validate_record(&jane()).is_empty());
    }

    #[test]
    fn test_short_mobile_number() {
        let mut record = jane();
        record.mobile_number = "12345".to_string();

        let errors = validate_record(&record);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(FieldKey::MobileNumber),
            Some(MOBILE_NUMBER_MESSAGE)
        );
    }

    #[test]
    fn test_malformed_pan() {
        for pan in ["", "abcde1234f", "ABCDE12345", "ABCDE1234FG"] {
            let mut record = jane();
            record.pan = pan.to_string();
            assert_eq!(
                validate_record(&record).get(FieldKey::Pan),
                Some(PAN_FORMAT_MESSAGE),
                "{pan}"
            );
        }
    }

    #[test]
    fn test_full_name_bounds() {
        let mut record = jane();
        record.full_name = String::new();
        assert!(validate_record(&record).contains(FieldKey::FullName));

        record.full_name = "a".repeat(140);
        assert!(!validate_record(&record).contains(FieldKey::FullName));

        record.full_name = "a".repeat(141);
        assert!(validate_record(&record).contains(FieldKey::FullName));

        // Counted in UTF-16 units, not bytes
        record.full_name = "é".repeat(140);
        assert!(!validate_record(&record).contains(FieldKey::FullName));

        // Astral characters take two units each
        record.full_name = "😀".repeat(70);
        assert!(!validate_record(&record).contains(FieldKey::FullName));

        record.full_name = "😀".repeat(71);
        assert!(validate_record(&record).contains(FieldKey::FullName));
    }

    #[test]
    fn test_bad_email() {
        let mut record = jane();
        record.email = "jane@localhost".to_string();
        assert_eq!(
            validate_record(&record).get(FieldKey::Email),
            Some(EMAIL_MESSAGE)
        );
    }

    #[test]
    fn test_address_errors_are_keyed_by_index() {
        let mut record = jane();
        record.addresses.push(Address {
            postcode: "12".to_string(),
            ..Address::default()
        });

        let errors = validate_record(&record);
        assert!(!errors.contains(FieldKey::AddressLine1(0)));
        assert!(!errors.contains(FieldKey::Postcode(0)));
        assert_eq!(
            errors.get(FieldKey::AddressLine1(1)),
            Some(ADDRESS_LINE1_MESSAGE)
        );
        assert_eq!(
            errors.get(FieldKey::Postcode(1)),
            Some(POSTCODE_FORMAT_MESSAGE)
        );
    }

    #[test]
    fn test_every_rule_fires_on_blank_draft() {
        let errors = validate_record(&CustomerRecord::draft());
        let keys: Vec<String> = errors.iter().map(|(key, _)| key.to_string()).collect();
        assert_eq!(
            keys,
            [
                "pan",
                "fullName",
                "email",
                "mobileNumber",
                "addressLine1_0",
                "postcode_0"
            ]
        );
    }

    #[test]
    fn test_field_key_string_form() {
        for key in [
            FieldKey::Pan,
            FieldKey::FullName,
            FieldKey::Email,
            FieldKey::MobileNumber,
            FieldKey::AddressLine1(3),
            FieldKey::Postcode(12),
        ] {
            assert_eq!(key.to_string().parse::<FieldKey>().unwrap(), key);
        }
        assert!("postcode_x".parse::<FieldKey>().is_err());
        assert!("city_0".parse::<FieldKey>().is_err());
    }

    #[test]
    fn test_errors_serialize_as_flat_map() {
        let mut errors = FormErrors::new();
        errors.insert(FieldKey::Postcode(1), POSTCODE_LOOKUP_MESSAGE);
        errors.insert(FieldKey::Pan, PAN_REJECTED_MESSAGE);

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["postcode_1"], POSTCODE_LOOKUP_MESSAGE);
        assert_eq!(json["pan"], PAN_REJECTED_MESSAGE);
    }

    #[test]
    fn test_remove_address_shifts_later_keys() {
        let mut errors = FormErrors::new();
        errors.insert(FieldKey::Email, EMAIL_MESSAGE);
        errors.insert(FieldKey::Postcode(0), "zero");
        errors.insert(FieldKey::AddressLine1(1), "one");
        errors.insert(FieldKey::Postcode(2), "two");

        errors.remove_address(1);

        assert_eq!(errors.get(FieldKey::Email), Some(EMAIL_MESSAGE));
        assert_eq!(errors.get(FieldKey::Postcode(0)), Some("zero"));
        assert!(!errors.contains(FieldKey::AddressLine1(1)));
        assert_eq!(errors.get(FieldKey::Postcode(1)), Some("two"));
        assert!(!errors.contains(FieldKey::Postcode(2)));
        assert_eq!(errors.len(), 3);
    }
}
