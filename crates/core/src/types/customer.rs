//! Customer record and address types.
//!
//! Field values are stored as plain strings because a record is also the
//! in-progress draft of the form: it must be able to hold invalid input until
//! validation runs at submit time. The validated newtypes ([`crate::Pan`],
//! [`crate::Email`], ...) are used at the points where a value must be valid.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a customer record.
///
/// Assigned when a draft is created, so a record can be found again after
/// other records were deleted and its positional index shifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(Uuid);

impl CustomerId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for CustomerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One postal address of a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address_line1: String,
    pub address_line2: String,
    pub postcode: String,
    pub state: String,
    pub city: String,
}

/// Editable fields of an [`Address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressField {
    AddressLine1,
    AddressLine2,
    Postcode,
    State,
    City,
}

impl Address {
    /// Read a field.
    #[must_use]
    pub fn get(&self, field: AddressField) -> &str {
        match field {
            AddressField::AddressLine1 => &self.address_line1,
            AddressField::AddressLine2 => &self.address_line2,
            AddressField::Postcode => &self.postcode,
            AddressField::State => &self.state,
            AddressField::City => &self.city,
        }
    }

    /// Overwrite a field.
    pub fn set(&mut self, field: AddressField, value: String) {
        let slot = match field {
            AddressField::AddressLine1 => &mut self.address_line1,
            AddressField::AddressLine2 => &mut self.address_line2,
            AddressField::Postcode => &mut self.postcode,
            AddressField::State => &mut self.state,
            AddressField::City => &mut self.city,
        };
        *slot = value;
    }

    /// Blank out the values resolved from the postcode.
    pub fn clear_region(&mut self) {
        self.state.clear();
        self.city.clear();
    }

    /// One-line rendering used by the list view.
    ///
    /// ```
    /// use customer_desk_core::Address;
    ///
    /// let address = Address {
    ///     address_line1: "1 Rd".to_string(),
    ///     address_line2: String::new(),
    ///     postcode: "560001".to_string(),
    ///     state: "Karnataka".to_string(),
    ///     city: "Bengaluru".to_string(),
    /// };
    /// assert_eq!(address.summary(), "1 Rd, , Bengaluru, Karnataka - 560001");
    /// ```
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}, {}, {}, {} - {}",
            self.address_line1, self.address_line2, self.city, self.state, self.postcode
        )
    }
}

/// Editable top-level fields of a [`CustomerRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomerField {
    Pan,
    FullName,
    Email,
    MobileNumber,
}

/// A customer entry as persisted by the record store.
///
/// `id` is optional on the wire so collections written before ids existed
/// still load; the store assigns ids to such records when it reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CustomerId>,
    pub pan: String,
    pub full_name: String,
    pub email: String,
    pub mobile_number: String,
    pub addresses: Vec<Address>,
}

impl CustomerRecord {
    /// A fresh draft: new id, blank fields, one blank address.
    #[must_use]
    pub fn draft() -> Self {
        Self {
            id: Some(CustomerId::generate()),
            pan: String::new(),
            full_name: String::new(),
            email: String::new(),
            mobile_number: String::new(),
            addresses: vec![Address::default()],
        }
    }

    /// Return the record id, assigning one first if it has none.
    pub fn ensure_id(&mut self) -> CustomerId {
        *self.id.get_or_insert_with(CustomerId::generate)
    }

    /// Read a top-level field.
    #[must_use]
    pub fn get(&self, field: CustomerField) -> &str {
        match field {
            CustomerField::Pan => &self.pan,
            CustomerField::FullName => &self.full_name,
            CustomerField::Email => &self.email,
            CustomerField::MobileNumber => &self.mobile_number,
        }
    }

    /// Overwrite a top-level field.
    pub fn set(&mut self, field: CustomerField, value: String) {
        let slot = match field {
            CustomerField::Pan => &mut self.pan,
            CustomerField::FullName => &mut self.full_name,
            CustomerField::Email => &mut self.email,
            CustomerField::MobileNumber => &mut self.mobile_number,
        };
        *slot = value;
    }
}
