//! Core types for Customer Desk.
//!
//! This module provides the customer record model and type-safe wrappers for
//! the individually validated fields.

pub mod customer;
pub mod email;
pub mod mobile;
pub mod pan;
pub mod postcode;

pub use customer::{Address, AddressField, CustomerField, CustomerId, CustomerRecord};
pub use email::{Email, EmailError};
pub use mobile::{MobileNumber, MobileNumberError};
pub use pan::{Pan, PanError};
pub use postcode::{Postcode, PostcodeError};
