//! Customer Desk Core - Shared types library.
//!
//! This crate provides the types used across all Customer Desk components:
//! - `app` - Local HTTP surface, record store and form/list controllers
//! - `cli` - Command-line front end over the same controllers
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Customer records plus newtypes for PAN, email, mobile number and postcode
//! - [`validation`] - Form validation rules producing a per-field error map
//! - [`lookup`] - Request/response shapes of the PAN and postcode lookups

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod lookup;
pub mod types;
pub mod validation;

pub use lookup::{LookupOption, OptionId, PanVerification, PostcodeDetails};
pub use types::*;
pub use validation::{FieldKey, FormErrors, validate_record};
