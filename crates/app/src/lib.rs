//! Customer Desk application library.
//!
//! Local customer record manager: the record store over local key/value
//! storage, the PAN and postcode lookup client, the list and form
//! controllers, and the JSON HTTP surface over them. The binary in
//! `main.rs` and the `desk-cli` crate are thin front ends over this library.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod form;
pub mod list;
pub mod lookup;
pub mod routes;
pub mod sessions;
pub mod state;
pub mod storage;
pub mod store;
