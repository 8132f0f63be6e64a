//! Remote lookups used to autofill the customer form.
//!
//! This module provides:
//! - [`LookupService`], the seam the form controller calls through
//! - [`HttpLookupClient`], the JSON-over-HTTP implementation
//! - [`LookupError`] for transport and decoding failures
//!
//! Callers only issue a lookup for input that already passed its local format
//! check, which is why the methods take [`Pan`] and [`Postcode`] rather than
//! raw strings.

mod client;
mod error;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use async_trait::async_trait;
use customer_desk_core::{Pan, PanVerification, Postcode, PostcodeDetails};

pub use client::HttpLookupClient;
pub use error::LookupError;

/// PAN verification and postcode resolution.
#[async_trait]
pub trait LookupService: Send + Sync {
    /// Ask the service whether `pan` is valid and whom it belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    async fn verify_pan(&self, pan: &Pan) -> Result<PanVerification, LookupError>;

    /// Resolve `postcode` to its state and city options.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be decoded.
    async fn postcode_details(&self, postcode: &Postcode) -> Result<PostcodeDetails, LookupError>;
}
