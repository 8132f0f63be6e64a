//! Scripted lookup service for tests.
//!
//! Answers from canned responses and records every call. Anything not
//! scripted fails like an unreachable service.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use customer_desk_core::{
    LookupOption, OptionId, Pan, PanVerification, Postcode, PostcodeDetails,
};

use super::{LookupError, LookupService};

/// A lookup issued against [`ScriptedLookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupCall {
    VerifyPan(String),
    PostcodeDetails(String),
}

#[derive(Debug, Default)]
pub struct ScriptedLookup {
    pans: HashMap<String, PanVerification>,
    postcodes: HashMap<String, PostcodeDetails>,
    calls: Mutex<Vec<LookupCall>>,
}

impl ScriptedLookup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `pan` verifies as valid and belongs to `full_name`.
    #[must_use]
    pub fn with_pan(mut self, pan: &str, full_name: &str) -> Self {
        self.pans.insert(
            pan.to_string(),
            PanVerification {
                is_valid: true,
                full_name: Some(full_name.to_string()),
            },
        );
        self
    }

    /// `pan` is well formed but the service reports it invalid.
    #[must_use]
    pub fn with_rejected_pan(mut self, pan: &str) -> Self {
        self.pans.insert(pan.to_string(), PanVerification::default());
        self
    }

    /// `postcode` resolves to the given states and cities, in order.
    #[must_use]
    pub fn with_postcode(mut self, postcode: &str, states: &[&str], cities: &[&str]) -> Self {
        self.postcodes.insert(
            postcode.to_string(),
            PostcodeDetails {
                status: PostcodeDetails::SUCCESS.to_string(),
                state: options(states),
                city: options(cities),
            },
        );
        self
    }

    /// `postcode` answers with a non-success status.
    #[must_use]
    pub fn with_unknown_postcode(mut self, postcode: &str) -> Self {
        self.postcodes.insert(
            postcode.to_string(),
            PostcodeDetails {
                status: "Error".to_string(),
                ..PostcodeDetails::default()
            },
        );
        self
    }

    /// Every call made so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<LookupCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: LookupCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

fn options(names: &[&str]) -> Vec<LookupOption> {
    (1_i64..)
        .zip(names)
        .map(|(id, name)| LookupOption {
            id: OptionId::Number(id),
            name: (*name).to_string(),
        })
        .collect()
}

fn unscripted() -> LookupError {
    LookupError::Request("connection refused (not scripted)".to_string())
}

#[async_trait]
impl LookupService for ScriptedLookup {
    async fn verify_pan(&self, pan: &Pan) -> Result<PanVerification, LookupError> {
        self.record(LookupCall::VerifyPan(pan.to_string()));
        self.pans.get(pan.as_str()).cloned().ok_or_else(unscripted)
    }

    async fn postcode_details(&self, postcode: &Postcode) -> Result<PostcodeDetails, LookupError> {
        self.record(LookupCall::PostcodeDetails(postcode.to_string()));
        self.postcodes
            .get(postcode.as_str())
            .cloned()
            .ok_or_else(unscripted)
    }
}
