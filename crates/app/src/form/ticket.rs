//! Lookup tickets.
//!
//! A ticket is issued by the controller when a lookup begins and carries
//! everything needed to decide, once the remote call returns, whether the
//! result still applies. Running a ticket does not borrow the controller.

use customer_desk_core::{Pan, PanVerification, Postcode, PostcodeDetails};

use crate::lookup::{LookupError, LookupService};

/// Controller-internal identity of an address, stable across removals of
/// other addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlotKey(pub(crate) u64);

/// A PAN verification waiting to be run.
#[derive(Debug, Clone)]
pub struct PanTicket {
    pub(crate) generation: u64,
    pub(crate) pan: Pan,
}

impl PanTicket {
    /// The PAN being verified.
    #[must_use]
    pub const fn pan(&self) -> &Pan {
        &self.pan
    }

    /// Call the lookup service.
    pub async fn run(self, lookup: &dyn LookupService) -> PanOutcome {
        let result = lookup.verify_pan(&self.pan).await;
        PanOutcome {
            generation: self.generation,
            pan: self.pan,
            result,
        }
    }
}

/// Result of a [`PanTicket`], ready to be merged.
#[derive(Debug)]
pub struct PanOutcome {
    pub(crate) generation: u64,
    pub(crate) pan: Pan,
    pub(crate) result: Result<PanVerification, LookupError>,
}

/// A postcode lookup for one address waiting to be run.
#[derive(Debug, Clone)]
pub struct PostcodeTicket {
    pub(crate) slot: SlotKey,
    pub(crate) generation: u64,
    pub(crate) postcode: Postcode,
}

impl PostcodeTicket {
    /// The postcode being resolved.
    #[must_use]
    pub const fn postcode(&self) -> &Postcode {
        &self.postcode
    }

    /// Call the lookup service.
    pub async fn run(self, lookup: &dyn LookupService) -> PostcodeOutcome {
        let result = lookup.postcode_details(&self.postcode).await;
        PostcodeOutcome {
            slot: self.slot,
            generation: self.generation,
            postcode: self.postcode,
            result,
        }
    }
}

/// Result of a [`PostcodeTicket`], ready to be merged.
#[derive(Debug)]
pub struct PostcodeOutcome {
    pub(crate) slot: SlotKey,
    pub(crate) generation: u64,
    pub(crate) postcode: Postcode,
    pub(crate) result: Result<PostcodeDetails, LookupError>,
}

/// What happened to an outcome handed back to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// The outcome was merged into the draft.
    Applied,
    /// Its target changed since the ticket was issued; nothing was touched.
    Discarded,
}
