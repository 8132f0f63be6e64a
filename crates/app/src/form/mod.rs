//! The customer form: one draft record under edit.
//!
//! Field edits update the draft in place and are never validated on their
//! own; validation runs on submit. PAN blur and postcode change trigger
//! remote lookups whose results are merged back into the draft.
//!
//! # Lookups
//!
//! A lookup runs in three steps so the controller is not held across the
//! remote call:
//!
//! 1. `begin_*` checks the input locally and issues a ticket
//! 2. [`PanTicket::run`] / [`PostcodeTicket::run`] call the service
//! 3. `apply_*` merges the outcome, or discards it when the PAN, the
//!    address or its postcode changed in the meantime
//!
//! [`FormController::blur_pan`] and [`FormController::change_postcode`] run
//! all three in sequence.

mod ticket;

use std::sync::Arc;

use customer_desk_core::validation::{
    PAN_REJECTED_MESSAGE, POSTCODE_FORMAT_MESSAGE, POSTCODE_LOOKUP_MESSAGE,
};
use customer_desk_core::{
    Address, AddressField, CustomerField, CustomerRecord, FieldKey, FormErrors, LookupOption,
    Pan, Postcode, validate_record,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::lookup::LookupService;
use crate::store::{RecordStore, StoreError};

use ticket::SlotKey;
pub use ticket::{Merge, PanOutcome, PanTicket, PostcodeOutcome, PostcodeTicket};

/// Errors from form operations.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("address {index} out of range (form has {len})")]
    AddressOutOfRange { index: usize, len: usize },

    #[error("a customer needs at least one address")]
    LastAddress,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of [`FormController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The draft was written to the store at `index`.
    Saved { index: usize },
    /// Validation failed; nothing was written.
    Invalid(FormErrors),
}

/// Per-address state that is not part of the record.
#[derive(Debug, Clone)]
struct AddressSlot {
    key: SlotKey,
    generation: u64,
    loading: bool,
    state_options: Vec<LookupOption>,
    city_options: Vec<LookupOption>,
}

impl AddressSlot {
    const fn new(key: SlotKey) -> Self {
        Self {
            key,
            generation: 0,
            loading: false,
            state_options: Vec::new(),
            city_options: Vec::new(),
        }
    }

    fn clear_options(&mut self) {
        self.state_options.clear();
        self.city_options.clear();
    }
}

/// Serializable snapshot of the form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub index: Option<usize>,
    pub draft: CustomerRecord,
    pub errors: FormErrors,
    pub pan_loading: bool,
    pub addresses: Vec<AddressView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressView {
    pub loading: bool,
    pub state_options: Vec<LookupOption>,
    pub city_options: Vec<LookupOption>,
}

/// Drives one form instance.
pub struct FormController {
    store: RecordStore,
    lookup: Arc<dyn LookupService>,
    origin: Option<usize>,
    draft: CustomerRecord,
    errors: FormErrors,
    slots: Vec<AddressSlot>,
    next_slot: u64,
    pan_generation: u64,
    pan_loading: bool,
}

impl std::fmt::Debug for FormController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormController")
            .field("origin", &self.origin)
            .field("draft", &self.draft)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

impl FormController {
    /// Open the form.
    ///
    /// With an index, the draft is hydrated from the record at that position.
    /// Without one, or when nothing is stored there any more, the form starts
    /// a new blank record.
    #[must_use]
    pub fn open(store: RecordStore, lookup: Arc<dyn LookupService>, index: Option<usize>) -> Self {
        let existing = index.and_then(|index| store.get(index).map(|record| (index, record)));

        let (origin, mut draft) = match existing {
            Some((index, record)) => {
                debug!(index, "Editing customer");
                (Some(index), record)
            }
            None => {
                if let Some(index) = index {
                    debug!(index, "No customer at index, starting a new one");
                }
                (None, CustomerRecord::draft())
            }
        };
        draft.ensure_id();
        if draft.addresses.is_empty() {
            draft.addresses.push(Address::default());
        }

        let mut form = Self {
            store,
            lookup,
            origin,
            draft,
            errors: FormErrors::new(),
            slots: Vec::new(),
            next_slot: 0,
            pan_generation: 0,
            pan_loading: false,
        };
        for _ in 0..form.draft.addresses.len() {
            let slot = form.new_slot();
            form.slots.push(slot);
        }
        form
    }

    /// The record being edited.
    #[must_use]
    pub const fn draft(&self) -> &CustomerRecord {
        &self.draft
    }

    /// Field errors from the last validation or lookup.
    #[must_use]
    pub const fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Store index of the record this form writes to, if it exists yet.
    #[must_use]
    pub const fn origin(&self) -> Option<usize> {
        self.origin
    }

    /// The lookup service this form calls.
    #[must_use]
    pub const fn lookup(&self) -> &Arc<dyn LookupService> {
        &self.lookup
    }

    /// Whether a PAN verification is in flight.
    #[must_use]
    pub const fn pan_loading(&self) -> bool {
        self.pan_loading
    }

    /// Whether a postcode lookup for address `index` is in flight.
    #[must_use]
    pub fn postcode_loading(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| slot.loading)
    }

    /// State options offered for address `index`.
    #[must_use]
    pub fn state_options(&self, index: usize) -> &[LookupOption] {
        self.slots
            .get(index)
            .map(|slot| slot.state_options.as_slice())
            .unwrap_or_default()
    }

    /// City options offered for address `index`.
    #[must_use]
    pub fn city_options(&self, index: usize) -> &[LookupOption] {
        self.slots
            .get(index)
            .map(|slot| slot.city_options.as_slice())
            .unwrap_or_default()
    }

    /// Overwrite a top-level field.
    pub fn set_field(&mut self, field: CustomerField, value: String) {
        self.draft.set(field, value);
    }

    /// Overwrite a field of address `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::AddressOutOfRange`] if there is no such address.
    pub fn set_address_field(
        &mut self,
        index: usize,
        field: AddressField,
        value: String,
    ) -> Result<(), FormError> {
        self.address_mut(index)?.set(field, value);
        Ok(())
    }

    /// Append a blank address and return its index.
    pub fn add_address(&mut self) -> usize {
        self.draft.addresses.push(Address::default());
        let slot = self.new_slot();
        self.slots.push(slot);
        self.draft.addresses.len() - 1
    }

    /// Remove address `index`; later addresses move down by one.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no such address or it is the only one.
    pub fn remove_address(&mut self, index: usize) -> Result<Address, FormError> {
        let len = self.draft.addresses.len();
        if index >= len {
            return Err(FormError::AddressOutOfRange { index, len });
        }
        if len == 1 {
            return Err(FormError::LastAddress);
        }

        self.slots.remove(index);
        self.errors.remove_address(index);
        Ok(self.draft.addresses.remove(index))
    }

    /// Start verifying the current PAN.
    ///
    /// A PAN that fails the local format check is rejected on the spot:
    /// the PAN error is set, the full name blanked and no ticket issued.
    /// Either way any verification already in flight is superseded.
    pub fn begin_pan_lookup(&mut self) -> Option<PanTicket> {
        self.pan_generation += 1;
        match Pan::parse(&self.draft.pan) {
            Ok(pan) => {
                self.pan_loading = true;
                Some(PanTicket {
                    generation: self.pan_generation,
                    pan,
                })
            }
            Err(e) => {
                debug!(error = %e, "PAN failed format check, skipping verification");
                self.pan_loading = false;
                self.reject_pan();
                None
            }
        }
    }

    /// Merge a PAN verification result.
    pub fn apply_pan(&mut self, outcome: PanOutcome) -> Merge {
        if outcome.generation != self.pan_generation {
            debug!(pan = %outcome.pan, "Discarding superseded PAN verification");
            return Merge::Discarded;
        }
        self.pan_loading = false;

        if self.draft.pan != outcome.pan.as_str() {
            debug!(pan = %outcome.pan, "PAN changed during verification, discarding");
            return Merge::Discarded;
        }

        match outcome.result {
            Ok(verification) if verification.is_valid => {
                self.draft.full_name = verification.full_name.unwrap_or_default();
                self.errors.remove(FieldKey::Pan);
            }
            Ok(_) => {
                warn!(pan = %outcome.pan, "PAN rejected by verification service");
                self.reject_pan();
            }
            Err(e) => {
                warn!(pan = %outcome.pan, error = %e, "PAN verification failed");
                self.reject_pan();
            }
        }
        Merge::Applied
    }

    /// Verify the current PAN, as on leaving the PAN field.
    pub async fn blur_pan(&mut self) -> Merge {
        let Some(ticket) = self.begin_pan_lookup() else {
            return Merge::Applied;
        };
        let lookup = Arc::clone(&self.lookup);
        let outcome = ticket.run(lookup.as_ref()).await;
        self.apply_pan(outcome)
    }

    /// Set the postcode of address `index` and start resolving it.
    ///
    /// A value that is not six digits clears the address's state, city and
    /// options, sets its postcode error and issues no ticket. Either way any
    /// lookup already in flight for this address is superseded.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::AddressOutOfRange`] if there is no such address.
    pub fn begin_postcode_lookup(
        &mut self,
        index: usize,
        value: String,
    ) -> Result<Option<PostcodeTicket>, FormError> {
        let len = self.draft.addresses.len();
        let (Some(address), Some(slot)) =
            (self.draft.addresses.get_mut(index), self.slots.get_mut(index))
        else {
            return Err(FormError::AddressOutOfRange { index, len });
        };

        slot.generation += 1;
        let parsed = Postcode::parse(&value);
        address.postcode = value;

        match parsed {
            Ok(postcode) => {
                slot.loading = true;
                Ok(Some(PostcodeTicket {
                    slot: slot.key,
                    generation: slot.generation,
                    postcode,
                }))
            }
            Err(e) => {
                debug!(index, error = %e, "Postcode failed format check, skipping lookup");
                slot.loading = false;
                slot.clear_options();
                address.clear_region();
                self.errors
                    .insert(FieldKey::Postcode(index), POSTCODE_FORMAT_MESSAGE);
                Ok(None)
            }
        }
    }

    /// Merge a postcode lookup result into the address it was issued for,
    /// wherever that address sits now.
    pub fn apply_postcode(&mut self, outcome: PostcodeOutcome) -> Merge {
        let Some(index) = self.slots.iter().position(|slot| slot.key == outcome.slot) else {
            debug!(postcode = %outcome.postcode, "Address removed during lookup, discarding");
            return Merge::Discarded;
        };
        let (Some(address), Some(slot)) =
            (self.draft.addresses.get_mut(index), self.slots.get_mut(index))
        else {
            return Merge::Discarded;
        };

        if outcome.generation != slot.generation {
            debug!(index, postcode = %outcome.postcode, "Discarding superseded postcode lookup");
            return Merge::Discarded;
        }
        slot.loading = false;

        if address.postcode != outcome.postcode.as_str() {
            debug!(
                index,
                postcode = %outcome.postcode,
                "Postcode changed during lookup, discarding"
            );
            return Merge::Discarded;
        }

        let failure = match outcome.result {
            Ok(details) if details.is_success() => {
                address.state = details.default_state().to_string();
                address.city = details.default_city().to_string();
                slot.state_options = details.state;
                slot.city_options = details.city;
                self.errors.remove(FieldKey::Postcode(index));
                return Merge::Applied;
            }
            Ok(details) => format!("status {}", details.status),
            Err(e) => e.to_string(),
        };

        warn!(index, postcode = %outcome.postcode, error = %failure, "Postcode lookup failed");
        address.clear_region();
        slot.clear_options();
        self.errors
            .insert(FieldKey::Postcode(index), POSTCODE_LOOKUP_MESSAGE);
        Merge::Applied
    }

    /// Set the postcode of address `index` and resolve it.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::AddressOutOfRange`] if there is no such address.
    pub async fn change_postcode(
        &mut self,
        index: usize,
        value: String,
    ) -> Result<Merge, FormError> {
        let Some(ticket) = self.begin_postcode_lookup(index, value)? else {
            return Ok(Merge::Applied);
        };
        let lookup = Arc::clone(&self.lookup);
        let outcome = ticket.run(lookup.as_ref()).await;
        Ok(self.apply_postcode(outcome))
    }

    /// Validate the draft and, when it is valid, write it to the store.
    ///
    /// The draft overwrites the record it was opened from, found by id at
    /// its current position. A new draft, or one whose record was deleted in
    /// the meantime, is appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn submit(&mut self) -> Result<SubmitOutcome, FormError> {
        let errors = validate_record(&self.draft);
        if !errors.is_empty() {
            debug!(errors = %errors, "Customer form has errors");
            self.errors = errors.clone();
            return Ok(SubmitOutcome::Invalid(errors));
        }

        let index = self.store.save_record(self.draft.clone())?;
        self.errors.clear();
        self.origin = Some(index);
        info!(index, "Customer form submitted");
        Ok(SubmitOutcome::Saved { index })
    }

    /// Snapshot of the form for rendering.
    #[must_use]
    pub fn view(&self) -> FormView {
        FormView {
            index: self.origin,
            draft: self.draft.clone(),
            errors: self.errors.clone(),
            pan_loading: self.pan_loading,
            addresses: self
                .slots
                .iter()
                .map(|slot| AddressView {
                    loading: slot.loading,
                    state_options: slot.state_options.clone(),
                    city_options: slot.city_options.clone(),
                })
                .collect(),
        }
    }

    fn address_mut(&mut self, index: usize) -> Result<&mut Address, FormError> {
        let len = self.draft.addresses.len();
        self.draft
            .addresses
            .get_mut(index)
            .ok_or(FormError::AddressOutOfRange { index, len })
    }

    fn reject_pan(&mut self) {
        self.draft.full_name.clear();
        self.errors.insert(FieldKey::Pan, PAN_REJECTED_MESSAGE);
    }

    fn new_slot(&mut self) -> AddressSlot {
        let key = SlotKey(self.next_slot);
        self.next_slot += 1;
        AddressSlot::new(key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::lookup::testing::{LookupCall, ScriptedLookup};
    use crate::storage::MemoryStorage;
    use customer_desk_core::validation::MOBILE_NUMBER_MESSAGE;

    fn store() -> RecordStore {
        RecordStore::new(Arc::new(MemoryStorage::new()), "customers")
    }

    fn lookup() -> Arc<ScriptedLookup> {
        Arc::new(
            ScriptedLookup::new()
                .with_pan("ABCDE1234F", "Jane Doe")
                .with_rejected_pan("ZZZZZ9999Z")
                .with_postcode("560001", &["Karnataka", "Kerala"], &["Bengaluru", "Mysuru"])
                .with_postcode("110001", &["Delhi"], &[])
                .with_unknown_postcode("999999"),
        )
    }

    fn new_form(store: &RecordStore, lookup: &Arc<ScriptedLookup>) -> FormController {
        FormController::open(store.clone(), lookup.clone(), None)
    }

    fn fill_valid(form: &mut FormController) {
        form.set_field(CustomerField::Pan, "ABCDE1234F".to_string());
        form.set_field(CustomerField::FullName, "Jane Doe".to_string());
        form.set_field(CustomerField::Email, "jane@x.com".to_string());
        form.set_field(CustomerField::MobileNumber, "9876543210".to_string());
        form.set_address_field(0, AddressField::AddressLine1, "1 Rd".to_string())
            .unwrap();
        form.set_address_field(0, AddressField::Postcode, "560001".to_string())
            .unwrap();
        form.set_address_field(0, AddressField::State, "Karnataka".to_string())
            .unwrap();
        form.set_address_field(0, AddressField::City, "Bengaluru".to_string())
            .unwrap();
    }

    #[test]
    fn test_open_without_index_starts_blank() {
        let form = new_form(&store(), &lookup());
        assert_eq!(form.origin(), None);
        assert!(form.draft().pan.is_empty());
        assert_eq!(form.draft().addresses.len(), 1);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_open_missing_index_starts_blank() {
        let store = store();
        let form = FormController::open(store, lookup(), Some(3));
        assert_eq!(form.origin(), None);
        assert_eq!(form.draft().addresses, vec![Address::default()]);
    }

    #[test]
    fn test_open_existing_index_hydrates() {
        let store = store();
        let mut record = CustomerRecord::draft();
        record.full_name = "Stored".to_string();
        store.save_all(&[record.clone()]).unwrap();

        let form = FormController::open(store, lookup(), Some(0));
        assert_eq!(form.origin(), Some(0));
        assert_eq!(form.draft(), &record);
    }

    #[test]
    fn test_open_record_without_addresses_gets_one() {
        let store = store();
        let mut record = CustomerRecord::draft();
        record.addresses.clear();
        store.save_all(&[record]).unwrap();

        let form = FormController::open(store, lookup(), Some(0));
        assert_eq!(form.draft().addresses.len(), 1);
        assert_eq!(form.view().addresses.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_pan_is_rejected_without_lookup() {
        let lookup = lookup();
        let mut form = new_form(&store(), &lookup);
        form.set_field(CustomerField::FullName, "Someone".to_string());

        for pan in ["abcde1234f", "ABCD1234F", "ABCDE12345", ""] {
            form.set_field(CustomerField::Pan, pan.to_string());
            form.blur_pan().await;
            assert_eq!(form.errors().get(FieldKey::Pan), Some(PAN_REJECTED_MESSAGE));
            assert!(form.draft().full_name.is_empty());
        }
        assert!(lookup.calls().is_empty());
        assert!(!form.pan_loading());
    }

    #[tokio::test]
    async fn test_valid_pan_fills_full_name() {
        let lookup = lookup();
        let mut form = new_form(&store(), &lookup);
        form.set_field(CustomerField::Pan, "ABCDE1234F".to_string());

        assert_eq!(form.blur_pan().await, Merge::Applied);
        assert_eq!(form.draft().full_name, "Jane Doe");
        assert!(!form.errors().contains(FieldKey::Pan));
        assert_eq!(
            lookup.calls(),
            [LookupCall::VerifyPan("ABCDE1234F".to_string())]
        );
    }

    #[tokio::test]
    async fn test_pan_success_clears_previous_error() {
        let mut form = new_form(&store(), &lookup());
        form.set_field(CustomerField::Pan, "bad".to_string());
        form.blur_pan().await;
        assert!(form.errors().contains(FieldKey::Pan));

        form.set_field(CustomerField::Pan, "ABCDE1234F".to_string());
        form.blur_pan().await;
        assert!(!form.errors().contains(FieldKey::Pan));
    }

    #[tokio::test]
    async fn test_rejected_or_failed_pan_blanks_full_name() {
        let mut form = new_form(&store(), &lookup());

        // ZZZZZ9999Z answers isValid=false, QQQQQ1111Q is unreachable.
        for pan in ["ZZZZZ9999Z", "QQQQQ1111Q"] {
            form.set_field(CustomerField::FullName, "Someone".to_string());
            form.set_field(CustomerField::Pan, pan.to_string());
            form.blur_pan().await;
            assert!(form.draft().full_name.is_empty());
            assert_eq!(form.errors().get(FieldKey::Pan), Some(PAN_REJECTED_MESSAGE));
        }
    }

    #[tokio::test]
    async fn test_pan_result_for_changed_pan_is_discarded() {
        let lookup = lookup();
        let mut form = new_form(&store(), &lookup);
        form.set_field(CustomerField::Pan, "ABCDE1234F".to_string());
        let ticket = form.begin_pan_lookup().unwrap();
        assert!(form.pan_loading());

        form.set_field(CustomerField::Pan, "ABCDE1234".to_string());
        let outcome = ticket.run(lookup.as_ref()).await;

        assert_eq!(form.apply_pan(outcome), Merge::Discarded);
        assert!(form.draft().full_name.is_empty());
        assert!(!form.pan_loading());
    }

    #[tokio::test]
    async fn test_superseded_pan_result_is_discarded() {
        let lookup = lookup();
        let mut form = new_form(&store(), &lookup);
        form.set_field(CustomerField::Pan, "ABCDE1234F".to_string());
        let first = form.begin_pan_lookup().unwrap();
        let second = form.begin_pan_lookup().unwrap();

        let first = first.run(lookup.as_ref()).await;
        assert_eq!(form.apply_pan(first), Merge::Discarded);
        assert!(form.pan_loading());

        let second = second.run(lookup.as_ref()).await;
        assert_eq!(form.apply_pan(second), Merge::Applied);
        assert!(!form.pan_loading());
        assert_eq!(form.draft().full_name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_postcode_lookup_selects_first_options() {
        let lookup = lookup();
        let mut form = new_form(&store(), &lookup);

        form.change_postcode(0, "560001".to_string()).await.unwrap();

        let address = &form.draft().addresses[0];
        assert_eq!(address.postcode, "560001");
        assert_eq!(address.state, "Karnataka");
        assert_eq!(address.city, "Bengaluru");
        assert_eq!(form.state_options(0).len(), 2);
        assert_eq!(form.city_options(0)[1].name, "Mysuru");
        assert!(!form.postcode_loading(0));
        assert!(!form.errors().contains(FieldKey::Postcode(0)));
    }

    #[tokio::test]
    async fn test_postcode_empty_option_list_selects_nothing() {
        let mut form = new_form(&store(), &lookup());
        form.change_postcode(0, "110001".to_string()).await.unwrap();

        let address = &form.draft().addresses[0];
        assert_eq!(address.state, "Delhi");
        assert_eq!(address.city, "");
    }

    #[tokio::test]
    async fn test_malformed_postcode_clears_region_without_lookup() {
        let lookup = lookup();
        let mut form = new_form(&store(), &lookup);
        form.change_postcode(0, "560001".to_string()).await.unwrap();
        let calls_before = lookup.calls().len();

        form.change_postcode(0, "5600".to_string()).await.unwrap();

        let address = &form.draft().addresses[0];
        assert_eq!(address.postcode, "5600");
        assert!(address.state.is_empty());
        assert!(address.city.is_empty());
        assert!(form.state_options(0).is_empty());
        assert_eq!(
            form.errors().get(FieldKey::Postcode(0)),
            Some(POSTCODE_FORMAT_MESSAGE)
        );
        assert_eq!(lookup.calls().len(), calls_before);
    }

    #[tokio::test]
    async fn test_failed_postcode_lookup_sets_error() {
        let mut form = new_form(&store(), &lookup());
        form.set_address_field(0, AddressField::State, "Stale".to_string())
            .unwrap();

        // 999999 answers a non-success status, 123456 is unreachable.
        for code in ["999999", "123456"] {
            form.change_postcode(0, code.to_string()).await.unwrap();
            assert!(form.draft().addresses[0].state.is_empty());
            assert_eq!(
                form.errors().get(FieldKey::Postcode(0)),
                Some(POSTCODE_LOOKUP_MESSAGE)
            );
        }
    }

    #[tokio::test]
    async fn test_postcode_result_for_changed_postcode_is_discarded() {
        let lookup = lookup();
        let mut form = new_form(&store(), &lookup);
        let ticket = form
            .begin_postcode_lookup(0, "560001".to_string())
            .unwrap()
            .unwrap();
        form.set_address_field(0, AddressField::Postcode, "56000".to_string())
            .unwrap();

        let outcome = ticket.run(lookup.as_ref()).await;
        assert_eq!(form.apply_postcode(outcome), Merge::Discarded);
        assert!(form.draft().addresses[0].state.is_empty());
        assert!(!form.postcode_loading(0));
    }

    #[tokio::test]
    async fn test_superseded_postcode_result_is_discarded() {
        let lookup = lookup();
        let mut form = new_form(&store(), &lookup);
        let first = form
            .begin_postcode_lookup(0, "560001".to_string())
            .unwrap()
            .unwrap();
        let second = form
            .begin_postcode_lookup(0, "110001".to_string())
            .unwrap()
            .unwrap();

        let second = second.run(lookup.as_ref()).await;
        assert_eq!(form.apply_postcode(second), Merge::Applied);
        let first = first.run(lookup.as_ref()).await;
        assert_eq!(form.apply_postcode(first), Merge::Discarded);

        assert_eq!(form.draft().addresses[0].state, "Delhi");
    }

    #[tokio::test]
    async fn test_postcode_result_follows_moved_address() {
        let lookup = lookup();
        let mut form = new_form(&store(), &lookup);
        let second = form.add_address();
        let ticket = form
            .begin_postcode_lookup(second, "560001".to_string())
            .unwrap()
            .unwrap();

        form.remove_address(0).unwrap();
        let outcome = ticket.run(lookup.as_ref()).await;

        assert_eq!(form.apply_postcode(outcome), Merge::Applied);
        assert_eq!(form.draft().addresses.len(), 1);
        assert_eq!(form.draft().addresses[0].state, "Karnataka");
        assert_eq!(form.state_options(0).len(), 2);
    }

    #[tokio::test]
    async fn test_postcode_result_for_removed_address_is_discarded() {
        let lookup = lookup();
        let mut form = new_form(&store(), &lookup);
        form.add_address();
        let ticket = form
            .begin_postcode_lookup(1, "560001".to_string())
            .unwrap()
            .unwrap();
        form.remove_address(1).unwrap();

        let outcome = ticket.run(lookup.as_ref()).await;
        assert_eq!(form.apply_postcode(outcome), Merge::Discarded);
        assert!(form.draft().addresses[0].state.is_empty());
    }

    #[test]
    fn test_address_out_of_range() {
        let mut form = new_form(&store(), &lookup());
        assert!(matches!(
            form.set_address_field(1, AddressField::City, "x".to_string()),
            Err(FormError::AddressOutOfRange { index: 1, len: 1 })
        ));
        assert!(matches!(
            form.begin_postcode_lookup(4, "560001".to_string()),
            Err(FormError::AddressOutOfRange { index: 4, len: 1 })
        ));
        assert!(matches!(
            form.remove_address(2),
            Err(FormError::AddressOutOfRange { .. })
        ));
    }

    #[test]
    fn test_last_address_cannot_be_removed() {
        let mut form = new_form(&store(), &lookup());
        assert!(matches!(form.remove_address(0), Err(FormError::LastAddress)));
        assert_eq!(form.draft().addresses.len(), 1);
    }

    #[test]
    fn test_remove_address_remaps_errors() {
        let mut form = new_form(&store(), &lookup());
        form.add_address();
        form.add_address();
        form.set_address_field(2, AddressField::AddressLine1, "third".to_string())
            .unwrap();

        let SubmitOutcome::Invalid(errors) = form.submit().unwrap() else {
            panic!("blank form should not submit");
        };
        assert!(errors.contains(FieldKey::AddressLine1(0)));
        assert!(!errors.contains(FieldKey::AddressLine1(2)));
        assert!(errors.contains(FieldKey::Postcode(2)));

        form.remove_address(1).unwrap();

        assert_eq!(form.draft().addresses[1].address_line1, "third");
        assert!(form.errors().contains(FieldKey::AddressLine1(0)));
        assert!(!form.errors().contains(FieldKey::AddressLine1(1)));
        assert!(form.errors().contains(FieldKey::Postcode(1)));
        assert!(!form.errors().contains(FieldKey::Postcode(2)));
    }

    #[test]
    fn test_submit_valid_draft_appends() {
        let store = store();
        let mut form = new_form(&store, &lookup());
        fill_valid(&mut form);

        assert_eq!(form.submit().unwrap(), SubmitOutcome::Saved { index: 0 });
        assert!(form.errors().is_empty());
        assert_eq!(form.origin(), Some(0));
        assert_eq!(store.load_all(), vec![form.draft().clone()]);
    }

    #[test]
    fn test_submit_short_mobile_number_is_blocked() {
        let store = store();
        let mut form = new_form(&store, &lookup());
        fill_valid(&mut form);
        form.set_field(CustomerField::MobileNumber, "12345".to_string());

        let SubmitOutcome::Invalid(errors) = form.submit().unwrap() else {
            panic!("short mobile number should not submit");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(FieldKey::MobileNumber), Some(MOBILE_NUMBER_MESSAGE));
        assert_eq!(form.errors(), &errors);
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn test_submit_existing_overwrites_in_place() {
        let store = store();
        let mut first = new_form(&store, &lookup());
        fill_valid(&mut first);
        first.submit().unwrap();
        let mut second = new_form(&store, &lookup());
        fill_valid(&mut second);
        second.submit().unwrap();

        let mut edit = FormController::open(store.clone(), lookup(), Some(0));
        edit.set_field(CustomerField::FullName, "Jane Roe".to_string());
        assert_eq!(edit.submit().unwrap(), SubmitOutcome::Saved { index: 0 });

        let records = store.load_all();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].full_name, "Jane Roe");
    }

    #[test]
    fn test_submit_after_earlier_record_deleted_follows_id() {
        let store = store();
        for _ in 0..3 {
            let mut form = new_form(&store, &lookup());
            fill_valid(&mut form);
            form.submit().unwrap();
        }

        let mut edit = FormController::open(store.clone(), lookup(), Some(2));
        store.delete_at(0).unwrap();
        edit.set_field(CustomerField::FullName, "Moved".to_string());

        assert_eq!(edit.submit().unwrap(), SubmitOutcome::Saved { index: 1 });
        let records = store.load_all();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].full_name, "Moved");
    }

    #[test]
    fn test_submit_after_own_record_deleted_appends() {
        let store = store();
        let mut form = new_form(&store, &lookup());
        fill_valid(&mut form);
        form.submit().unwrap();

        let mut edit = FormController::open(store.clone(), lookup(), Some(0));
        store.delete_at(0).unwrap();
        assert_eq!(edit.submit().unwrap(), SubmitOutcome::Saved { index: 0 });
        assert_eq!(store.load_all().len(), 1);
    }

    #[tokio::test]
    async fn test_view_reflects_state() {
        let mut form = new_form(&store(), &lookup());
        form.add_address();
        form.change_postcode(1, "560001".to_string()).await.unwrap();
        form.set_field(CustomerField::Pan, "ABCDE1234F".to_string());
        let _ticket = form.begin_pan_lookup().unwrap();

        let view = serde_json::to_value(form.view()).unwrap();
        assert!(view["index"].is_null());
        assert_eq!(view["panLoading"], true);
        assert_eq!(view["addresses"].as_array().unwrap().len(), 2);
        assert_eq!(view["addresses"][1]["stateOptions"][0]["name"], "Karnataka");
        assert_eq!(view["draft"]["addresses"][1]["city"], "Bengaluru");
    }
}
