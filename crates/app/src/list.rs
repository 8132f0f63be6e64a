//! The customer list: summaries, and navigation into the form.

use std::sync::Arc;

use customer_desk_core::{CustomerId, CustomerRecord};
use serde::Serialize;
use tracing::instrument;

use crate::form::FormController;
use crate::lookup::LookupService;
use crate::store::{RecordStore, StoreError};

/// Where the list sends the user to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRoute {
    Create,
    Edit(usize),
}

impl FormRoute {
    /// Path of the form view for this route.
    #[must_use]
    pub fn path(self) -> String {
        match self {
            Self::Create => "/customer-form".to_string(),
            Self::Edit(index) => format!("/customer-form/{index}"),
        }
    }

    /// Record index carried by the route.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Create => None,
            Self::Edit(index) => Some(index),
        }
    }
}

/// One row of the list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub index: usize,
    pub id: Option<CustomerId>,
    pub pan: String,
    pub full_name: String,
    pub email: String,
    pub mobile_number: String,
    pub addresses: Vec<String>,
}

impl CustomerSummary {
    fn new(index: usize, record: CustomerRecord) -> Self {
        Self {
            index,
            id: record.id,
            addresses: record.addresses.iter().map(|a| a.summary()).collect(),
            pan: record.pan,
            full_name: record.full_name,
            email: record.email,
            mobile_number: record.mobile_number,
        }
    }
}

/// Reads the store for the list view and dispatches its actions.
#[derive(Debug, Clone)]
pub struct ListController {
    store: RecordStore,
}

impl ListController {
    #[must_use]
    pub const fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Every record in display order.
    #[must_use]
    pub fn list(&self) -> Vec<CustomerRecord> {
        self.store.load_all()
    }

    /// Every record rendered for display.
    #[must_use]
    pub fn summaries(&self) -> Vec<CustomerSummary> {
        self.list()
            .into_iter()
            .enumerate()
            .map(|(index, record)| CustomerSummary::new(index, record))
            .collect()
    }

    #[must_use]
    pub const fn create(&self) -> FormRoute {
        FormRoute::Create
    }

    #[must_use]
    pub const fn edit(&self, index: usize) -> FormRoute {
        FormRoute::Edit(index)
    }

    /// Delete the record at `index` and return the refreshed list.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    #[instrument(skip(self))]
    pub fn delete(&self, index: usize) -> Result<Vec<CustomerSummary>, StoreError> {
        self.store.delete_at(index)?;
        Ok(self.summaries())
    }

    /// Open the form a route points at.
    #[must_use]
    pub fn open(&self, route: FormRoute, lookup: Arc<dyn LookupService>) -> FormController {
        FormController::open(self.store.clone(), lookup, route.index())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::lookup::testing::ScriptedLookup;
    use crate::storage::MemoryStorage;
    use customer_desk_core::Address;

    fn customer(name: &str, line1: &str) -> CustomerRecord {
        CustomerRecord {
            pan: "ABCDE1234F".to_string(),
            full_name: name.to_string(),
            email: "a@b.co".to_string(),
            mobile_number: "9876543210".to_string(),
            addresses: vec![Address {
                address_line1: line1.to_string(),
                address_line2: "Floor 2".to_string(),
                postcode: "560001".to_string(),
                state: "Karnataka".to_string(),
                city: "Bengaluru".to_string(),
            }],
            ..CustomerRecord::draft()
        }
    }

    fn controller(records: &[CustomerRecord]) -> ListController {
        let store = RecordStore::new(Arc::new(MemoryStorage::new()), "customers");
        store.save_all(records).unwrap();
        ListController::new(store)
    }

    #[test]
    fn test_summaries_render_addresses() {
        let list = controller(&[customer("A", "1 Rd"), customer("B", "2 Rd")]);
        let summaries = list.summaries();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].index, 1);
        assert_eq!(summaries[1].full_name, "B");
        assert_eq!(
            summaries[0].addresses,
            ["1 Rd, Floor 2, Bengaluru, Karnataka - 560001"]
        );
    }

    #[test]
    fn test_summary_json_shape() {
        let list = controller(&[customer("A", "1 Rd")]);
        let json = serde_json::to_value(list.summaries()).unwrap();

        assert_eq!(json[0]["index"], 0);
        assert_eq!(json[0]["fullName"], "A");
        assert_eq!(json[0]["mobileNumber"], "9876543210");
        assert!(json[0]["id"].is_string());
    }

    #[test]
    fn test_delete_returns_refreshed_list() {
        let list = controller(&[customer("A", "1"), customer("B", "2"), customer("C", "3")]);
        let after = list.delete(0).unwrap();

        let names: Vec<_> = after.iter().map(|s| s.full_name.as_str()).collect();
        assert_eq!(names, ["B", "C"]);
        assert_eq!(after[0].index, 0);
    }

    #[test]
    fn test_delete_out_of_range_keeps_list() {
        let list = controller(&[customer("A", "1")]);
        assert_eq!(list.delete(7).unwrap().len(), 1);
    }

    #[test]
    fn test_routes() {
        let list = controller(&[]);
        assert_eq!(list.create().path(), "/customer-form");
        assert_eq!(list.edit(4).path(), "/customer-form/4");
        assert_eq!(list.edit(4).index(), Some(4));
        assert_eq!(list.create().index(), None);
    }

    #[test]
    fn test_open_edit_route_hydrates_form() {
        let list = controller(&[customer("A", "1"), customer("B", "2")]);
        let form = list.open(list.edit(1), Arc::new(ScriptedLookup::new()));

        assert_eq!(form.origin(), Some(1));
        assert_eq!(form.draft().full_name, "B");

        let form = list.open(list.create(), Arc::new(ScriptedLookup::new()));
        assert_eq!(form.origin(), None);
    }
}
