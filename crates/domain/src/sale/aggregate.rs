//! Sale aggregate implementation.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use common::{ItemId, SaleId};
use rust_decimal::Decimal;

use super::{LineItem, MAX_BRANCH_LEN, MAX_CLIENT_LEN, SaleError, require_text};

/// Sale aggregate root.
///
/// A sale header plus the ordered line items it exclusively owns. Totals are
/// derived from the current items on every read and are never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    /// Unique sale identifier, fixed at creation.
    id: SaleId,

    /// When the sale took place.
    sale_date: DateTime<Utc>,

    /// Name of the buying client.
    client: String,

    /// Branch where the sale was made.
    branch: String,

    /// One-way cancellation flag.
    cancelled: bool,

    /// Line items in insertion order.
    items: Vec<LineItem>,
}

impl Sale {
    /// Creates a sale with no items that is not cancelled.
    ///
    /// Header fields are not validated here; see [`Sale::validate_header`].
    pub fn new(
        id: SaleId,
        sale_date: DateTime<Utc>,
        client: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            id,
            sale_date,
            client: client.into(),
            branch: branch.into(),
            cancelled: false,
            items: Vec::new(),
        }
    }

    /// Checks the header fields against the limits of the sales schema.
    ///
    /// Client and branch are required; client is at most 100 characters and
    /// branch at most 50.
    pub fn validate_header(client: &str, branch: &str) -> Result<(), SaleError> {
        require_text("client", client, MAX_CLIENT_LEN)?;
        require_text("branch", branch, MAX_BRANCH_LEN)
    }
}

// Query methods
impl Sale {
    pub fn id(&self) -> SaleId {
        self.id
    }

    pub fn sale_date(&self) -> DateTime<Utc> {
        self.sale_date
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Returns true once the sale has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Returns the line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Returns a line item by ID.
    pub fn get_item(&self, item_id: ItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id() == item_id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the first item ID that appears more than once, if any.
    pub fn duplicate_item_id(&self) -> Option<ItemId> {
        let mut seen = HashSet::with_capacity(self.items.len());
        self.items
            .iter()
            .map(LineItem::id)
            .find(|id| !seen.insert(*id))
    }

    /// Sum of the line totals of all items.
    ///
    /// Cannot overflow for sales within [`MAX_ITEMS`](super::MAX_ITEMS).
    pub fn total_value(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Sum of the per-item discounts.
    ///
    /// Each item contributes its unit discount once, regardless of quantity.
    pub fn total_discount(&self) -> Decimal {
        self.items.iter().map(LineItem::discount).sum()
    }
}

// Mutations
impl Sale {
    /// Appends an item to the sale.
    pub fn add_item(&mut self, item: LineItem) {
        self.items.push(item);
    }

    /// Removes the first item with the given ID.
    ///
    /// Returns false, leaving the sale untouched, if no such item exists.
    pub fn remove_item(&mut self, item_id: ItemId) -> bool {
        match self.items.iter().position(|item| item.id() == item_id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Marks the sale as cancelled. There is no way back.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}
