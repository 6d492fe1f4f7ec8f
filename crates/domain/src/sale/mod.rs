//! Sale aggregate and related types.

mod aggregate;
mod events;
mod line_item;
mod transfer;

pub use aggregate::Sale;
pub use events::{SaleCancelledData, SaleChangedData, SaleCreatedData, SaleEvent};
pub use line_item::LineItem;
pub use transfer::{LineItemDto, SaleDto};

use common::ItemId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Maximum length of a client name, in characters.
pub const MAX_CLIENT_LEN: usize = 100;

/// Maximum length of a branch name, in characters.
pub const MAX_BRANCH_LEN: usize = 50;

/// Maximum length of a product name, in characters.
pub const MAX_PRODUCT_LEN: usize = 100;

/// Maximum number of line items in one sale.
///
/// Keeps the sum of line totals inside the range of `Decimal`.
pub const MAX_ITEMS: usize = 1000;

/// Largest amount accepted for a unit price or discount.
///
/// Matches the `NUMERIC(18,2)` columns the amounts are stored in.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_808_348_671, 232_830_643, 0, false, 2);

/// Validation errors raised while building a sale or one of its line items.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    /// Quantity must be strictly positive.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: i32 },

    /// Unit price must not be negative.
    #[error("Invalid unit price: {unit_price} (must not be negative)")]
    NegativeUnitPrice { unit_price: Decimal },

    /// Discount must not be negative.
    #[error("Invalid discount: {discount} (must not be negative)")]
    NegativeDiscount { discount: Decimal },

    /// Amount does not fit the stored precision.
    #[error("Invalid {field}: {amount} exceeds the maximum of {MAX_AMOUNT}")]
    AmountOutOfRange { field: &'static str, amount: Decimal },

    /// A required text field is empty.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// Two line items of the same sale share an ID.
    #[error("Duplicate line item ID: {item_id}")]
    DuplicateItem { item_id: ItemId },

    /// The sale has more line items than allowed.
    #[error("Too many line items: {actual} (maximum {max})")]
    TooManyItems { max: usize, actual: usize },

    /// A text field exceeds its maximum length.
    #[error("{field} is too long: {actual} characters (maximum {max})")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

pub(crate) fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), SaleError> {
    if value.trim().is_empty() {
        return Err(SaleError::MissingField { field });
    }

    let actual = value.chars().count();
    if actual > max {
        return Err(SaleError::FieldTooLong { field, max, actual });
    }

    Ok(())
}
