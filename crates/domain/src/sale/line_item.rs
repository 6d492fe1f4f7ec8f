//! Line item owned by a sale.

use common::ItemId;
use rust_decimal::Decimal;

use super::{MAX_AMOUNT, MAX_PRODUCT_LEN, SaleError, require_text};

/// A single product line within a sale.
///
/// Construction validates every invariant, so a `LineItem` value is always
/// valid and can be added to a sale without further checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    id: ItemId,
    product: String,
    quantity: i32,
    unit_price: Decimal,
    discount: Decimal,
}

impl LineItem {
    /// Creates a new line item.
    ///
    /// Fails when quantity is not positive, when the unit price or discount is
    /// negative or out of range, or when the product name is blank or longer
    /// than 100 characters.
    pub fn new(
        id: ItemId,
        product: impl Into<String>,
        quantity: i32,
        unit_price: Decimal,
        discount: Decimal,
    ) -> Result<Self, SaleError> {
        if quantity <= 0 {
            return Err(SaleError::InvalidQuantity { quantity });
        }

        if unit_price < Decimal::ZERO {
            return Err(SaleError::NegativeUnitPrice { unit_price });
        }

        if discount < Decimal::ZERO {
            return Err(SaleError::NegativeDiscount { discount });
        }

        check_range("unit price", unit_price)?;
        check_range("discount", discount)?;

        let product = product.into();
        require_text("product", &product, MAX_PRODUCT_LEN)?;

        Ok(Self {
            id,
            product,
            quantity,
            unit_price,
            discount,
        })
    }

    /// Creates a new line item without a discount.
    pub fn with_no_discount(
        id: ItemId,
        product: impl Into<String>,
        quantity: i32,
        unit_price: Decimal,
    ) -> Result<Self, SaleError> {
        Self::new(id, product, quantity, unit_price, Decimal::ZERO)
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Discount applied to each unit.
    pub fn discount(&self) -> Decimal {
        self.discount
    }

    /// Returns `quantity * (unit_price - discount)`.
    ///
    /// Computed on every call; never stored.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * (self.unit_price - self.discount)
    }
}

fn check_range(field: &'static str, amount: Decimal) -> Result<(), SaleError> {
    if amount > MAX_AMOUNT {
        return Err(SaleError::AmountOutOfRange { field, amount });
    }
    Ok(())
}
