//! Transfer representation of a sale and its mapping to the aggregate.

use chrono::{DateTime, Utc};
use common::{ItemId, SaleId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LineItem, MAX_ITEMS, Sale, SaleError};

/// Wire-shaped view of a sale used at the system boundary.
///
/// Derived fields (`totalValue`, `totalDiscount`, `lineTotal`) are filled when
/// mapping from an aggregate and ignored when mapping back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDto {
    #[serde(default)]
    pub id: SaleId,

    #[serde(default = "Utc::now")]
    pub sale_date: DateTime<Utc>,

    pub client: String,

    pub branch: String,

    #[serde(default)]
    pub cancelled: bool,

    #[serde(default)]
    pub items: Vec<LineItemDto>,

    #[serde(default, with = "rust_decimal::serde::arbitrary_precision")]
    pub total_value: Decimal,

    #[serde(default, with = "rust_decimal::serde::arbitrary_precision")]
    pub total_discount: Decimal,
}

/// Wire-shaped view of a line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDto {
    #[serde(default)]
    pub id: ItemId,

    pub product: String,

    pub quantity: i32,

    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub unit_price: Decimal,

    #[serde(default, with = "rust_decimal::serde::arbitrary_precision")]
    pub discount: Decimal,

    #[serde(default, with = "rust_decimal::serde::arbitrary_precision")]
    pub line_total: Decimal,
}

impl SaleDto {
    /// Creates an inbound transfer object for a new sale dated now.
    pub fn new(client: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            id: SaleId::new(),
            sale_date: Utc::now(),
            client: client.into(),
            branch: branch.into(),
            cancelled: false,
            items: Vec::new(),
            total_value: Decimal::ZERO,
            total_discount: Decimal::ZERO,
        }
    }

    /// Sets the sale ID.
    pub fn with_id(mut self, id: SaleId) -> Self {
        self.id = id;
        self
    }

    /// Appends an item.
    pub fn with_item(mut self, item: LineItemDto) -> Self {
        self.items.push(item);
        self
    }
}

impl LineItemDto {
    /// Creates an inbound line item with a fresh ID.
    pub fn new(
        product: impl Into<String>,
        quantity: i32,
        unit_price: Decimal,
        discount: Decimal,
    ) -> Self {
        Self {
            id: ItemId::new(),
            product: product.into(),
            quantity,
            unit_price,
            discount,
            line_total: Decimal::ZERO,
        }
    }
}

impl From<&LineItem> for LineItemDto {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id(),
            product: item.product().to_string(),
            quantity: item.quantity(),
            unit_price: item.unit_price(),
            discount: item.discount(),
            line_total: item.line_total(),
        }
    }
}

impl From<&Sale> for SaleDto {
    fn from(sale: &Sale) -> Self {
        Self {
            id: sale.id(),
            sale_date: sale.sale_date(),
            client: sale.client().to_string(),
            branch: sale.branch().to_string(),
            cancelled: sale.is_cancelled(),
            items: sale.items().iter().map(LineItemDto::from).collect(),
            total_value: sale.total_value(),
            total_discount: sale.total_discount(),
        }
    }
}

impl TryFrom<LineItemDto> for LineItem {
    type Error = SaleError;

    fn try_from(dto: LineItemDto) -> Result<Self, Self::Error> {
        LineItem::new(
            dto.id,
            dto.product,
            dto.quantity,
            dto.unit_price,
            dto.discount,
        )
    }
}

impl TryFrom<SaleDto> for Sale {
    type Error = SaleError;

    /// Builds the aggregate, validating the header and item count first and
    /// then each item in order. Item IDs must be unique within the sale. The
    /// first violation is returned.
    fn try_from(dto: SaleDto) -> Result<Self, Self::Error> {
        Sale::validate_header(&dto.client, &dto.branch)?;

        if dto.items.len() > MAX_ITEMS {
            return Err(SaleError::TooManyItems {
                max: MAX_ITEMS,
                actual: dto.items.len(),
            });
        }

        let mut sale = Sale::new(dto.id, dto.sale_date, dto.client, dto.branch);
        for item in dto.items {
            let item = LineItem::try_from(item)?;
            if sale.get_item(item.id()).is_some() {
                return Err(SaleError::DuplicateItem { item_id: item.id() });
            }
            sale.add_item(item);
        }
        if dto.cancelled {
            sale.cancel();
        }

        Ok(sale)
    }
}
