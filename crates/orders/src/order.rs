use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pluribus_catalog::{Listing, ListingStatus};
use pluribus_core::{DomainError, ListingId, OrderId, UserId};

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
    Cancelled,
}

/// A buyer's order against one listing.
///
/// Price fields are captured at placement; later listing edits never change
/// an existing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub listing_id: ListingId,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub quantity: u32,
    pub unit_price_cents: u64,
    pub total_cents: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Place an order against a listing snapshot.
    ///
    /// Validates everything except stock, which the listing store checks
    /// atomically at reservation time.
    pub fn place(
        listing: &Listing,
        buyer_id: UserId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        if listing.status != ListingStatus::Active {
            return Err(DomainError::invariant("listing is not active"));
        }
        if listing.seller_id == buyer_id {
            return Err(DomainError::invariant(
                "buyers cannot order their own listing",
            ));
        }

        let total_cents = listing
            .price_cents
            .checked_mul(u64::from(quantity))
            .ok_or_else(|| DomainError::invariant("order total overflows"))?;

        Ok(Self {
            id: OrderId::new(),
            listing_id: listing.id,
            buyer_id,
            seller_id: listing.seller_id,
            quantity,
            unit_price_cents: listing.price_cents,
            total_cents,
            status: OrderStatus::Placed,
            created_at: now,
        })
    }

    /// Cancel a placed order.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        match self.status {
            OrderStatus::Placed => {
                self.status = OrderStatus::Cancelled;
                Ok(())
            }
            OrderStatus::Cancelled => Err(DomainError::conflict("order is already cancelled")),
        }
    }
}
