use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pluribus_core::{DomainError, ListingId, UserId};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Listing status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Archived,
}

/// A published catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub seller_id: UserId,
    pub title: String,
    pub description: String,
    /// Unit price in the smallest currency unit.
    pub price_cents: u64,
    /// Units still available for ordering.
    pub quantity: u32,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Whether an order can currently be placed against this listing.
    pub fn can_be_ordered(&self) -> bool {
        self.status == ListingStatus::Active && self.quantity > 0
    }
}

/// Validated input for publishing a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price_cents: u64,
    pub quantity: u32,
}

impl NewListing {
    pub fn validate(&self) -> Result<(), DomainError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::validation(format!(
                "title cannot exceed {MAX_TITLE_LEN} characters"
            )));
        }
        if self.description.trim().chars().count() > MAX_DESCRIPTION_LEN {
            return Err(DomainError::validation(format!(
                "description cannot exceed {MAX_DESCRIPTION_LEN} characters"
            )));
        }
        if self.price_cents == 0 {
            return Err(DomainError::validation("price must be positive"));
        }
        if self.quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        Ok(())
    }

    /// Validate and publish as an active listing owned by `seller_id`.
    pub fn publish(self, seller_id: UserId, now: DateTime<Utc>) -> Result<Listing, DomainError> {
        self.validate()?;
        Ok(Listing {
            id: ListingId::new(),
            seller_id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            price_cents: self.price_cents,
            quantity: self.quantity,
            status: ListingStatus::Active,
            created_at: now,
        })
    }
}
