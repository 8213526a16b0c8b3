use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use pluribus_core::{ListingId, UserId};

use crate::listing::{Listing, ListingStatus};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListingStoreError {
    #[error("listing not found")]
    NotFound,

    #[error("listing is archived")]
    Archived,

    #[error("insufficient quantity: {available} available, {requested} requested")]
    InsufficientQuantity { available: u32, requested: u32 },

    #[error("listing already exists")]
    Duplicate,
}

/// Storage abstraction for listings (the query interface the API talks to).
pub trait ListingStore: Send + Sync {
    fn insert(&self, listing: Listing) -> Result<(), ListingStoreError>;
    fn get(&self, id: ListingId) -> Option<Listing>;
    /// Active listings, newest first.
    fn list_active(&self) -> Vec<Listing>;
    /// All of a seller's listings (any status), newest first.
    fn list_by_seller(&self, seller_id: UserId) -> Vec<Listing>;
    /// Archive a listing. Archiving an archived listing is a no-op.
    fn archive(&self, id: ListingId) -> Result<(), ListingStoreError>;
    /// Atomically check and decrement available quantity, returning the
    /// updated listing.
    fn reserve(&self, id: ListingId, quantity: u32) -> Result<Listing, ListingStoreError>;
    /// Return previously reserved quantity (order cancellation). Works on
    /// archived listings too; the stock just stays off the market.
    fn release(&self, id: ListingId, quantity: u32) -> Result<Listing, ListingStoreError>;
}

impl<S> ListingStore for Arc<S>
where
    S: ListingStore + ?Sized,
{
    fn insert(&self, listing: Listing) -> Result<(), ListingStoreError> {
        (**self).insert(listing)
    }

    fn get(&self, id: ListingId) -> Option<Listing> {
        (**self).get(id)
    }

    fn list_active(&self) -> Vec<Listing> {
        (**self).list_active()
    }

    fn list_by_seller(&self, seller_id: UserId) -> Vec<Listing> {
        (**self).list_by_seller(seller_id)
    }

    fn archive(&self, id: ListingId) -> Result<(), ListingStoreError> {
        (**self).archive(id)
    }

    fn reserve(&self, id: ListingId, quantity: u32) -> Result<Listing, ListingStoreError> {
        (**self).reserve(id, quantity)
    }

    fn release(&self, id: ListingId, quantity: u32) -> Result<Listing, ListingStoreError> {
        (**self).release(id, quantity)
    }
}

/// In-memory listing store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryListingStore {
    inner: RwLock<HashMap<ListingId, Listing>>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<ListingId, Listing>> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<ListingId, Listing>> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn newest_first(items: &mut [Listing]) {
    items.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
    });
}

impl ListingStore for InMemoryListingStore {
    fn insert(&self, listing: Listing) -> Result<(), ListingStoreError> {
        let mut map = self.write();
        if map.contains_key(&listing.id) {
            return Err(ListingStoreError::Duplicate);
        }
        map.insert(listing.id, listing);
        Ok(())
    }

    fn get(&self, id: ListingId) -> Option<Listing> {
        self.read().get(&id).cloned()
    }

    fn list_active(&self) -> Vec<Listing> {
        let mut items: Vec<Listing> = self
            .read()
            .values()
            .filter(|l| l.status == ListingStatus::Active)
            .cloned()
            .collect();
        newest_first(&mut items);
        items
    }

    fn list_by_seller(&self, seller_id: UserId) -> Vec<Listing> {
        let mut items: Vec<Listing> = self
            .read()
            .values()
            .filter(|l| l.seller_id == seller_id)
            .cloned()
            .collect();
        newest_first(&mut items);
        items
    }

    fn archive(&self, id: ListingId) -> Result<(), ListingStoreError> {
        let mut map = self.write();
        let listing = map.get_mut(&id).ok_or(ListingStoreError::NotFound)?;
        listing.status = ListingStatus::Archived;
        Ok(())
    }

    fn reserve(&self, id: ListingId, quantity: u32) -> Result<Listing, ListingStoreError> {
        let mut map = self.write();
        let listing = map.get_mut(&id).ok_or(ListingStoreError::NotFound)?;

        if listing.status == ListingStatus::Archived {
            return Err(ListingStoreError::Archived);
        }
        if listing.quantity < quantity {
            return Err(ListingStoreError::InsufficientQuantity {
                available: listing.quantity,
                requested: quantity,
            });
        }

        listing.quantity -= quantity;
        Ok(listing.clone())
    }

    fn release(&self, id: ListingId, quantity: u32) -> Result<Listing, ListingStoreError> {
        let mut map = self.write();
        let listing = map.get_mut(&id).ok_or(ListingStoreError::NotFound)?;
        listing.quantity = listing.quantity.saturating_add(quantity);
        Ok(listing.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::listing::NewListing;

    fn published(seller: UserId, quantity: u32) -> Listing {
        NewListing {
            title: "Ceramic mug".to_string(),
            description: String::new(),
            price_cents: 1_200,
            quantity,
        }
        .publish(seller, Utc::now())
        .unwrap()
    }

    #[test]
    fn insert_then_get() {
        let store = InMemoryListingStore::new();
        let listing = published(UserId::new(), 5);
        store.insert(listing.clone()).unwrap();
        assert_eq!(store.get(listing.id), Some(listing));
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let store = InMemoryListingStore::new();
        let listing = published(UserId::new(), 5);
        store.insert(listing.clone()).unwrap();
        assert_eq!(
            store.insert(listing),
            Err(ListingStoreError::Duplicate)
        );
    }

    #[test]
    fn list_active_excludes_archived() {
        let store = InMemoryListingStore::new();
        let keep = published(UserId::new(), 5);
        let drop = published(UserId::new(), 5);
        store.insert(keep.clone()).unwrap();
        store.insert(drop.clone()).unwrap();
        store.archive(drop.id).unwrap();

        let active = store.list_active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, keep.id);
    }

    #[test]
    fn list_by_seller_includes_archived() {
        let store = InMemoryListingStore::new();
        let seller = UserId::new();
        let a = published(seller, 5);
        let b = published(seller, 5);
        let other = published(UserId::new(), 5);
        store.insert(a.clone()).unwrap();
        store.insert(b.clone()).unwrap();
        store.insert(other).unwrap();
        store.archive(b.id).unwrap();

        assert_eq!(store.list_by_seller(seller).len(), 2);
    }

    #[test]
    fn archive_is_idempotent() {
        let store = InMemoryListingStore::new();
        let listing = published(UserId::new(), 5);
        store.insert(listing.clone()).unwrap();
        store.archive(listing.id).unwrap();
        store.archive(listing.id).unwrap();
        assert_eq!(store.get(listing.id).unwrap().status, ListingStatus::Archived);
    }

    #[test]
    fn reserve_decrements_quantity() {
        let store = InMemoryListingStore::new();
        let listing = published(UserId::new(), 5);
        store.insert(listing.clone()).unwrap();

        let updated = store.reserve(listing.id, 2).unwrap();
        assert_eq!(updated.quantity, 3);
        assert_eq!(store.get(listing.id).unwrap().quantity, 3);
    }

    #[test]
    fn reserve_rejects_shortfall_without_mutating() {
        let store = InMemoryListingStore::new();
        let listing = published(UserId::new(), 2);
        store.insert(listing.clone()).unwrap();

        let err = store.reserve(listing.id, 3).unwrap_err();
        assert_eq!(
            err,
            ListingStoreError::InsufficientQuantity {
                available: 2,
                requested: 3,
            }
        );
        assert_eq!(store.get(listing.id).unwrap().quantity, 2);
    }

    #[test]
    fn reserve_rejects_archived_listing() {
        let store = InMemoryListingStore::new();
        let listing = published(UserId::new(), 5);
        store.insert(listing.clone()).unwrap();
        store.archive(listing.id).unwrap();

        assert_eq!(
            store.reserve(listing.id, 1),
            Err(ListingStoreError::Archived)
        );
    }

    #[test]
    fn release_returns_quantity() {
        let store = InMemoryListingStore::new();
        let listing = published(UserId::new(), 5);
        store.insert(listing.clone()).unwrap();

        store.reserve(listing.id, 4).unwrap();
        let updated = store.release(listing.id, 4).unwrap();
        assert_eq!(updated.quantity, 5);
    }

    #[test]
    fn release_works_on_archived_listing() {
        let store = InMemoryListingStore::new();
        let listing = published(UserId::new(), 5);
        store.insert(listing.clone()).unwrap();
        store.reserve(listing.id, 2).unwrap();
        store.archive(listing.id).unwrap();

        let updated = store.release(listing.id, 2).unwrap();
        assert_eq!(updated.quantity, 5);
        assert_eq!(updated.status, ListingStatus::Archived);
        assert!(!updated.can_be_ordered());
    }

    #[test]
    fn release_rejects_unknown_listing() {
        let store = InMemoryListingStore::new();
        assert_eq!(
            store.release(ListingId::new(), 1),
            Err(ListingStoreError::NotFound)
        );
    }

    #[test]
    fn reserve_rejects_unknown_listing() {
        let store = InMemoryListingStore::new();
        assert_eq!(
            store.reserve(ListingId::new(), 1),
            Err(ListingStoreError::NotFound)
        );
    }

    #[test]
    fn concurrent_reserves_never_oversell() {
        let store = Arc::new(InMemoryListingStore::new());
        let listing = published(UserId::new(), 10);
        store.insert(listing.clone()).unwrap();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = listing.id;
                std::thread::spawn(move || store.reserve(id, 1).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 10);
        assert_eq!(store.get(listing.id).unwrap().quantity, 0);
    }
}
