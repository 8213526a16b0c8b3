use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use pluribus_core::{OrderId, UserId};

use crate::order::{Order, OrderStatus};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderStoreError {
    #[error("order not found")]
    NotFound,

    #[error("order is already cancelled")]
    AlreadyCancelled,

    #[error("order already exists")]
    Duplicate,
}

/// Storage abstraction for orders.
pub trait OrderStore: Send + Sync {
    fn insert(&self, order: Order) -> Result<(), OrderStoreError>;
    fn get(&self, id: OrderId) -> Option<Order>;
    /// Orders placed by one buyer, newest first.
    fn list_by_buyer(&self, buyer_id: UserId) -> Vec<Order>;
    /// Every order in the marketplace, newest first (operator view).
    fn list_all(&self) -> Vec<Order>;
    /// Cancel a placed order, returning the updated record.
    fn cancel(&self, id: OrderId) -> Result<Order, OrderStoreError>;
}

impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    fn insert(&self, order: Order) -> Result<(), OrderStoreError> {
        (**self).insert(order)
    }

    fn get(&self, id: OrderId) -> Option<Order> {
        (**self).get(id)
    }

    fn list_by_buyer(&self, buyer_id: UserId) -> Vec<Order> {
        (**self).list_by_buyer(buyer_id)
    }

    fn list_all(&self) -> Vec<Order> {
        (**self).list_all()
    }

    fn cancel(&self, id: OrderId) -> Result<Order, OrderStoreError> {
        (**self).cancel(id)
    }
}

/// In-memory order store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    inner: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<OrderId, Order>> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<OrderId, Order>> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn newest_first(items: &mut [Order]) {
    items.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
    });
}

impl OrderStore for InMemoryOrderStore {
    fn insert(&self, order: Order) -> Result<(), OrderStoreError> {
        let mut map = self.write();
        if map.contains_key(&order.id) {
            return Err(OrderStoreError::Duplicate);
        }
        map.insert(order.id, order);
        Ok(())
    }

    fn get(&self, id: OrderId) -> Option<Order> {
        self.read().get(&id).cloned()
    }

    fn list_by_buyer(&self, buyer_id: UserId) -> Vec<Order> {
        let mut items: Vec<Order> = self
            .read()
            .values()
            .filter(|o| o.buyer_id == buyer_id)
            .cloned()
            .collect();
        newest_first(&mut items);
        items
    }

    fn list_all(&self) -> Vec<Order> {
        let mut items: Vec<Order> = self.read().values().cloned().collect();
        newest_first(&mut items);
        items
    }

    fn cancel(&self, id: OrderId) -> Result<Order, OrderStoreError> {
        let mut map = self.write();
        let order = map.get_mut(&id).ok_or(OrderStoreError::NotFound)?;
        if order.status == OrderStatus::Cancelled {
            return Err(OrderStoreError::AlreadyCancelled);
        }
        order.status = OrderStatus::Cancelled;
        Ok(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use pluribus_catalog::NewListing;

    fn placed(buyer: UserId) -> Order {
        let listing = NewListing {
            title: "Tea kettle".to_string(),
            description: String::new(),
            price_cents: 3_000,
            quantity: 20,
        }
        .publish(UserId::new(), Utc::now())
        .unwrap();
        Order::place(&listing, buyer, 2, Utc::now()).unwrap()
    }

    #[test]
    fn insert_then_get() {
        let store = InMemoryOrderStore::new();
        let order = placed(UserId::new());
        store.insert(order.clone()).unwrap();
        assert_eq!(store.get(order.id), Some(order));
    }

    #[test]
    fn list_by_buyer_filters_other_buyers() {
        let store = InMemoryOrderStore::new();
        let buyer = UserId::new();
        store.insert(placed(buyer)).unwrap();
        store.insert(placed(buyer)).unwrap();
        store.insert(placed(UserId::new())).unwrap();

        assert_eq!(store.list_by_buyer(buyer).len(), 2);
        assert_eq!(store.list_all().len(), 3);
    }

    #[test]
    fn cancel_updates_stored_record() {
        let store = InMemoryOrderStore::new();
        let order = placed(UserId::new());
        store.insert(order.clone()).unwrap();

        let cancelled = store.cancel(order.id).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(store.get(order.id).unwrap().status, OrderStatus::Cancelled);
    }

    #[test]
    fn cancel_twice_is_a_conflict() {
        let store = InMemoryOrderStore::new();
        let order = placed(UserId::new());
        store.insert(order.clone()).unwrap();
        store.cancel(order.id).unwrap();

        assert_eq!(
            store.cancel(order.id),
            Err(OrderStoreError::AlreadyCancelled)
        );
    }

    #[test]
    fn cancel_unknown_order_is_not_found() {
        let store = InMemoryOrderStore::new();
        assert_eq!(store.cancel(OrderId::new()), Err(OrderStoreError::NotFound));
    }
}
