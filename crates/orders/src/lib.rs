//! Orders domain module (buyer purchases and cancellation).

pub mod order;
pub mod store;

pub use order::{Order, OrderStatus};
pub use store::{InMemoryOrderStore, OrderStore, OrderStoreError};
