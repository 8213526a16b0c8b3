//! Listings domain module (seller catalog).

pub mod listing;
pub mod store;

pub use listing::{Listing, ListingStatus, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN, NewListing};
pub use store::{InMemoryListingStore, ListingStore, ListingStoreError};
