//! Event system for the storefront.
//!
//! # Event Flow
//!
//! 1. Views emit interaction events (`card:select`, `add:card`, ...)
//! 2. The composition layer maps them onto `AppState` mutators
//! 3. `AppState` emits model events (`items:changed`, `basket:change`, ...)
//! 4. Views re-render from the snapshot carried by the model event
//!
//! Dispatch is synchronous and single-threaded.

pub mod bus;
pub mod types;

pub use bus::{Dispatch, EventBus, EventFilter, EventHandler, SubscriptionId};
pub use types::{
    ApiOperation, BasketChanged, CatalogChanged, EventGroup, EventKind, FieldChange,
    FormErrorsChanged, RequestFailed, StoreEvent,
};
