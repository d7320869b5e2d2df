//! Event type definitions for the storefront event bus.
//!
//! Every notification is a variant of the closed [`StoreEvent`] union with a
//! statically typed payload. Payloads are snapshots: handlers receive copies
//! taken at emit time, never references into live state.

use std::borrow::Cow;

use storefront_sdk::objects::{BasketItem, Card, FormField, OrderForm};

use crate::validation::{FormErrors, FormPass};

/// Root event enum for all storefront events.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    // -- model changes, emitted by `AppState` ---------------------------
    /// The catalog was replaced.
    ItemsChanged(CatalogChanged),
    /// A card was selected for the detail view.
    PreviewChanged(Card),
    /// The basket contents changed.
    BasketChanged(BasketChanged),
    /// A validation pass ran.
    FormErrorsChanged(FormErrorsChanged),
    /// The payment pass is valid.
    PaymentReady(OrderForm),
    /// The contact pass is valid.
    OrderReady(OrderForm),

    // -- interactions, emitted by views ---------------------------------
    /// A catalog card was clicked.
    CardSelected(Card),
    /// "Add to basket" was pressed in the preview.
    CardAdded(Card),
    /// A basket row's delete button was pressed.
    CardRemoved(BasketItem),
    BasketOpened,
    OrderOpened,
    /// The payment form was submitted.
    OrderSubmitted,
    /// A payment method button was pressed.
    PaymentChanged { method: String },
    /// A payment form input changed.
    OrderFieldChanged(FieldChange),
    /// A contacts form input changed.
    ContactsFieldChanged(FieldChange),
    /// The contacts form was submitted.
    ContactsSubmitted,
    /// The success view was dismissed.
    SuccessClosed,
    ModalOpened,
    ModalClosed,

    // -- diagnostics ----------------------------------------------------
    /// A network request failed; state was left unchanged.
    RequestFailed(RequestFailed),
}

impl StoreEvent {
    /// Get the tag of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            StoreEvent::ItemsChanged(_) => EventKind::ItemsChanged,
            StoreEvent::PreviewChanged(_) => EventKind::PreviewChanged,
            StoreEvent::BasketChanged(_) => EventKind::BasketChanged,
            StoreEvent::FormErrorsChanged(_) => EventKind::FormErrorsChanged,
            StoreEvent::PaymentReady(_) => EventKind::PaymentReady,
            StoreEvent::OrderReady(_) => EventKind::OrderReady,
            StoreEvent::CardSelected(_) => EventKind::CardSelected,
            StoreEvent::CardAdded(_) => EventKind::CardAdded,
            StoreEvent::CardRemoved(_) => EventKind::CardRemoved,
            StoreEvent::BasketOpened => EventKind::BasketOpened,
            StoreEvent::OrderOpened => EventKind::OrderOpened,
            StoreEvent::OrderSubmitted => EventKind::OrderSubmitted,
            StoreEvent::PaymentChanged { .. } => EventKind::PaymentChanged,
            StoreEvent::OrderFieldChanged(_) => EventKind::OrderFieldChanged,
            StoreEvent::ContactsFieldChanged(_) => EventKind::ContactsFieldChanged,
            StoreEvent::ContactsSubmitted => EventKind::ContactsSubmitted,
            StoreEvent::SuccessClosed => EventKind::SuccessClosed,
            StoreEvent::ModalOpened => EventKind::ModalOpened,
            StoreEvent::ModalClosed => EventKind::ModalClosed,
            StoreEvent::RequestFailed(_) => EventKind::RequestFailed,
        }
    }

    /// Get the group this event belongs to.
    pub fn group(&self) -> EventGroup {
        self.kind().group()
    }

    /// Wire-style name of this event, used for logging.
    ///
    /// Form input events carry the field in their name, e.g.
    /// `order.address:change`.
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            StoreEvent::OrderFieldChanged(change) => {
                Cow::Owned(format!("order.{}:change", change.field))
            }
            StoreEvent::ContactsFieldChanged(change) => {
                Cow::Owned(format!("contacts.{}:change", change.field))
            }
            other => Cow::Borrowed(other.kind().name()),
        }
    }
}

/// Tag of a [`StoreEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ItemsChanged,
    PreviewChanged,
    BasketChanged,
    FormErrorsChanged,
    PaymentReady,
    OrderReady,
    CardSelected,
    CardAdded,
    CardRemoved,
    BasketOpened,
    OrderOpened,
    OrderSubmitted,
    PaymentChanged,
    OrderFieldChanged,
    ContactsFieldChanged,
    ContactsSubmitted,
    SuccessClosed,
    ModalOpened,
    ModalClosed,
    RequestFailed,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::ItemsChanged => "items:changed",
            EventKind::PreviewChanged => "preview:changed",
            EventKind::BasketChanged => "basket:change",
            EventKind::FormErrorsChanged => "formErrors:change",
            EventKind::PaymentReady => "payment:ready",
            EventKind::OrderReady => "order:ready",
            EventKind::CardSelected => "card:select",
            EventKind::CardAdded => "add:card",
            EventKind::CardRemoved => "delete:card",
            EventKind::BasketOpened => "basket:open",
            EventKind::OrderOpened => "order:open",
            EventKind::OrderSubmitted => "order:submit",
            EventKind::PaymentChanged => "payment:change",
            EventKind::OrderFieldChanged => "order.*:change",
            EventKind::ContactsFieldChanged => "contacts.*:change",
            EventKind::ContactsSubmitted => "contacts:submit",
            EventKind::SuccessClosed => "success:close",
            EventKind::ModalOpened => "modal:open",
            EventKind::ModalClosed => "modal:close",
            EventKind::RequestFailed => "request:failed",
        }
    }

    pub fn group(&self) -> EventGroup {
        match self {
            EventKind::ItemsChanged
            | EventKind::PreviewChanged
            | EventKind::BasketChanged
            | EventKind::FormErrorsChanged
            | EventKind::PaymentReady
            | EventKind::OrderReady => EventGroup::Model,
            EventKind::OrderFieldChanged => EventGroup::OrderForm,
            EventKind::ContactsFieldChanged => EventGroup::ContactsForm,
            EventKind::ModalOpened | EventKind::ModalClosed => EventGroup::Modal,
            EventKind::RequestFailed => EventGroup::Diagnostics,
            EventKind::CardSelected
            | EventKind::CardAdded
            | EventKind::CardRemoved
            | EventKind::BasketOpened
            | EventKind::OrderOpened
            | EventKind::OrderSubmitted
            | EventKind::PaymentChanged
            | EventKind::ContactsSubmitted
            | EventKind::SuccessClosed => EventGroup::Interaction,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Group of event kinds that can be subscribed to as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventGroup {
    /// State changes emitted by `AppState`.
    Model,
    /// Clicks and submits from views.
    Interaction,
    /// Any payment form input change.
    OrderForm,
    /// Any contacts form input change.
    ContactsForm,
    /// Modal open/close.
    Modal,
    /// Failures reported for display.
    Diagnostics,
}

/// Payload of `items:changed`.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogChanged {
    pub catalog: Vec<Card>,
}

/// Payload of `basket:change`.
#[derive(Debug, Clone, PartialEq)]
pub struct BasketChanged {
    pub basket: Vec<BasketItem>,
}

/// Payload of `formErrors:change`: the errors of the pass that just ran.
#[derive(Debug, Clone, PartialEq)]
pub struct FormErrorsChanged {
    pub pass: FormPass,
    pub errors: FormErrors,
}

/// A single form input edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: FormField,
    pub value: String,
}

impl FieldChange {
    pub fn new(field: FormField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Network operation that can fail at the composition boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    LoadCatalog,
    SubmitOrder,
}

impl std::fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiOperation::LoadCatalog => write!(f, "load_catalog"),
            ApiOperation::SubmitOrder => write!(f, "submit_order"),
        }
    }
}

/// Payload of `request:failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailed {
    pub operation: ApiOperation,
    pub message: String,
}
