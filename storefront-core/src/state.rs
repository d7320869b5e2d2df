//! Application state.
//!
//! `AppState` is the single source of truth for the catalog, the basket,
//! the preview selection and the checkout form. It is mutated only through
//! its own methods; each mutator updates the data, releases its borrow and
//! then emits one model event carrying a snapshot, so handlers may freely
//! read the state back or call further mutators.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use rust_decimal::Decimal;
use storefront_sdk::objects::{BasketItem, Card, CardId, FormField, Order, OrderForm};
use tracing::{debug, info};

use crate::events::{BasketChanged, CatalogChanged, EventBus, FormErrorsChanged, StoreEvent};
use crate::validation::{self, ContactField, FormErrors, FormPass, PaymentField};

/// Reasons an order snapshot cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// A validation pass currently has errors.
    #[error("checkout form incomplete: {0} step has errors")]
    FormIncomplete(FormPass),

    /// Nothing to order.
    #[error("basket is empty")]
    EmptyBasket,
}

#[derive(Debug, Default)]
struct StateData {
    catalog: Vec<Card>,
    preview: Option<CardId>,
    basket: Vec<BasketItem>,
    form: OrderForm,
    payment_errors: FormErrors,
    contact_errors: FormErrors,
    order: Option<Order>,
}

impl StateData {
    /// Empty state whose error maps already describe the empty form.
    fn blank() -> Self {
        let mut data = Self::default();
        data.reset_form();
        data
    }

    fn reset_form(&mut self) {
        self.form = OrderForm::default();
        self.payment_errors = validation::validate(FormPass::Payment, &self.form);
        self.contact_errors = validation::validate(FormPass::Contacts, &self.form);
    }

    fn errors_mut(&mut self, pass: FormPass) -> &mut FormErrors {
        match pass {
            FormPass::Payment => &mut self.payment_errors,
            FormPass::Contacts => &mut self.contact_errors,
        }
    }

    fn reindex_basket(&mut self) {
        for (index, item) in self.basket.iter_mut().enumerate() {
            item.index = index;
        }
    }
}

/// In-memory storefront model that notifies through an [`EventBus`].
#[derive(Debug)]
pub struct AppState {
    bus: Rc<EventBus>,
    data: RefCell<StateData>,
}

impl AppState {
    /// Create an empty state bound to `bus`.
    pub fn new(bus: Rc<EventBus>) -> Self {
        Self {
            bus,
            data: RefCell::new(StateData::blank()),
        }
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    // -- catalog ------------------------------------------------------------

    /// Replace the whole catalog. Emits `items:changed`.
    pub fn set_catalog(&self, items: Vec<Card>) {
        let catalog = {
            let mut data = self.data.borrow_mut();
            data.catalog = items;
            data.catalog.clone()
        };
        info!(items = catalog.len(), "Catalog replaced");
        self.bus
            .emit(StoreEvent::ItemsChanged(CatalogChanged { catalog }));
    }

    /// Select a card for the detail view. Emits `preview:changed`.
    pub fn set_preview(&self, card: Card) {
        self.data.borrow_mut().preview = Some(card.id.clone());
        debug!(card = %card.id, "Preview selected");
        self.bus.emit(StoreEvent::PreviewChanged(card));
    }

    pub fn catalog(&self) -> Ref<'_, [Card]> {
        Ref::map(self.data.borrow(), |data| data.catalog.as_slice())
    }

    pub fn preview(&self) -> Option<CardId> {
        self.data.borrow().preview.clone()
    }

    /// Look up a catalog card by id.
    pub fn card(&self, id: &CardId) -> Option<Card> {
        self.data
            .borrow()
            .catalog
            .iter()
            .find(|card| &card.id == id)
            .cloned()
    }

    // -- basket -------------------------------------------------------------

    /// Append an item unless its id is already in the basket.
    ///
    /// Emits `basket:change` and returns true only when the item was added.
    pub fn add_product(&self, item: BasketItem) -> bool {
        let basket = {
            let mut data = self.data.borrow_mut();
            if data.basket.iter().any(|existing| existing.id == item.id) {
                debug!(card = %item.id, "Card already in basket");
                return false;
            }
            data.basket.push(item);
            data.reindex_basket();
            data.basket.clone()
        };
        debug!(items = basket.len(), "Card added to basket");
        self.bus
            .emit(StoreEvent::BasketChanged(BasketChanged { basket }));
        true
    }

    /// Remove an item by id. Emits `basket:change` even if it was absent.
    pub fn delete_product(&self, id: &CardId) {
        let basket = {
            let mut data = self.data.borrow_mut();
            data.basket.retain(|item| &item.id != id);
            data.reindex_basket();
            data.basket.clone()
        };
        debug!(card = %id, items = basket.len(), "Card removed from basket");
        self.bus
            .emit(StoreEvent::BasketChanged(BasketChanged { basket }));
    }

    /// Empty the basket. Emits `basket:change`.
    pub fn clear_basket(&self) {
        self.data.borrow_mut().basket.clear();
        debug!("Basket cleared");
        self.bus.emit(StoreEvent::BasketChanged(BasketChanged {
            basket: Vec::new(),
        }));
    }

    pub fn basket(&self) -> Ref<'_, [BasketItem]> {
        Ref::map(self.data.borrow(), |data| data.basket.as_slice())
    }

    pub fn basket_len(&self) -> usize {
        self.data.borrow().basket.len()
    }

    /// Whether a card is already in the basket.
    pub fn check_basket(&self, id: &CardId) -> bool {
        self.data.borrow().basket.iter().any(|item| &item.id == id)
    }

    /// Sum of basket prices; priceless items count as zero.
    pub fn get_total(&self) -> Decimal {
        basket_total(&self.data.borrow().basket)
    }

    // -- checkout form ------------------------------------------------------

    /// Update a payment step field and rerun the payment pass.
    ///
    /// Emits `formErrors:change`, then `payment:ready` if the pass is valid.
    /// Returns the validity of the payment pass.
    pub fn set_payment_field(&self, field: PaymentField, value: impl Into<String>) -> bool {
        self.data
            .borrow_mut()
            .form
            .set(FormField::from(field), value);
        let valid = self.validate_payment();
        if valid {
            let form = self.form();
            self.bus.emit(StoreEvent::PaymentReady(form));
        }
        valid
    }

    /// Update a contacts step field and rerun the contacts pass.
    ///
    /// Emits `formErrors:change`, then `order:ready` if the pass is valid.
    /// Returns the validity of the contacts pass.
    pub fn set_order_field(&self, field: ContactField, value: impl Into<String>) -> bool {
        self.data
            .borrow_mut()
            .form
            .set(FormField::from(field), value);
        let valid = self.validate_contacts();
        if valid {
            let form = self.form();
            self.bus.emit(StoreEvent::OrderReady(form));
        }
        valid
    }

    /// Rerun the payment pass. Emits `formErrors:change`.
    pub fn validate_payment(&self) -> bool {
        self.run_pass(FormPass::Payment)
    }

    /// Rerun the contacts pass. Emits `formErrors:change`.
    pub fn validate_contacts(&self) -> bool {
        self.run_pass(FormPass::Contacts)
    }

    fn run_pass(&self, pass: FormPass) -> bool {
        let errors = {
            let mut data = self.data.borrow_mut();
            let errors = validation::validate(pass, &data.form);
            *data.errors_mut(pass) = errors.clone();
            errors
        };
        let valid = errors.is_empty();
        debug!(%pass, valid, errors = errors.len(), "Form pass validated");
        self.bus
            .emit(StoreEvent::FormErrorsChanged(FormErrorsChanged { pass, errors }));
        valid
    }

    /// Blank the checkout form for the next order.
    ///
    /// Both passes are rerun against the empty form, so each emits
    /// `formErrors:change` with its required-field errors.
    pub fn reset_form(&self) {
        let (payment, contacts) = {
            let mut data = self.data.borrow_mut();
            data.reset_form();
            (data.payment_errors.clone(), data.contact_errors.clone())
        };
        debug!("Checkout form reset");
        for (pass, errors) in [(FormPass::Payment, payment), (FormPass::Contacts, contacts)] {
            self.bus
                .emit(StoreEvent::FormErrorsChanged(FormErrorsChanged { pass, errors }));
        }
    }

    pub fn form(&self) -> OrderForm {
        self.data.borrow().form.clone()
    }

    pub fn payment_errors(&self) -> FormErrors {
        self.data.borrow().payment_errors.clone()
    }

    pub fn contact_errors(&self) -> FormErrors {
        self.data.borrow().contact_errors.clone()
    }

    /// Errors of both passes combined.
    pub fn form_errors(&self) -> FormErrors {
        let data = self.data.borrow();
        data.payment_errors.merged(&data.contact_errors)
    }

    // -- order ----------------------------------------------------------------

    /// Build the order snapshot from the current form and basket.
    ///
    /// Both passes are re-checked against the current form without emitting.
    /// The snapshot is also kept as the current order.
    pub fn create_order(&self) -> Result<Order, StateError> {
        let mut data = self.data.borrow_mut();
        for pass in [FormPass::Payment, FormPass::Contacts] {
            if !validation::validate(pass, &data.form).is_empty() {
                return Err(StateError::FormIncomplete(pass));
            }
        }
        if data.basket.is_empty() {
            return Err(StateError::EmptyBasket);
        }

        let order = Order {
            form: data.form.clone(),
            items: data.basket.iter().map(|item| item.id.clone()).collect(),
            total: basket_total(&data.basket),
        };
        info!(items = order.items.len(), total = %order.total, "Order created");
        data.order = Some(order.clone());
        Ok(order)
    }

    /// The last order built by [`create_order`](Self::create_order).
    pub fn order(&self) -> Option<Order> {
        self.data.borrow().order.clone()
    }
}

fn basket_total(basket: &[BasketItem]) -> Decimal {
    basket.iter().filter_map(|item| item.price).sum()
}
