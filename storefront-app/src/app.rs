//! Composition of bus, state, views and network.
//!
//! `App` registers every handler once at construction. Handlers never hold
//! a `Screen` borrow while calling into `AppState` or the bus, because those
//! calls dispatch further events whose handlers borrow the screen again.

use std::cell::{Ref, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::anyhow;
use storefront_core::events::{
    ApiOperation, Dispatch, EventBus, EventGroup, EventKind, RequestFailed, StoreEvent,
};
use storefront_core::validation::{ContactField, PaymentField};
use storefront_core::AppState;
use storefront_sdk::objects::Order;
use tracing::{debug, error, info};

use crate::api::ShopApi;
use crate::view::{
    BasketView, CardView, ModalContent, Screen, SuccessView, render_card,
};

/// A running storefront session.
pub struct App<A> {
    bus: Rc<EventBus>,
    state: Rc<AppState>,
    screen: Rc<RefCell<Screen>>,
    outbox: Rc<RefCell<VecDeque<Order>>>,
    api: A,
}

impl<A: ShopApi> App<A> {
    /// Build the session and wire all handlers.
    pub fn new(api: A) -> Self {
        let bus = Rc::new(EventBus::new());
        let app = Self {
            state: Rc::new(AppState::new(Rc::clone(&bus))),
            bus,
            screen: Rc::new(RefCell::new(Screen::default())),
            outbox: Rc::new(RefCell::new(VecDeque::new())),
            api,
        };
        app.wire();
        app
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn state(&self) -> &Rc<AppState> {
        &self.state
    }

    pub fn screen(&self) -> Ref<'_, Screen> {
        self.screen.borrow()
    }

    /// Emit a user interaction.
    pub fn emit(&self, event: StoreEvent) -> Dispatch {
        self.bus.emit(event)
    }

    /// Number of orders waiting for [`flush`](Self::flush).
    pub fn pending_orders(&self) -> usize {
        self.outbox.borrow().len()
    }

    /// Fetch the catalog and install it.
    ///
    /// On failure the catalog is left untouched and `request:failed` is
    /// emitted. Returns whether the catalog was replaced.
    pub async fn load_catalog(&self) -> bool {
        match self.api.get_item_list().await {
            Ok(items) => {
                self.state.set_catalog(items);
                true
            }
            Err(e) => {
                self.report_failure(ApiOperation::LoadCatalog, e.to_string());
                false
            }
        }
    }

    /// Send every queued order.
    ///
    /// Each accepted order replaces the modal with the success view. A
    /// rejected order is dropped after `request:failed`; basket and form stay
    /// as they were. Returns the number of accepted orders.
    pub async fn flush(&self) -> usize {
        let mut accepted = 0;
        loop {
            let Some(order) = self.next_order() else {
                break;
            };
            match self.api.order_items(&order).await {
                Ok(result) => {
                    info!(order_id = %result.id, total = %result.total, "Order accepted");
                    open_modal(
                        &self.screen,
                        &self.bus,
                        ModalContent::Success(SuccessView::new(result.total)),
                    );
                    accepted += 1;
                }
                Err(e) => self.report_failure(ApiOperation::SubmitOrder, e.to_string()),
            }
        }
        accepted
    }

    fn next_order(&self) -> Option<Order> {
        self.outbox.borrow_mut().pop_front()
    }

    fn report_failure(&self, operation: ApiOperation, message: String) {
        self.bus
            .emit(StoreEvent::RequestFailed(RequestFailed { operation, message }));
    }

    fn wire(&self) {
        let bus = &self.bus;

        // Diagnostics for every event.
        bus.subscribe_all(|event| {
            debug!(event = %event.name(), payload = ?event, "Event emitted");
            Ok(())
        });

        let screen = Rc::clone(&self.screen);
        bus.subscribe(EventKind::ItemsChanged, move |event| {
            let StoreEvent::ItemsChanged(changed) = event else {
                return Ok(());
            };
            let catalog = changed
                .catalog
                .iter()
                .map(|card| render_card(&CardView::catalog(card)))
                .collect();
            let mut screen = screen.borrow_mut();
            screen.page.catalog = catalog;
            screen.page.notice = None;
            Ok(())
        });

        let state = Rc::clone(&self.state);
        bus.subscribe(EventKind::CardSelected, move |event| {
            if let StoreEvent::CardSelected(card) = event {
                state.set_preview(card.clone());
            }
            Ok(())
        });

        let (state, screen, b) = (
            Rc::clone(&self.state),
            Rc::clone(&self.screen),
            Rc::clone(bus),
        );
        bus.subscribe(EventKind::PreviewChanged, move |event| {
            let StoreEvent::PreviewChanged(card) = event else {
                return Ok(());
            };
            let in_basket = state.check_basket(&card.id);
            let rendered = render_card(&CardView::preview(card, in_basket));
            open_modal(&screen, &b, ModalContent::Preview(rendered));
            Ok(())
        });

        let (state, screen) = (Rc::clone(&self.state), Rc::clone(&self.screen));
        bus.subscribe(EventKind::CardAdded, move |event| {
            let StoreEvent::CardAdded(card) = event else {
                return Ok(());
            };
            if card.price.is_none() {
                return Err(anyhow!("card {} has no price and cannot be bought", card.id));
            }
            if !state.add_product(card.to_basket_item(state.basket_len())) {
                return Ok(());
            }
            // Flip the preview button if the modal still shows this card.
            if state.preview().as_ref() == Some(&card.id) {
                let mut screen = screen.borrow_mut();
                if let Some(ModalContent::Preview(rendered)) = screen.modal.content.as_mut() {
                    *rendered = render_card(&CardView::preview(card, true));
                }
            }
            Ok(())
        });

        let state = Rc::clone(&self.state);
        bus.subscribe(EventKind::CardRemoved, move |event| {
            if let StoreEvent::CardRemoved(item) = event {
                state.delete_product(&item.id);
            }
            Ok(())
        });

        let (state, screen) = (Rc::clone(&self.state), Rc::clone(&self.screen));
        bus.subscribe(EventKind::BasketChanged, move |event| {
            let StoreEvent::BasketChanged(changed) = event else {
                return Ok(());
            };
            let basket = BasketView::render(&changed.basket, state.get_total());
            let mut screen = screen.borrow_mut();
            screen.basket = basket;
            screen.page.counter = changed.basket.len();
            Ok(())
        });

        let (screen, b) = (Rc::clone(&self.screen), Rc::clone(bus));
        bus.subscribe(EventKind::BasketOpened, move |_| {
            open_modal(&screen, &b, ModalContent::Basket);
            Ok(())
        });

        let (state, screen, b) = (
            Rc::clone(&self.state),
            Rc::clone(&self.screen),
            Rc::clone(bus),
        );
        bus.subscribe(EventKind::OrderOpened, move |_| {
            let (form, errors) = (state.form(), state.payment_errors());
            screen.borrow_mut().order.open(&form, &errors);
            open_modal(&screen, &b, ModalContent::Order);
            Ok(())
        });

        let (state, screen, b) = (
            Rc::clone(&self.state),
            Rc::clone(&self.screen),
            Rc::clone(bus),
        );
        bus.subscribe(EventKind::OrderSubmitted, move |_| {
            let (form, errors) = (state.form(), state.contact_errors());
            screen.borrow_mut().contacts.open(&form, &errors);
            open_modal(&screen, &b, ModalContent::Contacts);
            Ok(())
        });

        let screen = Rc::clone(&self.screen);
        bus.subscribe(EventKind::FormErrorsChanged, move |event| {
            if let StoreEvent::FormErrorsChanged(changed) = event {
                screen.borrow_mut().form_mut(changed.pass).apply(&changed.errors);
            }
            Ok(())
        });

        let (state, screen) = (Rc::clone(&self.state), Rc::clone(&self.screen));
        bus.subscribe(EventKind::PaymentChanged, move |event| {
            let StoreEvent::PaymentChanged { method } = event else {
                return Ok(());
            };
            screen.borrow_mut().order.payment = Some(method.clone());
            state.set_payment_field(PaymentField::Payment, method.clone());
            Ok(())
        });

        let state = Rc::clone(&self.state);
        bus.subscribe_group(EventGroup::OrderForm, move |event| {
            let StoreEvent::OrderFieldChanged(change) = event else {
                return Ok(());
            };
            let field = PaymentField::try_from(change.field)
                .map_err(|f| anyhow!("field {f} is not part of the payment step"))?;
            state.set_payment_field(field, change.value.clone());
            Ok(())
        });

        let state = Rc::clone(&self.state);
        bus.subscribe_group(EventGroup::ContactsForm, move |event| {
            let StoreEvent::ContactsFieldChanged(change) = event else {
                return Ok(());
            };
            let field = ContactField::try_from(change.field)
                .map_err(|f| anyhow!("field {f} is not part of the contacts step"))?;
            state.set_order_field(field, change.value.clone());
            Ok(())
        });

        let (state, outbox) = (Rc::clone(&self.state), Rc::clone(&self.outbox));
        bus.subscribe(EventKind::ContactsSubmitted, move |_| {
            let order = state.create_order()?;
            outbox.borrow_mut().push_back(order);
            Ok(())
        });

        let (state, screen, b) = (
            Rc::clone(&self.state),
            Rc::clone(&self.screen),
            Rc::clone(bus),
        );
        bus.subscribe(EventKind::SuccessClosed, move |_| {
            close_modal(&screen, &b);
            state.clear_basket();
            state.reset_form();
            Ok(())
        });

        let screen = Rc::clone(&self.screen);
        bus.subscribe_group(EventGroup::Modal, move |event| {
            screen.borrow_mut().page.locked = matches!(event, StoreEvent::ModalOpened);
            Ok(())
        });

        let screen = Rc::clone(&self.screen);
        bus.subscribe(EventKind::RequestFailed, move |event| {
            if let StoreEvent::RequestFailed(failure) = event {
                error!(
                    operation = %failure.operation,
                    error = %failure.message,
                    "Request failed"
                );
                screen.borrow_mut().page.notice = Some(failure.message.clone());
            }
            Ok(())
        });
    }
}

fn open_modal(screen: &RefCell<Screen>, bus: &EventBus, content: ModalContent) {
    screen.borrow_mut().modal.content = Some(content);
    bus.emit(StoreEvent::ModalOpened);
}

fn close_modal(screen: &RefCell<Screen>, bus: &EventBus) {
    screen.borrow_mut().modal.content = None;
    bus.emit(StoreEvent::ModalClosed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use storefront_core::events::FieldChange;
    use storefront_sdk::client::{ClientError, StatusCode};
    use storefront_sdk::objects::{Card, CardId, FormField, OrderForm, OrderResult};

    /// In-memory backend.
    #[derive(Default)]
    struct FakeApi {
        catalog: Vec<Card>,
        fail: bool,
        orders: RefCell<Vec<Order>>,
    }

    fn unavailable() -> ClientError {
        ClientError::Api {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "maintenance".to_string(),
        }
    }

    #[async_trait(?Send)]
    impl ShopApi for FakeApi {
        async fn get_item_list(&self) -> Result<Vec<Card>, ClientError> {
            if self.fail {
                return Err(unavailable());
            }
            Ok(self.catalog.clone())
        }

        async fn order_items(&self, order: &Order) -> Result<OrderResult, ClientError> {
            if self.fail {
                return Err(unavailable());
            }
            self.orders.borrow_mut().push(order.clone());
            Ok(OrderResult {
                id: "order-1".to_string(),
                total: order.total,
            })
        }
    }

    fn card(id: &str, price: Option<i64>) -> Card {
        Card {
            id: CardId::from(id),
            title: format!("Card {id}"),
            description: format!("About {id}"),
            image: format!("https://cdn.example.com/{id}.svg"),
            category: "софт-скил".to_string(),
            price: price.map(Decimal::from),
        }
    }

    fn catalog() -> Vec<Card> {
        vec![card("a", Some(10)), card("b", None), card("c", Some(2200))]
    }

    async fn loaded_app() -> App<FakeApi> {
        let app = App::new(FakeApi {
            catalog: catalog(),
            ..FakeApi::default()
        });
        assert!(app.load_catalog().await);
        app
    }

    fn fill_checkout(app: &App<FakeApi>) {
        app.emit(StoreEvent::OrderOpened);
        app.emit(StoreEvent::PaymentChanged {
            method: "online".to_string(),
        });
        app.emit(StoreEvent::OrderFieldChanged(FieldChange::new(
            FormField::Address,
            "Main st. 1",
        )));
        app.emit(StoreEvent::OrderSubmitted);
        app.emit(StoreEvent::ContactsFieldChanged(FieldChange::new(
            FormField::Email,
            "buyer@example.com",
        )));
        app.emit(StoreEvent::ContactsFieldChanged(FieldChange::new(
            FormField::Phone,
            "+71234567890",
        )));
    }

    #[tokio::test]
    async fn test_catalog_renders_into_page() {
        let app = loaded_app().await;
        let screen = app.screen();
        assert_eq!(screen.page.catalog.len(), 3);
        assert_eq!(screen.page.catalog[1].price, "Priceless");
        assert_eq!(screen.page.catalog[0].button, None);
    }

    #[tokio::test]
    async fn test_failed_catalog_load_leaves_state() {
        let app = App::new(FakeApi {
            fail: true,
            ..FakeApi::default()
        });
        assert!(!app.load_catalog().await);
        assert!(app.state().catalog().is_empty());
        assert!(app.screen().page.notice.is_some());
    }

    #[tokio::test]
    async fn test_preview_and_add_to_basket() {
        let app = loaded_app().await;
        let a = app.state().card(&CardId::from("a")).unwrap();

        app.emit(StoreEvent::CardSelected(a.clone()));
        {
            let screen = app.screen();
            assert!(screen.page.locked);
            match &screen.modal.content {
                Some(ModalContent::Preview(rendered)) => {
                    assert_eq!(rendered.button.unwrap().label, "Add to basket");
                }
                other => panic!("unexpected modal {other:?}"),
            }
        }

        app.emit(StoreEvent::CardAdded(a.clone()));
        app.emit(StoreEvent::CardAdded(a));
        let screen = app.screen();
        assert_eq!(screen.page.counter, 1);
        assert_eq!(screen.basket.total, "10 synapses");
        match &screen.modal.content {
            Some(ModalContent::Preview(rendered)) => {
                assert!(rendered.button.unwrap().disabled);
            }
            other => panic!("unexpected modal {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_priceless_card_is_rejected() {
        let app = loaded_app().await;
        let b = app.state().card(&CardId::from("b")).unwrap();
        let dispatch = app.emit(StoreEvent::CardAdded(b));
        assert_eq!(dispatch.failed, 1);
        assert_eq!(app.state().basket_len(), 0);
    }

    #[tokio::test]
    async fn test_delete_from_basket() {
        let app = loaded_app().await;
        for id in ["a", "c"] {
            let card = app.state().card(&CardId::from(id)).unwrap();
            app.emit(StoreEvent::CardAdded(card));
        }
        let first = app.state().basket()[0].clone();
        app.emit(StoreEvent::CardRemoved(first));

        let screen = app.screen();
        assert_eq!(screen.page.counter, 1);
        assert_eq!(screen.basket.rows[0].index, "1");
        assert_eq!(screen.basket.rows[0].id, CardId::from("c"));
        assert_eq!(screen.basket.total, "2200 synapses");
    }

    #[tokio::test]
    async fn test_form_bridge_tracks_each_step() {
        let app = loaded_app().await;
        app.emit(StoreEvent::OrderOpened);
        app.emit(StoreEvent::PaymentChanged {
            method: "card".to_string(),
        });
        app.emit(StoreEvent::OrderFieldChanged(FieldChange::new(
            FormField::Address,
            "",
        )));
        {
            let screen = app.screen();
            assert!(!screen.order.valid);
            assert_eq!(screen.order.errors, "Enter a delivery address");
            assert_eq!(screen.order.payment.as_deref(), Some("card"));
        }

        app.emit(StoreEvent::ContactsFieldChanged(FieldChange::new(
            FormField::Email,
            "buyer@example.com",
        )));
        let screen = app.screen();
        assert_eq!(screen.contacts.errors, "Enter a phone number");
        // The payment step still shows its own error.
        assert_eq!(screen.order.errors, "Enter a delivery address");
    }

    #[tokio::test]
    async fn test_misrouted_field_is_isolated() {
        let app = loaded_app().await;
        let dispatch = app.emit(StoreEvent::OrderFieldChanged(FieldChange::new(
            FormField::Email,
            "buyer@example.com",
        )));
        assert_eq!(dispatch.failed, 1);
        assert_eq!(app.state().form().email, "");
    }

    #[tokio::test]
    async fn test_checkout_flow() {
        let app = loaded_app().await;
        for id in ["c", "a"] {
            let card = app.state().card(&CardId::from(id)).unwrap();
            app.emit(StoreEvent::CardAdded(card));
        }
        fill_checkout(&app);
        assert!(app.screen().order.valid);
        assert!(app.screen().contacts.valid);

        app.emit(StoreEvent::ContactsSubmitted);
        assert_eq!(app.pending_orders(), 1);
        assert_eq!(app.flush().await, 1);

        let sent = app.api.orders.borrow()[0].clone();
        assert_eq!(sent.items, vec![CardId::from("c"), CardId::from("a")]);
        assert_eq!(sent.total, Decimal::from(2210));
        match &app.screen().modal.content {
            Some(ModalContent::Success(success)) => {
                assert_eq!(success.description, "Debited 2210 synapses");
            }
            other => panic!("unexpected modal {other:?}"),
        }

        app.emit(StoreEvent::SuccessClosed);
        let screen = app.screen();
        assert!(!screen.modal.is_open());
        assert!(!screen.page.locked);
        assert_eq!(screen.page.counter, 0);
        assert_eq!(app.state().basket_len(), 0);
    }

    #[tokio::test]
    async fn test_second_checkout_starts_blank() {
        let app = loaded_app().await;
        let a = app.state().card(&CardId::from("a")).unwrap();
        app.emit(StoreEvent::CardAdded(a));
        fill_checkout(&app);
        app.emit(StoreEvent::ContactsSubmitted);
        assert_eq!(app.flush().await, 1);
        app.emit(StoreEvent::SuccessClosed);
        assert_eq!(app.state().form(), OrderForm::default());

        let c = app.state().card(&CardId::from("c")).unwrap();
        app.emit(StoreEvent::CardAdded(c));
        app.emit(StoreEvent::OrderOpened);
        {
            let screen = app.screen();
            assert!(!screen.order.valid);
            assert_eq!(screen.order.payment, None);
            assert!(screen.order.errors.is_empty());
        }
        app.emit(StoreEvent::OrderSubmitted);
        assert!(!app.screen().contacts.valid);

        // The previous order's contacts must not leak into a new one.
        let dispatch = app.emit(StoreEvent::ContactsSubmitted);
        assert_eq!(dispatch.failed, 1);
        assert_eq!(app.pending_orders(), 0);
        assert_eq!(app.api.orders.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_reopened_step_shows_entered_values() {
        let app = loaded_app().await;
        fill_checkout(&app);
        app.emit(StoreEvent::ModalClosed);

        app.emit(StoreEvent::OrderOpened);
        let screen = app.screen();
        assert!(screen.order.valid);
        assert_eq!(screen.order.payment.as_deref(), Some("online"));
    }

    #[tokio::test]
    async fn test_successful_load_clears_notice() {
        let failing = App::new(FakeApi {
            fail: true,
            ..FakeApi::default()
        });
        assert!(!failing.load_catalog().await);
        assert!(failing.screen().page.notice.is_some());

        let app = App {
            api: FakeApi {
                catalog: catalog(),
                ..FakeApi::default()
            },
            bus: Rc::clone(&failing.bus),
            state: Rc::clone(&failing.state),
            screen: Rc::clone(&failing.screen),
            outbox: Rc::clone(&failing.outbox),
        };
        assert!(app.load_catalog().await);
        let screen = app.screen();
        assert_eq!(screen.page.notice, None);
        assert_eq!(screen.page.catalog.len(), 3);
    }

    #[tokio::test]
    async fn test_incomplete_checkout_is_not_queued() {
        let app = loaded_app().await;
        let card = app.state().card(&CardId::from("a")).unwrap();
        app.emit(StoreEvent::CardAdded(card));
        app.emit(StoreEvent::PaymentChanged {
            method: "card".to_string(),
        });

        let dispatch = app.emit(StoreEvent::ContactsSubmitted);
        assert_eq!(dispatch.failed, 1);
        assert_eq!(app.pending_orders(), 0);
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_basket() {
        let app = App::new(FakeApi {
            catalog: catalog(),
            ..FakeApi::default()
        });
        app.load_catalog().await;
        let card = app.state().card(&CardId::from("a")).unwrap();
        app.emit(StoreEvent::CardAdded(card));
        fill_checkout(&app);
        app.emit(StoreEvent::ContactsSubmitted);

        let failing = App {
            api: FakeApi {
                fail: true,
                ..FakeApi::default()
            },
            bus: Rc::clone(&app.bus),
            state: Rc::clone(&app.state),
            screen: Rc::clone(&app.screen),
            outbox: Rc::clone(&app.outbox),
        };
        assert_eq!(failing.flush().await, 0);
        assert_eq!(app.state().basket_len(), 1);
        assert_eq!(app.pending_orders(), 0);
        assert!(app.screen().page.notice.is_some());
        assert!(matches!(
            app.screen().modal.content,
            Some(ModalContent::Contacts)
        ));
    }
}
