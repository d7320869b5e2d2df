//! View models.
//!
//! Views hold what would be drawn, not how. The composition layer rewrites
//! them from model event snapshots; nothing here reads `AppState`.

pub mod basket;
pub mod card;
pub mod form;

pub use basket::BasketView;
pub use card::{CardView, render_card};
pub use form::FormView;

use rust_decimal::Decimal;
use storefront_core::validation::FormPass;

use card::{RenderedCard, price_label};

/// Main page: catalog grid, basket counter and scroll lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageView {
    pub catalog: Vec<RenderedCard>,
    pub counter: usize,
    /// Set while a modal is open.
    pub locked: bool,
    /// Last network failure, if any.
    pub notice: Option<String>,
}

/// What the modal currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalContent {
    Preview(RenderedCard),
    /// The live [`BasketView`] in [`Screen::basket`].
    Basket,
    /// The payment step, [`Screen::order`].
    Order,
    /// The contacts step, [`Screen::contacts`].
    Contacts,
    Success(SuccessView),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalView {
    pub content: Option<ModalContent>,
}

impl ModalView {
    pub fn is_open(&self) -> bool {
        self.content.is_some()
    }
}

/// Confirmation shown after an order is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessView {
    pub description: String,
}

impl SuccessView {
    pub fn new(total: Decimal) -> Self {
        Self {
            description: format!("Debited {}", price_label(Some(total))),
        }
    }
}

/// Every view of the storefront.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub page: PageView,
    pub modal: ModalView,
    pub basket: BasketView,
    pub order: FormView,
    pub contacts: FormView,
}

impl Screen {
    pub fn form_mut(&mut self, pass: FormPass) -> &mut FormView {
        match pass {
            FormPass::Payment => &mut self.order,
            FormPass::Contacts => &mut self.contacts,
        }
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            page: PageView::default(),
            modal: ModalView::default(),
            basket: BasketView::default(),
            order: FormView::new(FormPass::Payment),
            contacts: FormView::new(FormPass::Contacts),
        }
    }
}
