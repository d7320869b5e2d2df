//! Checkout form state as the views show it.

use itertools::Itertools;
use storefront_core::validation::{FormErrors, FormPass};
use storefront_sdk::objects::{FormField, OrderForm};

/// Submit-button and error-line state of one checkout step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub pass: FormPass,
    pub valid: bool,
    pub errors: String,
    /// Highlighted payment method button (payment step only).
    pub payment: Option<String>,
}

impl FormView {
    pub fn new(pass: FormPass) -> Self {
        Self {
            pass,
            valid: false,
            errors: String::new(),
            payment: None,
        }
    }

    /// Recompute validity from the latest errors.
    ///
    /// Only this step's own fields count; errors of the other step are
    /// ignored.
    pub fn apply(&mut self, errors: &FormErrors) {
        self.valid = errors.is_valid_for(self.pass);
        self.errors = errors.messages_for(self.pass).join("; ");
    }

    /// State shown when the step is opened.
    ///
    /// Validity and the payment highlight come from the current form; the
    /// error line stays empty until the user edits a field.
    pub fn open(&mut self, form: &OrderForm, errors: &FormErrors) {
        self.valid = errors.is_valid_for(self.pass);
        self.errors.clear();
        self.payment = match self.pass {
            FormPass::Payment => Some(form.get(FormField::Payment))
                .filter(|method| !method.is_empty())
                .map(str::to_string),
            FormPass::Contacts => None,
        };
    }
}
