//! Two-pass checkout form validation.
//!
//! The payment pass covers `payment` and `address`, the contacts pass covers
//! `email` and `phone`. Each pass owns a separate error map that is
//! recomputed wholesale from the current form; running one pass never
//! touches the other pass's errors.

use std::collections::BTreeMap;

use storefront_sdk::objects::{FormField, OrderForm};

/// One of the two independent validation groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormPass {
    Payment,
    Contacts,
}

impl FormPass {
    /// Fields owned by this pass, in the order their messages are shown.
    pub fn fields(&self) -> &'static [FormField] {
        match self {
            FormPass::Payment => &[FormField::Payment, FormField::Address],
            FormPass::Contacts => &[FormField::Phone, FormField::Email],
        }
    }

    pub fn owns(&self, field: FormField) -> bool {
        self.fields().contains(&field)
    }
}

impl std::fmt::Display for FormPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormPass::Payment => write!(f, "payment"),
            FormPass::Contacts => write!(f, "contacts"),
        }
    }
}

/// A field of the payment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentField {
    Payment,
    Address,
}

impl From<PaymentField> for FormField {
    fn from(field: PaymentField) -> Self {
        match field {
            PaymentField::Payment => FormField::Payment,
            PaymentField::Address => FormField::Address,
        }
    }
}

impl TryFrom<FormField> for PaymentField {
    type Error = FormField;

    fn try_from(field: FormField) -> Result<Self, Self::Error> {
        match field {
            FormField::Payment => Ok(PaymentField::Payment),
            FormField::Address => Ok(PaymentField::Address),
            other => Err(other),
        }
    }
}

/// A field of the contacts step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    Email,
    Phone,
}

impl From<ContactField> for FormField {
    fn from(field: ContactField) -> Self {
        match field {
            ContactField::Email => FormField::Email,
            ContactField::Phone => FormField::Phone,
        }
    }
}

impl TryFrom<FormField> for ContactField {
    type Error = FormField;

    fn try_from(field: FormField) -> Result<Self, Self::Error> {
        match field {
            FormField::Email => Ok(ContactField::Email),
            FormField::Phone => Ok(ContactField::Phone),
            other => Err(other),
        }
    }
}

/// Message shown when a required field is empty.
pub fn required_message(field: FormField) -> &'static str {
    match field {
        FormField::Payment => "Select a payment method",
        FormField::Address => "Enter a delivery address",
        FormField::Email => "Enter an email",
        FormField::Phone => "Enter a phone number",
    }
}

/// Validation messages keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<FormField, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// A form is valid iff none of its own fields has an error.
    pub fn is_valid_for(&self, pass: FormPass) -> bool {
        !self.iter().any(|(field, _)| pass.owns(field))
    }

    /// Non-empty messages for the fields of `pass`, in display order.
    pub fn messages_for(&self, pass: FormPass) -> impl Iterator<Item = &str> {
        pass.fields()
            .iter()
            .filter_map(|field| self.get(*field))
            .filter(|msg| !msg.is_empty())
    }

    /// Union of two maps; entries of `other` win on conflict.
    pub fn merged(&self, other: &FormErrors) -> FormErrors {
        let mut merged = self.clone();
        for (field, msg) in other.iter() {
            merged.insert(field, msg);
        }
        merged
    }
}

/// Run one validation pass over the current form.
pub fn validate(pass: FormPass, form: &OrderForm) -> FormErrors {
    let mut errors = FormErrors::new();
    for field in pass.fields() {
        if form.get(*field).is_empty() {
            errors.insert(*field, required_message(*field));
        }
    }
    errors
}
