//! Checkout form and order types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::card::CardId;

/// Fields of the two-step checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Payment,
    Address,
    Email,
    Phone,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Payment => "payment",
            FormField::Address => "address",
            FormField::Email => "email",
            FormField::Phone => "phone",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-progress checkout input, one field updated at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderForm {
    pub payment: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

impl OrderForm {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Payment => &self.payment,
            FormField::Address => &self.address,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::Payment => &mut self.payment,
            FormField::Address => &mut self.address,
            FormField::Email => &mut self.email,
            FormField::Phone => &mut self.phone,
        };
        *slot = value.into();
    }
}

/// Request body for `POST /order`.
///
/// Built once at submission time; a read-only snapshot of the form and basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(flatten)]
    pub form: OrderForm,
    pub items: Vec<CardId>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Response returned by `POST /order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    pub id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_body_is_flat() {
        let order = Order {
            form: OrderForm {
                payment: "online".to_string(),
                address: "Main st. 1".to_string(),
                email: "buyer@example.com".to_string(),
                phone: "+71234567890".to_string(),
            },
            items: vec![CardId::from("a"), CardId::from("c")],
            total: Decimal::from(2200),
        };
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["payment"], "online");
        assert_eq!(value["phone"], "+71234567890");
        assert_eq!(value["items"], serde_json::json!(["a", "c"]));
        assert_eq!(value["total"].as_f64(), Some(2200.0));
    }

    #[test]
    fn test_order_result_parsing() {
        let result: OrderResult =
            serde_json::from_str(r#"{"id":"28c57cb4-3002-4445-8aa1-2a06a5055ae5","total":2200}"#)
                .unwrap();
        assert_eq!(result.total, Decimal::from(2200));
    }

    #[test]
    fn test_form_field_names() {
        assert_eq!(FormField::Address.to_string(), "address");
        assert_eq!(serde_json::to_value(FormField::Phone).unwrap(), "phone");
        let mut form = OrderForm::default();
        form.set(FormField::Email, "a@b.c");
        assert_eq!(form.get(FormField::Email), "a@b.c");
    }
}
