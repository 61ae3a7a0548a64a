use crate::error::ValidationError;
use crate::format::parse_iso_date;
use crate::reference::{Category, Supplier, blank_to_none};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 4] = [
        ItemStatus::Pending,
        ItemStatus::InProgress,
        ItemStatus::Completed,
        ItemStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::InProgress => "in_progress",
            ItemStatus::Completed => "completed",
            ItemStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "Pending",
            ItemStatus::InProgress => "In Progress",
            ItemStatus::Completed => "Completed",
            ItemStatus::Cancelled => "Cancelled",
        }
    }

    /// Work still to be done on the item.
    pub fn is_open(&self) -> bool {
        matches!(self, ItemStatus::Pending | ItemStatus::InProgress)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "pending" | "pendente" => Ok(ItemStatus::Pending),
            "in_progress" | "em_andamento" => Ok(ItemStatus::InProgress),
            "completed" | "done" | "concluído" | "concluido" => Ok(ItemStatus::Completed),
            "cancelled" | "canceled" | "cancelado" => Ok(ItemStatus::Cancelled),
            _ => Err(ValidationError::new(format!(
                "unknown item status '{}'",
                s.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Transfer,
    Pix,
    Check,
    Financing,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Pix => "pix",
            PaymentMethod::Check => "check",
            PaymentMethod::Financing => "financing",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "cash" | "dinheiro" => Ok(PaymentMethod::Cash),
            "credit_card" | "cartão_de_crédito" | "cartao_de_credito" => {
                Ok(PaymentMethod::CreditCard)
            }
            "debit_card" | "cartão_de_débito" | "cartao_de_debito" => Ok(PaymentMethod::DebitCard),
            "transfer" | "transferência" | "transferencia" => Ok(PaymentMethod::Transfer),
            "pix" => Ok(PaymentMethod::Pix),
            "check" | "cheque" => Ok(PaymentMethod::Check),
            "financing" | "financiamento" => Ok(PaymentMethod::Financing),
            _ => Err(ValidationError::new(format!(
                "unknown payment method '{}'",
                s.trim()
            ))),
        }
    }
}

/// A line item of a renovation: something to buy, schedule and pay for.
///
/// Dates are kept as the ISO strings they were entered with. Readers go
/// through the `*_on` accessors, which treat unparseable values as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenovationItem {
    pub id: i64,
    pub renovation_id: i64,
    pub item_number: String,
    /// Legacy free-text category label; `category_data` wins when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_data: Option<Category>,
    /// Legacy free-text supplier label; `supplier_data` wins when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_data: Option<Supplier>,
    pub description: String,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub estimated_price: f64,
    #[serde(default)]
    pub paid_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_duration_days: Option<i64>,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RenovationItem {
    pub fn new(id: i64, item_number: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            renovation_id: 0,
            item_number: item_number.into(),
            category: None,
            category_id: None,
            category_data: None,
            supplier: None,
            supplier_id: None,
            supplier_data: None,
            description: description.into(),
            budget: 0.0,
            estimated_price: 0.0,
            paid_value: 0.0,
            purchase_date: None,
            planned_date: None,
            estimated_duration_days: None,
            executed_date: None,
            real_duration_days: None,
            status: ItemStatus::Pending,
            payment_method: None,
            observations: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn planned_on(&self) -> Option<NaiveDate> {
        self.planned_date.as_deref().and_then(parse_iso_date)
    }

    pub fn executed_on(&self) -> Option<NaiveDate> {
        self.executed_date.as_deref().and_then(parse_iso_date)
    }

    pub fn purchased_on(&self) -> Option<NaiveDate> {
        self.purchase_date.as_deref().and_then(parse_iso_date)
    }

    /// Display name of the supplier: the joined record first, then the legacy label.
    pub fn supplier_label(&self) -> Option<&str> {
        self.supplier_data
            .as_ref()
            .map(|supplier| supplier.name.as_str())
            .filter(|name| !name.trim().is_empty())
            .or_else(|| {
                self.supplier
                    .as_deref()
                    .filter(|name| !name.trim().is_empty())
            })
    }

    pub fn to_draft(&self) -> ItemDraft {
        ItemDraft {
            item_number: self.item_number.clone(),
            category: self.category.clone(),
            category_id: self.category_id,
            supplier: self.supplier.clone(),
            supplier_id: self.supplier_id,
            description: self.description.clone(),
            budget: self.budget,
            estimated_price: self.estimated_price,
            paid_value: self.paid_value,
            purchase_date: self.purchase_date.clone(),
            planned_date: self.planned_date.clone(),
            estimated_duration_days: self.estimated_duration_days,
            executed_date: self.executed_date.clone(),
            real_duration_days: self.real_duration_days,
            status: self.status,
            payment_method: self.payment_method,
            observations: self.observations.clone(),
        }
    }

    pub(crate) fn from_draft(
        id: i64,
        renovation_id: i64,
        draft: ItemDraft,
        now: DateTime<Utc>,
    ) -> Self {
        let mut item = Self::new(id, String::new(), String::new());
        item.renovation_id = renovation_id;
        item.created_at = now;
        item.apply(draft, now);
        item
    }

    pub(crate) fn apply(&mut self, draft: ItemDraft, now: DateTime<Utc>) {
        self.item_number = draft.item_number;
        self.category = draft.category;
        self.category_id = draft.category_id;
        self.supplier = draft.supplier;
        self.supplier_id = draft.supplier_id;
        self.description = draft.description;
        self.budget = draft.budget;
        self.estimated_price = draft.estimated_price;
        self.paid_value = draft.paid_value;
        self.purchase_date = draft.purchase_date;
        self.planned_date = draft.planned_date;
        self.estimated_duration_days = draft.estimated_duration_days;
        self.executed_date = draft.executed_date;
        self.real_duration_days = draft.real_duration_days;
        self.status = draft.status;
        self.payment_method = draft.payment_method;
        self.observations = draft.observations;
        self.updated_at = now;
    }
}

/// Submitted form data for creating or editing an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub item_number: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<i64>,
    pub description: String,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub estimated_price: f64,
    #[serde(default)]
    pub paid_value: f64,
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub planned_date: Option<String>,
    #[serde(default)]
    pub estimated_duration_days: Option<i64>,
    #[serde(default)]
    pub executed_date: Option<String>,
    #[serde(default)]
    pub real_duration_days: Option<i64>,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub observations: Option<String>,
}

impl ItemDraft {
    pub fn new(item_number: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            item_number: item_number.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Trims text fields and turns blank optional values into `None`, the way
    /// an empty form input means "not set".
    pub(crate) fn normalized(mut self) -> Self {
        self.item_number = self.item_number.trim().to_string();
        self.description = self.description.trim().to_string();
        self.category = blank_to_none(self.category);
        self.supplier = blank_to_none(self.supplier);
        self.purchase_date = blank_to_none(self.purchase_date);
        self.planned_date = blank_to_none(self.planned_date);
        self.executed_date = blank_to_none(self.executed_date);
        self.observations = blank_to_none(self.observations);
        self
    }
}
