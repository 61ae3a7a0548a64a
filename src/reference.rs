use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Grouping label for renovation items (e.g. "Kitchen").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A shop or contractor items are bought from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierDraft {
    pub name: String,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub(crate) fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = blank_to_none(self.description);
        self
    }
}

impl SupplierDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.contact_info = blank_to_none(self.contact_info);
        self.phone = blank_to_none(self.phone);
        self.email = blank_to_none(self.email);
        self.address = blank_to_none(self.address);
        self
    }
}

impl Category {
    pub(crate) fn from_draft(id: i64, draft: CategoryDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn apply(&mut self, draft: CategoryDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.description = draft.description;
        self.updated_at = now;
    }
}

impl Supplier {
    pub(crate) fn from_draft(id: i64, draft: SupplierDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            contact_info: draft.contact_info,
            phone: draft.phone,
            email: draft.email,
            address: draft.address,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn apply(&mut self, draft: SupplierDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.contact_info = draft.contact_info;
        self.phone = draft.phone;
        self.email = draft.email;
        self.address = draft.address;
        self.updated_at = now;
    }
}

pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
