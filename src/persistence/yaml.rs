//! Line-oriented `renovation_items:` documents.
//!
//! Only the flat layout below is read and written; it is not a general YAML
//! reader.
//!
//! ```text
//! renovation_items:
//!   - id: "1"
//!     itemNumber: "001"
//!     category: "Kitchen"
//!     budget: 2500
//!     ...
//! ```

use super::file::{
    category_label, items_oldest_first, parse_date, parse_f64, parse_i64, parse_payment_method,
    parse_status, parse_string_option,
};
use super::{PersistenceError, PersistenceResult};
use crate::item::{ItemDraft, RenovationItem};
use crate::tracker::Tracker;
use std::fs;
use std::path::Path;

const ROOT_KEY: &str = "renovation_items:";

pub fn items_to_yaml(items: &[RenovationItem]) -> String {
    let mut out = String::from(ROOT_KEY);
    out.push('\n');
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let fields: [(&str, Value); 16] = [
            ("id", Value::Text(item.id.to_string())),
            ("itemNumber", Value::Text(item.item_number.clone())),
            ("category", Value::Text(category_label(item).unwrap_or_default())),
            ("description", Value::Text(item.description.clone())),
            (
                "supplier",
                Value::Text(item.supplier_label().unwrap_or_default().to_string()),
            ),
            ("budget", Value::Number(item.budget.to_string())),
            ("estimatedPrice", Value::Number(item.estimated_price.to_string())),
            ("purchaseDate", Value::Text(item.purchase_date.clone().unwrap_or_default())),
            ("paidValue", Value::Number(item.paid_value.to_string())),
            ("status", Value::Text(item.status.as_str().to_string())),
            (
                "paymentMethod",
                Value::Text(
                    item.payment_method
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default(),
                ),
            ),
            ("observations", Value::Text(item.observations.clone().unwrap_or_default())),
            ("plannedDate", Value::Text(item.planned_date.clone().unwrap_or_default())),
            ("estimatedDurationDays", Value::optional_number(item.estimated_duration_days)),
            ("executedDate", Value::Text(item.executed_date.clone().unwrap_or_default())),
            ("realDurationDays", Value::optional_number(item.real_duration_days)),
        ];
        for (position, (key, value)) in fields.iter().enumerate() {
            let prefix = if position == 0 { "  - " } else { "    " };
            out.push_str(prefix);
            out.push_str(key);
            out.push_str(": ");
            out.push_str(&value.render());
            out.push('\n');
        }
    }
    out
}

/// Parses the documents written by [`items_to_yaml`]. The `id` key is read but
/// ignored; imported items get fresh ids.
pub fn items_from_yaml(content: &str) -> PersistenceResult<Vec<ItemDraft>> {
    let mut drafts = Vec::new();
    let mut current: Option<ItemDraft> = None;

    for (line_no, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == ROOT_KEY {
            continue;
        }

        let entry = match trimmed.strip_prefix("- ") {
            Some(rest) => {
                drafts.extend(current.take());
                current = Some(ItemDraft::default());
                rest.trim()
            }
            None => trimmed,
        };

        let Some(draft) = current.as_mut() else {
            return Err(PersistenceError::InvalidData(format!(
                "line {}: expected '{ROOT_KEY}' list entry, got '{trimmed}'",
                line_no + 1
            )));
        };
        let Some((key, raw_value)) = entry.split_once(':') else {
            return Err(PersistenceError::InvalidData(format!(
                "line {}: expected 'key: value', got '{trimmed}'",
                line_no + 1
            )));
        };
        let value = unquote(raw_value.trim());
        apply_field(draft, key.trim(), value).map_err(|err| match err {
            PersistenceError::InvalidData(msg) => {
                PersistenceError::InvalidData(format!("line {}: {msg}", line_no + 1))
            }
            other => other,
        })?;
    }
    drafts.extend(current);
    Ok(drafts)
}

pub fn export_items_to_yaml<P: AsRef<Path>>(
    tracker: &Tracker,
    renovation_id: i64,
    path: P,
) -> PersistenceResult<usize> {
    let items = items_oldest_first(tracker, renovation_id)?;
    fs::write(path.as_ref(), items_to_yaml(&items))?;
    tracing::info!(renovation_id, count = items.len(), path = %path.as_ref().display(), "exported items to yaml");
    Ok(items.len())
}

pub fn import_items_from_yaml<P: AsRef<Path>>(
    tracker: &mut Tracker,
    renovation_id: i64,
    path: P,
) -> PersistenceResult<Vec<RenovationItem>> {
    let content = fs::read_to_string(path.as_ref())?;
    let drafts = items_from_yaml(&content)?;
    if drafts.is_empty() {
        return Err(PersistenceError::InvalidData(
            "YAML file contained no items".into(),
        ));
    }
    Ok(tracker.import_items(renovation_id, drafts)?)
}

enum Value {
    Text(String),
    Number(String),
}

impl Value {
    fn optional_number(value: Option<i64>) -> Self {
        match value {
            Some(v) => Value::Number(v.to_string()),
            None => Value::Text(String::new()),
        }
    }

    fn render(&self) -> String {
        match self {
            Value::Number(raw) => raw.clone(),
            Value::Text(text) => {
                let escaped = text
                    .replace('\\', "\\\\")
                    .replace('"', "\\\"")
                    .replace('\n', "\\n");
                format!("\"{escaped}\"")
            }
        }
    }
}

fn unquote(raw: &str) -> String {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return raw.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn apply_field(draft: &mut ItemDraft, key: &str, value: String) -> PersistenceResult<()> {
    match key {
        "id" => {}
        "itemNumber" => draft.item_number = value,
        "category" => draft.category = parse_string_option(value),
        "description" => draft.description = value,
        "supplier" => draft.supplier = parse_string_option(value),
        "budget" => draft.budget = parse_f64(&value)?.unwrap_or(0.0),
        "estimatedPrice" => draft.estimated_price = parse_f64(&value)?.unwrap_or(0.0),
        "paidValue" => draft.paid_value = parse_f64(&value)?.unwrap_or(0.0),
        "purchaseDate" => draft.purchase_date = parse_date(&value)?,
        "plannedDate" => draft.planned_date = parse_date(&value)?,
        "executedDate" => draft.executed_date = parse_date(&value)?,
        "estimatedDurationDays" => draft.estimated_duration_days = parse_i64(&value)?,
        "realDurationDays" => draft.real_duration_days = parse_i64(&value)?,
        "status" => draft.status = parse_status(&value)?,
        "paymentMethod" => draft.payment_method = parse_payment_method(&value)?,
        "observations" => draft.observations = parse_string_option(value),
        other => tracing::debug!(key = other, "ignoring unknown yaml key"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemStatus, PaymentMethod};

    #[test]
    fn reads_legacy_document() {
        let doc = r#"renovation_items:
  - id: "1"
    itemNumber: "001"
    category: "Cozinha"
    description: "Bancada de granito para cozinha"
    supplier: "Marmoraria Silva"
    budget: 2500
    estimatedPrice: 2300
    purchaseDate: "2024-01-15"
    paidValue: 2300
    status: "Concluído"
    paymentMethod: "PIX"
    observations: "Instalação incluída no preço"
"#;
        let drafts = items_from_yaml(doc).unwrap();
        assert_eq!(drafts.len(), 1);
        let draft = &drafts[0];
        assert_eq!(draft.item_number, "001");
        assert_eq!(draft.category.as_deref(), Some("Cozinha"));
        assert_eq!(draft.budget, 2500.0);
        assert_eq!(draft.status, ItemStatus::Completed);
        assert_eq!(draft.payment_method, Some(PaymentMethod::Pix));
        assert_eq!(draft.purchase_date.as_deref(), Some("2024-01-15"));
        assert_eq!(draft.planned_date, None);
    }

    #[test]
    fn quotes_and_colons_survive() {
        let mut item = RenovationItem::new(7, "007", "Door \"A\": oak");
        item.observations = Some("line one\nline two".into());
        let doc = items_to_yaml(&[item]);
        let drafts = items_from_yaml(&doc).unwrap();
        assert_eq!(drafts[0].description, "Door \"A\": oak");
        assert_eq!(drafts[0].observations.as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn stray_key_is_rejected() {
        let err = items_from_yaml("budget: 10\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
