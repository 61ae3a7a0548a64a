use super::{PersistenceError, PersistenceResult, TrackerSnapshot};
use crate::format::parse_iso_date;
use crate::item::{ItemDraft, ItemStatus, PaymentMethod, RenovationItem};
use crate::tracker::Tracker;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

pub fn save_tracker_to_json<P: AsRef<Path>>(tracker: &Tracker, path: P) -> PersistenceResult<()> {
    let snapshot = TrackerSnapshot::from_tracker(tracker);
    snapshot.validate()?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    tracing::info!(path = %path.as_ref().display(), "saved tracker snapshot");
    Ok(())
}

pub fn load_tracker_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Tracker> {
    let file = File::open(path.as_ref())?;
    let snapshot: TrackerSnapshot = serde_json::from_reader(file)?;
    let tracker = snapshot.into_tracker()?;
    tracing::info!(path = %path.as_ref().display(), "loaded tracker snapshot");
    Ok(tracker)
}

/// One CSV row per item. Category and supplier travel as labels so the file
/// can be imported into another tracker.
#[derive(Debug, Serialize, Deserialize)]
struct ItemCsvRecord {
    item_number: String,
    #[serde(default)]
    category: String,
    description: String,
    #[serde(default)]
    supplier: String,
    #[serde(default)]
    budget: String,
    #[serde(default)]
    estimated_price: String,
    #[serde(default)]
    paid_value: String,
    #[serde(default)]
    purchase_date: String,
    #[serde(default)]
    planned_date: String,
    #[serde(default)]
    estimated_duration_days: String,
    #[serde(default)]
    executed_date: String,
    #[serde(default)]
    real_duration_days: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    payment_method: String,
    #[serde(default)]
    observations: String,
}

impl From<&RenovationItem> for ItemCsvRecord {
    fn from(item: &RenovationItem) -> Self {
        Self {
            item_number: item.item_number.clone(),
            category: category_label(item).unwrap_or_default(),
            description: item.description.clone(),
            supplier: item.supplier_label().unwrap_or_default().to_string(),
            budget: item.budget.to_string(),
            estimated_price: item.estimated_price.to_string(),
            paid_value: item.paid_value.to_string(),
            purchase_date: item.purchase_date.clone().unwrap_or_default(),
            planned_date: item.planned_date.clone().unwrap_or_default(),
            estimated_duration_days: format_option_i64(item.estimated_duration_days),
            executed_date: item.executed_date.clone().unwrap_or_default(),
            real_duration_days: format_option_i64(item.real_duration_days),
            status: item.status.as_str().to_string(),
            payment_method: item
                .payment_method
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            observations: item.observations.clone().unwrap_or_default(),
        }
    }
}

impl ItemCsvRecord {
    fn into_draft(self) -> PersistenceResult<ItemDraft> {
        let mut draft = ItemDraft::new(self.item_number, self.description);
        draft.category = parse_string_option(self.category);
        draft.supplier = parse_string_option(self.supplier);
        draft.budget = parse_f64(&self.budget)?.unwrap_or(0.0);
        draft.estimated_price = parse_f64(&self.estimated_price)?.unwrap_or(0.0);
        draft.paid_value = parse_f64(&self.paid_value)?.unwrap_or(0.0);
        draft.purchase_date = parse_date(&self.purchase_date)?;
        draft.planned_date = parse_date(&self.planned_date)?;
        draft.estimated_duration_days = parse_i64(&self.estimated_duration_days)?;
        draft.executed_date = parse_date(&self.executed_date)?;
        draft.real_duration_days = parse_i64(&self.real_duration_days)?;
        draft.status = parse_status(&self.status)?;
        draft.payment_method = parse_payment_method(&self.payment_method)?;
        draft.observations = parse_string_option(self.observations);
        Ok(draft)
    }
}

/// Category label as stored on the item, without the uncategorized fallback.
pub(crate) fn category_label(item: &RenovationItem) -> Option<String> {
    item.category_data
        .as_ref()
        .map(|c| c.name.clone())
        .or_else(|| item.category.clone())
        .filter(|label| !label.trim().is_empty())
}

pub fn write_items_csv<W: Write>(items: &[RenovationItem], writer: W) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for item in items {
        writer.serialize(ItemCsvRecord::from(item))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_items_csv<R: Read>(reader: R) -> PersistenceResult<Vec<ItemDraft>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut drafts = Vec::new();
    for record in reader.deserialize::<ItemCsvRecord>() {
        drafts.push(record?.into_draft()?);
    }
    Ok(drafts)
}

/// Writes the items of a renovation, oldest first.
pub fn export_items_to_csv<P: AsRef<Path>>(
    tracker: &Tracker,
    renovation_id: i64,
    path: P,
) -> PersistenceResult<usize> {
    let items = items_oldest_first(tracker, renovation_id)?;
    let file = File::create(path.as_ref())?;
    write_items_csv(&items, file)?;
    tracing::info!(renovation_id, count = items.len(), path = %path.as_ref().display(), "exported items to csv");
    Ok(items.len())
}

pub fn import_items_from_csv<P: AsRef<Path>>(
    tracker: &mut Tracker,
    renovation_id: i64,
    path: P,
) -> PersistenceResult<Vec<RenovationItem>> {
    let file = File::open(path.as_ref())?;
    let drafts = read_items_csv(file)?;
    if drafts.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no items".into(),
        ));
    }
    Ok(tracker.import_items(renovation_id, drafts)?)
}

pub(crate) fn items_oldest_first(
    tracker: &Tracker,
    renovation_id: i64,
) -> PersistenceResult<Vec<RenovationItem>> {
    let mut items = tracker.items_for(renovation_id)?;
    items.sort_by_key(|item| item.id);
    Ok(items)
}

fn format_option_i64(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub(crate) fn parse_date(input: &str) -> PersistenceResult<Option<String>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_iso_date(trimmed)
        .map(|_| Some(trimmed.to_string()))
        .ok_or_else(|| PersistenceError::InvalidData(format!("invalid date '{input}'")))
}

pub(crate) fn parse_f64(input: &str) -> PersistenceResult<Option<f64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid number '{input}': {e}")))
}

pub(crate) fn parse_i64(input: &str) -> PersistenceResult<Option<i64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid integer '{input}': {e}")))
}

pub(crate) fn parse_status(input: &str) -> PersistenceResult<ItemStatus> {
    if input.trim().is_empty() {
        return Ok(ItemStatus::default());
    }
    ItemStatus::from_str(input).map_err(|e| PersistenceError::InvalidData(e.to_string()))
}

pub(crate) fn parse_payment_method(input: &str) -> PersistenceResult<Option<PaymentMethod>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    PaymentMethod::from_str(input)
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(e.to_string()))
}

pub(crate) fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
