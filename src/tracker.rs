use crate::calendar::{WorkCalendar, WorkCalendarConfig};
use crate::error::{TrackerError, TrackerResult};
use crate::format::format_item_number;
use crate::gantt::{GanttChart, RenovationEndDates, calculate_renovation_end_date_with, process_gantt_data_at};
use crate::item::{ItemDraft, RenovationItem};
use crate::reference::{Category, CategoryDraft, Supplier, SupplierDraft};
use crate::renovation::{Renovation, RenovationDraft};
use crate::report::{RenovationReport, build_report};
use crate::validation::{
    validate_category_draft, validate_item_draft, validate_renovation_draft,
    validate_supplier_draft,
};
use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Last id handed out per record kind. Ids only ever grow, so a deleted
/// record's id is never given to a new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdSequences {
    #[serde(default)]
    pub renovations: i64,
    #[serde(default)]
    pub items: i64,
    #[serde(default)]
    pub categories: i64,
    #[serde(default)]
    pub suppliers: i64,
}

/// In-memory store of renovations, their items and the shared reference data.
///
/// Every write is validated before anything is touched, so a failed call
/// leaves the tracker unchanged. Items carry a copy of their category and
/// supplier records (`category_data` / `supplier_data`), refreshed whenever
/// either side changes.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    renovations: BTreeMap<i64, Renovation>,
    items: BTreeMap<i64, RenovationItem>,
    categories: BTreeMap<i64, Category>,
    suppliers: BTreeMap<i64, Supplier>,
    calendar: WorkCalendar,
    sequences: IdSequences,
}

fn next_id<V>(last_issued: &mut i64, map: &BTreeMap<i64, V>) -> i64 {
    let highest = map.keys().next_back().copied().unwrap_or(0);
    *last_issued = (*last_issued).max(highest) + 1;
    *last_issued
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calendar(calendar: WorkCalendar) -> Self {
        Self {
            calendar,
            ..Self::default()
        }
    }

    /// Rebuilds a tracker from stored records, re-linking item joins.
    pub(crate) fn from_parts(
        renovations: Vec<Renovation>,
        items: Vec<RenovationItem>,
        categories: Vec<Category>,
        suppliers: Vec<Supplier>,
        calendar: WorkCalendar,
        sequences: IdSequences,
    ) -> Self {
        let mut tracker = Self {
            renovations: renovations.into_iter().map(|r| (r.id, r)).collect(),
            items: BTreeMap::new(),
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
            suppliers: suppliers.into_iter().map(|s| (s.id, s)).collect(),
            calendar,
            sequences,
        };
        for mut item in items {
            tracker.link_references(&mut item);
            tracker.items.insert(item.id, item);
        }
        tracker
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    pub fn calendar_config(&self) -> WorkCalendarConfig {
        self.calendar.to_config()
    }

    pub fn set_calendar(&mut self, calendar: WorkCalendar) {
        self.calendar = calendar;
    }

    pub fn id_sequences(&self) -> IdSequences {
        self.sequences
    }

    // ---- renovations ----

    /// All renovations, newest first.
    pub fn renovations(&self) -> Vec<&Renovation> {
        let mut list: Vec<&Renovation> = self.renovations.values().collect();
        list.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        list
    }

    pub fn find_renovation(&self, id: i64) -> Option<&Renovation> {
        self.renovations.get(&id)
    }

    pub fn renovation(&self, id: i64) -> TrackerResult<&Renovation> {
        self.find_renovation(id)
            .ok_or_else(|| TrackerError::not_found("renovation", id))
    }

    pub fn create_renovation(&mut self, draft: RenovationDraft) -> TrackerResult<Renovation> {
        let draft = draft.normalized();
        validate_renovation_draft(&draft)?;

        let id = next_id(&mut self.sequences.renovations, &self.renovations);
        let renovation = Renovation::from_draft(id, draft, Utc::now());
        tracing::info!(renovation_id = id, name = %renovation.name, "created renovation");
        self.renovations.insert(id, renovation.clone());
        Ok(renovation)
    }

    pub fn update_renovation(
        &mut self,
        id: i64,
        draft: RenovationDraft,
    ) -> TrackerResult<Renovation> {
        let draft = draft.normalized();
        validate_renovation_draft(&draft)?;

        let renovation = self
            .renovations
            .get_mut(&id)
            .ok_or_else(|| TrackerError::not_found("renovation", id))?;
        renovation.apply(draft, Utc::now());
        tracing::info!(renovation_id = id, "updated renovation");
        Ok(renovation.clone())
    }

    /// Removes a renovation together with all of its items.
    pub fn delete_renovation(&mut self, id: i64) -> TrackerResult<Renovation> {
        let renovation = self
            .renovations
            .remove(&id)
            .ok_or_else(|| TrackerError::not_found("renovation", id))?;
        let before = self.items.len();
        self.items.retain(|_, item| item.renovation_id != id);
        tracing::info!(
            renovation_id = id,
            removed_items = before - self.items.len(),
            "deleted renovation"
        );
        Ok(renovation)
    }

    // ---- items ----

    /// Items of a renovation, newest first.
    pub fn items_for(&self, renovation_id: i64) -> TrackerResult<Vec<RenovationItem>> {
        self.renovation(renovation_id)?;
        let mut items: Vec<RenovationItem> = self
            .items
            .values()
            .filter(|item| item.renovation_id == renovation_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(items)
    }

    /// Every item across renovations, in id order.
    pub fn all_items(&self) -> impl Iterator<Item = &RenovationItem> {
        self.items.values()
    }

    pub fn find_item(&self, id: i64) -> Option<&RenovationItem> {
        self.items.get(&id)
    }

    pub fn item(&self, id: i64) -> TrackerResult<&RenovationItem> {
        self.find_item(id)
            .ok_or_else(|| TrackerError::not_found("item", id))
    }

    /// Next free numeric item number for a renovation, zero-padded (`"001"`).
    pub fn next_item_number(&self, renovation_id: i64) -> String {
        let highest = self
            .items
            .values()
            .filter(|item| item.renovation_id == renovation_id)
            .filter_map(|item| item.item_number.trim().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        format_item_number(&(highest + 1).to_string())
    }

    pub fn create_item(
        &mut self,
        renovation_id: i64,
        draft: ItemDraft,
    ) -> TrackerResult<RenovationItem> {
        self.renovation(renovation_id)?;
        let draft = self.checked_item_draft(draft)?;

        let id = next_id(&mut self.sequences.items, &self.items);
        let mut item = RenovationItem::from_draft(id, renovation_id, draft, Utc::now());
        self.link_references(&mut item);
        tracing::info!(renovation_id, item_id = id, number = %item.item_number, "created item");
        self.items.insert(id, item.clone());
        Ok(item)
    }

    pub fn update_item(&mut self, id: i64, draft: ItemDraft) -> TrackerResult<RenovationItem> {
        self.item(id)?;
        let draft = self.checked_item_draft(draft)?;

        let mut item = self.item(id)?.clone();
        item.apply(draft, Utc::now());
        self.link_references(&mut item);
        tracing::info!(item_id = id, "updated item");
        self.items.insert(id, item.clone());
        Ok(item)
    }

    pub fn delete_item(&mut self, id: i64) -> TrackerResult<RenovationItem> {
        let item = self
            .items
            .remove(&id)
            .ok_or_else(|| TrackerError::not_found("item", id))?;
        tracing::info!(item_id = id, renovation_id = item.renovation_id, "deleted item");
        Ok(item)
    }

    /// Adds a batch of items to a renovation. Free-text category and supplier
    /// labels without an id are matched by name against the reference data and
    /// created when missing. Nothing is inserted unless every draft is valid.
    pub fn import_items(
        &mut self,
        renovation_id: i64,
        drafts: Vec<ItemDraft>,
    ) -> TrackerResult<Vec<RenovationItem>> {
        self.renovation(renovation_id)?;
        let drafts: Vec<ItemDraft> = drafts.into_iter().map(ItemDraft::normalized).collect();
        for draft in &drafts {
            validate_item_draft(draft)?;
            self.check_item_references(draft)?;
        }

        let mut imported = Vec::with_capacity(drafts.len());
        for mut draft in drafts {
            if draft.category_id.is_none() {
                if let Some(label) = draft.category.clone() {
                    draft.category_id = Some(self.category_id_for_label(&label));
                }
            }
            if draft.supplier_id.is_none() {
                if let Some(label) = draft.supplier.clone() {
                    draft.supplier_id = Some(self.supplier_id_for_label(&label));
                }
            }
            let id = next_id(&mut self.sequences.items, &self.items);
            let mut item = RenovationItem::from_draft(id, renovation_id, draft, Utc::now());
            self.link_references(&mut item);
            self.items.insert(id, item.clone());
            imported.push(item);
        }
        tracing::info!(renovation_id, count = imported.len(), "imported items");
        Ok(imported)
    }

    fn checked_item_draft(&self, draft: ItemDraft) -> TrackerResult<ItemDraft> {
        let draft = draft.normalized();
        validate_item_draft(&draft)?;
        self.check_item_references(&draft)?;
        Ok(draft)
    }

    fn check_item_references(&self, draft: &ItemDraft) -> TrackerResult<()> {
        if let Some(category_id) = draft.category_id {
            self.category(category_id)?;
        }
        if let Some(supplier_id) = draft.supplier_id {
            self.supplier(supplier_id)?;
        }
        Ok(())
    }

    fn link_references(&self, item: &mut RenovationItem) {
        item.category_data = item
            .category_id
            .and_then(|id| self.categories.get(&id))
            .cloned();
        if item.category_data.is_none() {
            item.category_id = None;
        }
        item.supplier_data = item
            .supplier_id
            .and_then(|id| self.suppliers.get(&id))
            .cloned();
        if item.supplier_data.is_none() {
            item.supplier_id = None;
        }
    }

    fn relink_all(&mut self) {
        let mut items = std::mem::take(&mut self.items);
        for item in items.values_mut() {
            self.link_references(item);
        }
        self.items = items;
    }

    fn category_id_for_label(&mut self, label: &str) -> i64 {
        if let Some(existing) = self.categories.values().find(|c| same_name(&c.name, label)) {
            return existing.id;
        }
        let id = next_id(&mut self.sequences.categories, &self.categories);
        let category = Category::from_draft(id, CategoryDraft::new(label.trim()), Utc::now());
        tracing::info!(category_id = id, name = %category.name, "created category from label");
        self.categories.insert(id, category);
        id
    }

    fn supplier_id_for_label(&mut self, label: &str) -> i64 {
        if let Some(existing) = self.suppliers.values().find(|s| same_name(&s.name, label)) {
            return existing.id;
        }
        let id = next_id(&mut self.sequences.suppliers, &self.suppliers);
        let supplier = Supplier::from_draft(id, SupplierDraft::new(label.trim()), Utc::now());
        tracing::info!(supplier_id = id, name = %supplier.name, "created supplier from label");
        self.suppliers.insert(id, supplier);
        id
    }

    // ---- categories ----

    /// Categories sorted by name.
    pub fn categories(&self) -> Vec<&Category> {
        let mut list: Vec<&Category> = self.categories.values().collect();
        list.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        list
    }

    pub fn find_category(&self, id: i64) -> Option<&Category> {
        self.categories.get(&id)
    }

    pub fn category(&self, id: i64) -> TrackerResult<&Category> {
        self.find_category(id)
            .ok_or_else(|| TrackerError::not_found("category", id))
    }

    pub fn create_category(&mut self, draft: CategoryDraft) -> TrackerResult<Category> {
        let draft = draft.normalized();
        validate_category_draft(&draft)?;
        self.ensure_unique_category(&draft.name, None)?;

        let id = next_id(&mut self.sequences.categories, &self.categories);
        let category = Category::from_draft(id, draft, Utc::now());
        tracing::info!(category_id = id, name = %category.name, "created category");
        self.categories.insert(id, category.clone());
        Ok(category)
    }

    pub fn update_category(&mut self, id: i64, draft: CategoryDraft) -> TrackerResult<Category> {
        let draft = draft.normalized();
        validate_category_draft(&draft)?;
        self.category(id)?;
        self.ensure_unique_category(&draft.name, Some(id))?;

        let category = self
            .categories
            .get_mut(&id)
            .ok_or_else(|| TrackerError::not_found("category", id))?;
        category.apply(draft, Utc::now());
        let updated = category.clone();
        self.relink_all();
        tracing::info!(category_id = id, "updated category");
        Ok(updated)
    }

    /// Removes a category and detaches it from every item that used it.
    pub fn delete_category(&mut self, id: i64) -> TrackerResult<Category> {
        let category = self
            .categories
            .remove(&id)
            .ok_or_else(|| TrackerError::not_found("category", id))?;
        self.relink_all();
        tracing::info!(category_id = id, "deleted category");
        Ok(category)
    }

    fn ensure_unique_category(&self, name: &str, except: Option<i64>) -> TrackerResult<()> {
        let taken = self
            .categories
            .values()
            .any(|c| Some(c.id) != except && same_name(&c.name, name));
        if taken {
            return Err(TrackerError::Conflict(format!(
                "category '{name}' already exists"
            )));
        }
        Ok(())
    }

    // ---- suppliers ----

    /// Suppliers sorted by name.
    pub fn suppliers(&self) -> Vec<&Supplier> {
        let mut list: Vec<&Supplier> = self.suppliers.values().collect();
        list.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        list
    }

    pub fn find_supplier(&self, id: i64) -> Option<&Supplier> {
        self.suppliers.get(&id)
    }

    pub fn supplier(&self, id: i64) -> TrackerResult<&Supplier> {
        self.find_supplier(id)
            .ok_or_else(|| TrackerError::not_found("supplier", id))
    }

    pub fn create_supplier(&mut self, draft: SupplierDraft) -> TrackerResult<Supplier> {
        let draft = draft.normalized();
        validate_supplier_draft(&draft)?;
        self.ensure_unique_supplier(&draft.name, None)?;

        let id = next_id(&mut self.sequences.suppliers, &self.suppliers);
        let supplier = Supplier::from_draft(id, draft, Utc::now());
        tracing::info!(supplier_id = id, name = %supplier.name, "created supplier");
        self.suppliers.insert(id, supplier.clone());
        Ok(supplier)
    }

    pub fn update_supplier(&mut self, id: i64, draft: SupplierDraft) -> TrackerResult<Supplier> {
        let draft = draft.normalized();
        validate_supplier_draft(&draft)?;
        self.supplier(id)?;
        self.ensure_unique_supplier(&draft.name, Some(id))?;

        let supplier = self
            .suppliers
            .get_mut(&id)
            .ok_or_else(|| TrackerError::not_found("supplier", id))?;
        supplier.apply(draft, Utc::now());
        let updated = supplier.clone();
        self.relink_all();
        tracing::info!(supplier_id = id, "updated supplier");
        Ok(updated)
    }

    /// Removes a supplier and detaches it from every item that used it.
    pub fn delete_supplier(&mut self, id: i64) -> TrackerResult<Supplier> {
        let supplier = self
            .suppliers
            .remove(&id)
            .ok_or_else(|| TrackerError::not_found("supplier", id))?;
        self.relink_all();
        tracing::info!(supplier_id = id, "deleted supplier");
        Ok(supplier)
    }

    fn ensure_unique_supplier(&self, name: &str, except: Option<i64>) -> TrackerResult<()> {
        let taken = self
            .suppliers
            .values()
            .any(|s| Some(s.id) != except && same_name(&s.name, name));
        if taken {
            return Err(TrackerError::Conflict(format!(
                "supplier '{name}' already exists"
            )));
        }
        Ok(())
    }

    // ---- derived views ----

    pub fn gantt(&self, renovation_id: i64) -> TrackerResult<GanttChart> {
        self.gantt_at(renovation_id, Local::now().date_naive())
    }

    /// Gantt data with an explicit "today", used when the renovation has no dates.
    pub fn gantt_at(&self, renovation_id: i64, today: NaiveDate) -> TrackerResult<GanttChart> {
        let items = self.items_for(renovation_id)?;
        Ok(process_gantt_data_at(&items, today, &self.calendar))
    }

    pub fn end_dates(&self, renovation_id: i64) -> TrackerResult<RenovationEndDates> {
        let items = self.items_for(renovation_id)?;
        Ok(calculate_renovation_end_date_with(&items, &self.calendar))
    }

    pub fn report(&self, renovation_id: i64) -> TrackerResult<RenovationReport> {
        let items = self.items_for(renovation_id)?;
        build_report(&items, &self.calendar)
            .map_err(|err| TrackerError::Aggregation(err.to_string()))
    }
}
