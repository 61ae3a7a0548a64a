use chrono::NaiveDate;
use renovation_tracker::{
    CategoryDraft, ItemDraft, ItemStatus, RenovationDraft, SupplierDraft, Tracker, TrackerError,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn tracker_with_renovation() -> (Tracker, i64) {
    let mut tracker = Tracker::new();
    let renovation = tracker
        .create_renovation(RenovationDraft::new("Apartment 42"))
        .unwrap();
    (tracker, renovation.id)
}

#[test]
fn renovations_are_listed_newest_first() {
    let mut tracker = Tracker::new();
    let first = tracker.create_renovation(RenovationDraft::new("First")).unwrap();
    let second = tracker.create_renovation(RenovationDraft::new("Second")).unwrap();
    let ids: Vec<i64> = tracker.renovations().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[test]
fn renovation_validation_rejects_inverted_dates() {
    let mut tracker = Tracker::new();
    let mut draft = RenovationDraft::new("Kitchen");
    draft.start_date = Some(d(2024, 3, 1));
    draft.target_completion_date = Some(d(2024, 2, 1));
    let err = tracker.create_renovation(draft).unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)));
    assert!(tracker.renovations().is_empty());

    let err = tracker.create_renovation(RenovationDraft::new("   ")).unwrap_err();
    assert_eq!(err.to_string(), "renovation name is required");
}

#[test]
fn update_renovation_keeps_created_at() {
    let (mut tracker, rid) = tracker_with_renovation();
    let created = tracker.renovation(rid).unwrap().created_at;
    let mut draft = tracker.renovation(rid).unwrap().to_draft();
    draft.name = "Apartment 42 (phase 2)".into();
    let updated = tracker.update_renovation(rid, draft).unwrap();
    assert_eq!(updated.name, "Apartment 42 (phase 2)");
    assert_eq!(updated.created_at, created);

    let err = tracker
        .update_renovation(99, RenovationDraft::new("x"))
        .unwrap_err();
    assert_eq!(err, TrackerError::NotFound { entity: "renovation", id: 99 });
}

#[test]
fn deleting_a_renovation_removes_its_items() {
    let (mut tracker, rid) = tracker_with_renovation();
    let other = tracker.create_renovation(RenovationDraft::new("Garden")).unwrap();
    tracker.create_item(rid, ItemDraft::new("001", "Tiles")).unwrap();
    tracker.create_item(rid, ItemDraft::new("002", "Paint")).unwrap();
    let kept = tracker.create_item(other.id, ItemDraft::new("001", "Hose")).unwrap();

    tracker.delete_renovation(rid).unwrap();
    assert!(tracker.find_renovation(rid).is_none());
    let remaining: Vec<i64> = tracker.all_items().map(|item| item.id).collect();
    assert_eq!(remaining, vec![kept.id]);
    assert!(tracker.items_for(rid).is_err());
}

#[test]
fn items_are_listed_newest_first_and_numbered() {
    let (mut tracker, rid) = tracker_with_renovation();
    assert_eq!(tracker.next_item_number(rid), "001");
    let first = tracker.create_item(rid, ItemDraft::new("001", "Tiles")).unwrap();
    assert_eq!(tracker.next_item_number(rid), "002");
    let second = tracker
        .create_item(rid, ItemDraft::new(tracker.next_item_number(rid), "Paint"))
        .unwrap();

    let ids: Vec<i64> = tracker.items_for(rid).unwrap().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(second.item_number, "002");
    assert_eq!(second.renovation_id, rid);
}

#[test]
fn invalid_item_leaves_tracker_unchanged() {
    let (mut tracker, rid) = tracker_with_renovation();
    let mut draft = ItemDraft::new("001", "Tiles");
    draft.paid_value = -10.0;
    assert!(matches!(
        tracker.create_item(rid, draft),
        Err(TrackerError::Validation(_))
    ));
    assert_eq!(tracker.all_items().count(), 0);

    let err = tracker.create_item(7, ItemDraft::new("001", "Tiles")).unwrap_err();
    assert_eq!(err, TrackerError::NotFound { entity: "renovation", id: 7 });
}

#[test]
fn blank_form_values_are_stored_as_absent() {
    let (mut tracker, rid) = tracker_with_renovation();
    let mut draft = ItemDraft::new(" 001 ", " Tiles ");
    draft.planned_date = Some("".into());
    draft.observations = Some("   ".into());
    let item = tracker.create_item(rid, draft).unwrap();
    assert_eq!(item.item_number, "001");
    assert_eq!(item.description, "Tiles");
    assert_eq!(item.planned_date, None);
    assert_eq!(item.observations, None);
}

#[test]
fn item_update_and_delete() {
    let (mut tracker, rid) = tracker_with_renovation();
    let item = tracker.create_item(rid, ItemDraft::new("001", "Tiles")).unwrap();

    let mut draft = item.to_draft();
    draft.status = ItemStatus::Completed;
    draft.paid_value = 120.0;
    let updated = tracker.update_item(item.id, draft).unwrap();
    assert_eq!(updated.status, ItemStatus::Completed);
    assert_eq!(updated.paid_value, 120.0);
    assert_eq!(updated.created_at, item.created_at);

    tracker.delete_item(item.id).unwrap();
    assert!(tracker.find_item(item.id).is_none());
    assert!(matches!(
        tracker.delete_item(item.id),
        Err(TrackerError::NotFound { entity: "item", .. })
    ));
}

#[test]
fn deleted_ids_are_never_reissued() {
    let (mut tracker, rid) = tracker_with_renovation();
    tracker.create_item(rid, ItemDraft::new("001", "Tiles")).unwrap();
    let newest = tracker.create_item(rid, ItemDraft::new("002", "Grout")).unwrap();
    tracker.delete_item(newest.id).unwrap();

    let replacement = tracker.create_item(rid, ItemDraft::new("002", "Sealant")).unwrap();
    assert_eq!(replacement.id, 3);
    assert!(tracker.delete_item(newest.id).is_err());
    assert_eq!(tracker.item(replacement.id).unwrap().description, "Sealant");

    let category = tracker.create_category(CategoryDraft::new("Electrical")).unwrap();
    tracker.delete_category(category.id).unwrap();
    let again = tracker.create_category(CategoryDraft::new("Electrical")).unwrap();
    assert_eq!(again.id, category.id + 1);

    tracker.delete_renovation(rid).unwrap();
    let next = tracker.create_renovation(RenovationDraft::new("Office")).unwrap();
    assert_eq!(next.id, rid + 1);
    assert_eq!(tracker.id_sequences().items, 3);
}

#[test]
fn items_carry_joined_reference_records() {
    let (mut tracker, rid) = tracker_with_renovation();
    let category = tracker.create_category(CategoryDraft::new("Electrical")).unwrap();
    let supplier = tracker.create_supplier(SupplierDraft::new("Casa & Obra")).unwrap();

    let mut draft = ItemDraft::new("001", "Outlets");
    draft.category_id = Some(category.id);
    draft.supplier_id = Some(supplier.id);
    let item = tracker.create_item(rid, draft).unwrap();
    assert_eq!(item.category_data.as_ref().map(|c| c.name.as_str()), Some("Electrical"));
    assert_eq!(item.supplier_label(), Some("Casa & Obra"));

    tracker
        .update_category(category.id, CategoryDraft::new("Wiring"))
        .unwrap();
    let refreshed = tracker.item(item.id).unwrap();
    assert_eq!(refreshed.category_data.as_ref().unwrap().name, "Wiring");
}

#[test]
fn unknown_reference_ids_are_rejected() {
    let (mut tracker, rid) = tracker_with_renovation();
    let mut draft = ItemDraft::new("001", "Outlets");
    draft.category_id = Some(5);
    assert_eq!(
        tracker.create_item(rid, draft).unwrap_err(),
        TrackerError::NotFound { entity: "category", id: 5 }
    );
}

#[test]
fn deleting_reference_data_detaches_items() {
    let (mut tracker, rid) = tracker_with_renovation();
    let category = tracker.create_category(CategoryDraft::new("Plumbing")).unwrap();
    let supplier = tracker.create_supplier(SupplierDraft::new("Hydro Ltda")).unwrap();
    let mut draft = ItemDraft::new("001", "Pipes");
    draft.category_id = Some(category.id);
    draft.supplier_id = Some(supplier.id);
    let item = tracker.create_item(rid, draft).unwrap();

    tracker.delete_category(category.id).unwrap();
    tracker.delete_supplier(supplier.id).unwrap();
    let detached = tracker.item(item.id).unwrap();
    assert_eq!(detached.category_id, None);
    assert_eq!(detached.category_data, None);
    assert_eq!(detached.supplier_id, None);
    assert_eq!(detached.supplier_data, None);
}

#[test]
fn reference_names_are_unique_ignoring_case() {
    let mut tracker = Tracker::new();
    let paint = tracker.create_category(CategoryDraft::new("Paint")).unwrap();
    let floor = tracker.create_category(CategoryDraft::new("Floor")).unwrap();
    assert!(matches!(
        tracker.create_category(CategoryDraft::new(" paint ")),
        Err(TrackerError::Conflict(_))
    ));
    assert!(matches!(
        tracker.update_category(floor.id, CategoryDraft::new("PAINT")),
        Err(TrackerError::Conflict(_))
    ));
    // renaming to its own name is fine
    tracker
        .update_category(paint.id, CategoryDraft::new("Paint"))
        .unwrap();

    tracker.create_supplier(SupplierDraft::new("Leroy")).unwrap();
    assert!(matches!(
        tracker.create_supplier(SupplierDraft::new("leroy")),
        Err(TrackerError::Conflict(_))
    ));
}

#[test]
fn reference_lists_are_sorted_by_name() {
    let mut tracker = Tracker::new();
    for name in ["Painting", "electrical", "Carpentry"] {
        tracker.create_category(CategoryDraft::new(name)).unwrap();
    }
    let names: Vec<&str> = tracker.categories().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Carpentry", "electrical", "Painting"]);
}

#[test]
fn supplier_email_is_validated() {
    let mut tracker = Tracker::new();
    let mut draft = SupplierDraft::new("Leroy");
    draft.email = Some("not-an-email".into());
    assert!(matches!(
        tracker.create_supplier(draft),
        Err(TrackerError::Validation(_))
    ));

    let mut draft = SupplierDraft::new("Leroy");
    draft.email = Some("  ".into());
    let supplier = tracker.create_supplier(draft).unwrap();
    assert_eq!(supplier.email, None);
}

#[test]
fn import_resolves_labels_against_reference_data() {
    let (mut tracker, rid) = tracker_with_renovation();
    let existing = tracker.create_category(CategoryDraft::new("Kitchen")).unwrap();

    let mut first = ItemDraft::new("001", "Cabinets");
    first.category = Some("kitchen".into());
    first.supplier = Some("Marcenaria Silva".into());
    let mut second = ItemDraft::new("002", "Shower");
    second.category = Some("Bathroom".into());
    second.supplier = Some("marcenaria silva".into());

    let imported = tracker.import_items(rid, vec![first, second]).unwrap();
    assert_eq!(imported.len(), 2);
    assert_eq!(imported[0].category_id, Some(existing.id));
    assert_eq!(tracker.categories().len(), 2);
    assert_eq!(tracker.suppliers().len(), 1);
    assert_eq!(imported[0].supplier_id, imported[1].supplier_id);
    assert_eq!(
        imported[1].category_data.as_ref().map(|c| c.name.as_str()),
        Some("Bathroom")
    );
}

#[test]
fn import_is_all_or_nothing() {
    let (mut tracker, rid) = tracker_with_renovation();
    let mut bad = ItemDraft::new("002", "Shower");
    bad.estimated_duration_days = Some(-1);
    let mut good = ItemDraft::new("001", "Cabinets");
    good.category = Some("Kitchen".into());

    assert!(tracker.import_items(rid, vec![good, bad]).is_err());
    assert_eq!(tracker.all_items().count(), 0);
    assert!(tracker.categories().is_empty());
}

#[test]
fn derived_views_use_the_tracker_calendar() {
    let (mut tracker, rid) = tracker_with_renovation();
    let mut draft = ItemDraft::new("001", "Tiles");
    draft.planned_date = Some("2024-01-05".into());
    draft.estimated_duration_days = Some(3);
    tracker.create_item(rid, draft).unwrap();

    assert_eq!(tracker.end_dates(rid).unwrap().estimated_end_date, Some(d(2024, 1, 10)));

    let mut calendar = tracker.calendar().clone();
    calendar.add_holiday(d(2024, 1, 9));
    tracker.set_calendar(calendar);
    let chart = tracker.gantt_at(rid, d(2024, 6, 1)).unwrap();
    assert_eq!(chart.gantt_items[0].planned_end, Some(d(2024, 1, 11)));
    assert_eq!(tracker.end_dates(rid).unwrap().estimated_end_date, Some(d(2024, 1, 11)));
}
