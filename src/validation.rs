use crate::error::ValidationError;
use crate::format::is_date_valid;
use crate::item::ItemDraft;
use crate::reference::{CategoryDraft, SupplierDraft};
use crate::renovation::RenovationDraft;

fn require(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(format!("{field} is required")));
    }
    Ok(())
}

fn non_negative_amount(value: f64, field: &str) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(format!(
            "{field} must be a non-negative number (got {value})"
        )));
    }
    Ok(())
}

fn optional_date(value: Option<&str>, field: &str) -> Result<(), ValidationError> {
    match value {
        Some(raw) if !is_date_valid(raw) => Err(ValidationError::new(format!(
            "{field} must be a valid date (got '{raw}')"
        ))),
        _ => Ok(()),
    }
}

fn optional_duration(value: Option<i64>, field: &str) -> Result<(), ValidationError> {
    match value {
        Some(days) if days < 0 => Err(ValidationError::new(format!(
            "{field} must be a non-negative number of business days (got {days})"
        ))),
        _ => Ok(()),
    }
}

pub fn validate_item_draft(draft: &ItemDraft) -> Result<(), ValidationError> {
    require(&draft.item_number, "item number")?;
    require(&draft.description, "description")?;
    non_negative_amount(draft.budget, "budget")?;
    non_negative_amount(draft.estimated_price, "estimated price")?;
    non_negative_amount(draft.paid_value, "paid value")?;
    optional_date(draft.purchase_date.as_deref(), "purchase date")?;
    optional_date(draft.planned_date.as_deref(), "planned date")?;
    optional_date(draft.executed_date.as_deref(), "executed date")?;
    optional_duration(draft.estimated_duration_days, "estimated duration")?;
    optional_duration(draft.real_duration_days, "real duration")?;
    Ok(())
}

pub fn validate_renovation_draft(draft: &RenovationDraft) -> Result<(), ValidationError> {
    require(&draft.name, "renovation name")?;
    if let (Some(start), Some(target)) = (draft.start_date, draft.target_completion_date) {
        if start > target {
            return Err(ValidationError::new(format!(
                "start date {start} must be on or before target completion date {target}"
            )));
        }
    }
    Ok(())
}

pub fn validate_category_draft(draft: &CategoryDraft) -> Result<(), ValidationError> {
    require(&draft.name, "category name")
}

pub fn validate_supplier_draft(draft: &SupplierDraft) -> Result<(), ValidationError> {
    require(&draft.name, "supplier name")?;
    if let Some(email) = draft.email.as_deref() {
        validate_email(email)?;
    }
    Ok(())
}

/// Accepts `local@domain.tld`: no whitespace, exactly one `@`, and a dot in the
/// domain with characters on both sides.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::new("email is required"));
    }
    let invalid = || ValidationError::new(format!("invalid email '{email}'"));
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let has_dotted_domain = domain
        .char_indices()
        .any(|(idx, ch)| ch == '.' && idx > 0 && idx + 1 < domain.len());
    if !has_dotted_domain {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_requires_number_and_description() {
        let err = validate_item_draft(&ItemDraft::new("", "Tiles")).unwrap_err();
        assert_eq!(err.message(), "item number is required");
        let err = validate_item_draft(&ItemDraft::new("001", "  ")).unwrap_err();
        assert_eq!(err.message(), "description is required");
        assert!(validate_item_draft(&ItemDraft::new("001", "Tiles")).is_ok());
    }

    #[test]
    fn item_rejects_negative_money_and_bad_dates() {
        let mut draft = ItemDraft::new("001", "Tiles");
        draft.budget = -1.0;
        assert!(validate_item_draft(&draft).is_err());

        let mut draft = ItemDraft::new("001", "Tiles");
        draft.planned_date = Some("2024-13-01".into());
        let err = validate_item_draft(&draft).unwrap_err();
        assert!(err.message().contains("planned date"));

        let mut draft = ItemDraft::new("001", "Tiles");
        draft.real_duration_days = Some(-3);
        assert!(validate_item_draft(&draft).is_err());

        let mut draft = ItemDraft::new("001", "Tiles");
        draft.estimated_duration_days = Some(250_000);
        assert!(validate_item_draft(&draft).is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("ana@example").is_err());
        assert!(validate_email("ana example@x.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana@.com").is_err());
        assert!(validate_email("ana@x@y.com").is_err());
    }
}
