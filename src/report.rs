use crate::calendar::WorkCalendar;
use crate::gantt::{RenovationEndDates, calculate_renovation_end_date_with, resolve_category_label};
use crate::item::{ItemStatus, RenovationItem};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Badge colors for item statuses.
pub fn status_color(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Pending => "#fbbf24",
        ItemStatus::InProgress => "#3b82f6",
        ItemStatus::Completed => "#10b981",
        ItemStatus::Cancelled => "#ef4444",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: ItemStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub items: i64,
    pub budget: f64,
    pub estimated_price: f64,
    pub paid_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: i64,
    pub item_number: String,
    pub description: String,
    pub status: ItemStatus,
    pub planned_date: Option<NaiveDate>,
}

/// Business-day slip between the planned and the executed start of an item.
/// Positive means the work started late.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartVariance {
    pub item_id: i64,
    pub planned_start: NaiveDate,
    pub executed_start: NaiveDate,
    pub variance_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenovationReport {
    pub item_count: usize,
    pub total_budget: f64,
    pub total_estimated: f64,
    pub total_paid: f64,
    /// Budget minus what has been paid; negative when over budget.
    pub remaining_budget: f64,
    pub status_counts: Vec<StatusCount>,
    pub category_totals: Vec<CategoryTotal>,
    pub todo_items: Vec<TodoItem>,
    pub end_dates: RenovationEndDates,
    pub start_variances: Vec<StartVariance>,
    pub started_early: usize,
    pub started_on_time: usize,
    pub started_late: usize,
}

// Days since 1970-01-01, the physical layout of a polars Date column.
fn date_to_i32(date: NaiveDate) -> i32 {
    const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn series_from_dates(name: &'static str, dates: Vec<Option<NaiveDate>>) -> PolarsResult<Series> {
    let data: Vec<Option<i32>> = dates.into_iter().map(|d| d.map(date_to_i32)).collect();
    Series::new(PlSmallStr::from_static(name), data).cast(&DataType::Date)
}

/// One row per item with the resolved category and parsed dates.
pub fn items_dataframe(items: &[RenovationItem]) -> PolarsResult<DataFrame> {
    let ids: Vec<i64> = items.iter().map(|item| item.id).collect();
    let numbers: Vec<String> = items.iter().map(|item| item.item_number.clone()).collect();
    let descriptions: Vec<String> = items.iter().map(|item| item.description.clone()).collect();
    let categories: Vec<String> = items.iter().map(resolve_category_label).collect();
    let suppliers: Vec<Option<String>> = items
        .iter()
        .map(|item| item.supplier_label().map(str::to_string))
        .collect();
    let budgets: Vec<f64> = items.iter().map(|item| item.budget).collect();
    let estimated: Vec<f64> = items.iter().map(|item| item.estimated_price).collect();
    let paid: Vec<f64> = items.iter().map(|item| item.paid_value).collect();
    let statuses: Vec<&str> = items.iter().map(|item| item.status.as_str()).collect();
    let estimated_durations: Vec<Option<i64>> =
        items.iter().map(|item| item.estimated_duration_days).collect();
    let real_durations: Vec<Option<i64>> =
        items.iter().map(|item| item.real_duration_days).collect();

    let columns = vec![
        Series::new(PlSmallStr::from_static("id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("item_number"), numbers).into_column(),
        Series::new(PlSmallStr::from_static("description"), descriptions).into_column(),
        Series::new(PlSmallStr::from_static("category"), categories).into_column(),
        Series::new(PlSmallStr::from_static("supplier"), suppliers).into_column(),
        Series::new(PlSmallStr::from_static("budget"), budgets).into_column(),
        Series::new(PlSmallStr::from_static("estimated_price"), estimated).into_column(),
        Series::new(PlSmallStr::from_static("paid_value"), paid).into_column(),
        Series::new(PlSmallStr::from_static("status"), statuses).into_column(),
        series_from_dates(
            "planned_date",
            items.iter().map(RenovationItem::planned_on).collect(),
        )?
        .into_column(),
        Series::new(
            PlSmallStr::from_static("estimated_duration_days"),
            estimated_durations,
        )
        .into_column(),
        series_from_dates(
            "executed_date",
            items.iter().map(RenovationItem::executed_on).collect(),
        )?
        .into_column(),
        Series::new(PlSmallStr::from_static("real_duration_days"), real_durations).into_column(),
        series_from_dates(
            "purchase_date",
            items.iter().map(RenovationItem::purchased_on).collect(),
        )?
        .into_column(),
    ];

    DataFrame::new(columns)
}

/// Totals per resolved category, sorted by category label.
pub fn category_totals(df: &DataFrame) -> PolarsResult<Vec<CategoryTotal>> {
    if df.height() == 0 {
        return Ok(Vec::new());
    }

    let grouped = df
        .clone()
        .lazy()
        .group_by([col("category")])
        .agg([
            len().cast(DataType::Int64).alias("items"),
            col("budget").sum().alias("budget"),
            col("estimated_price").sum().alias("estimated_price"),
            col("paid_value").sum().alias("paid_value"),
        ])
        .sort(["category"], SortMultipleOptions::default())
        .collect()?;

    let categories = grouped.column("category")?.str()?;
    let counts = grouped.column("items")?.i64()?;
    let budgets = grouped.column("budget")?.f64()?;
    let estimated = grouped.column("estimated_price")?.f64()?;
    let paid = grouped.column("paid_value")?.f64()?;

    let totals = (0..grouped.height())
        .map(|idx| CategoryTotal {
            category: categories.get(idx).unwrap_or_default().to_string(),
            items: counts.get(idx).unwrap_or(0),
            budget: budgets.get(idx).unwrap_or(0.0),
            estimated_price: estimated.get(idx).unwrap_or(0.0),
            paid_value: paid.get(idx).unwrap_or(0.0),
        })
        .collect();
    Ok(totals)
}

pub fn build_report(
    items: &[RenovationItem],
    calendar: &WorkCalendar,
) -> PolarsResult<RenovationReport> {
    let df = items_dataframe(items)?;
    let category_totals = category_totals(&df)?;

    let total_budget: f64 = items.iter().map(|item| item.budget).sum();
    let total_estimated: f64 = items.iter().map(|item| item.estimated_price).sum();
    let total_paid: f64 = items.iter().map(|item| item.paid_value).sum();

    let status_counts = ItemStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: items.iter().filter(|item| item.status == status).count(),
        })
        .filter(|entry| entry.count > 0)
        .collect();

    let todo_items = items
        .iter()
        .filter(|item| item.status.is_open())
        .map(|item| TodoItem {
            id: item.id,
            item_number: item.item_number.clone(),
            description: item.description.clone(),
            status: item.status,
            planned_date: item.planned_on(),
        })
        .collect();

    let start_variances: Vec<StartVariance> = items
        .iter()
        .filter_map(|item| {
            let planned_start = item.planned_on()?;
            let executed_start = item.executed_on()?;
            Some(StartVariance {
                item_id: item.id,
                planned_start,
                executed_start,
                variance_days: calendar.working_days_diff(planned_start, executed_start),
            })
        })
        .collect();

    let started_early = start_variances.iter().filter(|v| v.variance_days < 0).count();
    let started_on_time = start_variances.iter().filter(|v| v.variance_days == 0).count();
    let started_late = start_variances.iter().filter(|v| v.variance_days > 0).count();

    tracing::debug!(
        items = items.len(),
        categories = category_totals.len(),
        "built renovation report"
    );

    Ok(RenovationReport {
        item_count: items.len(),
        total_budget,
        total_estimated,
        total_paid,
        remaining_budget: total_budget - total_paid,
        status_counts,
        category_totals,
        todo_items,
        end_dates: calculate_renovation_end_date_with(items, calendar),
        start_variances,
        started_early,
        started_on_time,
        started_late,
    })
}
