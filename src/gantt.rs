//! Gantt chart data for a renovation.
//!
//! [`process_gantt_data`] turns a list of items into a display window, one
//! timeline row per item and a category legend. Everything here is pure: no
//! I/O, inputs are never mutated, and malformed dates or durations simply drop
//! out of the computation instead of failing it.

use crate::calendar::WorkCalendar;
use crate::item::{ItemStatus, RenovationItem};
use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Label given to items that carry no category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Color of the uncategorized bucket, whatever its legend position.
pub const NEUTRAL_COLOR: &str = "#6b7280";

pub const CATEGORY_COLORS: [&str; 10] = [
    "#3b82f6", // blue
    "#10b981", // green
    "#f59e0b", // amber
    "#ef4444", // red
    "#8b5cf6", // purple
    "#06b6d4", // cyan
    "#84cc16", // lime
    "#f97316", // orange
    "#ec4899", // pink
    "#6b7280", // gray
];

const LEAD_PADDING_DAYS: u64 = 7;
const TRAIL_PADDING_DAYS: u64 = 14;
const EMPTY_LOOKBACK_DAYS: u64 = 30;
const EMPTY_LOOKAHEAD_DAYS: u64 = 60;

pub const DEFAULT_MAX_TICKS: usize = 10;

/// The date window every bar is scaled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GanttDateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A horizontal bar expressed in percent of the window width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineBar {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub left_percent: f64,
    pub width_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttItem {
    pub id: i64,
    pub item_number: String,
    pub description: String,
    pub category: String,
    pub category_color: String,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    pub executed_start: Option<NaiveDate>,
    pub executed_end: Option<NaiveDate>,
    pub purchase_date: Option<NaiveDate>,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttChart {
    pub gantt_items: Vec<GanttItem>,
    pub date_range: GanttDateRange,
    /// Sorted, distinct category labels for the legend.
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenovationEndDates {
    pub estimated_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
}

/// Category label of an item: the joined category record, then the legacy
/// free-text label, then [`UNCATEGORIZED`]. Blank values are skipped; other
/// labels are kept verbatim, so `"Kitchen "` and `"Kitchen"` stay distinct.
pub fn resolve_category_label(item: &RenovationItem) -> String {
    let joined = item.category_data.as_ref().map(|category| category.name.as_str());
    [joined, item.category.as_deref()]
        .into_iter()
        .flatten()
        .find(|label| !label.trim().is_empty())
        .unwrap_or(UNCATEGORIZED)
        .to_string()
}

/// Palette color for the category at `index` in the sorted legend.
pub fn category_color(label: &str, index: usize) -> &'static str {
    if label.trim().is_empty() || label == UNCATEGORIZED {
        return NEUTRAL_COLOR;
    }
    CATEGORY_COLORS[index % CATEGORY_COLORS.len()]
}

/// End of a span that starts on `start` and lasts `duration` business days.
/// Missing or negative durations yield `None`, as does an end past the last
/// representable date.
pub fn business_day_end(
    calendar: &WorkCalendar,
    start: Option<NaiveDate>,
    duration: Option<i64>,
) -> Option<NaiveDate> {
    let start = start?;
    let duration = u32::try_from(duration?).ok()?;
    calendar.add_business_days(start, duration)
}

/// Whole days from `start` to `end`; negative when `end` comes first.
pub fn days_between_dates(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Day difference between two timestamps, rounding any partial day up.
pub fn days_between_datetimes(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    const SECONDS_PER_DAY: i64 = 86_400;
    let seconds = (end - start).num_seconds();
    let whole = seconds.div_euclid(SECONDS_PER_DAY);
    if seconds.rem_euclid(SECONDS_PER_DAY) > 0 {
        whole + 1
    } else {
        whole
    }
}

/// Builds Gantt data against today's date and a Monday-to-Friday calendar.
pub fn process_gantt_data(items: &[RenovationItem]) -> GanttChart {
    process_gantt_data_at(items, Local::now().date_naive(), &WorkCalendar::default())
}

/// Builds Gantt data with an explicit "today" (used only for the empty-window
/// fallback) and business-day calendar.
pub fn process_gantt_data_at(
    items: &[RenovationItem],
    today: NaiveDate,
    calendar: &WorkCalendar,
) -> GanttChart {
    let rows: Vec<ItemSpans> = items
        .iter()
        .map(|item| ItemSpans::resolve(item, calendar))
        .collect();

    let categories: Vec<String> = rows
        .iter()
        .map(|row| row.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let date_range = window_for(rows.iter().flat_map(ItemSpans::dates), today);

    let gantt_items = items
        .iter()
        .zip(rows)
        .map(|(item, row)| {
            let index = categories
                .binary_search(&row.category)
                .unwrap_or_default();
            GanttItem {
                id: item.id,
                item_number: item.item_number.clone(),
                description: item.description.clone(),
                category_color: category_color(&row.category, index).to_string(),
                category: row.category,
                planned_start: row.planned_start,
                planned_end: row.planned_end,
                executed_start: row.executed_start,
                executed_end: row.executed_end,
                purchase_date: row.purchase_date,
                status: item.status,
            }
        })
        .collect();

    tracing::debug!(
        items = items.len(),
        start = %date_range.start_date,
        end = %date_range.end_date,
        "computed gantt window"
    );

    GanttChart {
        gantt_items,
        date_range,
        categories,
    }
}

/// Latest estimated and actual finish across items, on a Monday-to-Friday calendar.
pub fn calculate_renovation_end_date(items: &[RenovationItem]) -> RenovationEndDates {
    calculate_renovation_end_date_with(items, &WorkCalendar::default())
}

pub fn calculate_renovation_end_date_with(
    items: &[RenovationItem],
    calendar: &WorkCalendar,
) -> RenovationEndDates {
    items
        .iter()
        .fold(RenovationEndDates::default(), |acc, item| {
            let estimated =
                business_day_end(calendar, item.planned_on(), item.estimated_duration_days);
            let actual = business_day_end(calendar, item.executed_on(), item.real_duration_days);
            RenovationEndDates {
                estimated_end_date: acc.estimated_end_date.max(estimated),
                actual_end_date: acc.actual_end_date.max(actual),
            }
        })
}

struct ItemSpans {
    category: String,
    planned_start: Option<NaiveDate>,
    planned_end: Option<NaiveDate>,
    executed_start: Option<NaiveDate>,
    executed_end: Option<NaiveDate>,
    purchase_date: Option<NaiveDate>,
}

impl ItemSpans {
    fn resolve(item: &RenovationItem, calendar: &WorkCalendar) -> Self {
        let planned_start = item.planned_on();
        let executed_start = item.executed_on();
        Self {
            category: resolve_category_label(item),
            planned_start,
            planned_end: business_day_end(calendar, planned_start, item.estimated_duration_days),
            executed_start,
            executed_end: business_day_end(calendar, executed_start, item.real_duration_days),
            purchase_date: item.purchased_on(),
        }
    }

    fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        [
            self.planned_start,
            self.planned_end,
            self.executed_start,
            self.executed_end,
            self.purchase_date,
        ]
        .into_iter()
        .flatten()
    }
}

fn window_for(dates: impl Iterator<Item = NaiveDate>, today: NaiveDate) -> GanttDateRange {
    let bounds = dates.fold(None, |acc: Option<(NaiveDate, NaiveDate)>, date| match acc {
        Some((earliest, latest)) => Some((earliest.min(date), latest.max(date))),
        None => Some((date, date)),
    });

    let (anchor_start, anchor_end, lead, trail) = match bounds {
        Some((earliest, latest)) => (earliest, latest, LEAD_PADDING_DAYS, TRAIL_PADDING_DAYS),
        None => (today, today, EMPTY_LOOKBACK_DAYS, EMPTY_LOOKAHEAD_DAYS),
    };

    GanttDateRange {
        start_date: anchor_start
            .checked_sub_days(Days::new(lead))
            .unwrap_or(anchor_start),
        end_date: anchor_end
            .checked_add_days(Days::new(trail))
            .unwrap_or(anchor_end),
    }
}

impl GanttDateRange {
    pub fn total_days(&self) -> i64 {
        days_between_dates(self.start_date, self.end_date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Horizontal offset of `date` in percent of the window, never negative.
    pub fn position_of(&self, date: NaiveDate) -> f64 {
        let offset = days_between_dates(self.start_date, date) as f64;
        (offset / self.total_days().max(1) as f64 * 100.0).max(0.0)
    }

    /// Width of the span in percent of the window, at least 1 so that
    /// same-day spans stay visible.
    pub fn width_between(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        let span = days_between_dates(start, end) as f64;
        (span / self.total_days().max(1) as f64 * 100.0).max(1.0)
    }

    pub fn bar(&self, start: NaiveDate, end: NaiveDate) -> TimelineBar {
        TimelineBar {
            start,
            end,
            left_percent: self.position_of(start),
            width_percent: self.width_between(start, end),
        }
    }

    /// Every day of the window, thinned so at most `max_ticks` labels remain.
    pub fn tick_dates(&self, max_ticks: usize) -> Vec<NaiveDate> {
        let days: Vec<NaiveDate> = self
            .start_date
            .iter_days()
            .take_while(|day| *day <= self.end_date)
            .collect();
        let step = days.len().div_ceil(max_ticks.max(1)).max(1);
        days.into_iter().step_by(step).collect()
    }
}

impl GanttItem {
    pub fn planned_bar(&self, range: &GanttDateRange) -> Option<TimelineBar> {
        Some(range.bar(self.planned_start?, self.planned_end?))
    }

    pub fn executed_bar(&self, range: &GanttDateRange) -> Option<TimelineBar> {
        Some(range.bar(self.executed_start?, self.executed_end?))
    }

    pub fn purchase_marker(&self, range: &GanttDateRange) -> Option<f64> {
        self.purchase_date.map(|date| range.position_of(date))
    }
}

impl GanttChart {
    /// Legend entries in display order.
    pub fn legend(&self) -> Vec<(&str, &'static str)> {
        self.categories
            .iter()
            .enumerate()
            .map(|(index, label)| (label.as_str(), category_color(label, index)))
            .collect()
    }

    pub fn tick_labels(&self) -> Vec<String> {
        self.date_range
            .tick_dates(DEFAULT_MAX_TICKS)
            .into_iter()
            .map(crate::format::format_gantt_tick)
            .collect()
    }
}
