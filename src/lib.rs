pub mod calendar;
pub mod config;
pub mod error;
pub mod format;
pub mod gantt;
pub mod item;
pub mod persistence;
pub mod reference;
pub mod renovation;
pub mod report;
pub mod tracker;
pub mod validation;

#[cfg(feature = "http_api")]
pub mod http_api;

pub use calendar::{WorkCalendar, WorkCalendarConfig};
pub use config::AppConfig;
pub use error::{TrackerError, TrackerResult, ValidationError};
pub use gantt::{
    GanttChart, GanttDateRange, GanttItem, RenovationEndDates, calculate_renovation_end_date,
    days_between_dates, process_gantt_data, process_gantt_data_at,
};
pub use item::{ItemDraft, ItemStatus, PaymentMethod, RenovationItem};
pub use reference::{Category, CategoryDraft, Supplier, SupplierDraft};
pub use renovation::{Renovation, RenovationDraft, RenovationStatus};
pub use report::RenovationReport;
pub use tracker::{IdSequences, Tracker};
