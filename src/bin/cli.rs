use std::io::{self, Write};

use anyhow::Context;
use chrono::{NaiveDate, Weekday};
use polars::prelude::{AnyValue, DataFrame};
use renovation_tracker::config::AppConfig;
use renovation_tracker::format::{
    format_currency_with, format_date, format_item_number, parse_iso_date,
};
use renovation_tracker::gantt::{GanttChart, GanttDateRange};
use renovation_tracker::persistence::{
    export_items_to_csv, export_items_to_yaml, import_items_from_csv, import_items_from_yaml,
    load_tracker_from_json, save_tracker_to_json,
};
use renovation_tracker::report::items_dataframe;
use renovation_tracker::{
    CategoryDraft, ItemDraft, ItemStatus, PaymentMethod, RenovationDraft, RenovationStatus,
    SupplierDraft, Tracker, TrackerError,
};
use tracing_subscriber::EnvFilter;

const TABLE_COLUMNS: [&str; 11] = [
    "id",
    "item_number",
    "category",
    "description",
    "status",
    "budget",
    "paid_value",
    "planned_date",
    "estimated_duration_days",
    "executed_date",
    "real_duration_days",
];

const BAR_WIDTH: usize = 40;

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cell = |ci: usize, row_idx: usize| -> String {
        match columns[ci].get(row_idx) {
            Ok(AnyValue::Null) | Err(_) => String::new(),
            Ok(AnyValue::String(s)) => s.to_string(),
            Ok(AnyValue::Float64(v)) => format!("{v:.2}"),
            Ok(av) => av.to_string(),
        }
    };

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for (ci, width) in widths.iter_mut().enumerate() {
        for row_idx in 0..df.height() {
            *width = (*width).max(cell(ci, row_idx).chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let push_row = |out: &mut String, values: Vec<String>| {
        out.push('|');
        for (ci, value) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(value.chars().count());
            out.push(' ');
            out.push_str(value);
            out.push_str(&" ".repeat(pad));
            out.push_str(" |");
        }
        out.push('\n');
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, col_names.clone());
    out.push_str(&sep);
    out.push('\n');
    for row_idx in 0..df.height() {
        push_row(&mut out, (0..columns.len()).map(|ci| cell(ci, row_idx)).collect());
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show items of the current renovation\n  reno list                          List renovations\n  reno new <name...>                 Create a renovation and switch to it\n  reno use <id>                      Switch current renovation\n  reno status <status>               Set status of the current renovation\n  reno dates <YYYY-MM-DD> <YYYY-MM-DD>\n                                     Set start and target completion dates\n  reno delete <id>                   Delete a renovation and its items\n  add <description...>               Add an item with the next item number\n  set <id> <field> <value...>        Edit an item field (number, description, category,\n                                     supplier, budget, estimated, paid, purchase, planned,\n                                     est_days, executed, real_days, status, payment, notes)\n  delete <id>                        Delete an item\n  sample                             Add a sample item\n  gantt [YYYY-MM-DD]                 Show the Gantt chart (optional 'today')\n  enddate                            Show estimated and actual end dates\n  report                             Show the renovation report\n  category list|add <name...>|rename <id> <name...>|delete <id>\n  supplier list|add <name...>|email <id> <email>|phone <id> <phone>|delete <id>\n  calendar show|holiday <YYYY-MM-DD>|workdays <Mon,Tue,...>\n  save json <path>                   Save everything to a JSON snapshot\n  load json <path>                   Replace everything from a JSON snapshot\n  export <csv|yaml> <path>           Export items of the current renovation\n  import <csv|yaml> <path>           Import items into the current renovation\n  quit|exit                          Exit"
    );
}

struct Session {
    tracker: Tracker,
    current: i64,
    currency: String,
}

impl Session {
    fn show(&self) {
        match self.tracker.items_for(self.current) {
            Ok(items) => match items_dataframe(&items).and_then(|df| df.select(TABLE_COLUMNS)) {
                Ok(df) => println!("{}", render_df_as_text_table(&df)),
                Err(e) => println!("Error building table: {}", e),
            },
            Err(e) => println!("Error: {}", e),
        }
    }

    fn money(&self, value: f64) -> String {
        format_currency_with(&self.currency, value)
    }

    fn ensure_renovation(&mut self) -> Result<(), TrackerError> {
        if let Some(latest) = self.tracker.renovations().first() {
            self.current = latest.id;
            return Ok(());
        }
        let created = self
            .tracker
            .create_renovation(RenovationDraft::new("My renovation"))?;
        self.current = created.id;
        Ok(())
    }
}

fn parse_id(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}

fn parse_weekdays(input: &str) -> Option<Vec<Weekday>> {
    input
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.trim().parse::<Weekday>().ok())
        .collect()
}

fn describe_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_else(|| "-".to_string())
}

fn ascii_bar(range: &GanttDateRange, start: NaiveDate, end: NaiveDate, fill: char) -> String {
    let bar = range.bar(start, end);
    let scale = BAR_WIDTH as f64 / 100.0;
    let left = ((bar.left_percent * scale).round() as usize).min(BAR_WIDTH - 1);
    let width = ((bar.width_percent * scale).round() as usize).clamp(1, BAR_WIDTH - left);
    format!(
        "{}{}{}",
        " ".repeat(left),
        fill.to_string().repeat(width),
        " ".repeat(BAR_WIDTH - left - width)
    )
}

fn print_gantt(chart: &GanttChart) {
    let range = &chart.date_range;
    println!(
        "Window: {} -> {} ({} days)",
        format_date(range.start_date),
        format_date(range.end_date),
        range.total_days()
    );
    println!("Ticks: {}", chart.tick_labels().join(" "));
    if !chart.categories.is_empty() {
        let legend: Vec<String> = chart
            .legend()
            .into_iter()
            .map(|(label, color)| format!("{label} {color}"))
            .collect();
        println!("Legend: {}", legend.join(", "));
    }
    if chart.gantt_items.is_empty() {
        println!("No items.");
        return;
    }
    for item in &chart.gantt_items {
        println!(
            "#{} {} [{}] {}",
            format_item_number(&item.item_number),
            item.description,
            item.category,
            item.status.label()
        );
        match (item.planned_start, item.planned_end) {
            (Some(start), Some(end)) => println!(
                "  planned  |{}| {} -> {}",
                ascii_bar(range, start, end, '='),
                format_date(start),
                format_date(end)
            ),
            (Some(start), None) => println!("  planned  starts {}", format_date(start)),
            _ => {}
        }
        match (item.executed_start, item.executed_end) {
            (Some(start), Some(end)) => println!(
                "  executed |{}| {} -> {}",
                ascii_bar(range, start, end, '#'),
                format_date(start),
                format_date(end)
            ),
            (Some(start), None) => println!("  executed starts {}", format_date(start)),
            _ => {}
        }
        if let Some(purchase) = item.purchase_date {
            println!("  purchased {}", format_date(purchase));
        }
    }
}

fn print_report(session: &Session) {
    let report = match session.tracker.report(session.current) {
        Ok(report) => report,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };
    println!("Items: {}", report.item_count);
    println!("Total budget: {}", session.money(report.total_budget));
    println!("Total estimated: {}", session.money(report.total_estimated));
    println!("Total paid: {}", session.money(report.total_paid));
    println!("Remaining budget: {}", session.money(report.remaining_budget));
    for entry in &report.status_counts {
        println!("  {}: {}", entry.status.label(), entry.count);
    }
    if !report.category_totals.is_empty() {
        println!("Budget by category:");
        for total in &report.category_totals {
            println!(
                "  {} ({} items): {}",
                total.category,
                total.items,
                session.money(total.budget)
            );
        }
    }
    println!("To do: {}", report.todo_items.len());
    for todo in &report.todo_items {
        println!(
            "  #{} {} ({})",
            format_item_number(&todo.item_number),
            todo.description,
            todo.status.label()
        );
    }
    println!(
        "Started early: {}, on time: {}, late: {}",
        report.started_early, report.started_on_time, report.started_late
    );
}

/// Applies `set <id> <field> <value>` to a draft.
fn apply_item_field(
    tracker: &Tracker,
    draft: &mut ItemDraft,
    field: &str,
    value: &str,
) -> Result<(), String> {
    let optional = |v: &str| {
        let v = v.trim();
        (!v.is_empty() && v != "-").then(|| v.to_string())
    };
    let money = |v: &str| v.trim().parse::<f64>().map_err(|_| format!("Invalid amount '{v}'"));
    let days = |v: &str| match optional(v) {
        None => Ok(None),
        Some(v) => v.parse::<i64>().map(Some).map_err(|_| format!("Invalid day count '{v}'")),
    };
    let date = |v: &str| match optional(v) {
        None => Ok(None),
        Some(v) if parse_iso_date(&v).is_some() => Ok(Some(v)),
        Some(v) => Err(format!("Invalid date '{v}' (YYYY-MM-DD)")),
    };

    match field {
        "number" => draft.item_number = value.trim().to_string(),
        "description" => draft.description = value.trim().to_string(),
        "category" => {
            let label = optional(value);
            let known = label.as_deref().and_then(|label| {
                tracker
                    .categories()
                    .into_iter()
                    .find(|c| c.name.eq_ignore_ascii_case(label))
                    .map(|c| c.id)
            });
            draft.category_id = known;
            draft.category = label;
        }
        "supplier" => {
            let label = optional(value);
            let known = label.as_deref().and_then(|label| {
                tracker
                    .suppliers()
                    .into_iter()
                    .find(|s| s.name.eq_ignore_ascii_case(label))
                    .map(|s| s.id)
            });
            draft.supplier_id = known;
            draft.supplier = label;
        }
        "budget" => draft.budget = money(value)?,
        "estimated" => draft.estimated_price = money(value)?,
        "paid" => draft.paid_value = money(value)?,
        "purchase" => draft.purchase_date = date(value)?,
        "planned" => draft.planned_date = date(value)?,
        "executed" => draft.executed_date = date(value)?,
        "est_days" => draft.estimated_duration_days = days(value)?,
        "real_days" => draft.real_duration_days = days(value)?,
        "status" => draft.status = value.parse::<ItemStatus>().map_err(|e| e.to_string())?,
        "payment" => {
            draft.payment_method = match optional(value) {
                None => None,
                Some(v) => Some(v.parse::<PaymentMethod>().map_err(|e| e.to_string())?),
            }
        }
        "notes" => draft.observations = optional(value),
        other => return Err(format!("Unknown field '{other}'.")),
    }
    Ok(())
}

fn sample_item(number: String) -> ItemDraft {
    ItemDraft {
        category: Some("Kitchen".into()),
        supplier: Some("Silva Marble Works".into()),
        budget: 2500.0,
        estimated_price: 2300.0,
        paid_value: 2300.0,
        purchase_date: Some("2024-01-15".into()),
        status: ItemStatus::Completed,
        payment_method: Some(PaymentMethod::Pix),
        observations: Some("Installation included in the price".into()),
        ..ItemDraft::new(number, "Granite kitchen countertop")
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            println!("Config error, using defaults: {}", e);
            AppConfig::default()
        }
    };

    let mut session = Session {
        tracker: Tracker::with_calendar(config.work_calendar()),
        current: 0,
        currency: config.display.currency_symbol.clone(),
    };
    session
        .ensure_renovation()
        .context("creating the default renovation")?;

    println!("Renovation Tracker (CLI) - type 'help' for commands\n");
    session.show();

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => session.show(),
            "reno" => match parts.next() {
                Some("list") | None => {
                    for renovation in session.tracker.renovations() {
                        let marker = if renovation.id == session.current { "*" } else { " " };
                        println!(
                            "{} {:>3}  {}  [{}]",
                            marker, renovation.id, renovation.name, renovation.status
                        );
                    }
                }
                Some("new") => {
                    let name = parts.collect::<Vec<_>>().join(" ");
                    match session.tracker.create_renovation(RenovationDraft::new(name)) {
                        Ok(created) => {
                            session.current = created.id;
                            println!("Created renovation {} ({}).", created.id, created.name);
                        }
                        Err(e) => println!("Error: {}", e),
                    }
                }
                Some("use") => match parse_id(parts.next()) {
                    Some(id) => match session.tracker.renovation(id) {
                        Ok(renovation) => {
                            println!("Using renovation {} ({}).", id, renovation.name);
                            session.current = id;
                            session.show();
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("Usage: reno use <id>"),
                },
                Some("status") => {
                    let status = match parts.next().map(str::parse::<RenovationStatus>) {
                        Some(Ok(status)) => status,
                        Some(Err(e)) => {
                            println!("Error: {}", e);
                            continue;
                        }
                        None => {
                            println!("Usage: reno status <status>");
                            continue;
                        }
                    };
                    let result = session.tracker.renovation(session.current).map(|r| r.to_draft());
                    let result = result.and_then(|mut draft| {
                        draft.status = status;
                        session.tracker.update_renovation(session.current, draft)
                    });
                    match result {
                        Ok(updated) => println!("Renovation status set to {}.", updated.status),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                Some("dates") => {
                    let start = parts.next().and_then(parse_iso_date);
                    let target = parts.next().and_then(parse_iso_date);
                    let (Some(start), Some(target)) = (start, target) else {
                        println!("Usage: reno dates <YYYY-MM-DD> <YYYY-MM-DD>");
                        continue;
                    };
                    let result = session.tracker.renovation(session.current).map(|r| r.to_draft());
                    let result = result.and_then(|mut draft| {
                        draft.start_date = Some(start);
                        draft.target_completion_date = Some(target);
                        session.tracker.update_renovation(session.current, draft)
                    });
                    match result {
                        Ok(_) => println!(
                            "Renovation dates set to {} -> {}.",
                            format_date(start),
                            format_date(target)
                        ),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                Some("delete") => match parse_id(parts.next()) {
                    Some(id) => match session.tracker.delete_renovation(id) {
                        Ok(removed) => {
                            println!("Deleted renovation {} ({}).", id, removed.name);
                            if id == session.current {
                                if let Err(e) = session.ensure_renovation() {
                                    println!("Error: {}", e);
                                }
                            }
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("Usage: reno delete <id>"),
                },
                Some(other) => {
                    println!("Unknown reno command '{}'.", other);
                    println!("Usage: reno list|new|use|status|dates|delete ...");
                }
            },
            "add" => {
                let description = parts.collect::<Vec<_>>().join(" ");
                if description.is_empty() {
                    println!("Usage: add <description...>");
                    continue;
                }
                let number = session.tracker.next_item_number(session.current);
                match session
                    .tracker
                    .create_item(session.current, ItemDraft::new(number, description))
                {
                    Ok(item) => {
                        println!("Added item {} (id={}).", item.item_number, item.id);
                        session.show();
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "set" => {
                let id = parse_id(parts.next());
                let field = parts.next();
                let value = parts.collect::<Vec<_>>().join(" ");
                let (Some(id), Some(field)) = (id, field) else {
                    println!("Usage: set <id> <field> <value...>");
                    continue;
                };
                let mut draft = match session.tracker.item(id) {
                    Ok(item) => item.to_draft(),
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                if let Err(message) = apply_item_field(&session.tracker, &mut draft, field, &value) {
                    println!("{}", message);
                    continue;
                }
                match session.tracker.update_item(id, draft) {
                    Ok(_) => {
                        println!("{} set.", field);
                        session.show();
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "delete" => match parse_id(parts.next()) {
                Some(id) => match session.tracker.delete_item(id) {
                    Ok(_) => println!("Deleted item {id}."),
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: delete <id>"),
            },
            "sample" => {
                let number = session.tracker.next_item_number(session.current);
                match session
                    .tracker
                    .import_items(session.current, vec![sample_item(number)])
                {
                    Ok(_) => {
                        println!("Sample item added.");
                        session.show();
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "gantt" => {
                let chart = match parts.next() {
                    Some(raw) => match parse_iso_date(raw) {
                        Some(today) => session.tracker.gantt_at(session.current, today),
                        None => {
                            println!("Invalid date (YYYY-MM-DD)");
                            continue;
                        }
                    },
                    None => session.tracker.gantt(session.current),
                };
                match chart {
                    Ok(chart) => print_gantt(&chart),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "enddate" => match session.tracker.end_dates(session.current) {
                Ok(dates) => {
                    println!("Estimated end: {}", describe_date(dates.estimated_end_date));
                    println!("Actual end: {}", describe_date(dates.actual_end_date));
                }
                Err(e) => println!("Error: {}", e),
            },
            "report" => print_report(&session),
            "category" => match parts.next() {
                Some("list") | None => {
                    for category in session.tracker.categories() {
                        println!("{:>3}  {}", category.id, category.name);
                    }
                }
                Some("add") => {
                    let name = parts.collect::<Vec<_>>().join(" ");
                    match session.tracker.create_category(CategoryDraft::new(name)) {
                        Ok(created) => println!("Added category {} ({}).", created.id, created.name),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                Some("rename") => {
                    let id = parse_id(parts.next());
                    let name = parts.collect::<Vec<_>>().join(" ");
                    let Some(id) = id else {
                        println!("Usage: category rename <id> <name...>");
                        continue;
                    };
                    let draft = session.tracker.category(id).map(|c| CategoryDraft {
                        name,
                        description: c.description.clone(),
                    });
                    match draft.and_then(|draft| session.tracker.update_category(id, draft)) {
                        Ok(updated) => println!("Renamed category {} to {}.", id, updated.name),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                Some("delete") => match parse_id(parts.next()) {
                    Some(id) => match session.tracker.delete_category(id) {
                        Ok(_) => println!("Deleted category {id}."),
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("Usage: category delete <id>"),
                },
                Some(other) => {
                    println!("Unknown category command '{}'.", other);
                    println!("Usage: category list|add|rename|delete ...");
                }
            },
            "supplier" => match parts.next() {
                Some("list") | None => {
                    for supplier in session.tracker.suppliers() {
                        println!(
                            "{:>3}  {}  {}  {}",
                            supplier.id,
                            supplier.name,
                            supplier.email.as_deref().unwrap_or("-"),
                            supplier.phone.as_deref().unwrap_or("-")
                        );
                    }
                }
                Some("add") => {
                    let name = parts.collect::<Vec<_>>().join(" ");
                    match session.tracker.create_supplier(SupplierDraft::new(name)) {
                        Ok(created) => println!("Added supplier {} ({}).", created.id, created.name),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                Some(sub @ ("email" | "phone")) => {
                    let id = parse_id(parts.next());
                    let value = parts.collect::<Vec<_>>().join(" ");
                    let Some(id) = id else {
                        println!("Usage: supplier {sub} <id> <value>");
                        continue;
                    };
                    let draft = session.tracker.supplier(id).map(|s| {
                        let mut draft = SupplierDraft {
                            name: s.name.clone(),
                            contact_info: s.contact_info.clone(),
                            phone: s.phone.clone(),
                            email: s.email.clone(),
                            address: s.address.clone(),
                        };
                        if sub == "email" {
                            draft.email = Some(value);
                        } else {
                            draft.phone = Some(value);
                        }
                        draft
                    });
                    match draft.and_then(|draft| session.tracker.update_supplier(id, draft)) {
                        Ok(_) => println!("Supplier {id} {sub} set."),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                Some("delete") => match parse_id(parts.next()) {
                    Some(id) => match session.tracker.delete_supplier(id) {
                        Ok(_) => println!("Deleted supplier {id}."),
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("Usage: supplier delete <id>"),
                },
                Some(other) => {
                    println!("Unknown supplier command '{}'.", other);
                    println!("Usage: supplier list|add|email|phone|delete ...");
                }
            },
            "calendar" => match parts.next() {
                Some("show") | None => {
                    let config = session.tracker.calendar_config();
                    let days: Vec<String> =
                        config.working_days().iter().map(|d| d.to_string()).collect();
                    println!("Working days: {}", days.join(", "));
                    let holidays: Vec<String> =
                        config.holidays().iter().map(|d| format_date(*d)).collect();
                    println!(
                        "Holidays: {}",
                        if holidays.is_empty() { "-".to_string() } else { holidays.join(", ") }
                    );
                }
                Some("holiday") => match parts.next().and_then(parse_iso_date) {
                    Some(date) => {
                        let mut calendar = session.tracker.calendar().clone();
                        calendar.add_holiday(date);
                        session.tracker.set_calendar(calendar);
                        println!("Holiday {} added.", format_date(date));
                    }
                    None => println!("Usage: calendar holiday <YYYY-MM-DD>"),
                },
                Some("workdays") => match parts.next().and_then(parse_weekdays) {
                    Some(days) if !days.is_empty() => {
                        let mut calendar = session.tracker.calendar().clone();
                        calendar.set_working_days(days);
                        session.tracker.set_calendar(calendar);
                        println!("Working days updated.");
                    }
                    _ => println!("Usage: calendar workdays <Mon,Tue,...>"),
                },
                Some(other) => {
                    println!("Unknown calendar command '{}'.", other);
                    println!("Usage: calendar show|holiday <YYYY-MM-DD>|workdays <Mon,Tue,...>");
                }
            },
            "save" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => match save_tracker_to_json(&session.tracker, path) {
                    Ok(_) => println!("Tracker saved to {}.", path),
                    Err(e) => println!("Error saving tracker: {}", e),
                },
                _ => println!("Usage: save json <path>"),
            },
            "load" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => match load_tracker_from_json(path) {
                    Ok(loaded) => {
                        session.tracker = loaded;
                        if let Err(e) = session.ensure_renovation() {
                            println!("Error: {}", e);
                        }
                        println!("Tracker loaded from {}.", path);
                        session.show();
                    }
                    Err(e) => println!("Error loading tracker: {}", e),
                },
                _ => println!("Usage: load json <path>"),
            },
            "export" => {
                let result = match (parts.next(), parts.next()) {
                    (Some("csv"), Some(path)) => {
                        export_items_to_csv(&session.tracker, session.current, path).map(|n| (n, path))
                    }
                    (Some("yaml"), Some(path)) => {
                        export_items_to_yaml(&session.tracker, session.current, path).map(|n| (n, path))
                    }
                    _ => {
                        println!("Usage: export <csv|yaml> <path>");
                        continue;
                    }
                };
                match result {
                    Ok((count, path)) => println!("Exported {} items to {}.", count, path),
                    Err(e) => println!("Error exporting items: {}", e),
                }
            }
            "import" => {
                let result = match (parts.next(), parts.next()) {
                    (Some("csv"), Some(path)) => {
                        import_items_from_csv(&mut session.tracker, session.current, path)
                    }
                    (Some("yaml"), Some(path)) => {
                        import_items_from_yaml(&mut session.tracker, session.current, path)
                    }
                    _ => {
                        println!("Usage: import <csv|yaml> <path>");
                        continue;
                    }
                };
                match result {
                    Ok(items) => {
                        println!("Imported {} items.", items.len());
                        session.show();
                    }
                    Err(e) => println!("Error importing items: {}", e),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
    Ok(())
}
