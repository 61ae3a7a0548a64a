use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Business-day calendar used to turn durations into end dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCalendar {
    holidays: HashSet<NaiveDate>,
    non_working_days: HashSet<Weekday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCalendarConfig {
    #[serde(default = "default_working_days")]
    working_days: Vec<Weekday>,
    #[serde(default)]
    holidays: Vec<NaiveDate>,
}

fn default_working_days() -> Vec<Weekday> {
    WorkCalendar::DEFAULT_WORKING_DAYS.to_vec()
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self::weekdays_only()
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    const DEFAULT_WORKING_DAYS: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    /// Monday to Friday, no holidays.
    pub fn weekdays_only() -> Self {
        Self {
            holidays: HashSet::new(),
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }

    pub fn custom<I, J>(working_days: I, holidays: J) -> Self
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let config = WorkCalendarConfig::new(working_days, holidays);
        Self::from_config(&config)
    }

    /// Builds a calendar from its serialized form. An empty working-day list
    /// falls back to Monday to Friday so a calendar always has working days.
    pub fn from_config(config: &WorkCalendarConfig) -> Self {
        let mut working_set: HashSet<Weekday> = config.working_days.iter().copied().collect();
        if working_set.is_empty() {
            tracing::warn!("calendar config has no working days, using Monday to Friday");
            working_set.extend(Self::DEFAULT_WORKING_DAYS);
        }
        let non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !working_set.contains(day))
            .collect();

        Self {
            holidays: config.holidays.iter().copied().collect(),
            non_working_days,
        }
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    pub fn add_holidays(&mut self, dates: &[NaiveDate]) {
        self.holidays.extend(dates);
    }

    /// Marks `month`/`day` as a holiday in every year of `start_year..=end_year`,
    /// e.g. 21 April (Tiradentes) for the years a renovation spans.
    pub fn add_recurring_holiday(&mut self, month: u32, day: u32, start_year: i32, end_year: i32) {
        for year in start_year..=end_year {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                self.holidays.insert(date);
            }
        }
    }

    /// Replaces the working week, e.g. Monday to Saturday for crews that work
    /// Saturdays. An empty list is ignored.
    pub fn set_working_days(&mut self, days: Vec<Weekday>) {
        if days.is_empty() {
            return;
        }
        self.non_working_days.clear();
        for day in Self::ALL_WEEKDAYS {
            if !days.contains(&day) {
                self.non_working_days.insert(day);
            }
        }
    }

    pub fn is_available(&self, date: NaiveDate) -> bool {
        !self.holidays.contains(&date) && !self.non_working_days.contains(&date.weekday())
    }

    /// First working day strictly after `from`.
    pub fn next_available(&self, from: NaiveDate) -> Option<NaiveDate> {
        let mut current = from.checked_add_days(Days::new(1))?;
        while !self.is_available(current) {
            current = current.checked_add_days(Days::new(1))?;
        }
        Some(current)
    }

    /// Last working day strictly before `from`.
    pub fn prev_available(&self, from: NaiveDate) -> Option<NaiveDate> {
        let mut current = from.checked_sub_days(Days::new(1))?;
        while !self.is_available(current) {
            current = current.checked_sub_days(Days::new(1))?;
        }
        Some(current)
    }

    /// Advance `business_days` business days from `from`. The start date itself
    /// is not counted, so zero days returns `from` unchanged. Returns `None`
    /// when the result falls outside the representable date range.
    ///
    /// Whole weeks are skipped in one step; only the remainder plus the
    /// holidays inside the skipped span are walked day by day.
    pub fn add_business_days(&self, from: NaiveDate, business_days: u32) -> Option<NaiveDate> {
        if business_days == 0 {
            return Some(from);
        }
        let per_week = u64::try_from(7 - self.non_working_days.len()).ok()?;
        if per_week == 0 {
            return None;
        }

        let business_days = u64::from(business_days);
        let whole_weeks = (business_days - 1) / per_week;
        let mut current = from.checked_add_days(Days::new(whole_weeks * 7))?;
        let skipped_holidays = self
            .holidays
            .iter()
            .filter(|day| from < **day && **day <= current)
            .filter(|day| !self.non_working_days.contains(&day.weekday()))
            .count() as u64;

        let remaining = business_days - whole_weeks * per_week + skipped_holidays;
        for _ in 0..remaining {
            current = self.next_available(current)?;
        }
        Some(current)
    }

    /// Working days in `start..=end`.
    pub fn available_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter(|day| self.is_available(*day))
            .collect()
    }

    pub fn count_available_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter(|day| self.is_available(*day))
            .count() as i64
    }

    /// Signed business-day distance from `baseline` to `actual`.
    pub fn working_days_diff(&self, baseline: NaiveDate, actual: NaiveDate) -> i64 {
        if baseline == actual {
            0
        } else if actual > baseline {
            self.count_available_days(baseline, actual) - i64::from(self.is_available(baseline))
        } else {
            -(self.count_available_days(actual, baseline) - i64::from(self.is_available(actual)))
        }
    }
}

impl WorkCalendarConfig {
    pub fn new<I, J>(working_days: I, holidays: J) -> Self
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let mut working: Vec<Weekday> = working_days.into_iter().collect();
        working.sort_by_key(|wd| wd.num_days_from_monday());
        working.dedup();

        let mut holidays: Vec<NaiveDate> = holidays.into_iter().collect();
        holidays.sort();
        holidays.dedup();

        Self {
            working_days: working,
            holidays,
        }
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    pub fn holidays(&self) -> &[NaiveDate] {
        &self.holidays
    }
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        WorkCalendarConfig::from(&WorkCalendar::default())
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        let working = WorkCalendar::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !calendar.non_working_days.contains(day))
            .collect();

        let mut holidays: Vec<NaiveDate> = calendar.holidays.iter().copied().collect();
        holidays.sort();

        Self {
            working_days: working,
            holidays,
        }
    }
}
