use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Cadence of a recurrence rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }
}

/// How a settlement date landing on a weekend is shifted. Consulted only by
/// the simulator; the recurrence cadence itself never moves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum WeekendPolicy {
    #[default]
    None,
    NextBusinessDay,
    PreviousBusinessDay,
}

/// Advances `date` by one recurrence period. Monthly and yearly steps land on
/// `min(pinned_day, days_in_target_month)`: Jan 31 monthly steps to Feb 28/29,
/// never rolls over into March. The pinned day must be re-supplied on every
/// step so a clamped occurrence does not drag later ones toward the 28th.
pub fn step(date: NaiveDate, frequency: Frequency, interval: u32, pinned_day: Option<u32>) -> NaiveDate {
    match frequency {
        Frequency::Daily => date + Duration::days(interval as i64),
        Frequency::Weekly => date + Duration::weeks(interval as i64),
        Frequency::Monthly => {
            shift_months(date, interval as i32, pinned_day.unwrap_or(date.day()))
        }
        Frequency::Yearly => {
            shift_months(date, interval as i32 * 12, pinned_day.unwrap_or(date.day()))
        }
    }
}

/// Moves `date` by a whole number of months, landing on `pinned_day` clamped
/// to the target month's length.
pub fn shift_months(date: NaiveDate, months: i32, pinned_day: u32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    clamp_day(year, month as u32, pinned_day)
}

/// The date at `day` of the given month, clamped to the month's last day.
pub fn clamp_day(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.max(1).min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 1).unwrap())
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}

/// Applies a weekend policy to a settlement date.
pub fn adjust_for_weekend(date: NaiveDate, policy: WeekendPolicy) -> NaiveDate {
    let mut adjusted = date;
    match policy {
        WeekendPolicy::None => adjusted,
        WeekendPolicy::NextBusinessDay => {
            while is_weekend(adjusted) {
                adjusted += Duration::days(1);
            }
            adjusted
        }
        WeekendPolicy::PreviousBusinessDay => {
            while is_weekend(adjusted) {
                adjusted -= Duration::days(1);
            }
            adjusted
        }
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
