//! Time filter predicates.
//!
//! Each [`TimePeriod`] maps to one predicate over the main table's date
//! column. Calendar periods are relative to `CURRENT_DATE`; explicit dates are
//! validated and bound like any other user value.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::filter::{Bindings, SqlValue};
use crate::analysis::TimeFilter;
use crate::semantic::error::{CompileResult, GenerationError};
use crate::sql::expr::{
    cast_date, current_date, extract, func, interval, lit_str, DatePart, Expr, ExprExt,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Recognized time periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimePeriod {
    CurrentMonth,
    CurrentYear,
    LastMonth,
    LastYear,
    Today,
    LastWeek,
    CurrentWeek,
    SpecificDate,
    DateRange,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 9] = [
        TimePeriod::CurrentMonth,
        TimePeriod::CurrentYear,
        TimePeriod::LastMonth,
        TimePeriod::LastYear,
        TimePeriod::Today,
        TimePeriod::LastWeek,
        TimePeriod::CurrentWeek,
        TimePeriod::SpecificDate,
        TimePeriod::DateRange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimePeriod::CurrentMonth => "current_month",
            TimePeriod::CurrentYear => "current_year",
            TimePeriod::LastMonth => "last_month",
            TimePeriod::LastYear => "last_year",
            TimePeriod::Today => "today",
            TimePeriod::LastWeek => "last_week",
            TimePeriod::CurrentWeek => "current_week",
            TimePeriod::SpecificDate => "specific_date",
            TimePeriod::DateRange => "date_range",
        }
    }

    /// Parse a period name. `year` is accepted for a date range.
    pub fn parse(period: &str) -> Option<Self> {
        let period = period.trim().to_ascii_lowercase();
        if period == "year" {
            return Some(TimePeriod::DateRange);
        }
        Self::ALL.into_iter().find(|p| p.as_str() == period)
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a period that is not recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPeriodPolicy {
    /// Fail with `UnrecognizedPeriod`.
    #[default]
    Reject,
    /// Fall back to "within the last month".
    Fallback,
}

/// Build the predicate for `filter` over `column`.
pub fn time_predicate(
    column: &Expr,
    filter: &TimeFilter,
    policy: UnknownPeriodPolicy,
    bindings: &mut Bindings,
) -> CompileResult<Expr> {
    let c = || column.clone();

    let period = TimePeriod::parse(&filter.period);
    let dates = (
        filter.date.as_deref(),
        filter.start_date.as_deref(),
        filter.end_date.as_deref(),
    );

    let predicate = match (period, dates) {
        (Some(TimePeriod::CurrentMonth), _) => {
            same_as_today(c(), DatePart::Month).and(same_as_today(c(), DatePart::Year))
        }
        (Some(TimePeriod::CurrentYear), _) => same_as_today(c(), DatePart::Year),
        (Some(TimePeriod::LastMonth), _) => previous_period(c(), "month"),
        (Some(TimePeriod::LastYear), _) => {
            extract(DatePart::Year, c()).eq(extract(DatePart::Year, current_date()).sub(1))
        }
        (Some(TimePeriod::Today), _) => cast_date(c()).eq(current_date()),
        (Some(TimePeriod::LastWeek), _) => previous_period(c(), "week"),
        (Some(TimePeriod::CurrentWeek), _) => {
            same_as_today(c(), DatePart::Week).and(same_as_today(c(), DatePart::Year))
        }
        (Some(TimePeriod::SpecificDate), (Some(date), _, _)) => {
            parse_date(date)?;
            cast_date(c()).eq(bindings.bind(SqlValue::Text(date.to_string())))
        }
        (Some(TimePeriod::DateRange), (_, Some(start), Some(end))) => {
            if parse_date(start)? > parse_date(end)? {
                return Err(GenerationError::invalid_input(format!(
                    "date range starts after it ends: {start} > {end}"
                )));
            }
            let low = bindings.bind(SqlValue::Text(start.to_string()));
            let high = bindings.bind(SqlValue::Text(end.to_string()));
            c().between(low, high)
        }
        // Unknown names, and explicit periods missing their dates.
        _ => match policy {
            UnknownPeriodPolicy::Reject => {
                return Err(GenerationError::UnrecognizedPeriod(filter.period.clone()));
            }
            UnknownPeriodPolicy::Fallback => {
                warn!(period = %filter.period, "unrecognized time period, using last month");
                fallback_predicate(c())
            }
        },
    };

    Ok(predicate)
}

/// `c >= CURRENT_DATE - INTERVAL '1 month'`
pub fn fallback_predicate(column: Expr) -> Expr {
    column.gte(current_date().sub(interval("1 month")))
}

fn same_as_today(column: Expr, part: DatePart) -> Expr {
    extract(part, column).eq(extract(part, current_date()))
}

/// The whole previous calendar `unit` (month or week).
fn previous_period(column: Expr, unit: &str) -> Expr {
    let start = func(
        "DATE_TRUNC",
        vec![
            lit_str(unit),
            current_date().sub(interval(&format!("1 {unit}"))),
        ],
    );
    let end = func("DATE_TRUNC", vec![lit_str(unit), current_date()]);
    column.clone().gte(start).and(column.lt(end))
}

fn parse_date(date: &str) -> CompileResult<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|e| {
        GenerationError::invalid_input(format!("invalid date '{date}' (expected YYYY-MM-DD): {e}"))
    })
}
