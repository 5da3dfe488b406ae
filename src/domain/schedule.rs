//! Accrual schedule generation.
//!
//! Translates a `(last_instant, current_instant, frequency)` triple into a
//! deterministic, duplicate-free list of due accrual instants. All arithmetic
//! is done on the local calendar (dates and local midnights), not on
//! fixed-width UTC durations, so DST shifts and month-length variation fall
//! out naturally: a monthly accrual anchored on Jan 31 lands on Feb 28 (or 29
//! in a leap year), then back on Mar 31.
//!
//! The module never reads the real clock; `current_instant` is always passed
//! in, so identical inputs always yield identical output.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::models::account::Frequency;

/// Local midnight of the calendar day containing `instant`.
pub fn local_midnight(instant: NaiveDateTime) -> NaiveDateTime {
    instant.date().and_time(NaiveTime::MIN)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// The same day-of-month `months` calendar months after `anchor`, clamped to
/// the target month's last day when the target month is shorter.
///
/// Each result is derived from the original anchor, never from a previously
/// clamped date, so the anchor day does not drift across short months.
pub(crate) fn advance_months(anchor: NaiveDate, months: u32) -> NaiveDate {
    let zero_based = anchor.month0() + months;
    let year = anchor.year() + (zero_based / 12) as i32;
    let month = zero_based % 12 + 1;
    let day = anchor.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(anchor)
}

/// Number of whole periods elapsed between the two instants.
///
/// Weekly and bi-weekly count whole 7/14-day spans between local midnights.
/// Monthly counts how many anchored month advances from `last` land at or
/// before `current`'s local midnight. Returns 0 whenever `current < last`;
/// callers are expected to have applied the clock-skew guard already.
pub fn periods_elapsed(last: NaiveDateTime, current: NaiveDateTime, frequency: Frequency) -> u32 {
    if current < last {
        return 0;
    }
    let last_midnight = local_midnight(last);
    let current_midnight = local_midnight(current);
    let whole_days = (current_midnight - last_midnight).num_days();
    match frequency {
        Frequency::Weekly => (whole_days / 7).max(0) as u32,
        Frequency::BiWeekly => (whole_days / 14).max(0) as u32,
        Frequency::Monthly => {
            let anchor = last.date();
            let mut elapsed = 0u32;
            while advance_months(anchor, elapsed + 1).and_time(NaiveTime::MIN) <= current_midnight {
                elapsed += 1;
            }
            elapsed
        }
    }
}

/// The exact instants at which accruals are due between `last` (exclusive)
/// and `current` (inclusive of its local midnight).
///
/// One instant per elapsed period, strictly increasing, each at local
/// midnight of the Nth period boundary after `last`. Zero elapsed periods
/// yield an empty list.
pub fn due_instants(
    last: NaiveDateTime,
    current: NaiveDateTime,
    frequency: Frequency,
) -> Vec<NaiveDateTime> {
    let count = periods_elapsed(last, current, frequency);
    (1..=count)
        .map(|n| match frequency {
            Frequency::Weekly => local_midnight(last) + Duration::days(7 * n as i64),
            Frequency::BiWeekly => local_midnight(last) + Duration::days(14 * n as i64),
            Frequency::Monthly => advance_months(last.date(), n).and_time(NaiveTime::MIN),
        })
        .collect()
}
