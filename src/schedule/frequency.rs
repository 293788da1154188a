use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Base cadence of a recurrence rule. Combined with the rule's interval
/// multiplier, e.g. `Weekly` with interval 2 repeats every two weeks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
    Quarterly,
    Yearly,
}

/// Length of one frequency unit, as either a day count or a month count.
enum Step {
    Days(i64),
    Months(i32),
}

impl Frequency {
    fn step(self) -> Step {
        match self {
            Frequency::Daily => Step::Days(1),
            Frequency::Weekly => Step::Days(7),
            Frequency::BiWeekly => Step::Days(14),
            Frequency::Monthly => Step::Months(1),
            Frequency::Quarterly => Step::Months(3),
            Frequency::Yearly => Step::Months(12),
        }
    }

    /// Returns the `index`-th occurrence date for a rule anchored at `anchor`.
    ///
    /// Month-based cadences are computed from the anchor at every step, so a
    /// rule anchored on the 31st clamps to shorter months without losing the
    /// anchor day: Jan 31 → Feb 28 → Mar 31 → Apr 30.
    pub fn date_at(self, anchor: NaiveDate, interval: u32, index: u32) -> NaiveDate {
        let units = interval as i64 * index as i64;
        match self.step() {
            Step::Days(days) => anchor + Duration::days(days * units),
            Step::Months(months) => shift_month(anchor, (months as i64 * units) as i32),
        }
    }

    pub fn label(self, interval: u32) -> String {
        match (interval, self) {
            (1, Frequency::Daily) => "Daily".into(),
            (1, Frequency::Weekly) => "Weekly".into(),
            (1, Frequency::BiWeekly) => "Every 2 Weeks".into(),
            (1, Frequency::Monthly) => "Monthly".into(),
            (1, Frequency::Quarterly) => "Quarterly".into(),
            (1, Frequency::Yearly) => "Yearly".into(),
            (n, freq) => format!("Every {} {:?} periods", n, freq),
        }
    }
}

/// Shifts a date by whole months, clamping the day to the end of the target
/// month when the source day does not exist there.
fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
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
    let day = date.day().min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_and_weekly_steps_are_linear() {
        let anchor = date(2026, 1, 5);
        assert_eq!(Frequency::Daily.date_at(anchor, 3, 2), date(2026, 1, 11));
        assert_eq!(Frequency::Weekly.date_at(anchor, 2, 1), date(2026, 1, 19));
        assert_eq!(Frequency::BiWeekly.date_at(anchor, 1, 2), date(2026, 2, 2));
    }

    #[test]
    fn monthly_clamps_without_losing_anchor_day() {
        let anchor = date(2026, 1, 31);
        assert_eq!(Frequency::Monthly.date_at(anchor, 1, 0), date(2026, 1, 31));
        assert_eq!(Frequency::Monthly.date_at(anchor, 1, 1), date(2026, 2, 28));
        assert_eq!(Frequency::Monthly.date_at(anchor, 1, 2), date(2026, 3, 31));
        assert_eq!(Frequency::Monthly.date_at(anchor, 1, 3), date(2026, 4, 30));
    }

    #[test]
    fn monthly_clamps_to_leap_day() {
        let anchor = date(2024, 1, 31);
        assert_eq!(Frequency::Monthly.date_at(anchor, 1, 1), date(2024, 2, 29));
    }

    #[test]
    fn quarterly_and_yearly_step_in_months() {
        let anchor = date(2026, 11, 30);
        assert_eq!(
            Frequency::Quarterly.date_at(anchor, 1, 1),
            date(2027, 2, 28)
        );
        assert_eq!(Frequency::Yearly.date_at(anchor, 1, 2), date(2028, 11, 30));
    }

    #[test]
    fn yearly_from_leap_day_clamps_in_common_years() {
        let anchor = date(2024, 2, 29);
        assert_eq!(Frequency::Yearly.date_at(anchor, 1, 1), date(2025, 2, 28));
        assert_eq!(Frequency::Yearly.date_at(anchor, 1, 4), date(2028, 2, 29));
    }

    #[test]
    fn labels() {
        assert_eq!(Frequency::Monthly.label(1), "Monthly");
        assert_eq!(Frequency::BiWeekly.label(1), "Every 2 Weeks");
    }
}
