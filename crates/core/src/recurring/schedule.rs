//! Calendar evaluation for recurring schedules.

use chrono::{Datelike, NaiveDate};

use super::recurring_model::Schedule;

impl Schedule {
    /// Whether this schedule fires on `date`.
    ///
    /// Pure and deterministic. Callers are responsible for checking that the
    /// rule is active and that `date` falls inside its start/end window; this
    /// only answers the calendar question.
    ///
    /// A monthly or yearly `day` greater than the length of the month simply
    /// never matches in that month. Rules with an unsupported frequency type
    /// never fire.
    pub fn fires_on(&self, date: NaiveDate) -> bool {
        match self {
            Schedule::Monthly { day } => date.day() == *day,
            Schedule::Biweekly { days } => days.contains(&date.day()),
            Schedule::Weekly { weekday } => date.weekday().num_days_from_sunday() == *weekday,
            Schedule::Yearly { month, day } => date.month() == *month && date.day() == *day,
            Schedule::Unsupported { .. } => false,
        }
    }
}
