//! Worklog date normalization.

use chrono::{Days, Local, NaiveDate};

use crate::error::{JiraError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const TODAY: &str = "today";
const YESTERDAY: &str = "yest";

/// Resolves `today`, `yest` or an explicit `YYYY-MM-DD` date against the local calendar.
pub fn convert_date(input: &str) -> Result<NaiveDate> {
    convert_date_from(input, Local::now().date_naive())
}

/// Same as [`convert_date`] with an explicit reference day.
pub fn convert_date_from(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    match input {
        TODAY => Ok(today),
        YESTERDAY => today
            .checked_sub_days(Days::new(1))
            .ok_or(JiraError::DateFormat),
        other => {
            let date =
                NaiveDate::parse_from_str(other, DATE_FORMAT).map_err(|_| JiraError::DateFormat)?;
            // chrono accepts unpadded fields; only the canonical spelling passes
            if format_date(date) != other {
                return Err(JiraError::DateFormat);
            }
            Ok(date)
        }
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
