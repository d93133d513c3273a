//! Month vocabulary of the wide-format table and the date synthesis used when reshaping.

use chrono::NaiveDate;

/// Name of the year column in the wide-format table.
pub const YEAR_COLUMN: &str = "YEAR";

/// The twelve month column headers of the wide-format table, in calendar order.
///
/// Matching against these names is case-sensitive.
pub const MONTH_COLUMNS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Builds the first-of-month date for a month label and a year.
///
/// The label must be a three-letter month abbreviation. It is combined with the year into
/// `"<label> <year>"` form (e.g. `"Jan 2001"`) and parsed as abbreviated month name plus
/// four-digit year. Month names are matched case-insensitively, so both `"Jan"` and `"JAN"`
/// resolve to January.
///
/// Returns `None` when the label is not a recognised abbreviation.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use tempcast::parse_month_date;
///
/// assert_eq!(parse_month_date("JAN", 2001), NaiveDate::from_ymd_opt(2001, 1, 1));
/// assert_eq!(parse_month_date("Sep", 1999), NaiveDate::from_ymd_opt(1999, 9, 1));
/// assert_eq!(parse_month_date("ANNUAL", 1999), None);
/// ```
pub fn parse_month_date(label: &str, year: i32) -> Option<NaiveDate> {
    // %b would also accept full month names; only abbreviations are valid headers.
    if label.chars().count() != 3 {
        return None;
    }
    NaiveDate::parse_from_str(&format!("1 {label} {year:04}"), "%d %b %Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_every_month_column_parses_in_calendar_order() {
        for (idx, label) in MONTH_COLUMNS.iter().enumerate() {
            let date = parse_month_date(label, 2017).expect("month column must parse");
            assert_eq!(date.year(), 2017);
            assert_eq!(date.month() as usize, idx + 1);
            assert_eq!(date.day(), 1);
        }
    }

    #[test]
    fn test_mixed_case_abbreviation_parses() {
        assert_eq!(
            parse_month_date("Mar", 1950),
            NaiveDate::from_ymd_opt(1950, 3, 1)
        );
        assert_eq!(
            parse_month_date("mar", 1950),
            NaiveDate::from_ymd_opt(1950, 3, 1)
        );
    }

    #[test]
    fn test_non_month_labels_are_rejected() {
        for label in ["ANNUAL", "JAN-FEB", "MARCH", "XYZ", "", "Ja"] {
            assert_eq!(parse_month_date(label, 2000), None, "label {label:?}");
        }
    }
}
