use crate::types::month::MONTH_COLUMNS;

fn header() -> String {
    format!("YEAR,{}", MONTH_COLUMNS.join(","))
}

/// Wide CSV where every month of every year has the same temperature.
pub(crate) fn constant_csv(years: &[i32], value: f64) -> String {
    let mut csv = header();
    for year in years {
        csv.push('\n');
        csv.push_str(&year.to_string());
        for _ in MONTH_COLUMNS {
            csv.push_str(&format!(",{value:.1}"));
        }
    }
    csv.push('\n');
    csv
}

/// Monthly temperature with an annual cycle and a slow warming trend.
pub(crate) fn seasonal_temperature(year: i32, month_idx: usize) -> f64 {
    let phase = (month_idx as f64 / 12.0) * std::f64::consts::TAU;
    let value = 24.0 - 6.0 * phase.cos() + 0.03 * (year - 1900) as f64;
    (value * 100.0).round() / 100.0
}

/// Wide CSV following [`seasonal_temperature`] for each year in the range.
pub(crate) fn seasonal_csv(years: std::ops::RangeInclusive<i32>) -> String {
    let mut csv = header();
    for year in years {
        csv.push('\n');
        csv.push_str(&year.to_string());
        for month_idx in 0..MONTH_COLUMNS.len() {
            csv.push_str(&format!(",{:.2}", seasonal_temperature(year, month_idx)));
        }
    }
    csv.push('\n');
    csv
}
