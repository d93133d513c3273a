use std::collections::BTreeMap;
use std::io::Write;
use tempcast::{
    elbow_curve, forecast, labeled_clusters, load_bytes, load_path, reshape, seasonal_mean,
    yearly_mean, AggregateError, BaseYear, ForecastOptions, KMeansSettings, LoadError,
    TemperatureExplorer, TempcastError, MONTH_COLUMNS,
};

fn wide_csv(years: std::ops::RangeInclusive<i32>, value: impl Fn(i32, usize) -> f64) -> String {
    let mut csv = format!("YEAR,{}\n", MONTH_COLUMNS.join(","));
    for year in years {
        csv.push_str(&year.to_string());
        for month in 0..MONTH_COLUMNS.len() {
            csv.push_str(&format!(",{:.2}", value(year, month)));
        }
        csv.push('\n');
    }
    csv
}

fn seasonal(year: i32, month: usize) -> f64 {
    let phase = month as f64 / 12.0 * std::f64::consts::TAU;
    20.0 - 8.0 * phase.cos() + 0.02 * (year - 1900) as f64
}

#[test]
fn constant_table_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let csv = wide_csv(2015..=2017, |_, _| 25.0);
    let wide = load_bytes(csv.as_bytes())?;
    let long = reshape(&wide)?;

    assert_eq!(long.height(), 36);
    assert!(long.temperatures()?.iter().all(|&t| t == 25.0));
    assert!(yearly_mean(&wide)?.iter().all(|y| y.temperature == 25.0));

    let options = ForecastOptions {
        base_year: BaseYear::Fixed(2017),
        seed: Some(2017),
        ..ForecastOptions::default()
    };
    let result = forecast(&long, &options)?;
    assert_eq!(result.r2, 1.0);
    let next = result.forecast_temperature().ok_or("2018 missing")?;
    assert!((next - 25.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn yearly_mean_agrees_with_long_table() -> Result<(), Box<dyn std::error::Error>> {
    let wide = load_bytes(wide_csv(1901..=1930, seasonal).as_bytes())?;
    let long = reshape(&wide)?;

    let mut per_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for record in long.records()? {
        per_year.entry(record.year).or_default().push(record.temperature);
    }

    let means = yearly_mean(&wide)?;
    assert_eq!(means.len(), per_year.len());
    for yearly in means {
        let values = &per_year[&yearly.year];
        let expected = values.iter().sum::<f64>() / values.len() as f64;
        assert!((yearly.temperature - expected).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn elbow_is_non_increasing_and_labels_are_in_range() -> Result<(), Box<dyn std::error::Error>> {
    // Nine well separated temperature levels, one per block of years.
    let wide = load_bytes(
        wide_csv(1901..=1918, |year, month| {
            ((year - 1901) / 2) as f64 * 12.0 + month as f64 * 0.05
        })
        .as_bytes(),
    )?;
    let long = reshape(&wide)?;
    let settings = KMeansSettings {
        seed: Some(9),
        ..KMeansSettings::default()
    };

    let curve = elbow_curve(&long, 9, &settings)?;
    assert_eq!(curve.len(), 9);
    for pair in curve.windows(2) {
        assert!(pair[1].inertia <= pair[0].inertia + 1e-9);
    }

    let clustered = labeled_clusters(&long, 3, &settings)?;
    assert!(clustered
        .labels()?
        .iter()
        .all(|label| matches!(label, Some(l) if *l < 3)));
    Ok(())
}

#[test]
fn forecast_adds_exactly_one_year() -> Result<(), Box<dyn std::error::Error>> {
    let long = reshape(&load_bytes(wide_csv(1950..=1980, seasonal).as_bytes())?)?;
    let result = forecast(&long, &ForecastOptions::default())?;

    assert!(result.r2 <= 1.0);
    assert_eq!(result.series.len(), 32);
    assert_eq!(result.series.last().map(|p| p.year), Some(result.base_year + 1));
    assert_eq!(result.base_year, 1980);
    Ok(())
}

#[test]
fn malformed_csv_is_rejected_whole() {
    let csv = "YEAR,JAN,FEB\n2001,1.0,2.0\n2002,3.0\n";
    assert!(matches!(
        load_bytes(csv.as_bytes()),
        Err(LoadError::MalformedInput(_))
    ));
    assert!(matches!(
        TemperatureExplorer::from_bytes(csv.as_bytes()),
        Err(TempcastError::Load(LoadError::MalformedInput(_)))
    ));
}

#[test]
fn seasonal_mean_reports_the_missing_month() -> Result<(), Box<dyn std::error::Error>> {
    let header: Vec<&str> = MONTH_COLUMNS.iter().copied().filter(|m| *m != "JUN").collect();
    let csv = format!("YEAR,{}\n2001{}\n", header.join(","), ",1.0".repeat(11));
    let wide = load_bytes(csv.as_bytes())?;

    match seasonal_mean(&wide) {
        Err(AggregateError::MissingColumn(name)) => assert_eq!(name, "JUN"),
        other => panic!("expected MissingColumn(\"JUN\"), got {other:?}"),
    }
    Ok(())
}

#[test]
fn explorer_reads_from_disk() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(wide_csv(2000..=2009, seasonal).as_bytes())?;

    assert_eq!(load_path(file.path())?.height(), 10);

    let explorer = TemperatureExplorer::from_path(file.path())?;
    let report = explorer.report().seed(4).call()?;
    assert_eq!(report.rows, 10);
    assert_eq!(report.clusters.as_ref().map(|c| c.sizes.iter().sum::<usize>()), Some(120));
    assert_eq!(report.forecast.as_ref().map(|f| f.forecast_year), Some(2010));
    assert!(report.to_json()?.contains("\"seasonal_trends\""));
    Ok(())
}
