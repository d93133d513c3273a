use tempcast::{TemperatureExplorer, TempcastError};
use std::env;

fn main() -> Result<(), TempcastError> {
    configure_polars_display();
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "data/temperatures.csv".to_string());

    let explorer = TemperatureExplorer::from_path(&path)?;
    println!("{}", explorer.preview(5).frame);

    let report = explorer.report().seed(42).call()?;
    println!("{}", report.to_json()?);

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    env::set_var("POLARS_FMT_MAX_ROWS", "10");
}
