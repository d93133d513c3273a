use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempcast::{
    elbow_curve, forecast, load_bytes, reshape, yearly_mean, ForecastOptions, KMeansSettings,
    MONTH_COLUMNS,
};

fn synthetic_csv() -> String {
    let mut csv = format!("YEAR,{}", MONTH_COLUMNS.join(","));
    for year in 1901..=2020 {
        csv.push_str(&format!("\n{year}"));
        for month in 0..12 {
            let phase = month as f64 / 12.0 * std::f64::consts::TAU;
            let value = 24.0 - 6.0 * phase.cos() + 0.01 * (year - 1900) as f64;
            csv.push_str(&format!(",{value:.2}"));
        }
    }
    csv
}

fn bench_pipeline(c: &mut Criterion) {
    let csv = synthetic_csv();
    let wide = load_bytes(csv.as_bytes()).expect("synthetic table loads");
    let long = reshape(&wide).expect("synthetic table reshapes");
    let seeded = KMeansSettings {
        seed: Some(1),
        ..KMeansSettings::default()
    };
    let options = ForecastOptions {
        seed: Some(1),
        ..ForecastOptions::default()
    };

    c.bench_function("load_and_reshape", |b| {
        b.iter(|| reshape(&load_bytes(black_box(csv.as_bytes())).unwrap()).unwrap())
    });
    c.bench_function("yearly_mean", |b| b.iter(|| yearly_mean(black_box(&wide))));
    c.bench_function("elbow_curve", |b| {
        b.iter(|| elbow_curve(black_box(&long), 9, &seeded))
    });
    c.bench_function("forecast", |b| b.iter(|| forecast(black_box(&long), &options)));
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
