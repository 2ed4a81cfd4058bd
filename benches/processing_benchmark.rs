use acidentes_processor::models::{concat_frames, ColumnNames};
use acidentes_processor::processors::{
    CoherenceFilter, Deduplicator, FeatureEnricher, NullImputer,
};
use acidentes_processor::utils::BrazilHolidays;
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use polars::prelude::*;

const STATES: [&str; 6] = ["SP", "MG", "RJ", "BA", "PR", "ZZ"];

// Synthetic consolidated table with a sprinkling of nulls and incoherent rows
fn create_test_frame(rows: usize) -> DataFrame {
    let base_date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();

    let ids: Vec<i64> = (0..rows).map(|i| i as i64).collect();
    let dates = DateChunked::from_naive_date(
        "data_inversa".into(),
        (0..rows).map(|i| base_date + chrono::Duration::days((i % 1460) as i64)),
    );
    let times: Vec<Option<String>> = (0..rows)
        .map(|i| (i % 17 != 0).then(|| format!("{:02}:{:02}:00", i % 24, i % 60)))
        .collect();
    let states: Vec<&str> = (0..rows).map(|i| STATES[i % STATES.len()]).collect();
    let people: Vec<Option<i64>> = (0..rows)
        .map(|i| (i % 13 != 0).then_some((i % 30) as i64))
        .collect();
    let deaths: Vec<i64> = (0..rows).map(|i| (i % 3) as i64).collect();
    let light: Vec<i64> = (0..rows).map(|i| (i % 4) as i64).collect();
    let severe: Vec<i64> = (0..rows).map(|i| (i % 2) as i64).collect();
    let injured: Vec<i64> = (0..rows).map(|i| (i % 4 + i % 2) as i64).collect();
    let km: Vec<Option<f64>> = (0..rows)
        .map(|i| (i % 11 != 0).then_some(i as f64 * 0.7))
        .collect();

    DataFrame::new(vec![
        Series::new("id".into(), ids).into_column(),
        dates.into_series().into_column(),
        Series::new("horario".into(), times).into_column(),
        Series::new("uf".into(), states).into_column(),
        Series::new("km".into(), km).into_column(),
        Series::new("pessoas".into(), people).into_column(),
        Series::new("mortos".into(), deaths).into_column(),
        Series::new("feridos_leves".into(), light).into_column(),
        Series::new("feridos_graves".into(), severe).into_column(),
        Series::new("feridos".into(), injured).into_column(),
    ])
    .unwrap()
}

fn benchmark_null_imputer(c: &mut Criterion) {
    let mut group = c.benchmark_group("null_imputer");

    for rows in [1_000, 10_000, 50_000] {
        let frame = create_test_frame(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &frame, |b, frame| {
            b.iter(|| {
                let mut frame = frame.clone();
                let report = NullImputer::new().impute(&mut frame).unwrap();
                black_box(report)
            })
        });
    }

    group.finish();
}

fn benchmark_deduplicator(c: &mut Criterion) {
    let frame = create_test_frame(10_000);
    let frame = concat_frames(vec![frame.clone(), frame]).unwrap();

    c.bench_function("deduplicate_20000", |b| {
        b.iter(|| black_box(Deduplicator::new().deduplicate(black_box(&frame)).unwrap()))
    });
}

fn benchmark_coherence_filter(c: &mut Criterion) {
    let columns = ColumnNames::default();
    let filter = CoherenceFilter::for_columns(&columns);
    let mut group = c.benchmark_group("coherence_filter");

    for rows in [1_000, 10_000, 50_000] {
        let mut frame = create_test_frame(rows);
        NullImputer::new().impute(&mut frame).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(rows), &frame, |b, frame| {
            b.iter(|| black_box(filter.filter(black_box(frame)).unwrap()))
        });
    }

    group.finish();
}

fn benchmark_feature_enricher(c: &mut Criterion) {
    let columns = ColumnNames::default();
    let calendar = BrazilHolidays::new();
    let frame = create_test_frame(10_000);

    c.bench_function("enrich_10000", |b| {
        b.iter(|| {
            let mut frame = frame.clone();
            FeatureEnricher::new(&columns, &calendar)
                .enrich(&mut frame)
                .unwrap();
            black_box(frame)
        })
    });
}

criterion_group!(
    benches,
    benchmark_null_imputer,
    benchmark_deduplicator,
    benchmark_coherence_filter,
    benchmark_feature_enricher
);
criterion_main!(benches);
