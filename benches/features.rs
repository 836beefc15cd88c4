use chronofold::timeseries::{FeaturePipeline, FeaturePipelineConfig, TimeBasedSplitter};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use polars::prelude::*;

/// One row per (period, contragent, article), with deterministic sales
fn create_monthly_data(n_periods: i64, n_contragents: usize, n_articles: usize) -> DataFrame {
    let mut periods = Vec::new();
    let mut contragents = Vec::new();
    let mut articles = Vec::new();
    let mut groups = Vec::new();
    let mut sales = Vec::new();
    let mut store_sales = Vec::new();

    for t in 0..n_periods {
        for c in 0..n_contragents {
            for a in 0..n_articles {
                periods.push(t);
                contragents.push(format!("C{}", c));
                articles.push(format!("A{}", a));
                groups.push(format!("G{}", a % 5));
                sales.push(((t as usize * 31 + c * 17 + a * 7) % 100) as f64);
                store_sales.push(((t as usize * 13 + c * 5 + a * 3) % 40) as f64);
            }
        }
    }

    df!(
        "YEAR_MONTH" => periods,
        "CONTRAGENT" => contragents,
        "ARTICLE_NAME" => articles,
        "ARTICLE_GROUP" => groups,
        "SALES" => sales,
        "STORE_SALES" => store_sales
    )
    .unwrap()
}

fn bench_feature_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_pipeline");
    group.sample_size(10);

    let pipeline = FeaturePipeline::new(FeaturePipelineConfig::default()).unwrap();

    for n_contragents in [10, 50, 100].iter() {
        let df = create_monthly_data(12, *n_contragents, 20);

        group.bench_with_input(
            BenchmarkId::new("run", df.height()),
            &df,
            |b, df| b.iter(|| pipeline.run(black_box(df)).unwrap()),
        );
    }

    group.finish();
}

fn bench_splitter(c: &mut Criterion) {
    let mut group = c.benchmark_group("time_split");

    for n_periods in [12, 48, 120].iter() {
        let times: Vec<i64> = (0..*n_periods)
            .flat_map(|t| std::iter::repeat(t).take(500))
            .collect();
        let splitter = TimeBasedSplitter::new(4, 1).unwrap();

        group.bench_with_input(
            BenchmarkId::new("split_times", times.len()),
            &times,
            |b, times| b.iter(|| splitter.split_times(black_box(times))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_feature_pipeline, bench_splitter);
criterion_main!(benches);
