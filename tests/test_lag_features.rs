//! Integration tests for grouped lag features

use chronofold::timeseries::{
    FeaturePipeline, FeaturePipelineConfig, LagFeatureBuilder, LagFeatureSpec, LagStatistic,
};
use chronofold::utils::columns::numeric_values;
use polars::prelude::*;

fn f64_column(df: &DataFrame, name: &str) -> Vec<f64> {
    numeric_values(df, name)
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap())
        .collect()
}

fn monthly_sales() -> DataFrame {
    df!(
        "YEAR_MONTH" => &[0i64, 0, 0, 1, 1, 2, 2, 2, 3],
        "CONTRAGENT" => &["A", "A", "B", "A", "B", "A", "B", "B", "A"],
        "SALES" => &[1.0, 3.0, 10.0, 5.0, 20.0, 7.0, 30.0, 40.0, 9.0]
    )
    .unwrap()
}

#[test]
fn test_previous_period_only() {
    let df = df!(
        "YEAR_MONTH" => &[2i64, 3],
        "CONTRAGENT" => &["A", "A"],
        "SALES" => &[10.0, 20.0]
    )
    .unwrap();

    let spec = LagFeatureSpec::new("CONTRAGENT", "SALES", 1);
    let out = LagFeatureBuilder::new("YEAR_MONTH").apply(&df, &spec).unwrap();

    assert_eq!(f64_column(&out, "GB_CONTRAGENT_PREV_MEAN_SALES_1"), vec![0.0, 10.0]);
    assert_eq!(f64_column(&out, "GB_CONTRAGENT_PREV_SUM_SALES_1"), vec![0.0, 10.0]);
}

#[test]
fn test_mean_and_sum_per_group() {
    let spec = LagFeatureSpec::new("CONTRAGENT", "SALES", 1);
    let out = LagFeatureBuilder::new("YEAR_MONTH")
        .apply(&monthly_sales(), &spec)
        .unwrap();

    assert_eq!(out.height(), 9);
    assert_eq!(
        f64_column(&out, "GB_CONTRAGENT_PREV_MEAN_SALES_1"),
        vec![0.0, 0.0, 0.0, 2.0, 10.0, 5.0, 20.0, 20.0, 7.0]
    );
    assert_eq!(
        f64_column(&out, "GB_CONTRAGENT_PREV_SUM_SALES_1"),
        vec![0.0, 0.0, 0.0, 4.0, 10.0, 5.0, 20.0, 20.0, 7.0]
    );
}

#[test]
fn test_gap_in_group_history_fills_zero() {
    // B has no row at t=3, so nothing at t=3 + 1
    let df = df!(
        "YEAR_MONTH" => &[1i64, 3, 4, 4],
        "CONTRAGENT" => &["B", "A", "A", "B"],
        "SALES" => &[5.0, 6.0, 7.0, 8.0]
    )
    .unwrap();
    let spec = LagFeatureSpec::new("CONTRAGENT", "SALES", 1);
    let out = LagFeatureBuilder::new("YEAR_MONTH").apply(&df, &spec).unwrap();

    assert_eq!(
        f64_column(&out, "GB_CONTRAGENT_PREV_SUM_SALES_1"),
        vec![0.0, 0.0, 6.0, 0.0]
    );
}

#[test]
fn test_no_future_leakage() {
    let base = monthly_sales();
    let pipeline = FeaturePipeline::new(
        FeaturePipelineConfig::new()
            .with_group_keys(["CONTRAGENT"])
            .with_value_columns(["SALES"])
            .with_drop_before_index(None),
    )
    .unwrap();
    let before = pipeline.run(&base).unwrap();

    // Perturb every row at t >= 2 and check rows at t <= 2 are unchanged
    let perturbed_sales: Vec<f64> = f64_column(&base, "SALES")
        .iter()
        .zip(f64_column(&base, "YEAR_MONTH"))
        .map(|(v, t)| if t >= 2.0 { v + 1000.0 } else { *v })
        .collect();
    let mut perturbed = base.clone();
    perturbed
        .with_column(Series::new("SALES".into(), perturbed_sales))
        .unwrap();
    let after = pipeline.run(&perturbed).unwrap();

    for name in before.feature_names() {
        let old = f64_column(before.frame(), &name);
        let new = f64_column(after.frame(), &name);
        // Rows 0..8 sit at t <= 2
        assert_eq!(old[..8], new[..8], "{}", name);
    }

    // The t=3 row does see the perturbed t=2 value
    let lag1 = LagFeatureSpec::new("CONTRAGENT", "SALES", 1);
    let lag1_sum = after.feature_values(&lag1, LagStatistic::Sum).unwrap();
    assert_eq!(lag1_sum[8], 1007.0);
}

#[test]
fn test_row_count_and_order_preserved() {
    let df = monthly_sales();
    let spec = LagFeatureSpec::new("CONTRAGENT", "SALES", 2);
    let out = LagFeatureBuilder::new("YEAR_MONTH").apply(&df, &spec).unwrap();

    assert_eq!(out.height(), df.height());
    assert_eq!(f64_column(&out, "SALES"), f64_column(&df, "SALES"));
    assert_eq!(out.width(), df.width() + 2);
}

#[test]
fn test_pipeline_feature_count() {
    let df = df!(
        "YEAR_MONTH" => &[0i64, 1, 2, 3],
        "CONTRAGENT" => &["A", "A", "A", "A"],
        "ARTICLE_NAME" => &["RED", "RED", "RED", "RED"],
        "ARTICLE_GROUP" => &["WINE", "WINE", "WINE", "WINE"],
        "SALES" => &[1.0, 2.0, 3.0, 4.0],
        "STORE_SALES" => &[0.0, 1.0, 0.0, 1.0]
    )
    .unwrap();

    let matrix = FeaturePipeline::new(FeaturePipelineConfig::default())
        .unwrap()
        .run(&df)
        .unwrap();

    // 3 lags x 3 keys x 2 columns x {mean, sum}
    assert_eq!(matrix.feature_names().len(), 36);
    // Index 0 only feeds lags
    assert_eq!(matrix.height(), 3);

    let lag3 = LagFeatureSpec::new("ARTICLE_GROUP", "SALES", 3);
    let values = matrix.feature_values(&lag3, LagStatistic::Mean).unwrap();
    assert_eq!(values.to_vec(), vec![0.0, 0.0, 1.0]);
}
