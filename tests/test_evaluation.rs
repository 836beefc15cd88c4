//! End-to-end tests: raw sales rows to cross-validated scores

use chronofold::prelude::*;
use chronofold::preprocessing::schema;
use chronofold::Result;
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Predicts the value of its first feature column
#[derive(Clone, Default)]
struct FirstFeatureRegressor;

impl Regressor for FirstFeatureRegressor {
    fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<f64>) -> Result<()> {
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(x.column(0).to_owned())
    }
}

/// Predicts the training mean
#[derive(Clone, Default)]
struct MeanRegressor {
    mean: f64,
}

impl Regressor for MeanRegressor {
    fn fit(&mut self, _x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.mean = y.mean().unwrap_or(0.0);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(Array1::from_elem(x.nrows(), self.mean))
    }
}

/// Six months from 2017_07, contragent A sells 10 and B sells 20 every month
fn raw_sales() -> DataFrame {
    let mut years = Vec::new();
    let mut months = Vec::new();
    let mut contragents = Vec::new();
    let mut codes = Vec::new();
    let mut names = Vec::new();
    let mut sales = Vec::new();

    for month in 7i64..=12 {
        for (contragent, code, name, amount) in [("A", 1i64, "RED", 10i64), ("B", 2, "WHITE", 20)] {
            years.push(2017i64);
            months.push(month);
            contragents.push(contragent);
            codes.push(code);
            names.push(name);
            sales.push(amount);
        }
    }
    let n = years.len();

    df!(
        schema::YEAR => years,
        schema::MONTH => months,
        schema::CONTRAGENT => contragents,
        schema::ARTICLE_CODE => codes,
        schema::ARTICLE_NAME => names,
        schema::ARTICLE_GROUP => vec!["WINE"; n],
        schema::SALES => sales,
        schema::STORE_SALES => vec![0i64; n]
    )
    .unwrap()
}

fn prepared() -> (Array2<f64>, Array1<f64>, SplitPlan) {
    let matrix = SalesPreprocessor::new(SalesPreprocessingConfig::default())
        .unwrap()
        .run(&raw_sales())
        .unwrap();
    // 2017_07 is index 0 and only feeds the lags
    assert_eq!(matrix.height(), 10);

    let lag1 = LagFeatureSpec::new("CONTRAGENT", "SALES", 1);
    let column = matrix.column_for(&lag1, LagStatistic::Sum).unwrap();
    let features = matrix.to_array(&[column]).unwrap();
    let target = matrix.target("SALES").unwrap();

    let mut splitter = TimeBasedSplitter::new(2, 1).unwrap();
    let plan = splitter.split(matrix.frame(), "YEAR_MONTH").unwrap();
    (features, target, plan)
}

#[test]
fn test_plan_over_preprocessed_data() {
    let (_, _, plan) = prepared();
    // 5 periods remain, (5 - 2 - 1) / 1 + 1
    assert_eq!(plan.len(), 3);
    for fold in &plan {
        assert_eq!(fold.train_indices.len(), 4);
        assert_eq!(fold.test_indices.len(), 2);
    }
}

#[test]
fn test_perfect_lag_model() {
    let (features, target, plan) = prepared();

    let scores = ScoredEvaluator::new()
        .evaluate(&FirstFeatureRegressor, &features, &target, &plan, &default_metrics())
        .unwrap();

    assert_eq!(scores.len(), 3);
    assert!(scores["MAE"].abs() < 1e-12);
    assert!(scores["RMSE"].abs() < 1e-12);
    assert!((scores["R2"] - 1.0).abs() < 1e-12);
}

#[test]
fn test_mean_model_scores() {
    let (features, target, plan) = prepared();

    let scores = ScoredEvaluator::with_executor(ParallelExecutor::new().with_n_jobs(2))
        .evaluate(&MeanRegressor::default(), &features, &target, &plan, &default_metrics())
        .unwrap();

    // Training mean is 15, every test row is off by 5
    assert!((scores["MAE"] - 5.0).abs() < 1e-12);
    assert!((scores["RMSE"] - 5.0).abs() < 1e-12);
    assert!(scores["R2"].abs() < 1e-12);
}

#[test]
fn test_losses_reported_as_positive_magnitudes() {
    let (features, target, plan) = prepared();
    let metrics = vec![
        MetricSpec::new("MSE", Scorer::NegMeanSquaredError),
        MetricSpec::new("R2", Scorer::R2),
    ];

    let scores = ScoredEvaluator::new()
        .evaluate(&MeanRegressor::default(), &features, &target, &plan, &metrics)
        .unwrap();
    assert!((scores["MSE"] - 25.0).abs() < 1e-12);
}
