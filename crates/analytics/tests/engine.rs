use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;

use salesight_analytics::{
    AnalyticsConfig, AnalyticsError, AnalyticsJob, AnalyticsScheduler, ForecastJob, LocalScheduler,
    Segmentation, SegmentationJob, segment,
};
use salesight_core::{
    BranchAggregate, CategoryTotals, FeatureRecord, PeriodAggregate, PeriodKey, ProductAggregate,
    TimeSeriesPoint,
};

fn products() -> Vec<FeatureRecord> {
    [
        ("Runner X", 98_000.0, 410.0),
        ("Runner Lite", 91_500.0, 390.0),
        ("Court Pro", 64_000.0, 220.0),
        ("Trail 2", 58_300.0, 205.0),
        ("Slide", 21_000.0, 700.0),
        ("Canvas Low", 19_400.0, 180.0),
        ("Canvas High", 17_800.0, 150.0),
        ("Kids Velcro", 9_200.0, 160.0),
        ("Sock Pack", 4_100.0, 520.0),
        ("Laces", 900.0, 300.0),
    ]
    .into_iter()
    .map(|(name, sales, units)| ProductAggregate::new(name, sales, units).into())
    .collect()
}

fn months(start: PeriodKey, count: u32) -> Vec<PeriodAggregate> {
    (0..count)
        .map(|i| {
            let period = start.offset(i).unwrap();
            let season = match period.month() {
                11 | 12 => 1.8,
                6..=8 => 1.3,
                _ => 1.0,
            };
            let sell_in = 40_000.0 * season + 500.0 * i as f64;
            let sell_out = 35_000.0 * season + 650.0 * i as f64;
            PeriodAggregate::new(period, sell_in, sell_out, sell_in / 80.0, sell_out / 95.0)
                .with_category("women", CategoryTotals::new(sell_out * 0.6, sell_out / 150.0))
                .with_category("men", CategoryTotals::new(sell_out * 0.4, sell_out / 190.0))
        })
        .collect()
}

/// Reported counts must agree with the assignment vector after any splitting.
fn assert_counts_match(result: &Segmentation, records: usize) {
    assert_eq!(result.assignments.len(), records);
    assert_eq!(result.total_members(), records);
    for cluster in &result.clusters {
        let assigned = result.assignments.iter().filter(|a| a.cluster == cluster.id).count();
        assert_eq!(cluster.member_count, assigned, "cluster {} ({})", cluster.id, cluster.name);
    }
}

#[test]
fn ten_products_make_four_named_segments() -> Result<()> {
    salesight_observability::init();

    let records = products();
    let result = segment(&records, 4, &mut StdRng::seed_from_u64(11))?;

    assert_eq!(result.clusters.len(), 4);
    assert_eq!(result.total_members(), 10);
    let names: Vec<&str> = result.clusters.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Top Sellers", "Steady Sellers", "Slow Movers", "Low Rotation"]);

    assert_counts_match(&result, records.len());
    assert!(result.assignments.iter().all(|a| a.cluster < 4));
    assert!(result.cluster("Top Sellers").is_some());
    for pair in result.clusters.windows(2) {
        assert!(pair[0].average_sales >= pair[1].average_sales);
    }
    Ok(())
}

#[test]
fn monthly_segments_carry_labels_and_categories() -> Result<()> {
    let records: Vec<FeatureRecord> = months(PeriodKey::new(2022, 1)?, 24)
        .into_iter()
        .map(FeatureRecord::from)
        .collect();

    let job = SegmentationJob::new(records).with_seed(3);
    assert_eq!(job.target_clusters(), 5);
    let result = LocalScheduler::new().run(&job)?;

    assert_eq!(result.clusters.len(), 5);
    assert_counts_match(&result, 24);
    for cluster in &result.clusters {
        let label = cluster.label.expect("temporal segments are labelled");
        assert_eq!(cluster.name, label.as_str());
        assert!(cluster.categories.contains_key("women"));
    }
    Ok(())
}

#[test]
fn repeated_month_profiles_are_split_without_drift() -> Result<()> {
    // Two alternating profiles repeated over a year: k-means finds two groups
    // and the balancer splits its way to the requested five.
    let start = PeriodKey::new(2023, 1)?;
    let records: Vec<FeatureRecord> = (0..12)
        .map(|i| {
            let period = start.offset(i)?;
            let (sell_in, sell_out) = if i % 2 == 0 {
                (80_000.0, 20_000.0)
            } else {
                (30_000.0, 70_000.0)
            };
            let (units_in, units_out) = (sell_in / 90.0, sell_out / 90.0);
            let month = PeriodAggregate::new(period, sell_in, sell_out, units_in, units_out);
            Ok(FeatureRecord::from(month))
        })
        .collect::<Result<_>>()?;

    for seed in [1, 2, 3, 42] {
        let result = SegmentationJob::new(records.clone()).with_seed(seed).run()?;
        assert_eq!(result.clusters.len(), 5);
        assert_counts_match(&result, records.len());
        for cluster in &result.clusters {
            assert_eq!(result.cluster_by_id(cluster.id).map(|c| &c.name), Some(&cluster.name));
        }
    }
    Ok(())
}

#[test]
fn branches_with_uniform_stock_still_segment() -> Result<()> {
    let records: Vec<FeatureRecord> = (0..6)
        .map(|i| {
            let sales = 10_000.0 * (i as f64 + 1.0);
            BranchAggregate::new(format!("Branch {i}"), sales, 80.0 + i as f64, 5.0).into()
        })
        .collect();

    let result = segment(&records, 4, &mut StdRng::seed_from_u64(1))?;
    assert_eq!(result.clusters.len(), 4);
    assert_eq!(result.clusters[0].name, "Flagship Branches");
    for cluster in &result.clusters {
        assert!(cluster.centroid.iter().all(|v| v.is_finite()));
        assert_eq!(cluster.feature("stock"), Some(5.0));
    }
    Ok(())
}

#[test]
fn forecast_insight_continues_the_calendar() -> Result<()> {
    let values = [
        100.0, 120.0, 90.0, 130.0, 110.0, 140.0, 95.0, 150.0, 105.0, 160.0, 115.0, 170.0,
    ];
    let start = PeriodKey::new(2023, 1)?;
    let points: Vec<TimeSeriesPoint> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| Ok(TimeSeriesPoint::new(start.offset(i as u32)?, v)))
        .collect::<Result<_>>()?;

    let insight = LocalScheduler::new().run_insight(&ForecastJob::new(points))?;
    let predictions = insight.payload["predictions"].as_array().unwrap();

    assert_eq!(insight.job, "forecast");
    assert_eq!(predictions.len(), 3);
    let periods: Vec<&str> = predictions.iter().map(|p| p["period"].as_str().unwrap()).collect();
    assert_eq!(periods, ["2024-01", "2024-02", "2024-03"]);
    for p in predictions {
        let (lower, estimate, upper) = (
            p["lower"].as_f64().unwrap(),
            p["estimate"].as_f64().unwrap(),
            p["upper"].as_f64().unwrap(),
        );
        assert!(estimate >= 0.0);
        assert!(lower <= estimate && estimate <= upper);
    }
    Ok(())
}

#[test]
fn configured_jobs_follow_config() -> Result<()> {
    let config = AnalyticsConfig::from_lookup(|key| match key {
        "SALESIGHT_PROFILE_CLUSTERS" => Some("3".to_string()),
        "SALESIGHT_FORECAST_HORIZON" => Some("6".to_string()),
        "SALESIGHT_SEED" => Some("77".to_string()),
        _ => None,
    })?;

    let scheduler = LocalScheduler::new();
    let segments = scheduler.run(&SegmentationJob::from_config(products(), &config))?;
    assert_eq!(segments.clusters.len(), 3);
    let again = scheduler.run(&SegmentationJob::from_config(products(), &config))?;
    assert_eq!(segments, again);

    let history = months(PeriodKey::new(2023, 1)?, 18);
    let points = history.iter().map(TimeSeriesPoint::from).collect();
    let projected = scheduler.run(&ForecastJob::from_config(points, &config))?;
    assert_eq!(projected.predictions.len(), 6);
    assert_eq!(projected.predictions[5].period.to_string(), "2024-12");
    Ok(())
}

#[test]
fn too_little_data_is_reported_not_raised() {
    let one_month = vec![TimeSeriesPoint::new(PeriodKey::new(2024, 5).unwrap(), 1_000.0)];
    let err = LocalScheduler::new().run(&ForecastJob::new(one_month)).unwrap_err();
    assert!(err.is_insufficient_data());

    let single = vec![FeatureRecord::from(ProductAggregate::new("Only", 10.0, 1.0))];
    let err = segment(&single, 4, &mut StdRng::seed_from_u64(0)).unwrap_err();
    assert!(matches!(err, AnalyticsError::InsufficientData(_)));
}
