//! Metric x object tables end to end: CSV in, weights out as a report.

use rankagg_core::{Direction, WeightVector};
use rankagg_runner::{
    read_metric_table, EnsembleConfig, EnsembleDriver, MetricLayout, Trial, WeightReport,
};

fn layout() -> MetricLayout {
    MetricLayout::builder(2)
        .per_object("Dice", Direction::HigherIsBetter)
        .per_object("AveDist", Direction::LowerIsBetter)
        .whole_set("Kappa", Direction::HigherIsBetter)
        .build()
        .unwrap()
}

fn csv_table() -> String {
    let mut out = layout().names().join(",");
    out.push('\n');
    for s in 0..8 {
        let q = 8 - s;
        let dice = f64::from(q) / 10.0;
        let dist = f64::from(s) + 0.5;
        // sample 7 lost its second object entirely
        let (dice2, dist2) = if s == 7 {
            (String::new(), "nan".to_string())
        } else {
            (format!("{dice:.2}"), format!("{dist:.2}"))
        };
        out.push_str(&format!(
            "{dice:.2},{dice2},{dist:.2},{dist2},{kappa:.3}\n",
            kappa = f64::from(q) / 9.0
        ));
    }
    out
}

#[test]
fn csv_columns_line_up_with_layout() {
    let (names, table) = read_metric_table(csv_table().as_bytes()).unwrap();
    assert_eq!(names, layout().names());
    assert_eq!(table.n_metrics(), layout().len());
    assert_eq!(table.undefined_count(), 2);
}

#[test]
fn ensemble_weights_render_as_report() {
    let layout = layout();
    let (_, table) = read_metric_table(csv_table().as_bytes()).unwrap();
    let driver = EnsembleDriver::new(EnsembleConfig::default()).unwrap();
    let result = driver.run(&[Trial::single(table)], layout.order()).unwrap();

    let report = WeightReport::new(&layout, &result.mean_weights).unwrap();
    assert!((report.total() - 1.0).abs() < 1e-9);
    assert_eq!(report.by_metric_type().len(), 3);
    assert_eq!(report.by_object().len(), 3);

    // columns with a missing sample disagree with consensus at the bottom
    let w = result.mean_weights.as_slice();
    assert!(w[1] < w[0], "Dice_object2 should lose weight: {w:?}");

    let sorted = report.sorted();
    assert!(sorted.windows(2).all(|p| p[0].weight >= p[1].weight));
}

#[test]
fn report_serializes_for_persistence() {
    let layout = layout();
    let weights = WeightVector::normalized(vec![2.0, 1.0, 1.0, 1.0, 5.0]).unwrap();
    let report = WeightReport::new(&layout, &weights).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[2]["name"], "AveDist_object1");
    assert_eq!(entries[2]["direction"], "LowerIsBetter");

    let competition = serde_json::to_value(report.competition_weights()).unwrap();
    assert_eq!(competition["Adb1"]["title"], "AveDist (label 1)");
    assert!((competition["Adb1"]["weight"].as_f64().unwrap() + 0.1).abs() < 1e-12);
    assert!((competition["Kap"]["weight"].as_f64().unwrap() - 0.5).abs() < 1e-12);
}
