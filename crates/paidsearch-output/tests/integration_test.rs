//! Integration tests from raw panel to written artifacts.

use paidsearch_data::{PanelSummary, build_market_tables, daily_group_means, read_observations};
use paidsearch_estimate::DidEstimator;
use paidsearch_output::{
    DidReport, ExportFormat, Exporter, FigureConfig, did_table_latex, format_console_summary,
    write_figures, write_latex_table,
};

/// Two treated markets whose revenue falls by e^0.10 and e^0.20 and two
/// control markets with flat revenue.
fn panel() -> String {
    let mut csv = String::from("date,dma,revenue,search_stays_on,treatment_period\n");
    let rows = [
        (501, 0, 0.10),
        (502, 0, 0.20),
        (601, 1, 0.0),
        (602, 1, 0.0),
    ];
    for (dma, stays_on, diff) in rows {
        let pre = 1000.0_f64;
        let post = pre * f64::exp(diff);
        csv.push_str(&format!("20-May-12,{dma},{pre},{stays_on},0\n"));
        csv.push_str(&format!("21-May-12,{dma},{pre},{stays_on},0\n"));
        csv.push_str(&format!("23-May-12,{dma},{post},{stays_on},1\n"));
    }
    csv
}

#[test]
fn test_end_to_end_scenario() {
    let observations = read_observations(panel().as_bytes(), "panel").unwrap();
    let (treated, control) = build_market_tables(&observations).unwrap();
    let estimate = DidEstimator::default().estimate(&treated, &control).unwrap();

    assert!((estimate.gamma_hat - 0.15).abs() < 1e-9);
    assert!((estimate.std_error - 0.05).abs() < 1e-9);
    assert!((estimate.ci_lower - 0.052).abs() < 1e-9);
    assert!((estimate.ci_upper - 0.248).abs() < 1e-9);

    let tex = did_table_latex(&estimate);
    assert!(tex.contains(r"95\% CI & $[0.0520, \; 0.2480]$"));

    let console = format_console_summary(&estimate);
    assert!(console.contains("Gamma hat: 0.1500"));
}

#[test]
fn test_artifacts_written() {
    let dir = tempfile::tempdir().unwrap();
    let observations = read_observations(panel().as_bytes(), "panel").unwrap();
    let (treated, control) = build_market_tables(&observations).unwrap();
    let estimate = DidEstimator::default().estimate(&treated, &control).unwrap();

    let tables = dir.path().join("output").join("tables");
    write_latex_table(&estimate, &tables.join("did_table.tex")).unwrap();

    let summary = PanelSummary::from_observations(&observations).unwrap();
    let report = DidReport::new(estimate, Some(summary));
    report
        .export_to_file(&tables.join("did_estimate.json"), ExportFormat::PrettyJson)
        .unwrap();

    let json = std::fs::read_to_string(tables.join("did_estimate.json")).unwrap();
    let back: DidReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.panel.map(|p| p.treated_markets), Some(2));

    let daily = daily_group_means(&observations).unwrap();
    let figures = write_figures(
        &daily,
        &dir.path().join("output").join("figures"),
        &FigureConfig::default(),
    )
    .unwrap();
    for path in &figures {
        let svg = std::fs::read_to_string(path).unwrap();
        assert!(svg.contains("stroke-dasharray"));
    }
}
