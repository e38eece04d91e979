#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/paidsearch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod console;
pub mod error;
pub mod export;
pub mod figure;
pub mod latex;

pub use console::format_console_summary;
pub use error::{OutputError, Result};
pub use export::{DidReport, EstimateRecord, ExportFormat, Exporter, estimate_records};
pub use figure::{FigureConfig, FigureFormat, write_figures};
pub use latex::{did_table_latex, write_latex_table};

#[cfg(test)]
pub(crate) mod test_support {
    use paidsearch_data::{Group, MarketAggregate, MarketId, MarketTable};
    use paidsearch_estimate::{DidEstimate, DidEstimator};

    fn table(group: Group, diffs: [f64; 2]) -> MarketTable {
        let rows = diffs
            .iter()
            .enumerate()
            .map(|(i, d)| MarketAggregate::new(MarketId(i as i64 + 1), Some(0.0), Some(*d)))
            .collect();
        MarketTable::new(group, rows).unwrap()
    }

    /// Treated diffs {0.10, 0.20} against control diffs {0, 0}.
    pub(crate) fn sample_estimate() -> DidEstimate {
        DidEstimator::default()
            .estimate(
                &table(Group::Treated, [0.10, 0.20]),
                &table(Group::Control, [0.0, 0.0]),
            )
            .unwrap()
    }
}
