//! LaTeX results table.
//!
//! Produces a `table` float with the point estimate, standard error and
//! confidence interval in two columns: log scale and levels (exponentiated).

use crate::error::Result;
use paidsearch_estimate::{DidEstimate, Z_95};
use std::path::Path;

/// Caption of the results table.
pub const TABLE_CAPTION: &str =
    "Difference-in-Differences Estimate of the Effect of Paid Search on Revenue";

/// Label used to reference the table.
pub const TABLE_LABEL: &str = "tab:did";

fn interval_label(z: f64) -> String {
    if (z - Z_95).abs() < 1e-12 {
        r"95\% CI".to_string()
    } else {
        format!("CI ($z = {z}$)")
    }
}

/// Render the estimate as a LaTeX `table` fragment.
pub fn did_table_latex(e: &DidEstimate) -> String {
    let mut tex = String::new();

    tex.push_str("\\begin{table}[h]\n");
    tex.push_str("\\centering\n");
    tex.push_str(&format!("\\caption{{{TABLE_CAPTION}}}\n"));
    tex.push_str("\\begin{tabular}{lcc}\n");
    tex.push_str("\\hline\n");
    tex.push_str("& Log Scale & Levels (exp) \\\\\n");
    tex.push_str("\\hline\n");
    tex.push_str(&format!(
        "Point Estimate ($\\hat{{\\gamma}}$) & ${:.4}$ & ${:.4}$ \\\\\n",
        e.gamma_hat, e.gamma_hat_exp
    ));
    tex.push_str(&format!(
        "Standard Error & ${:.4}$ & --- \\\\\n",
        e.std_error
    ));
    tex.push_str(&format!(
        "{} & $[{:.4}, \\; {:.4}]$ & $[{:.4}, \\; {:.4}]$ \\\\\n",
        interval_label(e.z_critical),
        e.ci_lower,
        e.ci_upper,
        e.ci_lower_exp,
        e.ci_upper_exp
    ));
    tex.push_str("\\hline\n");
    tex.push_str("\\end{tabular}\n");
    tex.push_str(&format!("\\label{{{TABLE_LABEL}}}\n"));
    tex.push_str("\\end{table}");

    tex
}

/// Write the LaTeX table to `path`, creating parent directories.
pub fn write_latex_table(estimate: &DidEstimate, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, did_table_latex(estimate))?;
    tracing::debug!(path = %path.display(), "wrote LaTeX table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_estimate;

    #[test]
    fn test_table_layout() {
        let tex = did_table_latex(&sample_estimate());
        let lines: Vec<&str> = tex.lines().collect();

        assert_eq!(lines[0], r"\begin{table}[h]");
        assert_eq!(lines[2], format!(r"\caption{{{TABLE_CAPTION}}}"));
        assert_eq!(lines[3], r"\begin{tabular}{lcc}");
        assert_eq!(lines[5], r"& Log Scale & Levels (exp) \\");
        assert_eq!(lines.last(), Some(&r"\end{table}"));
        assert!(tex.contains(r"\label{tab:did}"));
    }

    #[test]
    fn test_values_four_decimals() {
        let tex = did_table_latex(&sample_estimate());
        assert!(tex.contains(r"Point Estimate ($\hat{\gamma}$) & $0.1500$ & $1.1618$ \\"));
        assert!(tex.contains(r"Standard Error & $0.0500$ & --- \\"));
        assert!(tex.contains(r"95\% CI & $[0.0520, \; 0.2480]$ & $[1.0534, \; 1.2815]$ \\"));
    }

    #[test]
    fn test_non_default_critical_value_label() {
        let mut estimate = sample_estimate();
        estimate.z_critical = 2.576;
        assert!(did_table_latex(&estimate).contains(r"CI ($z = 2.576$) & "));
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output").join("tables").join("did_table.tex");
        write_latex_table(&sample_estimate(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(r"\begin{table}[h]"));
    }
}
