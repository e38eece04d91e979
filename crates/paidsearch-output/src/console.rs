//! Plain-text estimate summary for the terminal.

use paidsearch_estimate::{DidEstimate, Z_95};

/// Format the estimate the way it is printed after a run.
pub fn format_console_summary(e: &DidEstimate) -> String {
    let ci_name = if (e.z_critical - Z_95).abs() < 1e-12 {
        "95% CI".to_string()
    } else {
        format!("CI (z = {})", e.z_critical)
    };

    let mut out = String::new();
    out.push_str("DID Results (Log Scale)\n");
    out.push_str(&"=".repeat(23));
    out.push('\n');
    out.push_str(&format!("Gamma hat: {:.4}\n", e.gamma_hat));
    out.push_str(&format!("Std Error: {:.4}\n", e.std_error));
    out.push_str(&format!(
        "{ci_name}: [{:.4}, {:.4}]\n\n",
        e.ci_lower, e.ci_upper
    ));

    out.push_str("DID Results (Levels)\n");
    out.push_str(&"=".repeat(20));
    out.push('\n');
    out.push_str(&format!("exp(Gamma hat): {:.4}\n", e.gamma_hat_exp));
    out.push_str(&format!(
        "{ci_name}: [{:.4}, {:.4}]\n",
        e.ci_lower_exp, e.ci_upper_exp
    ));
    out.push_str(&format!(
        "Implied revenue change: {:+.2}%\n\n",
        e.percent_effect() * 100.0
    ));
    out.push_str(&format!(
        "Markets used: {} treated, {} control\n",
        e.treated.n, e.control.n
    ));

    if e.has_warnings() {
        out.push_str("\nWarnings:\n");
        for warning in &e.warnings {
            out.push_str(&format!("  - {warning}\n"));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_estimate;

    #[test]
    fn test_log_scale_block() {
        let text = format_console_summary(&sample_estimate());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "DID Results (Log Scale)");
        assert_eq!(lines[1], "=======================");
        assert_eq!(lines[2], "Gamma hat: 0.1500");
        assert_eq!(lines[3], "Std Error: 0.0500");
        assert_eq!(lines[4], "95% CI: [0.0520, 0.2480]");
    }

    #[test]
    fn test_level_block_and_counts() {
        let text = format_console_summary(&sample_estimate());
        assert!(text.contains("exp(Gamma hat): 1.1618"));
        assert!(text.contains("95% CI: [1.0534, 1.2815]"));
        assert!(text.contains("Implied revenue change: +16.18%"));
        assert!(text.contains("Markets used: 2 treated, 2 control"));
    }

    #[test]
    fn test_warnings_listed() {
        let text = format_console_summary(&sample_estimate());
        assert!(text.contains("Warnings:"));
        assert!(text.contains("control group has zero variance"));
    }

    #[test]
    fn test_custom_critical_value_label() {
        let mut estimate = sample_estimate();
        estimate.z_critical = 2.576;
        let text = format_console_summary(&estimate);
        assert!(text.contains("CI (z = 2.576): ["));
        assert!(!text.contains("95% CI"));
    }
}
