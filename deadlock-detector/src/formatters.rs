//! Output formatters (out of scope per spec.md §1, ambient front-end only).
//!
//! Grounded on `original_source/src/output_handler.c`'s text/json/verbose
//! formats — verbose is folded into text and toggled by `-v`.

use deadlock_core::DeadlockReport;

pub fn format_json(report: &DeadlockReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

pub fn format_text(report: &DeadlockReport, verbose: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Deadlock Detector Report — {}\n",
        report.timestamp.to_rfc3339()
    ));
    out.push_str(&format!(
        "Scanned {} processes, {} resources.\n",
        report.total_processes_scanned, report.total_resources_found
    ));

    if !report.deadlock_detected {
        out.push_str("No deadlock detected.\n");
        return out;
    }

    out.push_str(&format!(
        "DEADLOCK DETECTED — {} process(es) involved: {:?}\n\n",
        report.deadlocked_pids.len(),
        report.deadlocked_pids
    ));

    for rc in &report.cycles {
        out.push_str(&rc.explanation);
        out.push('\n');
        if verbose {
            if let Some(note) = &rc.shared_resource_note {
                out.push_str("  note: ");
                out.push_str(note);
                out.push('\n');
            }
            out.push_str(&format!("  chain: {:?}\n", rc.cycle.non_closing()));
        }
    }

    if !report.recommendations.is_empty() {
        out.push_str("\nRecommendations:\n");
        for rec in &report.recommendations {
            out.push_str("  - ");
            out.push_str(rec);
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn empty_report() -> DeadlockReport {
        DeadlockReport {
            deadlock_detected: false,
            deadlocked_pids: Vec::new(),
            cycles: Vec::new(),
            recommendations: Vec::new(),
            timestamp: Utc::now(),
            total_processes_scanned: 3,
            total_resources_found: 1,
        }
    }

    #[test]
    fn text_format_reports_no_deadlock() {
        let text = format_text(&empty_report(), false);
        assert!(text.contains("No deadlock detected"));
    }

    #[test]
    fn json_format_round_trips_field_names() {
        let json = format_json(&empty_report()).unwrap();
        assert!(json.contains("\"deadlock_detected\": false"));
        assert!(json.contains("\"total_processes_scanned\": 3"));
    }
}
