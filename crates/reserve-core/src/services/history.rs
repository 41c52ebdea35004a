//! Change-log summaries for record edits.

use crate::models::Record;

pub const CREATED_SUMMARY: &str = "Created";
pub const BATCH_IMPORT_SUMMARY: &str = "Batch import";
pub const MANUAL_UPDATE_SUMMARY: &str = "Manual update";

/// Describe the tracked fields that differ between `old` and `new`.
pub fn describe_changes(old: &Record, new: &Record) -> Vec<String> {
    let mut changes = Vec::new();

    if old.estimated_new_payroll != new.estimated_new_payroll {
        changes.push(format!(
            "Estimated new payroll: {} -> {}",
            old.estimated_new_payroll, new.estimated_new_payroll
        ));
    }
    if old.cards_issued != new.cards_issued {
        changes.push(format!(
            "Cards issued: {} -> {}",
            old.cards_issued, new.cards_issued
        ));
    }
    if old.estimated_landing_date != new.estimated_landing_date {
        changes.push("Landing date changed".to_string());
    }
    if old.probability != new.probability {
        changes.push(format!(
            "Probability: {}% -> {}%",
            old.probability, new.probability
        ));
    }
    if old.progress_notes != new.progress_notes {
        changes.push("Notes updated".to_string());
    }
    if old.status != new.status {
        changes.push(format!("Status: {} -> {}", old.status, new.status));
    }
    if old.total_employees != new.total_employees {
        changes.push(format!(
            "Total employees: {} -> {}",
            old.total_employees, new.total_employees
        ));
    }
    if old.company_name != new.company_name {
        changes.push(format!(
            "Company name: {} -> {}",
            old.company_name, new.company_name
        ));
    }

    changes
}

/// Join change lines into one history summary.
pub fn summarize(changes: &[String]) -> String {
    if changes.is_empty() {
        MANUAL_UPDATE_SUMMARY.to_string()
    } else {
        changes.join("; ")
    }
}
