//! Record export helpers shared by every client.

use std::fmt::Write as _;

use crate::models::Record;

const CSV_HEADERS: [&str; 12] = [
    "Company",
    "Total employees",
    "Estimated new payroll",
    "Estimated landing",
    "Cards issued",
    "Probability",
    "Last visit",
    "Progress notes",
    "Line",
    "Department",
    "Owner",
    "Status",
];

/// Render records as pretty-printed JSON in the shared document format.
pub fn render_json_export(records: &[Record]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

/// Render records as a spreadsheet-friendly CSV sheet.
///
/// Starts with a UTF-8 byte order mark so spreadsheet tools detect the
/// encoding; every field is quoted.
#[must_use]
pub fn render_csv_export(records: &[Record]) -> String {
    let mut output = String::from('\u{feff}');
    output.push_str(&CSV_HEADERS.map(quote_csv).join(","));
    output.push('\n');

    for record in records {
        let fields = [
            record.company_name.clone(),
            record.total_employees.to_string(),
            record.estimated_new_payroll.to_string(),
            date_part(&record.estimated_landing_date).to_string(),
            record.cards_issued.to_string(),
            record.probability.to_string(),
            date_part(&record.last_visit_date).to_string(),
            record.progress_notes.clone(),
            record.line.label().to_string(),
            record.department.clone(),
            record.updated_by_name.clone(),
            record.status.label().to_string(),
        ];
        let row = fields
            .iter()
            .map(|field| quote_csv(field))
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(output, "{row}");
    }

    output
}

fn quote_csv(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// `2024-06-01T00:00:00.000Z` -> `2024-06-01`
fn date_part(value: &str) -> &str {
    value.split('T').next().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordStatus;
    use crate::sync::testing::{base_time, record};
    use pretty_assertions::assert_eq;

    #[test]
    fn csv_export_quotes_every_field() {
        let mut lead = record("r1", base_time(), 180);
        lead.company_name = "Harbor \"North\" Seafood".to_string();
        lead.estimated_landing_date = "2024-06-01T00:00:00.000Z".to_string();
        lead.status = RecordStatus::Completed;

        let csv = render_csv_export(&[lead]);
        let mut lines = csv.lines();

        assert!(lines.next().unwrap().starts_with("\u{feff}\"Company\",\"Total employees\""));
        assert_eq!(
            lines.next().unwrap(),
            "\"Harbor \"\"North\"\" Seafood\",\"200\",\"180\",\"2024-06-01\",\"0\",\"60\",\"\",\"\",\
             \"Corporate\",\"Corporate One\",\"Liu\",\"Completed\""
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn json_export_uses_document_field_names() {
        let rendered = render_json_export(&[record("r1", base_time(), 10)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value[0]["estimatedNewPayroll"], 10);
    }
}
