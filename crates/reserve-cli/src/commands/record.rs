use std::cmp::Ordering;
use std::path::Path;

use reserve_core::models::{RecordDraft, RecordPatch};
use reserve_core::Record;

use crate::cli::{RecordFields, RecordFilter, RecordSort};
use crate::commands::common::{
    format_record_lines, read_input, record_to_list_item, records_for, resolve_record, short_id,
    App, RecordListItem,
};
use crate::error::CliError;

pub fn run_add(
    app: &App,
    company: &str,
    fields: RecordFields,
    force: bool,
) -> Result<(), CliError> {
    let actor = app.actor()?;
    if !force {
        if let Some(existing) = app.service.find_record_by_company(company)? {
            return Err(CliError::DuplicateCompany(format!(
                "{} {}",
                short_id(&existing),
                existing.company_name
            )));
        }
    }

    let record = app.service.add_record(draft_from_fields(company, fields), &actor)?;
    println!("Created {} {}", short_id(&record), record.company_name);
    Ok(())
}

pub fn run_list(
    app: &App,
    filter: &RecordFilter,
    sort: RecordSort,
    ascending: bool,
    limit: Option<usize>,
    as_json: bool,
) -> Result<(), CliError> {
    let actor = app.actor()?;
    let records = records_for(&app.service, &actor)?;
    let mut records = select_records(records, filter, sort, ascending);
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    if as_json {
        let items = records
            .iter()
            .map(record_to_list_item)
            .collect::<Vec<RecordListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if records.is_empty() {
        println!("No records.");
    } else {
        for line in format_record_lines(&records) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Records passing `filter`, ordered by `sort` (descending unless `ascending`).
pub fn select_records(
    mut records: Vec<Record>,
    filter: &RecordFilter,
    sort: RecordSort,
    ascending: bool,
) -> Vec<Record> {
    records.retain(|record| matches_filter(record, filter));
    records.sort_by(|a, b| {
        let order = compare_by(a, b, sort);
        if ascending {
            order
        } else {
            order.reverse()
        }
    });
    records
}

fn matches_filter(record: &Record, filter: &RecordFilter) -> bool {
    let owner = filter.owner.as_deref().map(str::trim).unwrap_or_default();
    filter.status.is_none_or(|status| record.status == status)
        && filter.line.is_none_or(|line| record.line == line)
        && filter
            .department
            .as_deref()
            .is_none_or(|department| record.department == department.trim())
        && (owner.is_empty()
            || record
                .updated_by_name
                .to_lowercase()
                .contains(&owner.to_lowercase()))
}

// Undated records order before dated ones, so they land last in the default order.
fn compare_by(a: &Record, b: &Record, sort: RecordSort) -> Ordering {
    match sort {
        RecordSort::Updated => a.updated_at.cmp(&b.updated_at),
        RecordSort::Payroll => a.estimated_new_payroll.cmp(&b.estimated_new_payroll),
        RecordSort::Landing => a.landing_date().cmp(&b.landing_date()),
        RecordSort::Cards => a.cards_issued.cmp(&b.cards_issued),
        RecordSort::Probability => a.probability.cmp(&b.probability),
        RecordSort::Visit => a.last_visit().cmp(&b.last_visit()),
    }
    .then_with(|| a.updated_at.cmp(&b.updated_at))
}

pub fn run_show(app: &App, id: &str, as_json: bool) -> Result<(), CliError> {
    let actor = app.actor()?;
    let record = resolve_record(&records_for(&app.service, &actor)?, id)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        for line in format_record_detail(&record) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn run_update(
    app: &App,
    id: &str,
    company: Option<String>,
    fields: RecordFields,
    owner: Option<&str>,
) -> Result<(), CliError> {
    let actor = app.actor()?;
    let record = resolve_record(&records_for(&app.service, &actor)?, id)?;

    let owner = owner
        .map(|code| {
            app.service
                .find_user_by_employee_id(code)?
                .map(|user| user.id)
                .ok_or_else(|| CliError::UnknownEmployee(code.to_string()))
        })
        .transpose()?;
    let patch = patch_from_fields(company, fields, owner);
    if patch.is_empty() {
        return Err(CliError::EmptyPatch);
    }

    let updated = app.service.update_record(&record.id, patch, &actor)?;
    let summary = updated
        .history
        .first()
        .map_or("", |entry| entry.change_summary.as_str());
    println!("Updated {}: {summary}", short_id(&updated));
    Ok(())
}

pub fn run_delete(app: &App, id: &str) -> Result<(), CliError> {
    let actor = app.actor()?;
    let record = resolve_record(&records_for(&app.service, &actor)?, id)?;
    app.service.delete_record(&record.id)?;
    println!("Deleted {} {}", short_id(&record), record.company_name);
    Ok(())
}

pub fn run_import(app: &App, path: &Path) -> Result<(), CliError> {
    let actor = app.actor()?;
    let drafts: Vec<RecordDraft> = serde_json::from_str(&read_input(path)?)?;
    let added = app.service.batch_add_records(drafts, &actor)?;
    println!("Imported {} records", added.len());
    Ok(())
}

pub fn draft_from_fields(company: &str, fields: RecordFields) -> RecordDraft {
    RecordDraft {
        company_name: company.to_string(),
        total_employees: fields.employees.unwrap_or_default(),
        estimated_new_payroll: fields.payroll.unwrap_or_default(),
        estimated_landing_date: fields.landing.unwrap_or_default(),
        cards_issued: fields.cards.unwrap_or_default(),
        card_schedule: fields.schedule.unwrap_or_default(),
        last_visit_date: fields.visited.unwrap_or_default(),
        probability: fields.probability.unwrap_or_default(),
        progress_notes: fields.notes.unwrap_or_default(),
        status: fields.status.unwrap_or_default(),
    }
}

pub fn patch_from_fields(
    company: Option<String>,
    fields: RecordFields,
    owner: Option<reserve_core::UserId>,
) -> RecordPatch {
    RecordPatch {
        company_name: company,
        total_employees: fields.employees,
        estimated_new_payroll: fields.payroll,
        estimated_landing_date: fields.landing,
        cards_issued: fields.cards,
        card_schedule: fields.schedule,
        last_visit_date: fields.visited,
        probability: fields.probability,
        progress_notes: fields.notes,
        status: fields.status,
        owner,
    }
}

pub fn format_record_detail(record: &Record) -> Vec<String> {
    let mut lines = vec![
        format!("{}  {}", record.id, record.company_name),
        format!("Status:            {}", record.status),
        format!("Line / department: {} / {}", record.line, record.department),
        format!("Owner:             {}", record.updated_by_name),
        format!("Total employees:   {}", record.total_employees),
        format!("Est. new payroll:  {}", record.estimated_new_payroll),
        format!(
            "Cards issued:      {} ({:.1}%)",
            record.cards_issued,
            record.card_coverage()
        ),
        format!("Probability:       {}%", record.probability),
    ];
    for (label, value) in [
        ("Landing date:      ", &record.estimated_landing_date),
        ("Card schedule:     ", &record.card_schedule),
        ("Last visit:        ", &record.last_visit_date),
        ("Notes:             ", &record.progress_notes),
    ] {
        if !value.trim().is_empty() {
            lines.push(format!("{label}{value}"));
        }
    }
    lines.push(format!("Updated:           {}", record.updated_at.to_rfc3339()));

    if !record.history.is_empty() {
        lines.push(String::new());
        lines.push("History:".to_string());
        for entry in &record.history {
            lines.push(format!(
                "  {}  {}  {}",
                entry.date, entry.updated_by_name, entry.change_summary
            ));
        }
    }
    lines
}
