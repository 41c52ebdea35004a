use chrono::{Local, NaiveDate};
use reserve_core::scope::{
    breakdown, scoped_target, upcoming_landings, BreakdownRow, LandingProgress, ReserveSummary,
};
use reserve_core::{Record, User};
use serde::Serialize;

use crate::commands::common::{records_for, short_id, truncate, App};
use crate::error::CliError;

const BREAKDOWN_ROWS: usize = 10;
const UPCOMING_ROWS: usize = 3;

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub actor: String,
    pub role: String,
    pub records: usize,
    pub estimated_new_payroll: u64,
    pub cards_issued: u64,
    pub card_coverage: f64,
    pub following: u64,
    pub completed: u64,
    pub failed: u64,
    /// Yearly target of everyone in the actor's scope
    pub target: u64,
    pub year_landed: u64,
    pub month_landed: u64,
    pub month_projected: u64,
    pub target_gap: u64,
    pub target_progress: Option<f64>,
    pub upcoming: Vec<UpcomingItem>,
    pub breakdowns: Vec<BreakdownReport>,
}

#[derive(Debug, Serialize)]
pub struct UpcomingItem {
    pub id: String,
    pub company: String,
    pub owner: String,
    pub landing: String,
}

#[derive(Debug, Serialize)]
pub struct BreakdownReport {
    pub dimension: String,
    pub rows: Vec<BreakdownItem>,
}

#[derive(Debug, Serialize)]
pub struct BreakdownItem {
    pub key: String,
    pub records: usize,
    pub estimated_new_payroll: u64,
    pub completed: u64,
}

pub fn run_summary(app: &App, as_json: bool) -> Result<(), CliError> {
    let actor = app.actor()?;
    let records = records_for(&app.service, &actor)?;
    let users = app.service.list_users()?;
    let report = build_summary(&actor, &records, &users, Local::now().date_naive());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_summary(&report) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn build_summary(
    actor: &User,
    records: &[Record],
    users: &[User],
    today: NaiveDate,
) -> SummaryReport {
    let summary = ReserveSummary::from_records(records);
    let progress = LandingProgress::from_records(records, scoped_target(actor, users), today);
    let upcoming = upcoming_landings(records, UPCOMING_ROWS)
        .into_iter()
        .map(|record| UpcomingItem {
            id: short_id(record),
            company: record.company_name.clone(),
            owner: record.updated_by_name.clone(),
            landing: record.estimated_landing_date.clone(),
        })
        .collect();

    let breakdowns = actor
        .role
        .breakdowns()
        .iter()
        .map(|dimension| BreakdownReport {
            dimension: dimension.as_str().to_string(),
            rows: breakdown(records, *dimension)
                .into_iter()
                .take(BREAKDOWN_ROWS)
                .map(breakdown_item)
                .collect(),
        })
        .collect();

    SummaryReport {
        actor: actor.name.clone(),
        role: actor.role.to_string(),
        records: summary.records,
        estimated_new_payroll: summary.estimated_new_payroll,
        cards_issued: summary.cards_issued,
        card_coverage: summary.card_coverage(),
        following: summary.following,
        completed: summary.completed,
        failed: summary.failed,
        target: progress.target,
        year_landed: progress.year_landed,
        month_landed: progress.month_landed,
        month_projected: progress.month_projected,
        target_gap: progress.gap(),
        target_progress: progress.percent(),
        upcoming,
        breakdowns,
    }
}

fn breakdown_item(row: BreakdownRow) -> BreakdownItem {
    BreakdownItem {
        key: row.key,
        records: row.summary.records,
        estimated_new_payroll: row.summary.estimated_new_payroll,
        completed: row.summary.completed,
    }
}

pub fn format_summary(report: &SummaryReport) -> Vec<String> {
    let mut lines = vec![
        format!("{} ({})", report.actor, report.role),
        format!("Records:           {}", report.records),
        format!("Est. new payroll:  {}", report.estimated_new_payroll),
        format!(
            "Cards issued:      {} ({:.1}%)",
            report.cards_issued, report.card_coverage
        ),
        format!(
            "Following / completed / failed: {} / {} / {}",
            report.following, report.completed, report.failed
        ),
    ];
    lines.push(format!(
        "This month:        {} landed, {} more due",
        report.month_landed, report.month_projected
    ));
    match report.target_progress {
        Some(progress) => lines.push(format!(
            "Yearly target:     {} of {} ({progress:.1}%), gap {}",
            report.year_landed, report.target, report.target_gap
        )),
        None => lines.push(format!(
            "Landed this year:  {} (no target set)",
            report.year_landed
        )),
    }

    if !report.upcoming.is_empty() {
        lines.push(String::new());
        lines.push("Upcoming landings:".to_string());
        for item in &report.upcoming {
            let landing = if item.landing.is_empty() {
                "no date"
            } else {
                item.landing.get(..10).unwrap_or(&item.landing)
            };
            lines.push(format!(
                "  {landing:<10}  {:<28}  {}",
                truncate(&item.company, 28),
                item.owner
            ));
        }
    }

    for section in &report.breakdowns {
        lines.push(String::new());
        lines.push(format!("By {}:", section.dimension));
        for row in &section.rows {
            let key = truncate(&row.key, 28);
            lines.push(format!(
                "  {key:<28}  {:>6}  {:>3} records",
                row.estimated_new_payroll, row.records
            ));
        }
    }
    lines
}

