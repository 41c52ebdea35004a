use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use reserve_core::scope::visible_records;
use reserve_core::services::ReserveService;
use reserve_core::storage::SqliteStore;
use reserve_core::sync::{BackgroundSync, JsonBinClient, Synchronizer};
use reserve_core::{Record, User};
use serde::Serialize;

use crate::config::jsonbin_base_url;
use crate::error::CliError;

pub type Service = ReserveService<SqliteStore>;
pub type CloudSync = BackgroundSync<SqliteStore, JsonBinClient>;

/// Open store, service, and background sync for one CLI invocation.
pub struct App {
    pub service: Service,
    pub sync: CloudSync,
    actor: Option<String>,
}

impl App {
    pub fn open(db_path: &Path, actor: Option<String>) -> Result<Self, CliError> {
        let store = Arc::new(SqliteStore::open(db_path)?);
        let remote = Arc::new(JsonBinClient::with_base_url(jsonbin_base_url())?);
        let sync = BackgroundSync::new(Synchronizer::new(Arc::clone(&store), remote));
        let service = ReserveService::new(store).with_sync(Arc::new(sync.clone()));
        Ok(Self {
            service,
            sync,
            actor,
        })
    }

    /// The acting user: `--actor`/`RESERVE_ACTOR` first, then the session.
    pub fn actor(&self) -> Result<User, CliError> {
        resolve_actor(&self.service, self.actor.as_deref())
    }

    /// Wait for background syncs started by this invocation.
    pub async fn finish(&self) {
        self.sync.wait_idle().await;
    }
}

pub fn resolve_actor(service: &Service, explicit: Option<&str>) -> Result<User, CliError> {
    if let Some(code) = explicit {
        return service
            .find_user_by_employee_id(code)?
            .ok_or_else(|| CliError::UnknownEmployee(code.to_string()));
    }
    service.current_user()?.ok_or(CliError::NoActor)
}

/// Visible records of `actor`, cloned for display.
pub fn records_for(service: &Service, actor: &User) -> Result<Vec<Record>, CliError> {
    let records = service.list_records()?;
    Ok(visible_records(actor, &records)
        .into_iter()
        .cloned()
        .collect())
}

/// Resolve a full id or a unique id prefix among `records`.
pub fn resolve_record(records: &[Record], query: &str) -> Result<Record, CliError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CliError::EmptyRecordId);
    }

    if let Some(record) = records.iter().find(|record| record.id.as_str() == query) {
        return Ok(record.clone());
    }

    let matching: Vec<&Record> = records
        .iter()
        .filter(|record| record.id.as_str().starts_with(query))
        .collect();
    match matching.as_slice() {
        [] => Err(CliError::RecordNotFound(query.to_string())),
        [record] => Ok((*record).clone()),
        many => {
            let options = many
                .iter()
                .take(3)
                .map(|record| short_id(record))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousRecordId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn short_id(record: &Record) -> String {
    record.id.as_str().chars().take(13).collect()
}

#[derive(Debug, Serialize)]
pub struct RecordListItem {
    pub id: String,
    pub company_name: String,
    pub estimated_new_payroll: u32,
    pub cards_issued: u32,
    pub probability: u8,
    pub status: String,
    pub line: String,
    pub department: String,
    pub owner: String,
    pub updated_at: DateTime<Utc>,
    pub updated: String,
}

pub fn record_to_list_item(record: &Record) -> RecordListItem {
    RecordListItem {
        id: record.id.to_string(),
        company_name: record.company_name.clone(),
        estimated_new_payroll: record.estimated_new_payroll,
        cards_issued: record.cards_issued,
        probability: record.probability,
        status: record.status.label().to_string(),
        line: record.line.label().to_string(),
        department: record.department.clone(),
        owner: record.updated_by_name.clone(),
        updated_at: record.updated_at,
        updated: format_updated_day(local_day(record.updated_at), Local::now().date_naive()),
    }
}

pub fn format_record_lines(records: &[Record]) -> Vec<String> {
    let today = Local::now().date_naive();
    records
        .iter()
        .map(|record| {
            let short_id = short_id(record);
            let company = truncate(&record.company_name, 28);
            let payroll = record.estimated_new_payroll;
            let status = record.status.label();
            let owner = truncate(&record.updated_by_name, 12);
            let updated = format_updated_day(local_day(record.updated_at), today);
            format!(
                "{short_id:<13}  {company:<28}  {payroll:>6}  {status:<9}  {owner:<12}  {updated}"
            )
        })
        .collect()
}

pub fn format_user_lines(users: &[User]) -> Vec<String> {
    users
        .iter()
        .map(|user| {
            let name = truncate(&user.name, 16);
            let role = user.role.as_str();
            let department = truncate(&user.department, 20);
            format!(
                "{:<8}  {name:<16}  {role:<18}  {department:<20}  {}",
                user.employee_id, user.line
            )
        })
        .collect()
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

/// Day a record was last touched, relative to `today` for the past week.
pub fn format_updated_day(updated: NaiveDate, today: NaiveDate) -> String {
    match (today - updated).num_days() {
        days if days <= 0 => "today".to_string(),
        1 => "yesterday".to_string(),
        days @ 2..=6 => format!("{days} days ago"),
        _ if updated.year() == today.year() => updated.format("%m-%d").to_string(),
        _ => updated.format("%Y-%m-%d").to_string(),
    }
}

fn local_day(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// Read a file, or stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Write to `output_path`, or print when omitted.
pub fn write_output(rendered: &str, output_path: Option<&Path>) -> Result<(), CliError> {
    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }
    Ok(())
}
