use clap::{CommandFactory, Parser};
use pretty_assertions::assert_eq;
use reserve_core::models::RecordDraft;
use reserve_core::{CloudConfig, Line, Record, Role, User};

use crate::cli::{
    Cli, Commands, CompletionShell, RecordCommands, RecordFields, RecordFilter, RecordSort,
};
use crate::commands::common::{format_updated_day, resolve_actor, resolve_record, truncate, App};
use crate::commands::completions::render_completions;
use crate::commands::config::{apply_config_changes, format_config_lines, mask_secret};
use crate::commands::record::{draft_from_fields, patch_from_fields, run_add, select_records};
use crate::commands::summary::build_summary;
use crate::commands::user::{ensure_user_admin, UserImport};
use crate::config::first_non_blank;
use crate::error::CliError;

fn open_app(dir: &tempfile::TempDir, actor: Option<&str>) -> App {
    App::open(&dir.path().join("reserve.db"), actor.map(str::to_string)).unwrap()
}

fn staff() -> User {
    User::new("C102", "Liu", Role::Staff, "Corporate One", Line::Corporate)
}

fn admin() -> User {
    User::new("A001", "Chen", Role::Admin, "President Office", Line::Corporate)
}

fn record_with_id(id: &str) -> Record {
    let mut record: Record = serde_json::from_value(serde_json::json!({
        "id": id,
        "companyName": "Fishery",
        "updatedAt": "2024-01-01T00:00:00Z",
        "updatedByUserId": "s_c1",
        "updatedByName": "Liu",
        "department": "Corporate One",
        "line": "CORPORATE"
    }))
    .unwrap();
    record.estimated_new_payroll = 10;
    record
}

#[test]
fn cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn cli_parses_record_add_fields() {
    let cli = Cli::try_parse_from([
        "reserve",
        "--actor",
        "C102",
        "record",
        "add",
        "East Tech Park",
        "--payroll",
        "180",
        "--probability",
        "80",
        "--status",
        "completed",
    ])
    .unwrap();

    assert_eq!(cli.actor.as_deref(), Some("C102"));
    let Commands::Record(RecordCommands::Add { company, fields, .. }) = cli.command else {
        panic!("expected record add");
    };
    assert_eq!(company, "East Tech Park");
    assert_eq!(fields.payroll, Some(180));
    assert_eq!(fields.probability, Some(80));
}

#[test]
fn cli_rejects_out_of_range_probability() {
    let parsed = Cli::try_parse_from([
        "reserve",
        "record",
        "add",
        "Fishery",
        "--probability",
        "150",
    ]);
    assert!(parsed.is_err());
}

#[test]
fn resolve_record_accepts_unique_prefix() {
    let records = vec![
        record_with_id("0190a1b2-aaaa"),
        record_with_id("0190a1b2-bbbb"),
        record_with_id("77f0"),
    ];

    assert_eq!(resolve_record(&records, "77").unwrap().id.as_str(), "77f0");
    assert_eq!(
        resolve_record(&records, "0190a1b2-bbbb").unwrap().id.as_str(),
        "0190a1b2-bbbb"
    );
    assert!(matches!(
        resolve_record(&records, "0190"),
        Err(CliError::AmbiguousRecordId(_))
    ));
    assert!(matches!(
        resolve_record(&records, "ff"),
        Err(CliError::RecordNotFound(_))
    ));
    assert!(matches!(
        resolve_record(&records, "  "),
        Err(CliError::EmptyRecordId)
    ));
}

#[test]
fn updated_day_is_relative_within_a_week() {
    let today = mid_june();
    let days_ago = |days: u64| today - chrono::Days::new(days);
    assert_eq!(format_updated_day(today, today), "today");
    assert_eq!(format_updated_day(days_ago(1), today), "yesterday");
    assert_eq!(format_updated_day(days_ago(4), today), "4 days ago");
    assert_eq!(format_updated_day(days_ago(30), today), "05-16");
    assert_eq!(format_updated_day(days_ago(200), today), "2023-11-28");
}

#[test]
fn cli_parses_record_list_filters() {
    let cli = Cli::try_parse_from([
        "reserve",
        "record",
        "list",
        "--line",
        "retail",
        "--department",
        "Retail One",
        "--owner",
        "yang",
        "--sort",
        "landing",
        "--asc",
    ])
    .unwrap();

    let Commands::Record(RecordCommands::List {
        filter, sort, asc, ..
    }) = cli.command
    else {
        panic!("expected record list");
    };
    assert_eq!(filter.line, Some(Line::Retail));
    assert_eq!(filter.department.as_deref(), Some("Retail One"));
    assert_eq!(filter.owner.as_deref(), Some("yang"));
    assert_eq!(sort, RecordSort::Landing);
    assert!(asc);
}

#[test]
fn cli_list_defaults_to_latest_update_first() {
    let cli = Cli::try_parse_from(["reserve", "record", "list"]).unwrap();
    let Commands::Record(RecordCommands::List { sort, asc, .. }) = cli.command else {
        panic!("expected record list");
    };
    assert_eq!(sort, RecordSort::Updated);
    assert!(!asc);

    let parsed = Cli::try_parse_from(["reserve", "record", "list", "--sort", "company"]);
    assert!(parsed.is_err());
}

fn listed_ids(records: &[Record]) -> Vec<&str> {
    records.iter().map(|record| record.id.as_str()).collect()
}

#[test]
fn list_filters_by_line_department_and_owner() {
    let mut retail = record_with_id("r1");
    retail.line = Line::Retail;
    retail.department = "Retail One".to_string();
    retail.updated_by_name = "Yang Mei".to_string();
    let corporate = record_with_id("r2");

    let filter = RecordFilter {
        owner: Some("YANG".to_string()),
        ..RecordFilter::default()
    };
    let picked = select_records(
        vec![retail.clone(), corporate.clone()],
        &filter,
        RecordSort::Updated,
        false,
    );
    assert_eq!(listed_ids(&picked), vec!["r1"]);

    let filter = RecordFilter {
        line: Some(Line::Corporate),
        department: Some("Corporate One".to_string()),
        ..RecordFilter::default()
    };
    let picked = select_records(vec![retail, corporate], &filter, RecordSort::Updated, false);
    assert_eq!(listed_ids(&picked), vec!["r2"]);
}

#[test]
fn list_sorts_by_field_with_undated_last() {
    let mut soon = record_with_id("soon");
    soon.estimated_landing_date = "2024-06-20".to_string();
    soon.probability = 90;
    let mut later = record_with_id("later");
    later.estimated_landing_date = "2024-09-01".to_string();
    later.probability = 40;
    let undated = record_with_id("undated");
    let records = vec![undated, soon, later];

    let all = RecordFilter::default();
    let by_landing = select_records(records.clone(), &all, RecordSort::Landing, false);
    assert_eq!(listed_ids(&by_landing), vec!["later", "soon", "undated"]);

    let by_probability = select_records(records, &all, RecordSort::Probability, true);
    assert_eq!(listed_ids(&by_probability), vec!["undated", "later", "soon"]);
}

#[test]
fn truncate_collapses_whitespace() {
    assert_eq!(truncate("Harbor   Seafood", 20), "Harbor Seafood");
    assert_eq!(truncate("Ningbo East Technology Park", 10), "Ningbo ...");
}

#[test]
fn mask_secret_keeps_tail() {
    assert_eq!(mask_secret("abcdefgh"), "****efgh");
    assert_eq!(mask_secret("abc"), "***");
}

#[test]
fn config_changes_enable_on_credentials() {
    let config = apply_config_changes(
        CloudConfig::default(),
        false,
        false,
        Some("key".to_string()),
        Some("bin".to_string()),
    );
    assert!(config.is_usable());

    let disabled = apply_config_changes(config, false, true, Some("other".to_string()), None);
    assert!(!disabled.enabled);
    assert_eq!(disabled.api_key, "other");
    assert_eq!(disabled.bin_id, "bin");
}

#[test]
fn config_lines_never_show_full_key() {
    let config = CloudConfig::new("$2a$10$very-secret-key", "671f00");
    let lines = format_config_lines(&config, "https://api.jsonbin.io/v3");
    assert!(lines.iter().all(|line| !line.contains("very-secret")));
    assert!(lines.iter().any(|line| line.ends_with("-key")));
    assert!(lines.iter().any(|line| line.contains("ready")));
}

#[test]
fn record_fields_map_to_draft_and_patch() {
    let draft = draft_from_fields(
        "Fishery",
        RecordFields {
            payroll: Some(50),
            ..RecordFields::default()
        },
    );
    assert_eq!(
        draft,
        RecordDraft {
            estimated_new_payroll: 50,
            ..RecordDraft::new("Fishery")
        }
    );
    assert!(patch_from_fields(None, RecordFields::default(), None).is_empty());
}

#[test]
fn first_non_blank_skips_empty_values() {
    assert_eq!(
        first_non_blank(Some("  ".to_string()), Some(" C102 ".to_string())),
        Some("C102".to_string())
    );
    assert_eq!(first_non_blank(None, None), None);
}

#[test]
fn actor_resolution_prefers_explicit_code() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_app(&dir, None);
    app.service.batch_add_users(vec![staff(), admin()]).unwrap();

    assert!(matches!(app.actor(), Err(CliError::NoActor)));
    app.service.set_current_user("C102").unwrap();
    assert_eq!(app.actor().unwrap().employee_id, "C102");
    assert_eq!(
        resolve_actor(&app.service, Some("A001")).unwrap().name,
        "Chen"
    );
    assert!(matches!(
        resolve_actor(&app.service, Some("Z999")),
        Err(CliError::UnknownEmployee(_))
    ));
}

#[test]
fn first_user_can_be_added_without_actor() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_app(&dir, None);
    ensure_user_admin(&app).unwrap();

    app.service.batch_add_users(vec![staff(), admin()]).unwrap();
    assert!(matches!(ensure_user_admin(&app), Err(CliError::NoActor)));

    let as_staff = open_app(&dir, Some("C102"));
    assert!(matches!(
        ensure_user_admin(&as_staff),
        Err(CliError::AdminRequired)
    ));
    let as_admin = open_app(&dir, Some("A001"));
    ensure_user_admin(&as_admin).unwrap();
}

#[test]
fn record_add_refuses_duplicate_company() {
    let dir = tempfile::tempdir().unwrap();
    let app = open_app(&dir, Some("C102"));
    app.service.batch_add_users(vec![staff()]).unwrap();

    run_add(&app, "Harbor Seafood", RecordFields::default(), false).unwrap();
    let error = run_add(&app, "Harbor Seafood", RecordFields::default(), false).unwrap_err();
    assert!(matches!(error, CliError::DuplicateCompany(_)));

    run_add(&app, "Harbor Seafood", RecordFields::default(), true).unwrap();
    assert_eq!(app.service.list_records().unwrap().len(), 2);
}

#[test]
fn user_import_rows_accept_document_spellings() {
    let rows: Vec<UserImport> = serde_json::from_str(
        r#"[{"employeeId":"R201","name":"Yang","role":"STAFF","department":"Retail One","line":"零售"}]"#,
    )
    .unwrap();
    let user = User::from(rows.into_iter().next().unwrap());
    assert_eq!(user.line, Line::Retail);
    assert_eq!(user.yearly_target, 0);
}

fn mid_june() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

#[test]
fn staff_summary_only_breaks_down_by_company() {
    let mut actor = staff();
    actor.yearly_target = 200;
    let mut landed = record_with_id("r1");
    landed.estimated_new_payroll = 50;
    landed.estimated_landing_date = "2024-03-01".to_string();
    landed.status = reserve_core::RecordStatus::Completed;
    let mut due = record_with_id("r2");
    due.estimated_landing_date = "2024-06-30".to_string();

    let report = build_summary(&actor, &[landed, due], &[], mid_june());

    assert_eq!(report.records, 2);
    assert_eq!(report.estimated_new_payroll, 60);
    assert_eq!(report.breakdowns.len(), 1);
    assert_eq!(report.breakdowns[0].dimension, "company");
    assert_eq!(report.breakdowns[0].rows[0].records, 2);
    assert_eq!(report.year_landed, 50);
    assert_eq!(report.month_projected, 10);
    assert_eq!(report.target_gap, 150);
    assert!((report.target_progress.unwrap() - 25.0).abs() < f64::EPSILON);
    assert_eq!(report.upcoming.len(), 1);
    assert_eq!(report.upcoming[0].id, "r2");
}

#[test]
fn manager_summary_uses_department_target() {
    let manager = User::new(
        "C100",
        "Wang",
        Role::DepartmentManager,
        "Corporate One",
        Line::Corporate,
    );
    let mut member = staff();
    member.yearly_target = 300;
    let mut other = User::new("R201", "Yang", Role::Staff, "Retail One", Line::Retail);
    other.yearly_target = 900;
    let mut landed = record_with_id("r1");
    landed.estimated_landing_date = "2023-12-20".to_string();
    landed.status = reserve_core::RecordStatus::Completed;

    let report = build_summary(&manager, &[landed], &[member, other, manager.clone()], mid_june());

    assert_eq!(report.target, 300);
    assert_eq!(report.year_landed, 0);
    assert_eq!(report.target_gap, 300);
    assert_eq!(report.breakdowns.len(), 2);
    assert!(report.upcoming.is_empty());
}

#[test]
fn completions_name_the_binary() {
    for shell in [CompletionShell::Bash, CompletionShell::PowerShell] {
        let script = String::from_utf8(render_completions(shell)).unwrap();
        assert!(script.contains("reserve"));
    }
}
