use std::path::Path;

use reserve_core::{Line, Role, User};
use serde::Deserialize;

use crate::commands::common::{format_user_lines, read_input, App};
use crate::error::CliError;

/// One row of a user import file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserImport {
    pub employee_id: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub title: String,
    pub department: String,
    pub line: Line,
    #[serde(default)]
    pub yearly_target: u32,
}

impl From<UserImport> for User {
    fn from(row: UserImport) -> Self {
        let mut user = Self::new(row.employee_id, row.name, row.role, row.department, row.line);
        user.title = row.title;
        user.yearly_target = row.yearly_target;
        user
    }
}

/// The first user may be created by anyone; after that only admins manage
/// users.
pub fn ensure_user_admin(app: &App) -> Result<(), CliError> {
    if app.service.list_users()?.is_empty() {
        return Ok(());
    }
    match app.actor()? {
        actor if actor.role == Role::Admin => Ok(()),
        _ => Err(CliError::AdminRequired),
    }
}

pub fn run_add(app: &App, user: User) -> Result<(), CliError> {
    ensure_user_admin(app)?;
    let saved = app.service.save_user(user)?;
    println!(
        "Added {} {} ({})",
        saved.employee_id, saved.name, saved.role
    );
    Ok(())
}

pub fn run_list(app: &App, as_json: bool) -> Result<(), CliError> {
    let users = app.service.list_users()?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&users)?);
    } else if users.is_empty() {
        println!("No users. Add one with `reserve user add`.");
    } else {
        for line in format_user_lines(&users) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn run_delete(app: &App, employee_id: &str) -> Result<(), CliError> {
    ensure_user_admin(app)?;
    let user = app
        .service
        .find_user_by_employee_id(employee_id)?
        .ok_or_else(|| CliError::UnknownEmployee(employee_id.to_string()))?;
    app.service.delete_user(&user.id)?;
    println!("Deleted {} {}", user.employee_id, user.name);
    Ok(())
}

pub fn run_import(app: &App, path: &Path) -> Result<(), CliError> {
    ensure_user_admin(app)?;
    let rows: Vec<UserImport> = serde_json::from_str(&read_input(path)?)?;
    let added = app
        .service
        .batch_add_users(rows.into_iter().map(User::from).collect())?;
    println!("Imported {} users", added.len());
    Ok(())
}
