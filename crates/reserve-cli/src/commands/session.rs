use crate::commands::common::App;
use crate::error::CliError;

pub fn run_use(app: &App, employee_id: &str) -> Result<(), CliError> {
    let user = app
        .service
        .set_current_user(employee_id)
        .map_err(|error| match error {
            reserve_core::Error::NotFound(_) => CliError::UnknownEmployee(employee_id.to_string()),
            other => other.into(),
        })?;
    println!("Acting as {} {} ({})", user.employee_id, user.name, user.role);
    Ok(())
}

pub fn run_whoami(app: &App) -> Result<(), CliError> {
    let user = app.actor()?;
    println!("{} {}", user.employee_id, user.name);
    println!("Role:       {}", user.role);
    if !user.title.is_empty() {
        println!("Title:      {}", user.title);
    }
    println!("Department: {}", user.department);
    println!("Line:       {}", user.line);
    if user.yearly_target > 0 {
        println!("Target:     {}", user.yearly_target);
    }
    Ok(())
}

pub fn run_logout(app: &App) -> Result<(), CliError> {
    app.service.clear_current_user()?;
    println!("Session cleared");
    Ok(())
}
