use reserve_core::sync::SyncError;

use crate::commands::common::App;
use crate::error::CliError;

/// Sync now and surface the outcome; unlike mutation-triggered runs, a
/// failure here fails the command.
pub async fn run_sync(app: &App) -> Result<(), CliError> {
    match app.sync.synchronizer().sync().await {
        Ok(report) => {
            println!(
                "Sync completed: {} records, {} users",
                report.merged_records, report.merged_users
            );
            Ok(())
        }
        Err(SyncError::NotConfigured) => Err(CliError::SyncNotConfigured),
        Err(error) => {
            if error.is_partial_consistency() {
                eprintln!("Local data was merged; run `reserve sync` again to publish it.");
            }
            Err(error.into())
        }
    }
}
