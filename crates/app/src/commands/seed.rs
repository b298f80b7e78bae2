use anyhow::{Context, bail};
use exam_core::model::{ApplicationId, ApplicationRecord};
use services::Clock;
use storage::repository::Storage;
use tracing::info;

use crate::config::AppConfig;

pub async fn execute(config: &AppConfig, id: ApplicationId, status: &str) -> anyhow::Result<()> {
    let Some(user_id) = config.user_id else {
        bail!("seeding an application needs --user or EXAM_USER_ID");
    };
    if status.trim().is_empty() {
        bail!("application status cannot be empty");
    }

    let storage = Storage::sqlite(&config.db_url)
        .await
        .with_context(|| format!("opening database {}", config.db_url))?;
    let record = ApplicationRecord::new(id, user_id, status.trim(), Clock::default_clock().now());
    storage.applications.upsert_application(&record).await?;

    info!(application_id = %id, %user_id, status = %record.status, "application seeded");
    let note = if record.is_active() {
        "exam results will be attached to it"
    } else {
        "it is not active, so exam results skip it"
    };
    println!("Application {id} stored for user {user_id}; {note}.");
    Ok(())
}
