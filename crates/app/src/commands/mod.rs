pub mod seed;
pub mod status;
pub mod take;

use std::sync::Arc;

use anyhow::Context;
use exam_core::QuestionBank;
use services::{Clock, ExamServices};

use crate::config::AppConfig;

/// Load the bank and open storage for the configured user.
async fn open_services(config: &AppConfig, clock: Clock) -> anyhow::Result<ExamServices> {
    let bank = QuestionBank::load_once(&config.bank_path)
        .with_context(|| format!("loading question bank {}", config.bank_path.display()))?;
    let services =
        ExamServices::new_sqlite(&config.db_url, clock, bank, Arc::new(config.identity()))
            .await
            .with_context(|| format!("opening database {}", config.db_url))?;
    Ok(services)
}
