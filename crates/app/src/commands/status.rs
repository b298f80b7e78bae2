use anyhow::bail;
use exam_core::Eligibility;
use services::{Clock, ExamError};

use super::open_services;
use crate::config::AppConfig;
use crate::display;

pub async fn execute(config: &AppConfig) -> anyhow::Result<()> {
    let clock = Clock::default_clock();
    let services = open_services(config, clock).await?;

    let (user_id, eligibility) = match services.runner().eligibility().await {
        Ok(found) => found,
        Err(ExamError::IdentityMissing) => bail!("no signed-in candidate; set --user or EXAM_USER_ID"),
        Err(e) => return Err(e.into()),
    };

    match eligibility {
        Eligibility::Allowed => println!("User {user_id} may start the exam now."),
        Eligibility::Locked(lock) => println!("{}", display::render_lock(&lock, clock.now())),
    }
    Ok(())
}
