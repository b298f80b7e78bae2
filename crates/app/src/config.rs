use std::path::PathBuf;

use clap::Args;
use exam_core::model::UserId;
use services::{Role, StaticIdentity};

pub const DEFAULT_DB_URL: &str = "sqlite:exam.sqlite3?mode=rwc";
pub const DEFAULT_BANK_PATH: &str = "data/questions.json";
pub const DEFAULT_LOG: &str = "info";

/// Flags shared by every command; each falls back to an `EXAM_*` variable.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// SQLite database URL
    #[arg(long = "db", env = "EXAM_DB_URL", default_value = DEFAULT_DB_URL, global = true)]
    pub db_url: String,

    /// Question bank JSON file
    #[arg(long = "bank", env = "EXAM_BANK_PATH", default_value = DEFAULT_BANK_PATH, global = true)]
    pub bank_path: PathBuf,

    /// Signed-in user; omit to run anonymously
    #[arg(long = "user", env = "EXAM_USER_ID", global = true)]
    pub user_id: Option<UserId>,

    /// Role of the signed-in user
    #[arg(long, env = "EXAM_ROLE", default_value = "candidate", global = true)]
    pub role: Role,

    /// Default log filter, overridden by RUST_LOG
    #[arg(long, env = "EXAM_LOG", default_value = DEFAULT_LOG, global = true)]
    pub log: String,
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_url: String,
    pub bank_path: PathBuf,
    pub user_id: Option<UserId>,
    pub role: Role,
    pub log: String,
}

impl AppConfig {
    #[must_use]
    pub fn identity(&self) -> StaticIdentity {
        match self.user_id {
            Some(user_id) => StaticIdentity::signed_in(user_id, self.role),
            None => StaticIdentity::anonymous(),
        }
    }
}

impl From<ConfigArgs> for AppConfig {
    fn from(args: ConfigArgs) -> Self {
        let db_url = args.db_url.trim();
        let log = args.log.trim();
        Self {
            db_url: if db_url.is_empty() {
                DEFAULT_DB_URL.to_owned()
            } else {
                db_url.to_owned()
            },
            bank_path: args.bank_path,
            user_id: args.user_id,
            role: args.role,
            log: if log.is_empty() {
                DEFAULT_LOG.to_owned()
            } else {
                log.to_owned()
            },
        }
    }
}
