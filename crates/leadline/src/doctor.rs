// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadline doctor` command implementation.
//!
//! Runs diagnostic checks against the Leadline environment to identify
//! configuration issues, database problems and missing secrets.

use std::time::{Duration, Instant};

use leadline_config::LeadlineConfig;
use leadline_core::LeadlineError;
use leadline_storage::Database;
use leadline_storage::database::map_tr_err;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `leadline doctor` command.
pub async fn run_doctor(config: &LeadlineConfig) -> Result<(), LeadlineError> {
    let results = run_checks(config).await;

    println!();
    println!("  leadline doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!(
            "    {tag} {:<20} {} ({}ms)",
            result.name,
            result.message,
            result.duration.as_millis()
        );
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

async fn run_checks(config: &LeadlineConfig) -> Vec<CheckResult> {
    let db_path = config.storage.database_path.as_str();
    let mut results = vec![
        check_secrets(config),
        check_database(db_path).await,
        check_db_integrity(db_path).await,
    ];
    if config.legacy.enabled {
        results.push(check_legacy_table(db_path, &config.legacy.table_name).await);
    }
    results
}

/// Warn about secrets that leave part of the surface closed or unprotected.
fn check_secrets(config: &LeadlineConfig) -> CheckResult {
    let start = Instant::now();
    let mut missing = Vec::new();
    if config.server.api_token.is_none() {
        missing.push("server.api_token (API rejects all requests)");
    }
    if config.server.webhook_secret.is_none() {
        missing.push("server.webhook_secret (webhook unsigned)");
    }
    if missing.is_empty() {
        CheckResult::new("Secrets", CheckStatus::Pass, "configured", start)
    } else {
        CheckResult::new("Secrets", CheckStatus::Warn, missing.join(", "), start)
    }
}

async fn open_existing(db_path: &str) -> Result<Option<Database>, LeadlineError> {
    if !std::path::Path::new(db_path).exists() {
        return Ok(None);
    }
    Database::open_read_only(db_path).await.map(Some)
}

/// Database file exists, opens and answers a query.
async fn check_database(db_path: &str) -> CheckResult {
    let start = Instant::now();
    let db = match open_existing(db_path).await {
        Ok(Some(db)) => db,
        Ok(None) => {
            return CheckResult::new(
                "Database",
                CheckStatus::Warn,
                format!("not found: {db_path} (will be created on first run)"),
                start,
            );
        }
        Err(e) => {
            return CheckResult::new("Database", CheckStatus::Fail, format!("open failed: {e}"), start);
        }
    };

    let users = db
        .connection()
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        })
        .await
        .map_err(map_tr_err);

    match users {
        Ok(0) => CheckResult::new(
            "Database",
            CheckStatus::Warn,
            "no users yet (run `leadline user add`)",
            start,
        ),
        Ok(n) => CheckResult::new("Database", CheckStatus::Pass, format!("{n} user(s)"), start),
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, format!("query failed: {e}"), start),
    }
}

/// SQLite integrity check.
async fn check_db_integrity(db_path: &str) -> CheckResult {
    let start = Instant::now();
    let db = match open_existing(db_path).await {
        Ok(Some(db)) => db,
        Ok(None) => {
            return CheckResult::new(
                "DB integrity",
                CheckStatus::Warn,
                "database not found (skipped)",
                start,
            );
        }
        Err(e) => {
            return CheckResult::new("DB integrity", CheckStatus::Fail, format!("open failed: {e}"), start);
        }
    };

    let rows = db
        .connection()
        .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare("PRAGMA integrity_check")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err);

    match rows {
        Ok(rows) if rows.len() == 1 && rows[0] == "ok" => {
            CheckResult::new("DB integrity", CheckStatus::Pass, "ok", start)
        }
        Ok(rows) => CheckResult::new(
            "DB integrity",
            CheckStatus::Fail,
            format!("{} issue(s) found", rows.len()),
            start,
        ),
        Err(e) => CheckResult::new("DB integrity", CheckStatus::Fail, format!("check failed: {e}"), start),
    }
}

/// The legacy table is written by the automation tool; its absence only
/// means no legacy sessions will be merged.
async fn check_legacy_table(db_path: &str, table: &str) -> CheckResult {
    let start = Instant::now();
    let db = match open_existing(db_path).await {
        Ok(Some(db)) => db,
        Ok(None) => {
            return CheckResult::new("Legacy table", CheckStatus::Warn, "database not found (skipped)", start);
        }
        Err(e) => {
            return CheckResult::new("Legacy table", CheckStatus::Fail, format!("open failed: {e}"), start);
        }
    };

    let name = table.to_string();
    let exists = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [&name],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(map_tr_err);

    match exists {
        Ok(true) => CheckResult::new("Legacy table", CheckStatus::Pass, format!("`{table}` found"), start),
        Ok(false) => CheckResult::new(
            "Legacy table",
            CheckStatus::Warn,
            format!("`{table}` not found (legacy sessions will not be listed)"),
            start,
        ),
        Err(e) => CheckResult::new("Legacy table", CheckStatus::Fail, format!("query failed: {e}"), start),
    }
}
