// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadline user add` command implementation.

use std::sync::Arc;

use leadline_config::LeadlineConfig;
use leadline_core::{LeadlineError, StorageAdapter, SystemClock};
use leadline_inbox::AccountService;
use leadline_storage::SqliteStorage;

/// Create a user and print its id, which webhook events and `X-User-Id` refer to.
pub async fn run_user_add(
    config: &LeadlineConfig,
    email: &str,
    name: Option<&str>,
) -> Result<(), LeadlineError> {
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let accounts = AccountService::new(storage.clone(), storage.clone(), Arc::new(SystemClock));
    let created = accounts.create_user(email, name).await;
    storage.close().await?;
    let user = created?;

    println!("created user {} <{}>", user.id, user.email);
    Ok(())
}
