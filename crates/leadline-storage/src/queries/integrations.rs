// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user provider integrations.

use leadline_core::LeadlineError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{Integration, integration_from_row, metadata_to_sql, ts_to_sql};

const INTEGRATION_COLUMNS: &str =
    "id, user_id, provider, config, enabled, created_at, updated_at";

/// All integrations of a user, ordered by provider name.
pub async fn list_integrations(
    db: &Database,
    user_id: &str,
) -> Result<Vec<Integration>, LeadlineError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {INTEGRATION_COLUMNS} FROM integrations
                 WHERE user_id = ?1 ORDER BY provider ASC"
            ))?;
            let rows = stmt.query_map(params![user_id], integration_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert or replace the integration for `(user_id, provider)`.
///
/// On conflict the existing row keeps its id and `created_at`; config,
/// enabled flag and `updated_at` are replaced.
pub async fn upsert_integration(
    db: &Database,
    integration: &Integration,
) -> Result<Integration, LeadlineError> {
    let integration = integration.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO integrations (id, user_id, provider, config, enabled, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT (user_id, provider) DO UPDATE SET
                     config = excluded.config,
                     enabled = excluded.enabled,
                     updated_at = excluded.updated_at",
                params![
                    integration.id,
                    integration.user_id,
                    integration.provider,
                    metadata_to_sql(&integration.config),
                    integration.enabled,
                    ts_to_sql(&integration.created_at),
                    ts_to_sql(&integration.updated_at),
                ],
            )?;
            conn.query_row(
                &format!(
                    "SELECT {INTEGRATION_COLUMNS} FROM integrations
                     WHERE user_id = ?1 AND provider = ?2"
                ),
                params![integration.user_id, integration.provider],
                integration_from_row,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::users::insert_user;
    use crate::test_support::{at, open_db, user};

    fn integration(id: &str, provider: &str, enabled: bool) -> Integration {
        let mut config = leadline_core::types::Metadata::new();
        config.insert("phoneNumberId".into(), serde_json::json!("1098"));
        Integration {
            id: id.to_string(),
            user_id: "u-1".to_string(),
            provider: provider.to_string(),
            config,
            enabled,
            created_at: at(9, 0),
            updated_at: at(9, 0),
        }
    }

    #[tokio::test]
    async fn upsert_keeps_id_and_replaces_config() {
        let (db, _dir) = open_db().await;
        insert_user(&db, &user("u-1")).await.unwrap();

        let first = upsert_integration(&db, &integration("i-1", "whatsapp", true))
            .await
            .unwrap();
        assert_eq!(first.id, "i-1");

        let mut second = integration("i-2", "whatsapp", false);
        second.updated_at = at(10, 0);
        let stored = upsert_integration(&db, &second).await.unwrap();
        assert_eq!(stored.id, "i-1");
        assert!(!stored.enabled);
        assert_eq!(stored.created_at, at(9, 0));
        assert_eq!(stored.updated_at, at(10, 0));

        let all = list_integrations(&db, "u-1").await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn list_is_scoped_to_user_and_sorted() {
        let (db, _dir) = open_db().await;
        insert_user(&db, &user("u-1")).await.unwrap();
        upsert_integration(&db, &integration("i-1", "whatsapp", true))
            .await
            .unwrap();
        upsert_integration(&db, &integration("i-2", "calendar", true))
            .await
            .unwrap();

        let all = list_integrations(&db, "u-1").await.unwrap();
        let providers: Vec<_> = all.iter().map(|i| i.provider.as_str()).collect();
        assert_eq!(providers, vec!["calendar", "whatsapp"]);
        assert!(list_integrations(&db, "u-2").await.unwrap().is_empty());
    }
}
