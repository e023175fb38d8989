// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User CRUD operations.

use leadline_core::LeadlineError;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::models::{User, ts_to_sql, user_from_row};

/// Insert a new user.
pub async fn insert_user(db: &Database, user: &User) -> Result<(), LeadlineError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (id, email, name, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![user.id, user.email, user.name, ts_to_sql(&user.created_at)],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a user by id.
pub async fn get_user(db: &Database, id: &str) -> Result<Option<User>, LeadlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, email, name, created_at FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{open_db, user};

    #[tokio::test]
    async fn insert_and_get_user() {
        let (db, _dir) = open_db().await;
        let u = user("u-1");
        insert_user(&db, &u).await.unwrap();

        let fetched = get_user(&db, "u-1").await.unwrap().unwrap();
        assert_eq!(fetched, u);
        assert!(get_user(&db, "u-missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (db, _dir) = open_db().await;
        insert_user(&db, &user("u-1")).await.unwrap();
        let mut dup = user("u-2");
        dup.email = "u-1@example.com".to_string();
        assert!(insert_user(&db, &dup).await.is_err());
    }
}
