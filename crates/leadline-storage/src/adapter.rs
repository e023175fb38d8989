// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementations of the storage and legacy-source traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use leadline_config::model::{LegacyConfig, StorageConfig};
use leadline_config::validation::is_sql_identifier;
use leadline_core::types::{Integration, LegacyChatRecord, LegacySession, User};
use leadline_core::{
    AdapterType, Conversation, ConversationStore, HealthStatus, IntegrationStore, LeadlineError,
    LegacyChatSource, Message, PluginAdapter, StorageAdapter, UserStore,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, LeadlineError> {
        self.db.get().ok_or_else(|| LeadlineError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(db: &Database) -> Result<(), LeadlineError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadlineError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadlineError> {
        if let Some(db) = self.db.get() {
            Self::checkpoint(db).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), LeadlineError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| LeadlineError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), LeadlineError> {
        Self::checkpoint(self.db()?).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for SqliteStorage {
    async fn insert_conversation(&self, conversation: &Conversation) -> Result<(), LeadlineError> {
        queries::conversations::insert_conversation(self.db()?, conversation).await
    }

    async fn get_conversation(
        &self,
        owner_user_id: &str,
        id: &str,
    ) -> Result<Option<Conversation>, LeadlineError> {
        queries::conversations::get_conversation(self.db()?, owner_user_id, id).await
    }

    async fn list_conversations(
        &self,
        owner_user_id: &str,
    ) -> Result<Vec<Conversation>, LeadlineError> {
        queries::conversations::list_conversations(self.db()?, owner_user_id).await
    }

    async fn update_conversation(&self, conversation: &Conversation) -> Result<(), LeadlineError> {
        match queries::conversations::update_conversation(self.db()?, conversation).await? {
            0 => Err(LeadlineError::conversation_not_found(&conversation.id)),
            _ => Ok(()),
        }
    }

    async fn delete_conversation(
        &self,
        owner_user_id: &str,
        id: &str,
    ) -> Result<bool, LeadlineError> {
        queries::conversations::delete_conversation(self.db()?, owner_user_id, id).await
    }

    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>, LeadlineError> {
        queries::messages::list_messages(self.db()?, conversation_id).await
    }

    async fn append_message(&self, message: &Message) -> Result<(), LeadlineError> {
        queries::messages::append_message(self.db()?, message).await
    }

    async fn find_or_create_with_message(
        &self,
        draft: &Conversation,
        message: &Message,
    ) -> Result<(Conversation, Message, bool), LeadlineError> {
        queries::conversations::find_or_create_with_message(self.db()?, draft, message).await
    }
}

#[async_trait]
impl UserStore for SqliteStorage {
    async fn insert_user(&self, user: &User) -> Result<(), LeadlineError> {
        queries::users::insert_user(self.db()?, user).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, LeadlineError> {
        queries::users::get_user(self.db()?, id).await
    }
}

#[async_trait]
impl IntegrationStore for SqliteStorage {
    async fn list_integrations(&self, user_id: &str) -> Result<Vec<Integration>, LeadlineError> {
        queries::integrations::list_integrations(self.db()?, user_id).await
    }

    async fn upsert_integration(
        &self,
        integration: &Integration,
    ) -> Result<Integration, LeadlineError> {
        queries::integrations::upsert_integration(self.db()?, integration).await
    }
}

/// Reader for the legacy chat-history table living in the same SQLite file.
///
/// Uses its own read-only connection so a slow legacy scan never queues
/// behind (or ahead of) native writes.
pub struct SqliteLegacySource {
    db: Database,
    table: String,
}

impl SqliteLegacySource {
    /// Open a read-only connection to `database_path` for the configured table.
    pub async fn open(database_path: &str, config: &LegacyConfig) -> Result<Self, LeadlineError> {
        let db = Database::open_read_only(database_path).await?;
        Self::from_database(db, &config.table_name)
    }

    /// Build a source over an existing handle.
    pub fn from_database(db: Database, table_name: &str) -> Result<Self, LeadlineError> {
        if !is_sql_identifier(table_name) {
            return Err(LeadlineError::Config(format!(
                "legacy table name `{table_name}` is not a plain SQL identifier"
            )));
        }
        Ok(Self {
            db,
            table: table_name.to_string(),
        })
    }

    /// The table this source reads.
    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl PluginAdapter for SqliteLegacySource {
    fn name(&self) -> &str {
        "sqlite-legacy"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::LegacySource
    }

    /// Degraded (not unhealthy) when the table is absent: conversation
    /// lists still work, they just carry no legacy sessions.
    async fn health_check(&self) -> Result<HealthStatus, LeadlineError> {
        let table = self.table.clone();
        let exists = self
            .db
            .connection()
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [&table],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        if exists {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(format!(
                "legacy table `{}` not found",
                self.table
            )))
        }
    }

    async fn shutdown(&self) -> Result<(), LeadlineError> {
        Ok(())
    }
}

#[async_trait]
impl LegacyChatSource for SqliteLegacySource {
    async fn list_sessions(&self) -> Result<Vec<LegacySession>, LeadlineError> {
        queries::legacy::list_sessions(&self.db, &self.table).await
    }

    async fn session_records(
        &self,
        session_id: &str,
    ) -> Result<Vec<LegacyChatRecord>, LeadlineError> {
        queries::legacy::session_records(&self.db, &self.table, session_id).await
    }
}
