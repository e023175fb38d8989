// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Users and per-user provider integrations.

use std::sync::Arc;

use tracing::info;

use leadline_core::types::{Integration, Metadata, User};
use leadline_core::{Clock, IntegrationStore, LeadlineError, UserStore};

/// Providers an integration row may be stored for.
pub const KNOWN_PROVIDERS: &[&str] = &["whatsapp", "n8n", "webhook"];

pub struct AccountService {
    users: Arc<dyn UserStore>,
    integrations: Arc<dyn IntegrationStore>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore>,
        integrations: Arc<dyn IntegrationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            integrations,
            clock,
        }
    }

    /// Register a dashboard user. The email is trimmed and lowercased.
    pub async fn create_user(&self, email: &str, name: Option<&str>) -> Result<User, LeadlineError> {
        let email = email.trim().to_lowercase();
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !well_formed {
            return Err(LeadlineError::Validation(format!(
                "invalid email address: {email:?}"
            )));
        }
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            name: name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string),
            created_at: self.clock.now(),
        };
        self.users.insert_user(&user).await?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    pub async fn user(&self, id: &str) -> Result<User, LeadlineError> {
        self.users
            .get_user(id)
            .await?
            .ok_or_else(|| LeadlineError::NotFound {
                resource: "user",
                id: id.to_string(),
            })
    }

    pub async fn integrations(&self, owner: &str) -> Result<Vec<Integration>, LeadlineError> {
        self.integrations.list_integrations(owner).await
    }

    /// Create or replace the integration of `owner` for `provider`.
    pub async fn upsert_integration(
        &self,
        owner: &str,
        provider: &str,
        config: Metadata,
        enabled: bool,
    ) -> Result<Integration, LeadlineError> {
        let provider = provider.trim().to_lowercase();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(LeadlineError::Validation(format!(
                "unknown provider {provider:?}, expected one of: {}",
                KNOWN_PROVIDERS.join(", ")
            )));
        }
        let now = self.clock.now();
        let integration = Integration {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: owner.to_string(),
            provider,
            config,
            enabled,
            created_at: now,
            updated_at: now,
        };
        self.integrations.upsert_integration(&integration).await
    }
}
