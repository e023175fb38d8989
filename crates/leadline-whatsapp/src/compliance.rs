// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging-policy checks: the customer-service window and opt-in state.
//!
//! WhatsApp only allows free-form replies within a fixed window after the
//! lead's last inbound message. Outside it, a pre-approved template is required.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use leadline_core::LeadlineError;

/// Customer-service window measured from the last inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceWindow {
    length: Duration,
}

impl ServiceWindow {
    pub fn from_hours(hours: u32) -> Self {
        Self {
            length: Duration::hours(i64::from(hours)),
        }
    }

    /// Whether a free-form message may be sent at `now`.
    ///
    /// A lead that never wrote to us has no open window.
    pub fn is_open(&self, last_inbound_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_inbound_at {
            Some(at) => now - at <= self.length,
            None => false,
        }
    }

    /// Reject free-form sends outside the window. Template sends always pass.
    pub fn check_send(
        &self,
        last_inbound_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        template_id: Option<&str>,
    ) -> Result<(), LeadlineError> {
        if template_id.is_some_and(|t| !t.trim().is_empty()) || self.is_open(last_inbound_at, now) {
            return Ok(());
        }
        Err(LeadlineError::Validation(format!(
            "outside the {}-hour service window: a template id is required",
            self.length.num_hours()
        )))
    }
}

impl Default for ServiceWindow {
    fn default() -> Self {
        Self::from_hours(24)
    }
}

/// Acknowledgment returned by the opt-in and opt-out endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptStatus {
    pub success: bool,
    pub phone: String,
    pub opted_in: bool,
}

/// Record that `phone` agreed to receive messages.
///
/// Consent is not persisted; the acknowledgment is static.
pub fn opt_in(phone: &str) -> Result<OptStatus, LeadlineError> {
    opt_status(phone, true)
}

/// Record that `phone` withdrew consent. Static acknowledgment, like [`opt_in`].
pub fn opt_out(phone: &str) -> Result<OptStatus, LeadlineError> {
    opt_status(phone, false)
}

fn opt_status(phone: &str, opted_in: bool) -> Result<OptStatus, LeadlineError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(LeadlineError::Validation("phone is required".into()));
    }
    Ok(OptStatus {
        success: true,
        phone: phone.to_string(),
        opted_in,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn window_open_within_24_hours() {
        let w = ServiceWindow::default();
        assert!(w.is_open(Some(t(0)), t(23)));
        assert!(w.is_open(Some(t(0)), t(0) + Duration::hours(24)));
        assert!(!w.is_open(Some(t(0)), t(0) + Duration::hours(25)));
        assert!(!w.is_open(None, t(0)));
    }

    #[test]
    fn free_form_outside_window_requires_template() {
        let w = ServiceWindow::from_hours(24);
        let late = t(0) + Duration::hours(30);
        let err = w.check_send(Some(t(0)), late, None).unwrap_err();
        assert!(err.to_string().contains("template"));
        assert!(w.check_send(Some(t(0)), late, Some("reengage_v1")).is_ok());
        assert!(w.check_send(Some(t(0)), late, Some("  ")).is_err());
        assert!(w.check_send(Some(t(0)), t(5), None).is_ok());
    }

    #[test]
    fn opt_in_and_out_are_static_acknowledgments() {
        let json = serde_json::to_value(opt_in(" +5215550001 ").unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "phone": "+5215550001", "optedIn": true})
        );
        assert!(!opt_out("+5215550001").unwrap().opted_in);
        assert!(opt_in("").is_err());
    }
}
