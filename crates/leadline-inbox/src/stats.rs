// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard counters over a reconciled conversation list.

use std::collections::BTreeMap;

use serde::Serialize;

use leadline_core::{Conversation, ConversationStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStats {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
    pub closed: usize,
    /// Mean lead score; 0 for an empty list.
    pub average_score: f64,
    pub by_channel: BTreeMap<String, usize>,
}

pub fn compute_stats(conversations: &[Conversation]) -> ConversationStats {
    let mut stats = ConversationStats {
        total: conversations.len(),
        active: 0,
        pending: 0,
        closed: 0,
        average_score: 0.0,
        by_channel: BTreeMap::new(),
    };
    let mut score_sum: i64 = 0;
    for c in conversations {
        match c.status {
            ConversationStatus::Active => stats.active += 1,
            ConversationStatus::Pending => stats.pending += 1,
            ConversationStatus::Closed => stats.closed += 1,
        }
        score_sum += c.lead_score;
        *stats.by_channel.entry(c.channel.clone()).or_default() += 1;
    }
    if !conversations.is_empty() {
        stats.average_score = score_sum as f64 / conversations.len() as f64;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadline_test_utils::fixtures::conversation;

    fn with(channel: &str, status: ConversationStatus, score: i64) -> Conversation {
        let mut c = conversation("c", "u-1");
        c.channel = channel.to_string();
        c.status = status;
        c.lead_score = score;
        c
    }

    #[test]
    fn empty_list_has_zero_average() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_score, 0.0);
        assert!(!stats.average_score.is_nan());
        assert!(stats.by_channel.is_empty());
    }

    #[test]
    fn counts_channels() {
        let stats = compute_stats(&[
            with("whatsapp", ConversationStatus::Active, 0),
            with("whatsapp", ConversationStatus::Active, 0),
            with("web", ConversationStatus::Active, 0),
        ]);
        let expected = BTreeMap::from([("whatsapp".to_string(), 2), ("web".to_string(), 1)]);
        assert_eq!(stats.by_channel, expected);
    }

    #[test]
    fn counts_statuses_and_averages_scores() {
        let stats = compute_stats(&[
            with("whatsapp", ConversationStatus::Active, 90),
            with("whatsapp", ConversationStatus::Pending, 40),
            with("web", ConversationStatus::Closed, 20),
            with("web", ConversationStatus::Closed, 50),
        ]);
        assert_eq!(stats.total, 4);
        assert_eq!((stats.active, stats.pending, stats.closed), (1, 1, 2));
        assert_eq!(stats.average_score, 50.0);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(compute_stats(&[])).unwrap();
        assert_eq!(json["averageScore"], 0.0);
        assert!(json["byChannel"].is_object());
    }
}
