// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Leadline tests.
//!
//! Provides in-memory and scripted adapters for fast, deterministic,
//! CI-runnable tests without a database.
//!
//! # Components
//!
//! - [`MemoryStore`] - In-memory conversation, user and integration store
//! - [`ScriptedLegacySource`] - Legacy chat-history rows, optionally failing or slow
//! - [`RecordingSender`] - Outbound sender that captures every send
//! - [`FixedClock`] - Manually advanced clock
//! - [`fixtures`] - Builders for domain values

pub mod clock;
pub mod fixtures;
pub mod mock_legacy;
pub mod mock_sender;
pub mod mock_store;

pub use clock::FixedClock;
pub use mock_legacy::ScriptedLegacySource;
pub use mock_sender::RecordingSender;
pub use mock_store::MemoryStore;
