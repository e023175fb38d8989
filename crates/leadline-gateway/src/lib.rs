// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Leadline.
//!
//! Exposes the dashboard REST API (bearer-token protected, scoped to the
//! user named in `X-User-Id`) and the public inbound webhook consumed by the
//! automation system.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod webhook;

pub use auth::{AuthConfig, OwnerId, USER_ID_HEADER};
pub use error::{ApiError, ErrorResponse};
pub use server::{GatewayConfig, GatewayState, build_router, start_server};
