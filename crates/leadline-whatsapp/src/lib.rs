// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Business integration for Leadline.
//!
//! Delivery is mocked: [`MockWhatsAppSender`] acknowledges every well-formed
//! send with a generated message id and performs no network I/O. The
//! customer-service window, opt-in/opt-out acknowledgments and webhook
//! signature verification are real.

pub mod compliance;
pub mod sender;
pub mod signature;

pub use compliance::{OptStatus, ServiceWindow, opt_in, opt_out};
pub use sender::MockWhatsAppSender;
pub use signature::{SIGNATURE_HEADER, sign_payload, verify_signature};
