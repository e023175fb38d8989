// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `X-Hub-Signature-256` verification for inbound webhooks.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Header carrying `sha256=<hex hmac>` of the raw request body.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

type HmacSha256 = Hmac<Sha256>;

/// Check `header` against the HMAC-SHA256 of `body` keyed with `secret`.
///
/// The `sha256=` prefix is optional. Comparison is constant-time.
pub fn verify_signature(secret: &str, header: Option<&str>, body: &[u8]) -> bool {
    let signature = header.unwrap_or("").trim();
    let signature = signature.strip_prefix("sha256=").unwrap_or(signature).trim();
    if signature.is_empty() {
        return false;
    }
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Produce the header value a sender would attach to `body`.
pub fn sign_payload(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"senderIdentifier":"5215550001","content":"hola"}"#;

    #[test]
    fn signed_body_verifies() {
        let header = sign_payload("s3cret", BODY).unwrap();
        assert!(header.starts_with("sha256="));
        assert!(verify_signature("s3cret", Some(&header), BODY));
        let bare = header.trim_start_matches("sha256=");
        assert!(verify_signature("s3cret", Some(bare), BODY));
    }

    #[test]
    fn tampered_or_missing_signature_fails() {
        let header = sign_payload("s3cret", BODY).unwrap();
        assert!(!verify_signature("other", Some(&header), BODY));
        assert!(!verify_signature("s3cret", Some(&header), b"{}"));
        assert!(!verify_signature("s3cret", None, BODY));
        assert!(!verify_signature("s3cret", Some("sha256=zz"), BODY));
    }
}
