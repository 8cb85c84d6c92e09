//! Stateless bearer tokens for authenticated sessions.
//!
//! A token is `base64url(payload).base64url(tag)` where the payload is the
//! JSON-encoded identity and the tag is an HMAC-SHA256 over the payload
//! bytes, keyed by server configuration. Nothing is stored server-side:
//! a token is valid iff it decodes, its signature verifies, and the
//! required identity fields are present. The token itself carries no
//! expiry; the transport that holds it may impose one.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use hmac::{Hmac, Mac};
use roadworks_core::user::Identity;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Encodes identities into signed bearer tokens and back.
#[derive(Clone)]
pub struct SessionCodec {
  key: Vec<u8>,
}

impl SessionCodec {
  pub fn new(key: impl AsRef<[u8]>) -> Self {
    Self { key: key.as_ref().to_vec() }
  }

  fn mac(&self) -> HmacSha256 {
    HmacSha256::new_from_slice(&self.key)
      .expect("HMAC can take key of any size")
  }

  /// Deterministically encode `identity` into a signed token.
  pub fn encode(&self, identity: &Identity) -> String {
    let payload = serde_json::json!({
      "user_id": identity.user_id,
      "email":   identity.email,
      "name":    identity.name,
      "role":    identity.role,
    })
    .to_string();

    let mut mac = self.mac();
    mac.update(payload.as_bytes());
    let tag = mac.finalize().into_bytes();

    format!("{}.{}", B64.encode(&payload), B64.encode(tag))
  }

  /// Decode and verify a token.
  ///
  /// Fails closed: malformed base64, a bad or missing signature, JSON that
  /// does not carry all four identity fields, or hollow values (nil id,
  /// empty email or name) all come back as `None`. Never panics, never
  /// surfaces an error.
  pub fn decode(&self, token: &str) -> Option<Identity> {
    let (payload_b64, tag_b64) = token.split_once('.')?;
    let payload = B64.decode(payload_b64).ok()?;
    let tag = B64.decode(tag_b64).ok()?;

    let mut mac = self.mac();
    mac.update(&payload);
    mac.verify_slice(&tag).ok()?;

    let identity: Identity = serde_json::from_slice(&payload).ok()?;
    if identity.user_id.is_nil()
      || identity.email.is_empty()
      || identity.name.is_empty()
    {
      return None;
    }
    Some(identity)
  }
}
