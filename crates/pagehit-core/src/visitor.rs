use sha2::{Digest, Sha256};

use crate::request::HitRequest;

/// Compute the visitor fingerprint for a request.
///
/// Formula: sha256(salt, user_agent, client_ip) hex encoded as 64 chars, with
/// the inputs length-prefixed so that shifting bytes between them cannot
/// produce the same digest.
///
/// The salt must stay the same across calls for visits to be attributed to the
/// same visitor. Rotating it starts a new set of visitor identities.
pub fn fingerprint(request: &HitRequest<'_>, salt: &str) -> String {
    fingerprint_parts(salt, &request.user_agent(), &request.client_ip())
}

fn fingerprint_parts(salt: &str, user_agent: &str, client_ip: &str) -> String {
    let mut hasher = Sha256::new();
    for part in [salt, user_agent, client_ip] {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}
