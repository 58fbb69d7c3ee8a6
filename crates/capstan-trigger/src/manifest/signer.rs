//! Manifest signing and verification.
//!
//! The signature is an HMAC-SHA256 over the concatenated non-signature
//! documents of the manifest text, hex-encoded, and carried inside the
//! manifest itself as a `kind: signature` document. Signing over the raw
//! text (rather than the parsed model) keeps the check independent of
//! serialization details; excluding the signature document lets it be
//! appended or moved without invalidating itself.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex signature for a manifest text.
pub fn sign(data: &str, secret: &str) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        // HMAC accepts keys of any length; unreachable for SHA-256.
        Err(_) => return String::new(),
    };
    mac.update(payload(data).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify the signature embedded in a manifest text.
///
/// A missing or malformed signature document yields `false`, never an
/// error: an unsigned manifest on a protected repository is an expected
/// condition that demotes stages to blocked.
pub fn verify(data: &str, secret: &str) -> bool {
    let signature = match extract_signature(data) {
        Some(signature) => signature,
        None => return false,
    };
    let expected = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload(data).as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// The signable portion of the text: every document except signatures,
/// concatenated in order. Trailing whitespace is normalized per document
/// so appending the signature block cannot perturb the digest.
fn payload(data: &str) -> String {
    let mut out = String::new();
    for document in split_documents(data) {
        if is_signature(&document) {
            continue;
        }
        out.push_str(document.trim_end());
        out.push('\n');
    }
    out
}

/// The `hmac` value of the first signature document, if present.
fn extract_signature(data: &str) -> Option<String> {
    split_documents(data)
        .into_iter()
        .find(|document| is_signature(document))
        .and_then(|document| {
            let value: serde_yaml::Value = serde_yaml::from_str(&document).ok()?;
            Some(value.get("hmac")?.as_str()?.to_string())
        })
}

fn is_signature(document: &str) -> bool {
    let value: serde_yaml::Value = match serde_yaml::from_str(document) {
        Ok(value) => value,
        Err(_) => return false,
    };
    value.get("kind").and_then(serde_yaml::Value::as_str) == Some("signature")
}

/// Split raw text on `---` separator lines. Blank documents are dropped.
fn split_documents(data: &str) -> Vec<String> {
    let mut documents = Vec::new();
    let mut current = String::new();
    for line in data.lines() {
        if line.trim_end() == "---" {
            if !current.trim().is_empty() {
                documents.push(std::mem::take(&mut current));
            }
            current.clear();
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    if !current.trim().is_empty() {
        documents.push(current);
    }
    documents
}

/// Append a signature document to a manifest text. Primarily a convenience
/// for tooling that signs manifests before commit.
pub fn sign_manifest(data: &str, secret: &str) -> String {
    let hmac = sign(data, secret);
    format!("{data}\n---\nkind: signature\nhmac: {hmac}\n")
}
