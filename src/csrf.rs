//! Signed, stateless CSRF tokens for the vote form.
//!
//! A token has the form `<issued_unix>.<hex hmac-sha256>` and is bound to a
//! single question.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Seconds a token stays valid after issue.
pub const TOKEN_TTL_SECS: i64 = 12 * 60 * 60;

#[allow(clippy::expect_used)] // HMAC accepts any key size, this cannot fail
fn mac_for(secret: &str, question_id: i64, issued: i64) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(format!("vote:{question_id}:{issued}").as_bytes());
    mac
}

pub fn issue(secret: &str, question_id: i64, now: DateTime<Utc>) -> String {
    let issued = now.timestamp();
    let signature = mac_for(secret, question_id, issued).finalize().into_bytes();
    format!("{issued}.{}", hex::encode(signature))
}

pub fn verify(secret: &str, question_id: i64, token: &str, now: DateTime<Utc>) -> bool {
    let Some((issued, signature)) = token.split_once('.') else {
        return false;
    };
    let Ok(issued) = issued.parse::<i64>() else {
        return false;
    };
    let Ok(signature) = hex::decode(signature) else {
        return false;
    };

    let age = now.timestamp() - issued;
    if age < 0 || age > TOKEN_TTL_SECS {
        return false;
    }

    mac_for(secret, question_id, issued)
        .verify_slice(&signature)
        .is_ok()
}
