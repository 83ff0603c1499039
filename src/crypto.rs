// MIT License - Copyright (c) 2026 Peter Wright

use md5::{Digest, Md5};

/// Compute the `clogin` token: lowercase hex MD5 over `username || password || nonce`.
///
/// The nonce is the 8 hex digits taken from the `100 HELLO` greeting.
pub fn login_token(username: &str, password: &str, nonce: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(username.as_bytes());
    hasher.update(password.as_bytes());
    hasher.update(nonce.as_bytes());
    hex::encode(hasher.finalize())
}
