use serde::{Deserialize, Serialize};

/// JWT payload used for authentication.
///
/// Validity is entirely carried by the signature and `exp`; nothing is
/// stored server-side and there is no revocation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,    // user ID
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
    pub iss: String, // issuer
    pub aud: String, // audience
}
