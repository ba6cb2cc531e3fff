// src/token.rs
//! Bearer-token payload decoding for role routing.
//!
//! After an OAuth redirect the client only has the raw token; the role
//! embedded in its claims decides which dashboard (and which API prefix) to
//! route to. Signature verification is the backend's job, not ours, so the
//! decode here deliberately skips it.

use anyhow::{Context, Result};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::types::UserRole;

/// Claims the backend embeds in its access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    /// "admin", "trainer" or "customer".
    pub role: String,
    #[serde(default)]
    pub exp: Option<usize>,
}

/// Decode a token's claims without verifying its signature.
pub fn decode_claims(token: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .context("Failed to decode bearer token payload")?;
    Ok(data.claims)
}

/// Extract the role a token routes to.
pub fn decode_role(token: &str) -> Result<UserRole> {
    let claims = decode_claims(token)?;
    claims
        .role
        .parse::<UserRole>()
        .map_err(|e| anyhow::anyhow!("Token carries an {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn make_token(email: &str, role: &str) -> String {
        let claims = Claims {
            email: email.to_string(),
            role: role.to_string(),
            exp: Some(4102444800), // far future
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_claims_without_key() {
        // Signed with a secret we never hand to the decoder.
        let token = make_token("trainer@example.com", "trainer");
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.email, "trainer@example.com");
        assert_eq!(claims.role, "trainer");
    }

    #[test]
    fn test_decode_role_maps_customer_to_client() {
        let token = make_token("c@example.com", "customer");
        assert_eq!(decode_role(&token).unwrap(), UserRole::Client);
    }

    #[test]
    fn test_garbage_token_fails() {
        assert!(decode_claims("not-a-jwt").is_err());
    }

    #[test]
    fn test_unknown_role_fails() {
        let token = make_token("x@example.com", "superuser");
        assert!(decode_role(&token).is_err());
    }
}
