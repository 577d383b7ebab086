/// JWT validation using JWKS
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Claims carried by an admin's bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Email address of the admin
    pub email: String,

    #[serde(default)]
    pub name: String,

    /// Subject (user ID)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: usize,

    #[serde(default)]
    pub iat: usize,

    pub iss: String,
}

#[derive(Debug, Deserialize)]
pub struct JwksKey {
    pub kty: String,
    pub kid: String,
    pub n: String,
    pub e: String,
}

#[derive(Debug, Deserialize)]
pub struct Jwks {
    pub keys: Vec<JwksKey>,
}

/// Verifies RS256 tokens against a fixed key set
pub struct JwtValidator {
    /// JWKS keys mapped by kid
    keys: HashMap<String, DecodingKey>,
}

impl JwtValidator {
    /// Create a new JWT validator from JWKS JSON
    pub fn new(jwks_json: &str) -> Result<Self, String> {
        let jwks: Jwks =
            serde_json::from_str(jwks_json).map_err(|e| format!("Invalid JWKS JSON: {}", e))?;

        let mut keys = HashMap::new();

        for key in jwks.keys.into_iter().filter(|k| k.kty == "RSA") {
            let decoding_key = DecodingKey::from_rsa_components(&key.n, &key.e)
                .map_err(|e| format!("Failed to create decoding key: {}", e))?;
            keys.insert(key.kid, decoding_key);
        }

        if keys.is_empty() {
            return Err("No valid RSA keys found in JWKS".to_string());
        }

        Ok(Self { keys })
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Validates signature, expiry and issuer, returning the claims
    pub fn validate(&self, token: &str, expected_issuer: &str) -> Result<Claims, String> {
        let header =
            decode_header(token).map_err(|e| format!("Failed to decode JWT header: {}", e))?;

        let kid = header
            .kid
            .ok_or_else(|| "JWT header missing 'kid' field".to_string())?;

        let decoding_key = self
            .keys
            .get(&kid)
            .ok_or_else(|| format!("No JWKS key found for kid: {}", kid))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        if !expected_issuer.is_empty() {
            validation.set_issuer(&[expected_issuer]);
        }

        let token_data = decode::<Claims>(token, decoding_key, &validation)
            .map_err(|e| format!("Failed to validate JWT: {}", e))?;

        Ok(token_data.claims)
    }

    /// Extract JWT token from Authorization header
    pub fn extract_token(auth_header: Option<&str>) -> Result<String, String> {
        let auth_header = auth_header.ok_or_else(|| "Missing Authorization header".to_string())?;

        auth_header
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .ok_or_else(|| "Authorization header must start with 'Bearer '".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_JWKS: &str = r#"{"keys":[
        {"kty":"RSA","kid":"admin","n":"AQAB","e":"AQAB"},
        {"kty":"EC","kid":"ignored","n":"","e":""}
    ]}"#;

    #[test]
    fn test_extract_token() {
        let token = JwtValidator::extract_token(Some("Bearer abc123")).unwrap();
        assert_eq!(token, "abc123");

        let result = JwtValidator::extract_token(Some("abc123"));
        assert!(result.is_err());

        let result = JwtValidator::extract_token(None);
        assert!(result.is_err());
    }

    #[test]
    fn test_loads_only_rsa_keys() {
        let validator = JwtValidator::new(TEST_JWKS).unwrap();
        assert_eq!(validator.key_count(), 1);
    }

    #[test]
    fn test_rejects_empty_key_set() {
        assert!(JwtValidator::new(r#"{"keys":[]}"#).is_err());
        assert!(JwtValidator::new("not json").is_err());
    }

    #[test]
    fn test_rejects_malformed_token() {
        let validator = JwtValidator::new(TEST_JWKS).unwrap();
        let err = validator.validate("not.a.token", "issuer").unwrap_err();
        assert!(err.starts_with("Failed to decode JWT header"), "{}", err);
    }
}
