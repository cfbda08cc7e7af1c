//! Deliberately invalid credentials for the 401 preparator

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use apiprobe_core::{AuthType, Token};

type HmacSha256 = Hmac<Sha256>;

const BASIC_USER: &str = "aaaa";
const BASIC_PASSWORD: &str = "bbbbb";
const API_KEY: &str = "aaaaaaaaaaaaaaaaaaaa";
const SIGNING_KEY: &[u8] = b"apiprobe-invalid-signing-key";

/// `base64("aaaa:bbbbb")`, ready for an `Authorization: Basic` header.
#[must_use]
pub fn invalid_basic() -> String {
    STANDARD.encode(format!("{BASIC_USER}:{BASIC_PASSWORD}"))
}

/// A well-formed HS256 JWT signed with a key no server knows.
#[must_use]
pub fn invalid_jwt() -> String {
    let header = json!({"alg": "HS256", "typ": "JWT"});
    let claims = json!({"iat": 1_516_239_022, "name": "Invalid Token", "sub": "apiprobe"});
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    );

    match HmacSha256::new_from_slice(SIGNING_KEY) {
        Ok(mut mac) => {
            mac.update(signing_input.as_bytes());
            let signature = mac.finalize().into_bytes();
            format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature))
        }
        Err(_) => format!("{signing_input}."),
    }
}

#[must_use]
pub fn invalid_api_key() -> String {
    API_KEY.to_string()
}

/// One invalid token per authentication type.
#[must_use]
pub fn invalid_tokens() -> Vec<Token> {
    vec![
        Token::new("invalid_basic", AuthType::HttpBasic, invalid_basic()),
        Token::new("invalid_bearer", AuthType::HttpBearer, invalid_jwt()),
        Token::new("invalid_oauth2", AuthType::OAuth2, invalid_jwt()),
        Token::new("invalid_api_key", AuthType::ApiKey, invalid_api_key()),
    ]
}
