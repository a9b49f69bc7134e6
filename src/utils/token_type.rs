use crate::constants::warehouse::{TOKEN_TYPE_KEYPAIR_JWT, TOKEN_TYPE_OAUTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    KeypairJwt,
    Oauth,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::KeypairJwt => TOKEN_TYPE_KEYPAIR_JWT,
            TokenType::Oauth => TOKEN_TYPE_OAUTH,
        }
    }
}

/// A token with exactly three dot-separated segments is treated as a signed
/// key-pair JWT; anything else is an OAuth access token.
pub fn detect_token_type(token: &str) -> TokenType {
    let token = strip_bearer(token);
    if token.split('.').count() == 3 {
        TokenType::KeypairJwt
    } else {
        TokenType::Oauth
    }
}

/// Token portion of a `Bearer` authorization value, or `None` for other schemes.
pub fn bearer_token(auth_header: &str) -> Option<&str> {
    let trimmed = auth_header.trim();
    let (scheme, rest) = trimmed.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(rest.trim())
    } else {
        None
    }
}

fn strip_bearer(token: &str) -> &str {
    bearer_token(token).unwrap_or_else(|| token.trim())
}
