use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Validates `Authorization: Bearer <key>` or `X-API-Key: <key>` against the
/// configured keys. Each key belongs to one collector.
pub struct ApiKeyAuthenticator {
    keys: Vec<(String, String)>,
}

impl ApiKeyAuthenticator {
    /// `keys` yields `(key, user_id)` pairs.
    pub fn new(keys: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    fn extract_key(request: &AuthRequest) -> Option<&str> {
        if let Some(header) = request.headers.get("authorization") {
            let token = header
                .strip_prefix("Bearer ")
                .or_else(|| header.strip_prefix("bearer "));
            if token.is_some() {
                return token;
            }
        }
        request.headers.get("x-api-key").map(String::as_str)
    }
}

#[async_trait]
impl Authenticator for ApiKeyAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let provided = Self::extract_key(request).ok_or(AuthError::NotAuthenticated)?;

        // Compare against every key so timing does not reveal which one matched.
        let mut matched: Option<&str> = None;
        for (key, user) in &self.keys {
            if constant_time_eq(provided.as_bytes(), key.as_bytes()) && matched.is_none() {
                matched = Some(user);
            }
        }

        match matched {
            Some(user) => Ok(Identity {
                user_id: user.to_string(),
                method: "api_key".to_string(),
            }),
            None => Err(AuthError::InvalidCredentials("Invalid API key".to_string())),
        }
    }

    fn method_name(&self) -> &'static str {
        "api_key"
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
