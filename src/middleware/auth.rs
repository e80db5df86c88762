use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{validate_token, Claims, Identity, Role};
use crate::error::ApiError;

/// Authenticated user context extracted from the session token. The role is
/// narrowed from the free-form claim here, once per request; an unknown tag
/// leaves the user authenticated but un-roled.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Option<Role>,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role.as_deref().and_then(|tag| tag.parse().ok()),
        }
    }
}

impl CurrentUser {
    pub fn identity(&self) -> Identity {
        Identity { user_id: self.user_id, email: self.email.clone(), role: self.role }
    }
}

/// Session-token middleware: validates the bearer token when one is
/// presented and injects the user context. A request with no Authorization
/// header passes through anonymously so the downstream gate can choose
/// between a 401 and a login redirect; a presented-but-invalid token is
/// rejected here.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Ok(token) = extract_bearer_token(&headers) {
        let claims = validate_token(&token)?;
        request.extensions_mut().insert(CurrentUser::from(claims));
    }

    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty session token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert!(extract_bearer_token(&HeaderMap::new()).is_err());
        assert!(extract_bearer_token(&headers_with("Basic dXNlcg==")).is_err());
        assert!(extract_bearer_token(&headers_with("Bearer   ")).is_err());
    }

    #[test]
    fn unknown_role_claim_degrades_to_unroled() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "x@suq.example.com".to_string(),
            role: Some("owner".to_string()),
            exp: 0,
            iat: 0,
        };
        let user = CurrentUser::from(claims);
        assert_eq!(user.role, None);
    }

    #[test]
    fn known_role_claim_parses() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "x@suq.example.com".to_string(),
            role: Some("trainer".to_string()),
            exp: 0,
            iat: 0,
        };
        assert_eq!(CurrentUser::from(claims).role, Some(Role::Trainer));
    }
}
