use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::{Identity, Role};
use crate::config;
use crate::error::ApiError;

use super::auth::CurrentUser;

/// How a gated route turns away a request. Browser traffic is sent to the
/// login entry point with nothing else revealed; API traffic gets the bare
/// status.
enum GateRejection {
    RedirectToLogin,
    Unauthenticated,
    Forbidden,
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            GateRejection::RedirectToLogin => {
                Redirect::to(&config::config().auth.login_route).into_response()
            }
            GateRejection::Unauthenticated => {
                ApiError::unauthorized("Authentication required").into_response()
            }
            GateRejection::Forbidden => ApiError::forbidden("Access denied").into_response(),
        }
    }
}

fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get("accept")
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("text/html"))
        .unwrap_or(false)
}

fn evaluate_request(headers: &HeaderMap, user: Option<&CurrentUser>, allowed: &[Role]) -> Result<(), GateRejection> {
    let browser = accepts_html(headers);

    let user = match user {
        Some(user) => user,
        None if browser => return Err(GateRejection::RedirectToLogin),
        None => return Err(GateRejection::Unauthenticated),
    };

    let permitted = match user.role {
        None => false,
        Some(role) => allowed.contains(&role),
    };

    if permitted {
        Ok(())
    } else if browser {
        Err(GateRejection::RedirectToLogin)
    } else {
        Err(GateRejection::Forbidden)
    }
}

/// Allow-list layer for a route group. Composes with `jwt_auth_middleware`,
/// which injects the user context this reads:
///
/// ```rust,ignore
/// Router::new()
///     .nest("/api/admin", admin_routes())
///     .layer(axum::middleware::from_fn(require_roles(&[Role::Admin])))
///     .layer(axum::middleware::from_fn(jwt_auth_middleware))
/// ```
pub fn require_roles(
    allowed: &'static [Role],
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Response> + Send>> + Clone {
    move |request, next| Box::pin(check_roles(allowed, request, next))
}

async fn check_roles(allowed: &'static [Role], request: Request, next: Next) -> Response {
    let user = request.extensions().get::<CurrentUser>().cloned();
    match evaluate_request(request.headers(), user.as_ref(), allowed) {
        Ok(()) => next.run(request).await,
        Err(rejection) => {
            if let Some(user) = user {
                tracing::debug!("Gate denied {} (role {:?}) for {:?}", user.email, user.role, allowed);
            }
            rejection.into_response()
        }
    }
}

macro_rules! role_extractor {
    ($name:ident, $role:expr) => {
        /// Extractor that requires the named role; yields the caller's
        /// identity to the handler.
        pub struct $name(pub Identity);

        #[axum::async_trait]
        impl<S> FromRequestParts<S> for $name
        where
            S: Send + Sync,
        {
            type Rejection = Response;

            async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
                let user = parts.extensions.get::<CurrentUser>().cloned();
                match evaluate_request(&parts.headers, user.as_ref(), &[$role]) {
                    Ok(()) => Ok(Self(user.expect("gate passed without user").identity())),
                    Err(rejection) => Err(rejection.into_response()),
                }
            }
        }
    };
}

role_extractor!(RequireAdmin, Role::Admin);
role_extractor!(RequireTrainer, Role::Trainer);
role_extractor!(RequireBroker, Role::Broker);

/// Extractor for routes open to any authenticated principal, roled or not
/// (whoami, logout).
pub struct RequireSession(pub Identity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<CurrentUser>() {
            Some(user) => Ok(Self(user.identity())),
            None if accepts_html(&parts.headers) => Err(GateRejection::RedirectToLogin.into_response()),
            None => Err(GateRejection::Unauthenticated.into_response()),
        }
    }
}

// Upload routes accept any of the three roles; reused by the media handler.
pub const ANY_ROLE: &[Role] = &[Role::Admin, Role::Trainer, Role::Broker];

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use uuid::Uuid;

    fn status_of(rejection: GateRejection) -> StatusCode {
        rejection.into_response().status()
    }

    fn user(role: Option<Role>) -> CurrentUser {
        CurrentUser { user_id: Uuid::new_v4(), email: "u@suq.example.com".to_string(), role }
    }

    fn api_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("application/json"));
        headers
    }

    fn browser_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("text/html,application/xhtml+xml"));
        headers
    }

    #[test]
    fn allowed_role_passes() {
        let admin = user(Some(Role::Admin));
        assert!(evaluate_request(&api_headers(), Some(&admin), &[Role::Admin]).is_ok());
        assert!(evaluate_request(&api_headers(), Some(&admin), ANY_ROLE).is_ok());
    }

    #[test]
    fn role_outside_allow_list_is_forbidden() {
        let admin = user(Some(Role::Admin));
        let err = evaluate_request(&api_headers(), Some(&admin), &[Role::Trainer]).unwrap_err();
        assert_eq!(status_of(err), StatusCode::FORBIDDEN);
    }

    #[test]
    fn unroled_user_is_denied_everywhere() {
        let unroled = user(None);
        for allowed in [&[Role::Admin][..], &[Role::Trainer][..], ANY_ROLE] {
            assert!(evaluate_request(&api_headers(), Some(&unroled), allowed).is_err());
        }
    }

    #[test]
    fn missing_user_is_unauthenticated_for_api() {
        let err = evaluate_request(&api_headers(), None, &[Role::Admin]).unwrap_err();
        assert_eq!(status_of(err), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn browsers_are_redirected_to_login() {
        let err = evaluate_request(&browser_headers(), None, &[Role::Admin]).unwrap_err();
        let response = err.into_response();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers().get("location").unwrap(), "/login");

        let trainer = user(Some(Role::Trainer));
        let err = evaluate_request(&browser_headers(), Some(&trainer), &[Role::Admin]).unwrap_err();
        assert!(err.into_response().status().is_redirection());
    }
}
