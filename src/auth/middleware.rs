use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AuthError, AuthService, AuthUser};
use crate::entities::user::UserType;
use crate::errors::ServiceError;

/// Reads the bearer token, if any. A present but unusable header is an error.
fn bearer_user(headers: &HeaderMap, auth: &AuthService) -> Result<Option<AuthUser>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| AuthError::InvalidToken)?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidToken)?;

    let claims = auth.validate_token(token)?;
    AuthUser::try_from(claims).map(Some)
}

fn auth_service(request: &Request) -> Result<Arc<AuthService>, Response> {
    request
        .extensions()
        .get::<Arc<AuthService>>()
        .cloned()
        .ok_or_else(|| {
            ServiceError::InternalError("Authentication service not available".to_string())
                .into_response()
        })
}

/// Requires a valid bearer token and stores the [`AuthUser`] in request extensions
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth = match auth_service(&request) {
        Ok(auth) => auth,
        Err(response) => return response,
    };

    match bearer_user(request.headers(), &auth) {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => AuthError::MissingAuth.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Like [`auth_middleware`] but lets anonymous requests through
pub async fn optional_auth_middleware(mut request: Request, next: Next) -> Response {
    let auth = match auth_service(&request) {
        Ok(auth) => auth,
        Err(response) => return response,
    };

    match bearer_user(request.headers(), &auth) {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

pub async fn require_roles(
    State(allowed): State<Arc<[UserType]>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(user) = request.extensions().get::<AuthUser>() else {
        return AuthError::MissingAuth.into_response();
    };

    if !user.has_any_role(&allowed) {
        return AuthError::InsufficientPermissions.into_response();
    }

    next.run(request).await
}

pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_optional_auth(self) -> Self;
    fn with_roles(self, roles: &[UserType]) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_optional_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(optional_auth_middleware))
    }

    fn with_roles(self, roles: &[UserType]) -> Self {
        let allowed: Arc<[UserType]> = Arc::from(roles);
        self.layer(axum::middleware::from_fn_with_state(
            allowed,
            require_roles,
        ))
        .with_auth()
    }
}
