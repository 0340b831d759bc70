use axum::Extension;

use crate::handlers::public::auth::SessionUser;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /auth/whoami - echo the authenticated actor back to the client.
pub async fn whoami(Extension(auth): Extension<AuthUser>) -> ApiResult<SessionUser> {
    Ok(ApiResponse::success(SessionUser {
        id: auth.id,
        email: auth.email,
        role: auth.role,
    }))
}
