//! User endpoints

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    response::Response,
    routing::{get, post},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};

use super::converters::{profile_to_response, user_to_response};
use super::dto::{ApiResponse, LoginRequest, RegisterRequest, message_only};
use super::form::MultipartForm;
use crate::AppState;
use crate::auth::{CurrentUser, SESSION_COOKIE, Session, create_session_token};
use crate::data::{FollowChange, User};
use crate::error::AppError;
use crate::realtime::UserSummary;
use crate::service::ProfileUpdate;

pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/user/register", post(register))
        .route("/user/login", post(login))
        .route("/user/logout", get(logout))
        .route("/user/:id/profile", get(profile))
        .route("/user/profile/edit", post(edit_profile))
        .route("/user/suggested", get(suggested))
        .route("/user/followorunfollow/:id", post(follow_or_unfollow))
}

fn session_cookie(state: &AppState, user: &User) -> Result<Cookie<'static>, AppError> {
    let session = Session::start(&user.id, &user.username, state.config.auth.session_max_age);
    let token = create_session_token(&session, &state.config.auth.session_secret)?;
    let secure = state.config.should_use_secure_cookies();

    Ok(Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(if secure { SameSite::None } else { SameSite::Lax })
        .build())
}

/// POST /api/user/register
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<(CookieJar, Response), AppError> {
    let user = state
        .user_service()
        .register(request.username, request.email, request.password)
        .await?;
    let cookie = session_cookie(&state, &user)?;
    let body = user_to_response(&state.db, &user).await?;

    Ok((
        jar.add(cookie),
        ApiResponse::created("Account created successfully", body),
    ))
}

/// POST /api/user/login
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Response), AppError> {
    let user = state
        .user_service()
        .login(request.email, request.password)
        .await?;
    let cookie = session_cookie(&state, &user)?;
    let message = format!("Welcome back {}", user.username);
    let body = user_to_response(&state.db, &user).await?;

    Ok((jar.add(cookie), ApiResponse::ok(message, body)))
}

/// GET /api/user/logout
async fn logout(jar: CookieJar) -> (CookieJar, Response) {
    let mut cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    cookie.make_removal();
    (jar.add(cookie), message_only("Logout Successfully!"))
}

/// GET /api/user/:id/profile
async fn profile(
    State(state): State<AppState>,
    CurrentUser(_session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let user = state.user_service().get(&id).await?;
    let body = profile_to_response(&state.db, &user).await?;
    Ok(ApiResponse::ok("Profile fetched successfully", body))
}

/// POST /api/user/profile/edit
///
/// Multipart fields: `bio`, `gender`, `profilePicture`.
async fn edit_profile(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = MultipartForm::read(multipart).await?;
    let update = ProfileUpdate {
        bio: form.text("bio"),
        gender: form.text("gender"),
        profile_picture: form.file("profilePicture"),
    };

    let user = state
        .user_service()
        .edit_profile(&session.user_id, update)
        .await?;
    let body = user_to_response(&state.db, &user).await?;
    Ok(ApiResponse::ok("Profile updated successfully", body))
}

/// GET /api/user/suggested
async fn suggested(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Response, AppError> {
    let users = state.user_service().suggested(&session.user_id).await?;
    let body: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();
    Ok(ApiResponse::ok("Suggested users fetched successfully", body))
}

/// POST /api/user/followorunfollow/:id
async fn follow_or_unfollow(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let change = state
        .user_service()
        .follow_or_unfollow(&session.user_id, &id)
        .await?;

    Ok(message_only(match change {
        FollowChange::Followed => "Follow user successfully",
        FollowChange::Unfollowed => "Unfollow user successfully",
    }))
}
