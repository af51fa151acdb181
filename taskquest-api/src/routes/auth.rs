/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token
/// - `POST /v1/auth/verify-email` - Redeem the emailed verification token
/// - `POST /v1/auth/forgot-password` - Email a password reset token
/// - `POST /v1/auth/reset-password` - Redeem a reset token with a new password
/// - `GET  /v1/me` - Profile of the authenticated caller

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskquest_shared::{
    auth::{
        jwt,
        middleware::AuthContext,
        password::{self, password_rules},
        token,
    },
    mailer::Email,
    models::{
        auth_token::{AuthToken, TokenPurpose},
        user::{normalize_email, CreateUser, User},
    },
};
use tracing::{info, warn};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "password_rules"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// Tokens issued on register and login
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: i64,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub token: String,

    #[validate(custom(function = "password_rules"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

fn issue_tokens(user_id: i64, secret: &str) -> ApiResult<AuthResponse> {
    let access_claims = jwt::Claims::new(user_id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user_id, jwt::TokenType::Refresh);

    Ok(AuthResponse {
        user_id,
        access_token: jwt::create_token(&access_claims, secret)?,
        refresh_token: jwt::create_token(&refresh_claims, secret)?,
    })
}

/// Stores a fresh token for `email` and mails the plaintext
///
/// Delivery failures are logged rather than returned: the account change
/// already happened and the user can ask for another token.
async fn send_token(state: &AppState, email: &str, purpose: TokenPurpose) -> ApiResult<()> {
    let (plaintext, hash) = token::generate_email_token();
    AuthToken::issue(&state.db, email, &hash, purpose).await?;

    let message = match purpose {
        TokenPurpose::Verification => Email::verification(email, &plaintext),
        TokenPurpose::Reset => Email::password_reset(email, &plaintext),
    };

    if let Err(err) = state.mailer.send(message).await {
        warn!(error = %err, purpose = purpose.as_str(), "Email token not delivered");
    }

    Ok(())
}

/// Redeems an emailed token or fails with `400`
async fn redeem_token(
    state: &AppState,
    email: &str,
    plaintext: &str,
    purpose: TokenPurpose,
) -> ApiResult<()> {
    let redeemed = token::is_well_formed(plaintext)
        && AuthToken::redeem(&state.db, email, plaintext, purpose, state.auth_token_ttl()).await?;

    if redeemed {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid or expired token".to_string()))
    }
}

/// Register a new user
///
/// Stores the account, mails an email verification token, and signs the
/// user in right away.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "jdoe",
///   "name": "John Doe",
///   "email": "user@example.com",
///   "password": "SecureP@ss123",
///   "confirmPassword": "SecureP@ss123"
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "userId": 1,
///   "accessToken": "eyJ...",
///   "refreshToken": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Email already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username.trim().to_string(),
            name: req.name.trim().to_string(),
            email: req.email,
            password_hash,
        },
    )
    .await?;

    info!(user_id = user.id, "User registered");

    send_token(&state, &user.email, TokenPurpose::Verification).await?;

    let tokens = issue_tokens(user.id, state.jwt_secret())?;
    Ok((StatusCode::CREATED, Json(tokens)))
}

/// Login endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(invalid());
    }

    Ok(Json(issue_tokens(user.id, state.jwt_secret())?))
}

/// Exchanges a refresh token for a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Marks the email verified
///
/// # Errors
///
/// - `400 Bad Request`: Token unknown, already used, or expired
pub async fn verify_email(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<VerifyEmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    redeem_token(&state, &req.email, req.token.trim(), TokenPurpose::Verification).await?;
    User::mark_email_verified(&state.db, &req.email).await?;

    Ok(MessageResponse::new("Email verified"))
}

/// Mails a reset token if the account exists
///
/// Always answers `202 Accepted` so the response doesn't reveal whether an
/// account exists.
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ForgotPasswordRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let email = normalize_email(&req.email);

    if User::find_by_email(&state.db, &email).await?.is_some() {
        send_token(&state, &email, TokenPurpose::Reset).await?;
    }

    Ok((
        StatusCode::ACCEPTED,
        MessageResponse::new("If the account exists, a reset code has been sent"),
    ))
}

/// Replaces the password using an emailed reset token
///
/// # Errors
///
/// - `400 Bad Request`: Token unknown, already used, or expired
/// - `422 Unprocessable Entity`: Validation failed
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    redeem_token(&state, &req.email, req.token.trim(), TokenPurpose::Reset).await?;

    let password_hash = password::hash_password(&req.password)?;
    if !User::update_password(&state.db, &req.email, &password_hash).await? {
        return Err(ApiError::BadRequest("Invalid or expired token".to_string()));
    }

    info!("Password reset");
    Ok(MessageResponse::new("Password updated"))
}

/// Profile of the authenticated caller
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
