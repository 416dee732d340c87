use axum::extract::{Json, State};
use axum::http::HeaderMap;
use axum::Extension;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::audit::{record_audit, Actor};
use crate::db::{LoginAttempt, User};
use crate::error::{SeraError, SeraResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;

const TOKEN_LIFETIME_HOURS: i64 = 12;

pub fn require_admin(claims: &Claims) -> SeraResult<()> {
    if claims.is_admin() {
        Ok(())
    } else {
        Err(SeraError::Auth("Yönetici yetkisi gerekli.".to_string()))
    }
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
}

impl LoginResponse {
    fn rejected(message: &str) -> Self {
        LoginResponse {
            success: false,
            message: message.to_string(),
            token: None,
            username: None,
            role: None,
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> SeraResult<Json<LoginResponse>> {
    let username = payload.username.trim().to_string();
    let password = payload.password;

    if username.is_empty() || password.trim().is_empty() {
        return Ok(Json(LoginResponse::rejected(
            "Kullanıcı adı ve şifre zorunludur.",
        )));
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE username = $1 AND active = TRUE",
    )
    .bind(&username)
    .fetch_optional(&state.pool)
    .await?;

    let ip = client_ip(&headers);

    let Some(user) = user else {
        record_login_attempt(&state, &username, ip.as_deref(), false).await?;
        return Ok(Json(LoginResponse::rejected(
            "Kullanıcı adı veya şifre hatalı.",
        )));
    };

    let Some(password_hash) = user.password_hash.as_deref() else {
        record_login_attempt(&state, &username, ip.as_deref(), false).await?;
        return Ok(Json(LoginResponse::rejected(
            "Kullanıcı adı veya şifre hatalı.",
        )));
    };

    let is_valid = verify(&password, password_hash).unwrap_or(false);
    record_login_attempt(&state, &username, ip.as_deref(), is_valid).await?;

    if !is_valid {
        return Ok(Json(LoginResponse::rejected(
            "Kullanıcı adı veya şifre hatalı.",
        )));
    }

    sqlx::query("UPDATE users SET last_login = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    let exp = (Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize;
    let claims = Claims {
        sub: user.username.clone(),
        user_id: Some(user.id),
        username: Some(user.username.clone()),
        role: Some(user.role.clone()),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Giriş başarılı.".to_string(),
        token: Some(token),
        username: Some(user.username),
        role: Some(user.role),
    }))
}

async fn record_login_attempt(
    state: &AppState,
    username: &str,
    ip: Option<&str>,
    success: bool,
) -> SeraResult<()> {
    sqlx::query("INSERT INTO login_attempts (username, ip_address, success) VALUES ($1, $2, $3)")
        .bind(username)
        .bind(ip)
        .bind(success)
        .execute(&state.pool)
        .await?;
    Ok(())
}

// Tokens are stateless; logout exists so clients have a uniform endpoint to
// call when discarding theirs.
pub async fn logout() -> Json<Value> {
    Json(json!({ "success": true }))
}

#[derive(Serialize)]
pub struct AuthStatusResponse {
    pub logged_in: bool,
    pub username: Option<String>,
    pub role: Option<String>,
}

pub async fn check_auth_status(claims: Option<Extension<Claims>>) -> Json<AuthStatusResponse> {
    match claims {
        Some(Extension(claims)) => Json(AuthStatusResponse {
            logged_in: true,
            username: claims.username.clone(),
            role: claims.role.clone(),
        }),
        None => Json(AuthStatusResponse {
            logged_in: false,
            username: None,
            role: None,
        }),
    }
}

pub async fn get_all_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> SeraResult<Json<Vec<User>>> {
    require_admin(&claims)?;
    let users = sqlx::query_as::<_, User>(
        "SELECT id, username, email, NULL as password_hash, full_name, role, active, last_login, created_at, updated_at FROM users ORDER BY id ASC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(users))
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: String,
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateUserRequest>,
) -> SeraResult<Json<Value>> {
    require_admin(&claims)?;

    if payload.username.trim().is_empty() || payload.password.trim().is_empty() {
        return Err(SeraError::Validation(
            "Kullanıcı adı ve şifre zorunludur.".to_string(),
        ));
    }

    let hashed = hash(payload.password, DEFAULT_COST)?;
    let actor = Actor::from(&claims);

    let (user_id,): (i32,) = sqlx::query_as(
        "INSERT INTO users (username, password_hash, email, full_name, role) VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(payload.username.trim())
    .bind(hashed)
    .bind(&payload.email)
    .bind(&payload.full_name)
    .bind(&payload.role)
    .fetch_one(&state.pool)
    .await?;

    record_audit(&state.pool, "users", Some(user_id), "create", &actor, None).await?;

    Ok(Json(json!({ "success": true, "id": user_id })))
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub id: i32,
    pub username: String,
    pub password: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: String,
    pub active: bool,
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateUserRequest>,
) -> SeraResult<Json<Value>> {
    require_admin(&claims)?;
    let actor = Actor::from(&claims);

    match payload.password.as_deref() {
        Some(password) if !password.trim().is_empty() => {
            let hashed = hash(password, DEFAULT_COST)?;
            sqlx::query(
                "UPDATE users SET username = $1, password_hash = $2, email = $3, full_name = $4, role = $5, active = $6, updated_at = CURRENT_TIMESTAMP WHERE id = $7",
            )
            .bind(payload.username.trim())
            .bind(hashed)
            .bind(&payload.email)
            .bind(&payload.full_name)
            .bind(&payload.role)
            .bind(payload.active)
            .bind(payload.id)
            .execute(&state.pool)
            .await?;
        }
        _ => {
            sqlx::query(
                "UPDATE users SET username = $1, email = $2, full_name = $3, role = $4, active = $5, updated_at = CURRENT_TIMESTAMP WHERE id = $6",
            )
            .bind(payload.username.trim())
            .bind(&payload.email)
            .bind(&payload.full_name)
            .bind(&payload.role)
            .bind(payload.active)
            .bind(payload.id)
            .execute(&state.pool)
            .await?;
        }
    }

    record_audit(&state.pool, "users", Some(payload.id), "update", &actor, None).await?;

    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct DeleteUserRequest {
    pub id: i32,
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<DeleteUserRequest>,
) -> SeraResult<Json<Value>> {
    require_admin(&claims)?;

    let username: String = sqlx::query_scalar("SELECT username FROM users WHERE id = $1")
        .bind(payload.id)
        .fetch_one(&state.pool)
        .await?;

    if username == state.config.admin_user {
        return Err(SeraError::Validation(
            "Sistem yöneticisi hesabı silinemez.".to_string(),
        ));
    }

    let actor = Actor::from(&claims);
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(payload.id)
        .execute(&state.pool)
        .await?;

    record_audit(
        &state.pool,
        "users",
        Some(payload.id),
        "delete",
        &actor,
        Some(&username),
    )
    .await?;

    Ok(Json(json!({ "success": true })))
}

pub async fn get_login_attempts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> SeraResult<Json<Vec<LoginAttempt>>> {
    require_admin(&claims)?;
    let attempts = sqlx::query_as::<_, LoginAttempt>(
        "SELECT * FROM login_attempts ORDER BY attempted_at DESC LIMIT 100",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(attempts))
}
