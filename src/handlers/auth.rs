use actix_web::rt::task::spawn_blocking;
use actix_web::{web, HttpResponse};
use bcrypt::{hash, verify};
use lazy_static::lazy_static;
use log::info;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::user::User;
use crate::utils::jwt::generate_token;
use crate::utils::validation::validate_payload;

lazy_static! {
    // Emails known to be registered; skips hashing for obvious duplicates.
    static ref EMAIL_CACHE: Cache<String, bool> = Cache::new(10_000);
}

const BCRYPT_COST: u32 = 10;

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    username: String,

    #[validate(email(message = "Invalid email format"))]
    email: String,

    #[validate(length(min = 8, max = 32, message = "Password must be between 8 and 32 characters"))]
    password: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
}

#[derive(Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    email: String,
}

#[derive(Serialize)]
struct UserResponse {
    id: i64,
    username: String,
    email: String,
}

#[derive(Serialize)]
struct AuthResponse {
    user: UserResponse,
    token: String,
}

fn issue_token(user_id: i64, config: &Config) -> Result<String, AppError> {
    generate_token(user_id, &config.jwt_secret, config.token_ttl_hours)
        .map_err(|_| AppError::InternalServerError("Token generation failed".to_string()))
}

// POST /v1/register
pub async fn register(
    req: web::Json<RegisterRequest>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*req)?;
    let req = req.into_inner();

    if EMAIL_CACHE.get(&req.email).is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let password = req.password;
    let password_hash = spawn_blocking(move || hash(&password, BCRYPT_COST))
        .await
        .map_err(|_| AppError::InternalServerError("Hashing failed".to_string()))?
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    // Insert and check if email already exists
    let user_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, email, password, created_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (email) DO NOTHING
        RETURNING id",
    )
    .bind(&req.username)
    .bind(&req.email)
    .bind(&password_hash)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::Conflict("Email already exists".to_string()))?;

    EMAIL_CACHE.insert(req.email.clone(), true);
    info!("Registered user {}", user_id);

    let token = issue_token(user_id, &config)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        user: UserResponse {
            id: user_id,
            username: req.username,
            email: req.email,
        },
        token,
    }))
}

// POST /v1/login
pub async fn login(
    req: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*req)?;
    let req = req.into_inner();

    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, password FROM users WHERE email = $1",
    )
    .bind(&req.email)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    // Verify password using bcrypt
    let stored_hash = user.password.clone();
    let is_valid = spawn_blocking(move || verify(req.password.as_str(), &stored_hash))
        .await
        .map_err(|_| AppError::InternalServerError("Password verification error".to_string()))?
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    if !is_valid {
        return Err(AppError::Unauthorized("Invalid email or password".to_string()));
    }

    let token = issue_token(user.id, &config)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        },
        token,
    }))
}

// POST /v1/forgot-password
pub async fn forgot_password(req: web::Json<ForgotPasswordRequest>) -> Result<HttpResponse, AppError> {
    validate_payload(&*req)?;

    // No mail transport is configured; the request is only acknowledged.
    info!("Password reset requested");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Password reset instructions sent" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test as actix_test, App};

    #[actix_web::test]
    async fn forgot_password_acknowledges_valid_email() {
        let app = actix_test::init_service(
            App::new().route("/v1/forgot-password", web::post().to(forgot_password)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/v1/forgot-password")
            .set_json(serde_json::json!({ "email": "sam@example.com" }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = actix_test::TestRequest::post()
            .uri("/v1/forgot-password")
            .set_json(serde_json::json!({ "email": "not-an-email" }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn register_payload_rules() {
        let ok = RegisterRequest {
            username: "sam".into(),
            email: "sam@example.com".into(),
            password: "longenough".into(),
        };
        assert!(ok.validate().is_ok());

        let short_password = RegisterRequest {
            password: "short".into(),
            ..ok
        };
        assert!(short_password.validate().is_err());
    }
}
