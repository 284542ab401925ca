use actix_web::dev::{Payload, ServiceRequest};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use futures_util::future::{ready, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Numeric user id.
    pub sub: String,
    pub exp: usize,
}

/// Generates a JWT token for the given user.
pub fn generate_token(user_id: i64, secret: &str, ttl_hours: i64) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = (chrono::Utc::now() + chrono::Duration::hours(ttl_hours)).timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validates a JWT token and returns the claims if valid.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(jsonwebtoken::Algorithm::HS256),
    )
    .map(|data| data.claims)
}

/// Validator function for the `HttpAuthentication::bearer` middleware.
/// Valid claims are stashed in the request extensions for [`Session`].
pub async fn validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(config) = req.app_data::<web::Data<Config>>().cloned() else {
        return Err((actix_web::error::ErrorInternalServerError("Missing configuration"), req));
    };

    match validate_token(credentials.token(), &config.jwt_secret) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Err(err) => {
            warn!("Rejected bearer token: {}", err);
            Err((actix_web::error::ErrorUnauthorized("Invalid token"), req))
        }
    }
}

/// The authenticated caller, handed to each handler explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
}

impl Session {
    fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        claims
            .sub
            .parse()
            .map(|user_id| Session { user_id })
            .map_err(|_| AppError::BadRequest("Invalid user id in token".to_string()))
    }
}

impl FromRequest for Session {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let session = match req.extensions().get::<Claims>() {
            Some(claims) => Session::from_claims(claims),
            None => Err(AppError::Unauthorized("Missing session".to_string())),
        };
        ready(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trips_user_id() {
        let token = generate_token(42, SECRET, 1).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "42");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = generate_token(42, "other", 1).unwrap();
        assert!(validate_token(&token, SECRET).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = generate_token(42, SECRET, -2).unwrap();
        assert!(validate_token(&token, SECRET).is_err());
    }

    #[actix_web::test]
    async fn session_requires_claims() {
        let req = TestRequest::default().to_http_request();
        let result = Session::extract(&req).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[actix_web::test]
    async fn session_reads_numeric_subject() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(Claims { sub: "7".into(), exp: 0 });
        assert_eq!(Session::extract(&req).await.unwrap(), Session { user_id: 7 });

        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(Claims { sub: "alice".into(), exp: 0 });
        assert!(matches!(Session::extract(&req).await, Err(AppError::BadRequest(_))));
    }
}
