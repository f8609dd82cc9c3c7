use crate::utils::error::CustomError;
use actix_web::{Error, HttpMessage, dev::ServiceRequest, web};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const ADMIN_ROLE: &str = "admin";

/// Secret moderator tokens are signed with.
#[derive(Clone)]
pub struct AdminAuth {
    pub secret: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// Decode a moderator token and check its role.
pub fn decode_admin_token(token: &str, secret: &str) -> Result<AdminClaims, CustomError> {
    let data = decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| CustomError::UnauthorizedError("Invalid token".to_string()))?;

    if data.claims.role != ADMIN_ROLE {
        return Err(CustomError::ForbiddenError(
            "Moderator access required".to_string(),
        ));
    }
    Ok(data.claims)
}

/// Issue a moderator token valid for `hours`.
pub fn create_admin_token(subject: &str, secret: &str, hours: i64) -> Result<String, CustomError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(hours))
        .ok_or_else(|| CustomError::InternalServerError("Invalid token lifetime".to_string()))?
        .timestamp() as usize;

    let claims = AdminClaims {
        sub: subject.to_owned(),
        role: ADMIN_ROLE.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| CustomError::InternalServerError("Token generation failed".to_string()))
}

/// Bearer validator guarding the moderation scope.
pub async fn verify_admin_token(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let secret = match req.app_data::<web::Data<AdminAuth>>() {
        Some(auth) => auth.secret.clone(),
        None => {
            return Err((
                CustomError::UnauthorizedError("Moderation is disabled".to_string()).into(),
                req,
            ));
        }
    };

    match decode_admin_token(credentials.token(), &secret) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Err(e) => Err((e.into(), req)),
    }
}

/// Moderator name from request extensions (use after the auth middleware)
pub fn get_admin_from_request(req: &actix_web::HttpRequest) -> Option<String> {
    req.extensions()
        .get::<AdminClaims>()
        .map(|claims| claims.sub.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_token_roundtrip() {
        let token = create_admin_token("chef", "s3cret", 1).unwrap();
        let claims = decode_admin_token(&token, "s3cret").unwrap();
        assert_eq!(claims.sub, "chef");
        assert_eq!(claims.role, ADMIN_ROLE);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_admin_token("chef", "s3cret", 1).unwrap();
        assert!(matches!(
            decode_admin_token(&token, "other"),
            Err(CustomError::UnauthorizedError(_))
        ));
    }

    #[test]
    fn test_non_admin_role_is_forbidden() {
        let claims = AdminClaims {
            sub: "reader".to_string(),
            role: "reader".to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();
        assert!(matches!(
            decode_admin_token(&token, "s3cret"),
            Err(CustomError::ForbiddenError(_))
        ));
    }
}
