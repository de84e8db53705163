//! # JWT tokens
//!
//! HS256-signed bearer tokens. The claim set mirrors [`Caller`]: a citizen
//! token carries `uid`, an admin token carries `aid` plus the department.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use domains::{AdminClaim, Caller, Department, DomainError, Result, TokenService};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    department: Option<Department>,
    iat: i64,
    exp: i64,
}

pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtTokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, caller: &Caller) -> Result<String> {
        if caller.is_anonymous() {
            return Err(DomainError::unauthorized("cannot issue a token without identity"));
        }
        let now = Utc::now();
        let subject = caller
            .admin
            .map(|a| a.admin_id)
            .or(caller.user_id)
            .unwrap_or_default();
        let claims = Claims {
            sub: subject.to_string(),
            uid: caller.user_id,
            aid: caller.admin.map(|a| a.admin_id),
            department: caller.admin.map(|a| a.department),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            error!(error = %e, "token signing failed");
            DomainError::internal("token signing failed")
        })
    }

    fn verify(&self, token: &str) -> Result<Caller> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                match e.kind() {
                    ErrorKind::ExpiredSignature => DomainError::unauthorized("token expired"),
                    _ => DomainError::unauthorized("invalid token"),
                }
            })?;
        let claims = data.claims;

        let admin = match (claims.aid, claims.department) {
            (Some(admin_id), Some(department)) => Some(AdminClaim {
                admin_id,
                department,
            }),
            (None, None) => None,
            _ => return Err(DomainError::unauthorized("invalid token")),
        };
        let caller = Caller {
            user_id: claims.uid,
            admin,
        };
        if caller.is_anonymous() {
            return Err(DomainError::unauthorized("invalid token"));
        }
        Ok(caller)
    }
}
