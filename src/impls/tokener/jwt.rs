use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::ports::tokener::Tokener;
use crate::error::Error;

pub struct Jwt {
    secret: Vec<u8>,
}

impl Jwt {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }
}

impl Tokener for Jwt {
    fn issue<C: Serialize>(&self, claims: &C) -> Result<String, Error> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(&self.secret);
        let token = encode(&header, claims, &key)?;
        Ok(token)
    }

    fn verify<C: DeserializeOwned>(&self, token: &str) -> Result<C, Error> {
        let key = DecodingKey::from_secret(&self.secret);
        let validation = Validation::new(Algorithm::HS256);
        let data = decode(token, &key, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::services::account::Claims;
    use std::ops::Add;

    fn claims_for(sub: &str) -> Claims {
        Claims {
            sub: sub.into(),
            exp: chrono::Utc::now().add(chrono::Duration::minutes(5)).timestamp(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let jwt = Jwt::new(b"0123456789".to_vec());
        let token = jwt.issue(&claims_for("42")).unwrap();
        let claims: Claims = jwt.verify(&token).unwrap();
        assert_eq!(claims.sub, "42");
    }

    #[test]
    fn test_wrong_secret_fails() {
        let jwt = Jwt::new(b"0123456789".to_vec());
        let token = jwt.issue(&claims_for("42")).unwrap();
        let other = Jwt::new(b"another secret".to_vec());
        assert!(other.verify::<Claims>(&token).is_err());
    }

    #[test]
    fn test_expired_token_fails() {
        let jwt = Jwt::new(b"0123456789".to_vec());
        let claims = Claims {
            sub: "42".into(),
            exp: chrono::Utc::now().timestamp() - 3600,
        };
        let token = jwt.issue(&claims).unwrap();
        assert!(jwt.verify::<Claims>(&token).is_err());
    }
}
