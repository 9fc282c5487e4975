use actix_web::{dev::Payload, error::ErrorUnauthorized, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

// The authenticated principal, planted by the jwt middleware. Extract
// `Option<UserInfo>` in handlers that also serve anonymous callers.
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub id: i32,
}

impl FromRequest for UserInfo {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(user) = req.extensions().get::<Self>() {
            ready(Ok(user.clone()))
        } else {
            ready(Err(ErrorUnauthorized("authentication required")))
        }
    }
}
