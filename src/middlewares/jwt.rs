use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    HttpMessage,
};
use std::future::{ready, Future, Ready};
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::context::UserInfo;
use crate::core::ports::tokener::Tokener;
use crate::core::services::account::Claims;
use crate::impls::tokener::jwt::Jwt;

pub struct JwtAuth {
    secret: Vec<u8>,
}

impl JwtAuth {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = JwtAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            tokener: Jwt::new(self.secret.clone()),
            service,
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    tokener: Jwt,
    service: S,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // a missing header means an anonymous caller, handlers decide
        // whether that is acceptable; a bad token is always an error
        if let Some(header) = req.headers().get("Authorization") {
            let token = match header.to_str() {
                Ok(value) => value.trim_start_matches("Bearer ").to_owned(),
                Err(e) => {
                    let msg = e.to_string();
                    return Box::pin(async move { Err(ErrorUnauthorized(msg)) });
                }
            };
            match self.tokener.verify::<Claims>(&token) {
                Ok(claims) => match claims.sub.parse::<i32>() {
                    Ok(id) => {
                        req.extensions_mut().insert(UserInfo { id });
                    }
                    Err(e) => {
                        let msg = e.to_string();
                        return Box::pin(async move { Err(ErrorUnauthorized(msg)) });
                    }
                },
                Err(e) => {
                    let msg = e.to_string();
                    return Box::pin(async move { Err(ErrorUnauthorized(msg)) });
                }
            }
        }
        let next = self.service.call(req);
        Box::pin(async move { next.await })
    }
}
