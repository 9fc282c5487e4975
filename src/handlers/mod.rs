pub mod category;
pub mod join_request;
pub mod review;
pub mod user;
pub mod work;

use actix_web::cookie::{time::OffsetDateTime, Cookie, CookieBuilder};
use actix_web::web::{Data, Json};
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

use crate::core::ports::notifier::Notifier;
use crate::core::services::account::{self, Signup};
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::impls::tokener::jwt::Jwt;
use crate::response::CreateResponse;

pub static JWT_TOKEN: &str = "JWT_TOKEN";
pub static JWT_SECRET: &str = "JWT_SECRET";

pub async fn signup<N>(Json(data): Json<Signup>, db: Data<PgSqlxManager>, notifier: Data<N>) -> Result<Json<CreateResponse>, Error>
where
    N: Notifier + 'static,
{
    let tx = db.begin().await?;
    let id = account::signup(tx, notifier.get_ref(), data).await?;
    Ok(Json(CreateResponse { id }))
}

#[derive(Debug, Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    token: String,
}

pub async fn login(Json(Login { username, password }): Json<Login>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let secret = dotenv::var(JWT_SECRET)?;
    let tokener = Jwt::new(secret.into_bytes());
    let mut store = db.acquire().await?;
    let token = account::login(&mut store, &tokener, &username, &password).await?;
    Ok(HttpResponse::Ok()
        .cookie(Cookie::new(JWT_TOKEN, token.clone()))
        .json(LoginResponse { token }))
}

pub async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(CookieBuilder::new(JWT_TOKEN, "").expires(OffsetDateTime::now_utc()).finish())
        .finish()
}
