use actix_web::web::{Data, Json, Path, Query};
use serde::Deserialize;

use crate::context::UserInfo;
use crate::core::models::user::{Patch, ProfilePatch, User};
use crate::core::services::account::{self, UserDetail};
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::request::Pagination;
use crate::response::List;

pub async fn list(Query(Pagination { page, size }): Query<Pagination>, db: Data<PgSqlxManager>) -> Result<Json<List<User>>, Error> {
    let mut store = db.acquire().await?;
    let (users, total) = account::list(&mut store, page, size).await?;
    Ok(Json(List::new(users, total)))
}

pub async fn detail(user_id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<Json<UserDetail>, Error> {
    let mut store = db.acquire().await?;
    let detail = account::detail(&mut store, user_id.into_inner().0).await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub struct EditPayload {
    #[serde(flatten)]
    pub user: Patch,
    #[serde(flatten)]
    pub profile: ProfilePatch,
}

pub async fn edit(user: UserInfo, Json(data): Json<EditPayload>, db: Data<PgSqlxManager>) -> Result<Json<UserDetail>, Error> {
    let mut store = db.acquire().await?;
    let detail = account::edit(&mut store, user.id, data.user, data.profile).await?;
    Ok(Json(detail))
}
