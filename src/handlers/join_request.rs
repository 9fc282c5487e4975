use actix_web::web::{Data, Json, Path, Query};

use crate::context::UserInfo;
use crate::core::models::join_request::JoinRequestItem;
use crate::core::services::join_request;
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::request::Pagination;
use crate::response::{CreateResponse, List, StatusResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct JoinRequestCreation {
    pub volunteer_work: i32,
}

pub async fn create(user: UserInfo, Json(data): Json<JoinRequestCreation>, db: Data<PgSqlxManager>) -> Result<Json<CreateResponse>, Error> {
    let mut store = db.acquire().await?;
    let id = join_request::create(&mut store, user.id, data.volunteer_work).await?;
    Ok(Json(CreateResponse { id }))
}

pub async fn list(user: UserInfo, Query(Pagination { page, size }): Query<Pagination>, db: Data<PgSqlxManager>) -> Result<Json<List<JoinRequestItem>>, Error> {
    let mut store = db.acquire().await?;
    let (requests, total) = join_request::list(&mut store, user.id, page, size).await?;
    Ok(Json(List::new(requests, total)))
}

pub async fn approve(user: UserInfo, request_id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<Json<StatusResponse>, Error> {
    let tx = db.begin().await?;
    join_request::approve(tx, user.id, request_id.into_inner().0).await?;
    Ok(Json(StatusResponse { status: "approved" }))
}

pub async fn reject(user: UserInfo, request_id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<Json<StatusResponse>, Error> {
    let tx = db.begin().await?;
    join_request::reject(tx, user.id, request_id.into_inner().0).await?;
    Ok(Json(StatusResponse { status: "rejected" }))
}
