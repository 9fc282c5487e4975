use actix_web::web::{Data, Json, Path, Query};
use actix_web::HttpResponse;

use crate::context::UserInfo;
use crate::core::models::work::{Query as WorkQuery, WorkItem};
use crate::core::services::work::{self, Payload, WorkDetail};
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::request::Pagination;
use crate::response::{CreateResponse, List};

pub async fn create(user: UserInfo, Json(data): Json<Payload>, db: Data<PgSqlxManager>) -> Result<Json<CreateResponse>, Error> {
    let mut store = db.acquire().await?;
    let id = work::create(&mut store, user.id, data).await?;
    Ok(Json(CreateResponse { id }))
}

pub async fn list(Query(Pagination { page, size }): Query<Pagination>, db: Data<PgSqlxManager>) -> Result<Json<List<WorkItem>>, Error> {
    let mut store = db.acquire().await?;
    let (works, total) = work::list(&mut store, WorkQuery::default(), page, size).await?;
    Ok(Json(List::new(works, total)))
}

pub async fn detail(work_id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<Json<WorkDetail>, Error> {
    let mut store = db.acquire().await?;
    let detail = work::detail(&mut store, work_id.into_inner().0).await?;
    Ok(Json(detail))
}

pub async fn update(user: UserInfo, work_id: Path<(i32,)>, Json(data): Json<Payload>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let mut store = db.acquire().await?;
    work::update(&mut store, user.id, work_id.into_inner().0, data).await?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn delete_work(user: UserInfo, work_id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let mut store = db.acquire().await?;
    work::delete(&mut store, user.id, work_id.into_inner().0).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn my_works(user: UserInfo, Query(Pagination { page, size }): Query<Pagination>, db: Data<PgSqlxManager>) -> Result<Json<List<WorkItem>>, Error> {
    let mut store = db.acquire().await?;
    let (works, total) = work::my_works(&mut store, user.id, page, size).await?;
    Ok(Json(List::new(works, total)))
}

pub async fn participated_works(
    user: UserInfo,
    Query(Pagination { page, size }): Query<Pagination>,
    db: Data<PgSqlxManager>,
) -> Result<Json<List<WorkItem>>, Error> {
    let mut store = db.acquire().await?;
    let (works, total) = work::participated_works(&mut store, user.id, page, size).await?;
    Ok(Json(List::new(works, total)))
}

pub async fn by_category(slug: Path<(String,)>, Query(Pagination { page, size }): Query<Pagination>, db: Data<PgSqlxManager>) -> Result<Json<List<WorkItem>>, Error> {
    let mut store = db.acquire().await?;
    let (works, total) = work::by_category_slug(&mut store, &slug.into_inner().0, page, size).await?;
    Ok(Json(List::new(works, total)))
}
