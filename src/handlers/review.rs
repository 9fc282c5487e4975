use actix_web::web::{Data, Json, Path, Query};
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

use crate::context::UserInfo;
use crate::core::models::review::{Patch, Query as ReviewQuery, ReviewItem};
use crate::core::services::review;
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::request::{default_page, default_size};
use crate::response::{CreateResponse, List};

#[derive(Debug, Deserialize)]
pub struct ReviewCreation {
    pub volunteer_work: i32,
    pub rating: i32,
    pub comment: Option<String>,
}

pub async fn create(user: UserInfo, Json(data): Json<ReviewCreation>, db: Data<PgSqlxManager>) -> Result<Json<CreateResponse>, Error> {
    let mut store = db.acquire().await?;
    let id = review::submit(&mut store, user.id, data.volunteer_work, data.rating, data.comment).await?;
    Ok(Json(CreateResponse { id }))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub volunteer_work: Option<i32>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

pub async fn list(Query(ListParams { volunteer_work, page, size }): Query<ListParams>, db: Data<PgSqlxManager>) -> Result<Json<List<ReviewItem>>, Error> {
    let mut store = db.acquire().await?;
    let (reviews, total) = review::list(
        &mut store,
        ReviewQuery {
            volunteer_work_id: volunteer_work,
            ..Default::default()
        },
        page,
        size,
    )
    .await?;
    Ok(Json(List::new(reviews, total)))
}

pub async fn update(user: UserInfo, review_id: Path<(i32,)>, Json(patch): Json<Patch>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let mut store = db.acquire().await?;
    review::update(&mut store, user.id, review_id.into_inner().0, patch).await?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn delete_review(user: UserInfo, review_id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let mut store = db.acquire().await?;
    review::delete(&mut store, user.id, review_id.into_inner().0).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Serialize)]
pub struct AverageRating {
    pub average_rating: f64,
}

pub async fn average_rating(work_id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<Json<AverageRating>, Error> {
    let mut store = db.acquire().await?;
    let average_rating = review::average(&mut store, work_id.into_inner().0).await?;
    Ok(Json(AverageRating { average_rating }))
}

#[derive(Debug, Serialize)]
pub struct HasReviewed {
    pub reviewed: bool,
}

pub async fn has_reviewed(user: Option<UserInfo>, work_id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<Json<HasReviewed>, Error> {
    let user = match user {
        Some(user) => user,
        None => return Ok(Json(HasReviewed { reviewed: false })),
    };
    let mut store = db.acquire().await?;
    let reviewed = review::has_reviewed(&mut store, user.id, work_id.into_inner().0).await?;
    Ok(Json(HasReviewed { reviewed }))
}
