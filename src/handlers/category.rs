use actix_web::web::{Data, Json, Path};
use actix_web::HttpResponse;

use crate::context::UserInfo;
use crate::core::models::category::Category;
use crate::core::services::category::{self, Payload};
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::response::CreateResponse;

pub async fn create(_user: UserInfo, Json(data): Json<Payload>, db: Data<PgSqlxManager>) -> Result<Json<CreateResponse>, Error> {
    let mut store = db.acquire().await?;
    let id = category::create(&mut store, data).await?;
    Ok(Json(CreateResponse { id }))
}

pub async fn list(db: Data<PgSqlxManager>) -> Result<Json<Vec<Category>>, Error> {
    let mut store = db.acquire().await?;
    let categories = category::list(&mut store).await?;
    Ok(Json(categories))
}

pub async fn update(_user: UserInfo, category_id: Path<(i32,)>, Json(data): Json<Payload>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let mut store = db.acquire().await?;
    category::update(&mut store, category_id.into_inner().0, data).await?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn delete_category(_user: UserInfo, category_id: Path<(i32,)>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let mut store = db.acquire().await?;
    category::delete(&mut store, category_id.into_inner().0).await?;
    Ok(HttpResponse::NoContent().finish())
}
