mod context;
mod core;
mod database;
mod error;
mod handlers;
mod impls;
mod middlewares;
mod request;
mod response;

use actix_web::web::{delete, get, post, put, resource, scope, Data};
use actix_web::HttpServer;
use sqlx::postgres::PgPoolOptions;

use database::sqlx::PgSqlxManager;
use handlers::JWT_SECRET;
use impls::notifier::mail::MailApi;
use middlewares::jwt::JwtAuth;

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    dotenv::dotenv().ok();
    std::env::set_var("RUST_LOG", "actix_web=info");
    env_logger::init();
    let database_url = dotenv::var("DATABASE_URL").expect("environment variable DATABASE_URL not been set");
    let secret = dotenv::var(JWT_SECRET).expect("environment variable JWT_SECRET not been set");
    let mail_endpoint = dotenv::var("MAIL_API_URL").expect("environment variable MAIL_API_URL not been set");
    let mail_key = dotenv::var("MAIL_API_KEY").expect("environment variable MAIL_API_KEY not been set");
    let mail_from = dotenv::var("MAIL_FROM").expect("environment variable MAIL_FROM not been set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("failed to connect to database");
    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(JwtAuth::new(secret.clone().into_bytes()))
            .app_data(Data::new(PgSqlxManager::new(pool.clone())))
            .app_data(Data::new(MailApi::new(&mail_endpoint, &mail_key, &mail_from)))
            .service(resource("signup").route(post().to(handlers::signup::<MailApi>)))
            .service(resource("login").route(post().to(handlers::login)))
            .service(resource("logout").route(post().to(handlers::logout)))
            .service(
                scope("volunteer-works")
                    .route("", get().to(handlers::work::list))
                    .route("", post().to(handlers::work::create))
                    .route("my-works", get().to(handlers::work::my_works))
                    .route("participated", get().to(handlers::work::participated_works))
                    .service(
                        scope("{work_id}")
                            .route("", get().to(handlers::work::detail))
                            .route("", put().to(handlers::work::update))
                            .route("", delete().to(handlers::work::delete_work))
                            .route("has-reviewed", get().to(handlers::review::has_reviewed))
                            .route("average-rating", get().to(handlers::review::average_rating)),
                    ),
            )
            .service(
                scope("reviews")
                    .route("", get().to(handlers::review::list))
                    .route("", post().to(handlers::review::create))
                    .service(
                        scope("{review_id}")
                            .route("", put().to(handlers::review::update))
                            .route("", delete().to(handlers::review::delete_review)),
                    ),
            )
            .service(
                scope("join-requests")
                    .route("", get().to(handlers::join_request::list))
                    .route("", post().to(handlers::join_request::create))
                    .service(
                        scope("{request_id}")
                            .route("approve", post().to(handlers::join_request::approve))
                            .route("reject", post().to(handlers::join_request::reject)),
                    ),
            )
            .service(
                scope("categories")
                    .route("", get().to(handlers::category::list))
                    .route("", post().to(handlers::category::create))
                    .route("{slug}/works", get().to(handlers::work::by_category))
                    .service(
                        scope("{category_id}")
                            .route("", put().to(handlers::category::update))
                            .route("", delete().to(handlers::category::delete_category)),
                    ),
            )
            .service(
                scope("users")
                    .route("", get().to(handlers::user::list))
                    .route("edit", put().to(handlers::user::edit))
                    .route("{user_id}", get().to(handlers::user::detail)),
            )
    })
    .bind(("0.0.0.0", 8000))?
    .run()
    .await
}
