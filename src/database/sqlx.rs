use sqlx::pool::PoolConnection;
use sqlx::{query, query_as, query_scalar, Executor, PgPool, Postgres, Transaction};

use crate::core::models::{
    category::{Category, Insert as CategoryInsert},
    join_request::{Insert as JoinRequestInsert, JoinRequest, JoinRequestItem, Status as JoinRequestStatus},
    review::{Insert as ReviewInsert, Patch as ReviewPatch, Query as ReviewQuery, Review, ReviewItem},
    user::{Insert as UserInsert, Patch as UserPatch, Profile, ProfilePatch, User},
    work::{Insert as WorkInsert, Query as WorkQuery, Update as WorkUpdate, Work, WorkItem},
};
use crate::core::ports::repository::{CategoryCommon, JoinRequestCommon, ReviewCommon, Store, TxStore, UserCommon, WorkCommon};
use crate::error::Error;

pub struct PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    executor: E,
}

impl<E> PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

impl<E> UserCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, data: UserInsert) -> Result<i32, Error> {
        let id = query_scalar(
            "INSERT INTO users (username, email, password, salt, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id",
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.password)
        .bind(data.salt)
        .bind(data.first_name)
        .bind(data.last_name)
        .fetch_one(&mut self.executor)
        .await?;
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Option<User>, Error> {
        let user = query_as("SELECT * FROM users WHERE id = $1").bind(id).fetch_optional(&mut self.executor).await?;
        Ok(user)
    }

    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error> {
        let user = query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(user)
    }

    async fn username_exists(&mut self, username: &str) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT * FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }

    async fn update(&mut self, id: i32, patch: UserPatch) -> Result<(), Error> {
        query(
            "UPDATE users
            SET username = COALESCE($1, username),
                email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name)
            WHERE id = $5",
        )
        .bind(patch.username)
        .bind(patch.email)
        .bind(patch.first_name)
        .bind(patch.last_name)
        .bind(id)
        .execute(&mut self.executor)
        .await?;
        Ok(())
    }

    async fn query(&mut self, page: i64, size: i64) -> Result<Vec<User>, Error> {
        let users = query_as("SELECT * FROM users ORDER BY id LIMIT $1 OFFSET $2")
            .bind(size)
            .bind((page - 1) * size)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(users)
    }

    async fn count(&mut self) -> Result<i64, Error> {
        let total = query_scalar("SELECT COUNT(*) FROM users").fetch_one(&mut self.executor).await?;
        Ok(total)
    }

    async fn get_profile(&mut self, user_id: i32) -> Result<Option<Profile>, Error> {
        let profile = query_as("SELECT bio, profile_picture, contact_info FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(profile)
    }

    async fn upsert_profile(&mut self, user_id: i32, patch: ProfilePatch) -> Result<(), Error> {
        query(
            "INSERT INTO profiles (user_id, bio, profile_picture, contact_info)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET bio = COALESCE($2, profiles.bio),
                profile_picture = COALESCE($3, profiles.profile_picture),
                contact_info = COALESCE($4, profiles.contact_info)",
        )
        .bind(user_id)
        .bind(patch.bio)
        .bind(patch.profile_picture)
        .bind(patch.contact_info)
        .execute(&mut self.executor)
        .await?;
        Ok(())
    }
}

impl<E> WorkCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, data: WorkInsert) -> Result<i32, Error> {
        let id = query_scalar(
            "INSERT INTO volunteer_works (title, description, image_url, location, date, organizer_id, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id",
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.image_url)
        .bind(data.location)
        .bind(data.date)
        .bind(data.organizer_id)
        .bind(data.category_id)
        .fetch_one(&mut self.executor)
        .await?;
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Option<Work>, Error> {
        let work = query_as("SELECT * FROM volunteer_works WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(work)
    }

    async fn get_item(&mut self, id: i32) -> Result<Option<WorkItem>, Error> {
        let item = query_as(
            "SELECT
                w.id, w.title, w.description, w.image_url, w.location, w.date,
                u.username AS organizer, w.organizer_id, w.category_id,
                COALESCE(AVG(r.rating), 0)::FLOAT8 AS average_rating
            FROM volunteer_works AS w
            JOIN users AS u ON w.organizer_id = u.id
            LEFT JOIN reviews AS r ON w.id = r.volunteer_work_id
            WHERE w.id = $1
            GROUP BY w.id, u.username",
        )
        .bind(id)
        .fetch_optional(&mut self.executor)
        .await?;
        Ok(item)
    }

    async fn query(&mut self, param: &WorkQuery, page: i64, size: i64) -> Result<Vec<WorkItem>, Error> {
        let works = query_as(
            "SELECT
                w.id, w.title, w.description, w.image_url, w.location, w.date,
                u.username AS organizer, w.organizer_id, w.category_id,
                COALESCE(AVG(r.rating), 0)::FLOAT8 AS average_rating
            FROM volunteer_works AS w
            JOIN users AS u ON w.organizer_id = u.id
            LEFT JOIN reviews AS r ON w.id = r.volunteer_work_id
            WHERE ($1::INT4 IS NULL OR w.organizer_id = $1)
            AND ($2::INT4 IS NULL OR w.category_id = $2)
            AND ($3::INT4 IS NULL OR w.id IN (SELECT volunteer_work_id FROM participants WHERE user_id = $3))
            GROUP BY w.id, u.username
            ORDER BY w.date
            LIMIT $4
            OFFSET $5",
        )
        .bind(param.organizer_id)
        .bind(param.category_id)
        .bind(param.participant_id)
        .bind(size)
        .bind((page - 1) * size)
        .fetch_all(&mut self.executor)
        .await?;
        Ok(works)
    }

    async fn count(&mut self, param: &WorkQuery) -> Result<i64, Error> {
        let total = query_scalar(
            "SELECT COUNT(*)
            FROM volunteer_works AS w
            WHERE ($1::INT4 IS NULL OR w.organizer_id = $1)
            AND ($2::INT4 IS NULL OR w.category_id = $2)
            AND ($3::INT4 IS NULL OR w.id IN (SELECT volunteer_work_id FROM participants WHERE user_id = $3))",
        )
        .bind(param.organizer_id)
        .bind(param.category_id)
        .bind(param.participant_id)
        .fetch_one(&mut self.executor)
        .await?;
        Ok(total)
    }

    async fn update(&mut self, id: i32, data: WorkUpdate) -> Result<(), Error> {
        query(
            "UPDATE volunteer_works
            SET title = $1, description = $2, image_url = $3, location = $4, date = $5, category_id = $6
            WHERE id = $7",
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.image_url)
        .bind(data.location)
        .bind(data.date)
        .bind(data.category_id)
        .bind(id)
        .execute(&mut self.executor)
        .await?;
        Ok(())
    }

    async fn delete(&mut self, id: i32) -> Result<(), Error> {
        // reviews, join requests and participants go with it (ON DELETE CASCADE)
        query("DELETE FROM volunteer_works WHERE id = $1").bind(id).execute(&mut self.executor).await?;
        Ok(())
    }

    async fn add_participant(&mut self, id: i32, uid: i32) -> Result<(), Error> {
        query("INSERT INTO participants (volunteer_work_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(id)
            .bind(uid)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }

    async fn participants(&mut self, id: i32) -> Result<Vec<i32>, Error> {
        let uids = query_scalar("SELECT user_id FROM participants WHERE volunteer_work_id = $1 ORDER BY user_id")
            .bind(id)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(uids)
    }
}

impl<E> ReviewCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, data: ReviewInsert) -> Result<i32, Error> {
        let id = query_scalar(
            "INSERT INTO reviews (volunteer_work_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id",
        )
        .bind(data.volunteer_work_id)
        .bind(data.user_id)
        .bind(data.rating)
        .bind(data.comment)
        .fetch_one(&mut self.executor)
        .await?;
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Option<Review>, Error> {
        let review = query_as("SELECT * FROM reviews WHERE id = $1").bind(id).fetch_optional(&mut self.executor).await?;
        Ok(review)
    }

    async fn exists(&mut self, work_id: i32, user_id: i32) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT * FROM reviews WHERE volunteer_work_id = $1 AND user_id = $2)")
            .bind(work_id)
            .bind(user_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }

    async fn query(&mut self, param: &ReviewQuery, page: i64, size: i64) -> Result<Vec<ReviewItem>, Error> {
        let reviews = query_as(
            "SELECT
                r.id, r.volunteer_work_id, u.username AS \"user\", r.rating,
                REPEAT('⭐', r.rating) AS rating_display, r.comment, r.created_at
            FROM reviews AS r
            JOIN users AS u ON r.user_id = u.id
            WHERE ($1::INT4 IS NULL OR r.volunteer_work_id = $1)
            AND ($2::INT4 IS NULL OR r.user_id = $2)
            ORDER BY r.created_at DESC
            LIMIT $3
            OFFSET $4",
        )
        .bind(param.volunteer_work_id)
        .bind(param.user_id)
        .bind(size)
        .bind((page - 1) * size)
        .fetch_all(&mut self.executor)
        .await?;
        Ok(reviews)
    }

    async fn count(&mut self, param: &ReviewQuery) -> Result<i64, Error> {
        let total = query_scalar(
            "SELECT COUNT(*)
            FROM reviews
            WHERE ($1::INT4 IS NULL OR volunteer_work_id = $1)
            AND ($2::INT4 IS NULL OR user_id = $2)",
        )
        .bind(param.volunteer_work_id)
        .bind(param.user_id)
        .fetch_one(&mut self.executor)
        .await?;
        Ok(total)
    }

    async fn update(&mut self, id: i32, patch: ReviewPatch) -> Result<(), Error> {
        query(
            "UPDATE reviews
            SET rating = COALESCE($1, rating), comment = COALESCE($2, comment)
            WHERE id = $3",
        )
        .bind(patch.rating)
        .bind(patch.comment)
        .bind(id)
        .execute(&mut self.executor)
        .await?;
        Ok(())
    }

    async fn delete(&mut self, id: i32) -> Result<(), Error> {
        query("DELETE FROM reviews WHERE id = $1").bind(id).execute(&mut self.executor).await?;
        Ok(())
    }

    async fn average_rating(&mut self, work_id: i32) -> Result<f64, Error> {
        let avg = query_scalar("SELECT COALESCE(AVG(rating), 0)::FLOAT8 FROM reviews WHERE volunteer_work_id = $1")
            .bind(work_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(avg)
    }
}

impl<E> JoinRequestCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, data: JoinRequestInsert) -> Result<i32, Error> {
        let id = query_scalar(
            "INSERT INTO join_requests (volunteer_work_id, user_id, status)
            VALUES ($1, $2, 'pending')
            RETURNING id",
        )
        .bind(data.volunteer_work_id)
        .bind(data.user_id)
        .fetch_one(&mut self.executor)
        .await?;
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Option<JoinRequest>, Error> {
        let request = query_as("SELECT * FROM join_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(request)
    }

    async fn query_for_organizer(&mut self, organizer_id: i32, page: i64, size: i64) -> Result<Vec<JoinRequestItem>, Error> {
        let requests = query_as(
            "SELECT
                j.id, j.volunteer_work_id, w.title AS volunteer_work_title,
                u.username AS \"user\", j.status, j.created_at
            FROM join_requests AS j
            JOIN volunteer_works AS w ON j.volunteer_work_id = w.id
            JOIN users AS u ON j.user_id = u.id
            WHERE w.organizer_id = $1
            ORDER BY j.created_at DESC
            LIMIT $2
            OFFSET $3",
        )
        .bind(organizer_id)
        .bind(size)
        .bind((page - 1) * size)
        .fetch_all(&mut self.executor)
        .await?;
        Ok(requests)
    }

    async fn count_for_organizer(&mut self, organizer_id: i32) -> Result<i64, Error> {
        let total = query_scalar(
            "SELECT COUNT(*)
            FROM join_requests AS j
            JOIN volunteer_works AS w ON j.volunteer_work_id = w.id
            WHERE w.organizer_id = $1",
        )
        .bind(organizer_id)
        .fetch_one(&mut self.executor)
        .await?;
        Ok(total)
    }

    async fn set_status(&mut self, id: i32, status: JoinRequestStatus) -> Result<(), Error> {
        query("UPDATE join_requests SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }
}

impl<E> CategoryCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, data: CategoryInsert) -> Result<i32, Error> {
        let id = query_scalar("INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING id")
            .bind(data.name)
            .bind(data.slug)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Option<Category>, Error> {
        let category = query_as("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(category)
    }

    async fn get_by_slug(&mut self, slug: &str) -> Result<Option<Category>, Error> {
        let category = query_as("SELECT * FROM categories WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(category)
    }

    async fn list(&mut self) -> Result<Vec<Category>, Error> {
        let categories = query_as("SELECT * FROM categories ORDER BY name").fetch_all(&mut self.executor).await?;
        Ok(categories)
    }

    async fn update(&mut self, id: i32, data: CategoryInsert) -> Result<(), Error> {
        query("UPDATE categories SET name = $1, slug = $2 WHERE id = $3")
            .bind(data.name)
            .bind(data.slug)
            .bind(id)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }

    async fn delete(&mut self, id: i32) -> Result<(), Error> {
        query("DELETE FROM categories WHERE id = $1").bind(id).execute(&mut self.executor).await?;
        Ok(())
    }

    async fn name_or_slug_exists(&mut self, name: &str, slug: &str) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT * FROM categories WHERE name = $1 OR slug = $2)")
            .bind(name)
            .bind(slug)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }
}

impl Store for PgSqlx<PoolConnection<Postgres>> {}
impl Store for PgSqlx<Transaction<'static, Postgres>> {}

impl TxStore for PgSqlx<Transaction<'static, Postgres>> {
    async fn commit(self) -> Result<(), Error> {
        self.executor.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        self.executor.rollback().await?;
        Ok(())
    }
}

pub struct PgSqlxManager {
    pool: PgPool,
}

impl PgSqlxManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn acquire(&self) -> Result<PgSqlx<PoolConnection<Postgres>>, Error> {
        let conn = self.pool.acquire().await?;
        Ok(PgSqlx::new(conn))
    }

    pub async fn begin(&self) -> Result<PgSqlx<Transaction<'static, Postgres>>, Error> {
        let tx = self.pool.begin().await?;
        Ok(PgSqlx::new(tx))
    }
}
