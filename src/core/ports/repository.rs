use crate::core::models::{
    category::{Category, Insert as CategoryInsert},
    join_request::{Insert as JoinRequestInsert, JoinRequest, JoinRequestItem, Status as JoinRequestStatus},
    review::{Insert as ReviewInsert, Patch as ReviewPatch, Query as ReviewQuery, Review, ReviewItem},
    user::{Insert as UserInsert, Patch as UserPatch, Profile, ProfilePatch, User},
    work::{Insert as WorkInsert, Query as WorkQuery, Update as WorkUpdate, Work, WorkItem},
};
use crate::error::Error;

pub trait UserCommon {
    async fn insert(&mut self, data: UserInsert) -> Result<i32, Error>;
    async fn get(&mut self, id: i32) -> Result<Option<User>, Error>;
    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error>;
    async fn username_exists(&mut self, username: &str) -> Result<bool, Error>;
    async fn update(&mut self, id: i32, patch: UserPatch) -> Result<(), Error>;
    async fn query(&mut self, page: i64, size: i64) -> Result<Vec<User>, Error>;
    async fn count(&mut self) -> Result<i64, Error>;
    async fn get_profile(&mut self, user_id: i32) -> Result<Option<Profile>, Error>;
    async fn upsert_profile(&mut self, user_id: i32, patch: ProfilePatch) -> Result<(), Error>;
}

pub trait WorkCommon {
    async fn insert(&mut self, data: WorkInsert) -> Result<i32, Error>;
    async fn get(&mut self, id: i32) -> Result<Option<Work>, Error>;
    async fn get_item(&mut self, id: i32) -> Result<Option<WorkItem>, Error>;
    async fn query(&mut self, param: &WorkQuery, page: i64, size: i64) -> Result<Vec<WorkItem>, Error>;
    async fn count(&mut self, param: &WorkQuery) -> Result<i64, Error>;
    async fn update(&mut self, id: i32, data: WorkUpdate) -> Result<(), Error>;
    async fn delete(&mut self, id: i32) -> Result<(), Error>;
    // must stay idempotent: approving twice may not duplicate membership
    async fn add_participant(&mut self, id: i32, uid: i32) -> Result<(), Error>;
    async fn participants(&mut self, id: i32) -> Result<Vec<i32>, Error>;
}

pub trait ReviewCommon {
    async fn insert(&mut self, data: ReviewInsert) -> Result<i32, Error>;
    async fn get(&mut self, id: i32) -> Result<Option<Review>, Error>;
    async fn exists(&mut self, work_id: i32, user_id: i32) -> Result<bool, Error>;
    async fn query(&mut self, param: &ReviewQuery, page: i64, size: i64) -> Result<Vec<ReviewItem>, Error>;
    async fn count(&mut self, param: &ReviewQuery) -> Result<i64, Error>;
    async fn update(&mut self, id: i32, patch: ReviewPatch) -> Result<(), Error>;
    async fn delete(&mut self, id: i32) -> Result<(), Error>;
    async fn average_rating(&mut self, work_id: i32) -> Result<f64, Error>;
}

pub trait JoinRequestCommon {
    async fn insert(&mut self, data: JoinRequestInsert) -> Result<i32, Error>;
    async fn get(&mut self, id: i32) -> Result<Option<JoinRequest>, Error>;
    async fn query_for_organizer(&mut self, organizer_id: i32, page: i64, size: i64) -> Result<Vec<JoinRequestItem>, Error>;
    async fn count_for_organizer(&mut self, organizer_id: i32) -> Result<i64, Error>;
    async fn set_status(&mut self, id: i32, status: JoinRequestStatus) -> Result<(), Error>;
}

pub trait CategoryCommon {
    async fn insert(&mut self, data: CategoryInsert) -> Result<i32, Error>;
    async fn get(&mut self, id: i32) -> Result<Option<Category>, Error>;
    async fn get_by_slug(&mut self, slug: &str) -> Result<Option<Category>, Error>;
    async fn list(&mut self) -> Result<Vec<Category>, Error>;
    async fn update(&mut self, id: i32, data: CategoryInsert) -> Result<(), Error>;
    async fn delete(&mut self, id: i32) -> Result<(), Error>;
    async fn name_or_slug_exists(&mut self, name: &str, slug: &str) -> Result<bool, Error>;
}

pub trait Store: UserCommon + WorkCommon + ReviewCommon + JoinRequestCommon + CategoryCommon {}

pub trait TxStore: Store {
    async fn commit(self) -> Result<(), Error>;
    async fn rollback(self) -> Result<(), Error>;
}
