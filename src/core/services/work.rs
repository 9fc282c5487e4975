use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::work::{Insert, Query, Update, WorkItem};
use crate::core::ports::repository::{CategoryCommon, Store, WorkCommon};
use crate::core::services::ensure_organizer;
use crate::error::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct Payload {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub location: String,
    pub date: DateTime<Utc>,
    pub category_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct WorkDetail {
    #[serde(flatten)]
    pub work: WorkItem,
    pub participants: Vec<i32>,
}

async fn check_category<D>(db: &mut D, category_id: Option<i32>) -> Result<(), Error>
where
    D: Store,
{
    if let Some(id) = category_id {
        CategoryCommon::get(db, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("category {} not found", id)))?;
    }
    Ok(())
}

pub async fn create<D>(db: &mut D, uid: i32, data: Payload) -> Result<i32, Error>
where
    D: Store,
{
    check_category(db, data.category_id).await?;
    let id = WorkCommon::insert(
        db,
        Insert {
            title: data.title,
            description: data.description,
            image_url: data.image_url,
            location: data.location,
            date: data.date,
            organizer_id: uid,
            category_id: data.category_id,
        },
    )
    .await?;
    Ok(id)
}

pub async fn update<D>(db: &mut D, uid: i32, id: i32, data: Payload) -> Result<(), Error>
where
    D: Store,
{
    let work = WorkCommon::get(db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("volunteer work {} not found", id)))?;
    ensure_organizer(uid, &work)?;
    check_category(db, data.category_id).await?;
    WorkCommon::update(
        db,
        id,
        Update {
            title: data.title,
            description: data.description,
            image_url: data.image_url,
            location: data.location,
            date: data.date,
            category_id: data.category_id,
        },
    )
    .await?;
    Ok(())
}

pub async fn delete<D>(db: &mut D, uid: i32, id: i32) -> Result<(), Error>
where
    D: Store,
{
    let work = WorkCommon::get(db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("volunteer work {} not found", id)))?;
    ensure_organizer(uid, &work)?;
    WorkCommon::delete(db, id).await?;
    Ok(())
}

pub async fn list<D>(db: &mut D, query: Query, page: i64, size: i64) -> Result<(Vec<WorkItem>, i64), Error>
where
    D: Store,
{
    let total = WorkCommon::count(db, &query).await?;
    let works = WorkCommon::query(db, &query, page, size).await?;
    Ok((works, total))
}

pub async fn detail<D>(db: &mut D, id: i32) -> Result<WorkDetail, Error>
where
    D: Store,
{
    let work = WorkCommon::get_item(db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("volunteer work {} not found", id)))?;
    let participants = WorkCommon::participants(db, id).await?;
    Ok(WorkDetail { work, participants })
}

pub async fn my_works<D>(db: &mut D, uid: i32, page: i64, size: i64) -> Result<(Vec<WorkItem>, i64), Error>
where
    D: Store,
{
    list(
        db,
        Query {
            organizer_id: Some(uid),
            ..Default::default()
        },
        page,
        size,
    )
    .await
}

pub async fn participated_works<D>(db: &mut D, uid: i32, page: i64, size: i64) -> Result<(Vec<WorkItem>, i64), Error>
where
    D: Store,
{
    list(
        db,
        Query {
            participant_id: Some(uid),
            ..Default::default()
        },
        page,
        size,
    )
    .await
}

pub async fn by_category_slug<D>(db: &mut D, slug: &str, page: i64, size: i64) -> Result<(Vec<WorkItem>, i64), Error>
where
    D: Store,
{
    let category = CategoryCommon::get_by_slug(db, slug)
        .await?
        .ok_or_else(|| Error::NotFound(format!("category {} not found", slug)))?;
    list(
        db,
        Query {
            category_id: Some(category.id),
            ..Default::default()
        },
        page,
        size,
    )
    .await
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::testing::MemStore;

    fn payload(title: &str) -> Payload {
        Payload {
            title: title.into(),
            description: "desc".into(),
            image_url: None,
            location: "park".into(),
            date: Utc::now(),
            category_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_sets_organizer() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let id = create(&mut store.clone(), organizer, payload("river cleanup")).await.unwrap();
        assert_eq!(store.0.borrow().works.get(&id).unwrap().organizer_id, organizer);
    }

    #[tokio::test]
    async fn test_update_requires_organizer() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let stranger = store.seed_user("stranger");
        let id = store.seed_work(organizer, "river cleanup");

        let err = update(&mut store.clone(), stranger, id, payload("hijacked")).await.unwrap_err();
        assert!(matches!(err, Error::Permission(_)));
        assert_eq!(store.0.borrow().works.get(&id).unwrap().title, "river cleanup");
    }

    #[tokio::test]
    async fn test_delete_requires_organizer() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let stranger = store.seed_user("stranger");
        let id = store.seed_work(organizer, "river cleanup");

        let err = delete(&mut store.clone(), stranger, id).await.unwrap_err();
        assert!(matches!(err, Error::Permission(_)));
        assert!(store.0.borrow().works.contains_key(&id));

        delete(&mut store.clone(), organizer, id).await.unwrap();
        assert!(!store.0.borrow().works.contains_key(&id));
    }

    #[tokio::test]
    async fn test_update_with_unknown_category() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let id = store.seed_work(organizer, "river cleanup");
        let mut data = payload("river cleanup");
        data.category_id = Some(777);
        let err = update(&mut store.clone(), organizer, id, data).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_detail_carries_participants_and_rating() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let alice = store.seed_user("alice");
        let id = store.seed_work(organizer, "river cleanup");
        store.0.borrow_mut().participants.insert((id, alice));
        crate::core::services::review::submit(&mut store.clone(), alice, id, 5, None).await.unwrap();

        let detail = detail(&mut store.clone(), id).await.unwrap();
        assert_eq!(detail.participants, vec![alice]);
        assert_eq!(detail.work.average_rating, 5.0);
        assert_eq!(detail.work.organizer, "organizer");
    }

    #[tokio::test]
    async fn test_my_and_participated_works() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let alice = store.seed_user("alice");
        let mine = store.seed_work(organizer, "mine");
        let joined = store.seed_work(alice, "joined");
        store.0.borrow_mut().participants.insert((joined, organizer));

        let (works, total) = my_works(&mut store.clone(), organizer, 1, 20).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(works[0].id, mine);

        let (works, total) = participated_works(&mut store.clone(), organizer, 1, 20).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(works[0].id, joined);
    }
}
