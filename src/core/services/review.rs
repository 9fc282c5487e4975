use crate::core::models::review::{Insert, Patch, Query, Review, ReviewItem};
use crate::core::ports::repository::{ReviewCommon, Store, WorkCommon};
use crate::core::services::ensure_review_author;
use crate::error::Error;

fn validate_rating(rating: i32) -> Result<(), Error> {
    if !(1..=5).contains(&rating) {
        return Err(Error::Validation(format!("rating must be between 1 and 5, got {}", rating)));
    }
    Ok(())
}

pub async fn submit<D>(db: &mut D, uid: i32, work_id: i32, rating: i32, comment: Option<String>) -> Result<i32, Error>
where
    D: Store,
{
    validate_rating(rating)?;
    WorkCommon::get(db, work_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("volunteer work {} not found", work_id)))?;
    if ReviewCommon::exists(db, work_id, uid).await? {
        return Err(Error::Conflict("you have already reviewed this volunteer work".into()));
    }
    // the unique index on (volunteer_work_id, user_id) backstops this
    // pre-check against concurrent submits
    let id = ReviewCommon::insert(
        db,
        Insert {
            volunteer_work_id: work_id,
            user_id: uid,
            rating,
            comment,
        },
    )
    .await?;
    Ok(id)
}

pub async fn update<D>(db: &mut D, uid: i32, review_id: i32, patch: Patch) -> Result<(), Error>
where
    D: Store,
{
    let review = get_review(db, review_id).await?;
    ensure_review_author(uid, &review)?;
    if let Some(rating) = patch.rating {
        validate_rating(rating)?;
    }
    ReviewCommon::update(db, review_id, patch).await?;
    Ok(())
}

pub async fn delete<D>(db: &mut D, uid: i32, review_id: i32) -> Result<(), Error>
where
    D: Store,
{
    let review = get_review(db, review_id).await?;
    ensure_review_author(uid, &review)?;
    ReviewCommon::delete(db, review_id).await?;
    Ok(())
}

pub async fn list<D>(db: &mut D, query: Query, page: i64, size: i64) -> Result<(Vec<ReviewItem>, i64), Error>
where
    D: Store,
{
    let total = ReviewCommon::count(db, &query).await?;
    let reviews = ReviewCommon::query(db, &query, page, size).await?;
    Ok((reviews, total))
}

// 0 with no reviews, by contract; never null.
pub async fn average<D>(db: &mut D, work_id: i32) -> Result<f64, Error>
where
    D: Store,
{
    ReviewCommon::average_rating(db, work_id).await
}

pub async fn has_reviewed<D>(db: &mut D, uid: i32, work_id: i32) -> Result<bool, Error>
where
    D: Store,
{
    ReviewCommon::exists(db, work_id, uid).await
}

async fn get_review<D>(db: &mut D, review_id: i32) -> Result<Review, Error>
where
    D: Store,
{
    ReviewCommon::get(db, review_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("review {} not found", review_id)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::testing::MemStore;

    #[tokio::test]
    async fn test_average_of_no_reviews_is_zero() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let work_id = store.seed_work(organizer, "tree planting");
        assert_eq!(average(&mut store.clone(), work_id).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_average_of_three_and_five_is_four() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let alice = store.seed_user("alice");
        let bob = store.seed_user("bob");
        let work_id = store.seed_work(organizer, "tree planting");

        submit(&mut store.clone(), alice, work_id, 3, None).await.unwrap();
        submit(&mut store.clone(), bob, work_id, 5, Some("great".into())).await.unwrap();

        assert_eq!(average(&mut store.clone(), work_id).await.unwrap(), 4.0);
    }

    #[tokio::test]
    async fn test_second_review_conflicts() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let alice = store.seed_user("alice");
        let work_id = store.seed_work(organizer, "tree planting");

        submit(&mut store.clone(), alice, work_id, 4, None).await.unwrap();
        let err = submit(&mut store.clone(), alice, work_id, 2, None).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.0.borrow().reviews.len(), 1);
    }

    #[tokio::test]
    async fn test_rating_out_of_range() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let alice = store.seed_user("alice");
        let work_id = store.seed_work(organizer, "tree planting");

        for rating in [0, 6, -1] {
            let err = submit(&mut store.clone(), alice, work_id, rating, None).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
        assert!(store.0.borrow().reviews.is_empty());
    }

    #[tokio::test]
    async fn test_submit_for_missing_work() {
        let store = MemStore::new();
        let alice = store.seed_user("alice");
        let err = submit(&mut store.clone(), alice, 999, 3, None).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_requires_author() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let alice = store.seed_user("alice");
        let bob = store.seed_user("bob");
        let work_id = store.seed_work(organizer, "tree planting");
        let id = submit(&mut store.clone(), alice, work_id, 4, None).await.unwrap();

        let err = update(
            &mut store.clone(),
            bob,
            id,
            Patch {
                rating: Some(1),
                comment: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Permission(_)));
        assert_eq!(store.0.borrow().reviews.get(&id).unwrap().rating, 4);
    }

    #[tokio::test]
    async fn test_update_revalidates_rating() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let alice = store.seed_user("alice");
        let work_id = store.seed_work(organizer, "tree planting");
        let id = submit(&mut store.clone(), alice, work_id, 4, None).await.unwrap();

        let err = update(
            &mut store.clone(),
            alice,
            id,
            Patch {
                rating: Some(9),
                comment: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_requires_author() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let alice = store.seed_user("alice");
        let bob = store.seed_user("bob");
        let work_id = store.seed_work(organizer, "tree planting");
        let id = submit(&mut store.clone(), alice, work_id, 4, None).await.unwrap();

        let err = delete(&mut store.clone(), bob, id).await.unwrap_err();
        assert!(matches!(err, Error::Permission(_)));

        delete(&mut store.clone(), alice, id).await.unwrap();
        assert!(store.0.borrow().reviews.is_empty());
    }

    #[tokio::test]
    async fn test_has_reviewed() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let alice = store.seed_user("alice");
        let work_id = store.seed_work(organizer, "tree planting");

        assert!(!has_reviewed(&mut store.clone(), alice, work_id).await.unwrap());
        submit(&mut store.clone(), alice, work_id, 5, None).await.unwrap();
        assert!(has_reviewed(&mut store.clone(), alice, work_id).await.unwrap());
    }
}
