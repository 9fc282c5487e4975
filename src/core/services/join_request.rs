use crate::core::models::join_request::{Insert, JoinRequest, JoinRequestItem, Status};
use crate::core::ports::repository::{JoinRequestCommon, Store, TxStore, WorkCommon};
use crate::core::services::ensure_organizer;
use crate::error::Error;

pub async fn create<D>(db: &mut D, uid: i32, work_id: i32) -> Result<i32, Error>
where
    D: Store,
{
    WorkCommon::get(db, work_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("volunteer work {} not found", work_id)))?;
    // nothing stops a user from filing several requests for the same
    // work, matching the published behavior
    let id = JoinRequestCommon::insert(
        db,
        Insert {
            volunteer_work_id: work_id,
            user_id: uid,
        },
    )
    .await?;
    Ok(id)
}

pub async fn approve<T>(mut tx: T, uid: i32, request_id: i32) -> Result<(), Error>
where
    T: TxStore,
{
    let request = get_request(&mut tx, request_id).await?;
    let work = WorkCommon::get(&mut tx, request.volunteer_work_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("volunteer work {} not found", request.volunteer_work_id)))?;
    ensure_organizer(uid, &work)?;
    JoinRequestCommon::set_status(&mut tx, request_id, Status::Approved).await?;
    WorkCommon::add_participant(&mut tx, work.id, request.user_id).await?;
    tx.commit().await?;
    Ok(())
}

pub async fn reject<T>(mut tx: T, uid: i32, request_id: i32) -> Result<(), Error>
where
    T: TxStore,
{
    let request = get_request(&mut tx, request_id).await?;
    let work = WorkCommon::get(&mut tx, request.volunteer_work_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("volunteer work {} not found", request.volunteer_work_id)))?;
    ensure_organizer(uid, &work)?;
    JoinRequestCommon::set_status(&mut tx, request_id, Status::Rejected).await?;
    tx.commit().await?;
    Ok(())
}

// Organizers only ever see requests targeting their own works.
pub async fn list<D>(db: &mut D, uid: i32, page: i64, size: i64) -> Result<(Vec<JoinRequestItem>, i64), Error>
where
    D: Store,
{
    let total = JoinRequestCommon::count_for_organizer(db, uid).await?;
    let requests = JoinRequestCommon::query_for_organizer(db, uid, page, size).await?;
    Ok((requests, total))
}

async fn get_request<D>(db: &mut D, request_id: i32) -> Result<JoinRequest, Error>
where
    D: Store,
{
    JoinRequestCommon::get(db, request_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("join request {} not found", request_id)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::testing::MemStore;

    #[tokio::test]
    async fn test_create_is_pending() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let requester = store.seed_user("requester");
        let work_id = store.seed_work(organizer, "beach cleanup");

        let id = create(&mut store.clone(), requester, work_id).await.unwrap();
        let request = store.0.borrow().join_requests.get(&id).cloned().unwrap();
        assert_eq!(request.status, Status::Pending);
        assert_eq!(request.user_id, requester);
    }

    #[tokio::test]
    async fn test_create_for_missing_work() {
        let store = MemStore::new();
        let requester = store.seed_user("requester");
        let err = create(&mut store.clone(), requester, 999).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_approve_adds_participant() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let requester = store.seed_user("requester");
        let work_id = store.seed_work(organizer, "beach cleanup");
        let id = create(&mut store.clone(), requester, work_id).await.unwrap();

        approve(store.clone(), organizer, id).await.unwrap();

        let state = store.0.borrow();
        assert_eq!(state.join_requests.get(&id).unwrap().status, Status::Approved);
        assert!(state.participants.contains(&(work_id, requester)));
        assert!(state.committed);
    }

    #[tokio::test]
    async fn test_approve_twice_is_idempotent_on_membership() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let requester = store.seed_user("requester");
        let work_id = store.seed_work(organizer, "beach cleanup");
        let id = create(&mut store.clone(), requester, work_id).await.unwrap();

        approve(store.clone(), organizer, id).await.unwrap();
        approve(store.clone(), organizer, id).await.unwrap();

        let state = store.0.borrow();
        assert_eq!(state.join_requests.get(&id).unwrap().status, Status::Approved);
        assert_eq!(state.participants.iter().filter(|(w, u)| (*w, *u) == (work_id, requester)).count(), 1);
    }

    #[tokio::test]
    async fn test_approve_requires_organizer() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let requester = store.seed_user("requester");
        let stranger = store.seed_user("stranger");
        let work_id = store.seed_work(organizer, "beach cleanup");
        let id = create(&mut store.clone(), requester, work_id).await.unwrap();

        let err = approve(store.clone(), stranger, id).await.unwrap_err();
        assert!(matches!(err, Error::Permission(_)));

        let state = store.0.borrow();
        assert_eq!(state.join_requests.get(&id).unwrap().status, Status::Pending);
        assert!(!state.participants.contains(&(work_id, requester)));
    }

    #[tokio::test]
    async fn test_reject_requires_organizer() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let requester = store.seed_user("requester");
        let stranger = store.seed_user("stranger");
        let work_id = store.seed_work(organizer, "beach cleanup");
        let id = create(&mut store.clone(), requester, work_id).await.unwrap();

        let err = reject(store.clone(), stranger, id).await.unwrap_err();
        assert!(matches!(err, Error::Permission(_)));
        assert_eq!(store.0.borrow().join_requests.get(&id).unwrap().status, Status::Pending);
    }

    #[tokio::test]
    async fn test_reject_leaves_participants_alone() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let requester = store.seed_user("requester");
        let work_id = store.seed_work(organizer, "beach cleanup");
        let id = create(&mut store.clone(), requester, work_id).await.unwrap();

        reject(store.clone(), organizer, id).await.unwrap();

        let state = store.0.borrow();
        assert_eq!(state.join_requests.get(&id).unwrap().status, Status::Rejected);
        assert!(state.participants.is_empty());
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_organizer() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let other_organizer = store.seed_user("other");
        let requester = store.seed_user("requester");
        let mine = store.seed_work(organizer, "mine");
        let theirs = store.seed_work(other_organizer, "theirs");
        create(&mut store.clone(), requester, mine).await.unwrap();
        create(&mut store.clone(), requester, theirs).await.unwrap();

        let (requests, total) = list(&mut store.clone(), organizer, 1, 20).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].volunteer_work_id, mine);
        assert_eq!(requests[0].user, "requester");
    }

    #[tokio::test]
    async fn test_missing_request() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let err = approve(store.clone(), organizer, 42).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
