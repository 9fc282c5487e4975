use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use chrono::Utc;

use crate::core::models::{
    category::{Category, Insert as CategoryInsert},
    join_request::{Insert as JoinRequestInsert, JoinRequest, JoinRequestItem, Status as JoinRequestStatus},
    review::{Insert as ReviewInsert, Patch as ReviewPatch, Query as ReviewQuery, Review, ReviewItem},
    user::{Insert as UserInsert, Patch as UserPatch, Profile, ProfilePatch, User},
    work::{Insert as WorkInsert, Query as WorkQuery, Update as WorkUpdate, Work, WorkItem},
};
use crate::core::ports::notifier::Notifier;
use crate::core::ports::repository::{CategoryCommon, JoinRequestCommon, ReviewCommon, Store, TxStore, UserCommon, WorkCommon};
use crate::error::Error;

#[derive(Debug, Default)]
pub struct MemState {
    pub users: BTreeMap<i32, User>,
    pub profiles: BTreeMap<i32, Profile>,
    pub works: BTreeMap<i32, Work>,
    pub participants: HashSet<(i32, i32)>,
    pub reviews: BTreeMap<i32, Review>,
    pub join_requests: BTreeMap<i32, JoinRequest>,
    pub categories: BTreeMap<i32, Category>,
    pub committed: bool,
    next_id: i32,
}

impl MemState {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn username(&self, id: i32) -> String {
        self.users.get(&id).map(|u| u.username.clone()).unwrap_or_default()
    }
}

// In-memory stand-in for the Postgres store. Mirrors the schema-level
// behavior the services lean on: unique usernames, the one-review-per
// (work, user) constraint and set semantics for participants.
#[derive(Debug, Clone, Default)]
pub struct MemStore(pub Rc<RefCell<MemState>>);

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_user(&self, username: &str) -> i32 {
        let mut s = self.0.borrow_mut();
        let id = s.next_id();
        s.users.insert(
            id,
            User {
                id,
                username: username.into(),
                email: format!("{}@example.com", username),
                password: String::new(),
                salt: String::new(),
                first_name: username.into(),
                last_name: "tester".into(),
            },
        );
        id
    }

    pub fn seed_work(&self, organizer_id: i32, title: &str) -> i32 {
        let mut s = self.0.borrow_mut();
        let id = s.next_id();
        s.works.insert(
            id,
            Work {
                id,
                title: title.into(),
                description: "seeded".into(),
                image_url: None,
                location: "somewhere".into(),
                date: Utc::now(),
                organizer_id,
                category_id: None,
            },
        );
        id
    }
}

impl UserCommon for MemStore {
    async fn insert(&mut self, data: UserInsert) -> Result<i32, Error> {
        let mut s = self.0.borrow_mut();
        if s.users.values().any(|u| u.username == data.username) {
            return Err(Error::Conflict("duplicate record".into()));
        }
        let id = s.next_id();
        s.users.insert(
            id,
            User {
                id,
                username: data.username,
                email: data.email,
                password: data.password,
                salt: data.salt,
                first_name: data.first_name,
                last_name: data.last_name,
            },
        );
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Option<User>, Error> {
        Ok(self.0.borrow().users.get(&id).cloned())
    }

    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error> {
        Ok(self.0.borrow().users.values().find(|u| u.username == username).cloned())
    }

    async fn username_exists(&mut self, username: &str) -> Result<bool, Error> {
        Ok(self.0.borrow().users.values().any(|u| u.username == username))
    }

    async fn update(&mut self, id: i32, patch: UserPatch) -> Result<(), Error> {
        let mut s = self.0.borrow_mut();
        if let Some(user) = s.users.get_mut(&id) {
            if let Some(username) = patch.username {
                user.username = username;
            }
            if let Some(email) = patch.email {
                user.email = email;
            }
            if let Some(first_name) = patch.first_name {
                user.first_name = first_name;
            }
            if let Some(last_name) = patch.last_name {
                user.last_name = last_name;
            }
        }
        Ok(())
    }

    async fn query(&mut self, page: i64, size: i64) -> Result<Vec<User>, Error> {
        let s = self.0.borrow();
        Ok(s.users.values().skip(((page - 1) * size) as usize).take(size as usize).cloned().collect())
    }

    async fn count(&mut self) -> Result<i64, Error> {
        Ok(self.0.borrow().users.len() as i64)
    }

    async fn get_profile(&mut self, user_id: i32) -> Result<Option<Profile>, Error> {
        Ok(self.0.borrow().profiles.get(&user_id).cloned())
    }

    async fn upsert_profile(&mut self, user_id: i32, patch: ProfilePatch) -> Result<(), Error> {
        let mut s = self.0.borrow_mut();
        let profile = s.profiles.entry(user_id).or_default();
        if let Some(bio) = patch.bio {
            profile.bio = Some(bio);
        }
        if let Some(picture) = patch.profile_picture {
            profile.profile_picture = Some(picture);
        }
        if let Some(contact) = patch.contact_info {
            profile.contact_info = Some(contact);
        }
        Ok(())
    }
}

impl WorkCommon for MemStore {
    async fn insert(&mut self, data: WorkInsert) -> Result<i32, Error> {
        let mut s = self.0.borrow_mut();
        let id = s.next_id();
        s.works.insert(
            id,
            Work {
                id,
                title: data.title,
                description: data.description,
                image_url: data.image_url,
                location: data.location,
                date: data.date,
                organizer_id: data.organizer_id,
                category_id: data.category_id,
            },
        );
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Option<Work>, Error> {
        Ok(self.0.borrow().works.get(&id).cloned())
    }

    async fn get_item(&mut self, id: i32) -> Result<Option<WorkItem>, Error> {
        let s = self.0.borrow();
        Ok(s.works.get(&id).map(|w| item_of(&s, w)))
    }

    async fn query(&mut self, param: &WorkQuery, page: i64, size: i64) -> Result<Vec<WorkItem>, Error> {
        let s = self.0.borrow();
        Ok(s.works
            .values()
            .filter(|w| matches_work(&s, w, param))
            .skip(((page - 1) * size) as usize)
            .take(size as usize)
            .map(|w| item_of(&s, w))
            .collect())
    }

    async fn count(&mut self, param: &WorkQuery) -> Result<i64, Error> {
        let s = self.0.borrow();
        Ok(s.works.values().filter(|w| matches_work(&s, w, param)).count() as i64)
    }

    async fn update(&mut self, id: i32, data: WorkUpdate) -> Result<(), Error> {
        let mut s = self.0.borrow_mut();
        if let Some(work) = s.works.get_mut(&id) {
            work.title = data.title;
            work.description = data.description;
            work.image_url = data.image_url;
            work.location = data.location;
            work.date = data.date;
            work.category_id = data.category_id;
        }
        Ok(())
    }

    async fn delete(&mut self, id: i32) -> Result<(), Error> {
        let mut s = self.0.borrow_mut();
        s.works.remove(&id);
        s.reviews.retain(|_, r| r.volunteer_work_id != id);
        s.join_requests.retain(|_, j| j.volunteer_work_id != id);
        s.participants.retain(|(work_id, _)| *work_id != id);
        Ok(())
    }

    async fn add_participant(&mut self, id: i32, uid: i32) -> Result<(), Error> {
        self.0.borrow_mut().participants.insert((id, uid));
        Ok(())
    }

    async fn participants(&mut self, id: i32) -> Result<Vec<i32>, Error> {
        let s = self.0.borrow();
        let mut uids: Vec<i32> = s.participants.iter().filter(|(work_id, _)| *work_id == id).map(|(_, uid)| *uid).collect();
        uids.sort_unstable();
        Ok(uids)
    }
}

impl ReviewCommon for MemStore {
    async fn insert(&mut self, data: ReviewInsert) -> Result<i32, Error> {
        let mut s = self.0.borrow_mut();
        if s.reviews.values().any(|r| r.volunteer_work_id == data.volunteer_work_id && r.user_id == data.user_id) {
            return Err(Error::Conflict("duplicate record".into()));
        }
        let id = s.next_id();
        s.reviews.insert(
            id,
            Review {
                id,
                volunteer_work_id: data.volunteer_work_id,
                user_id: data.user_id,
                rating: data.rating,
                comment: data.comment,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Option<Review>, Error> {
        Ok(self.0.borrow().reviews.get(&id).cloned())
    }

    async fn exists(&mut self, work_id: i32, user_id: i32) -> Result<bool, Error> {
        Ok(self
            .0
            .borrow()
            .reviews
            .values()
            .any(|r| r.volunteer_work_id == work_id && r.user_id == user_id))
    }

    async fn query(&mut self, param: &ReviewQuery, page: i64, size: i64) -> Result<Vec<ReviewItem>, Error> {
        let s = self.0.borrow();
        Ok(s.reviews
            .values()
            .filter(|r| param.volunteer_work_id.map_or(true, |id| r.volunteer_work_id == id))
            .filter(|r| param.user_id.map_or(true, |id| r.user_id == id))
            .skip(((page - 1) * size) as usize)
            .take(size as usize)
            .map(|r| ReviewItem {
                id: r.id,
                volunteer_work_id: r.volunteer_work_id,
                user: s.username(r.user_id),
                rating: r.rating,
                rating_display: "⭐".repeat(r.rating as usize),
                comment: r.comment.clone(),
                created_at: r.created_at,
            })
            .collect())
    }

    async fn count(&mut self, param: &ReviewQuery) -> Result<i64, Error> {
        let s = self.0.borrow();
        Ok(s.reviews
            .values()
            .filter(|r| param.volunteer_work_id.map_or(true, |id| r.volunteer_work_id == id))
            .filter(|r| param.user_id.map_or(true, |id| r.user_id == id))
            .count() as i64)
    }

    async fn update(&mut self, id: i32, patch: ReviewPatch) -> Result<(), Error> {
        let mut s = self.0.borrow_mut();
        if let Some(review) = s.reviews.get_mut(&id) {
            if let Some(rating) = patch.rating {
                review.rating = rating;
            }
            if let Some(comment) = patch.comment {
                review.comment = Some(comment);
            }
        }
        Ok(())
    }

    async fn delete(&mut self, id: i32) -> Result<(), Error> {
        self.0.borrow_mut().reviews.remove(&id);
        Ok(())
    }

    async fn average_rating(&mut self, work_id: i32) -> Result<f64, Error> {
        let s = self.0.borrow();
        let ratings: Vec<i32> = s.reviews.values().filter(|r| r.volunteer_work_id == work_id).map(|r| r.rating).collect();
        if ratings.is_empty() {
            return Ok(0.0);
        }
        Ok(ratings.iter().sum::<i32>() as f64 / ratings.len() as f64)
    }
}

impl JoinRequestCommon for MemStore {
    async fn insert(&mut self, data: JoinRequestInsert) -> Result<i32, Error> {
        let mut s = self.0.borrow_mut();
        let id = s.next_id();
        s.join_requests.insert(
            id,
            JoinRequest {
                id,
                volunteer_work_id: data.volunteer_work_id,
                user_id: data.user_id,
                status: JoinRequestStatus::Pending,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Option<JoinRequest>, Error> {
        Ok(self.0.borrow().join_requests.get(&id).cloned())
    }

    async fn query_for_organizer(&mut self, organizer_id: i32, page: i64, size: i64) -> Result<Vec<JoinRequestItem>, Error> {
        let s = self.0.borrow();
        Ok(s.join_requests
            .values()
            .filter(|j| s.works.get(&j.volunteer_work_id).map_or(false, |w| w.organizer_id == organizer_id))
            .skip(((page - 1) * size) as usize)
            .take(size as usize)
            .map(|j| JoinRequestItem {
                id: j.id,
                volunteer_work_id: j.volunteer_work_id,
                volunteer_work_title: s.works.get(&j.volunteer_work_id).map(|w| w.title.clone()).unwrap_or_default(),
                user: s.username(j.user_id),
                status: j.status,
                created_at: j.created_at,
            })
            .collect())
    }

    async fn count_for_organizer(&mut self, organizer_id: i32) -> Result<i64, Error> {
        let s = self.0.borrow();
        Ok(s.join_requests
            .values()
            .filter(|j| s.works.get(&j.volunteer_work_id).map_or(false, |w| w.organizer_id == organizer_id))
            .count() as i64)
    }

    async fn set_status(&mut self, id: i32, status: JoinRequestStatus) -> Result<(), Error> {
        if let Some(request) = self.0.borrow_mut().join_requests.get_mut(&id) {
            request.status = status;
        }
        Ok(())
    }
}

impl CategoryCommon for MemStore {
    async fn insert(&mut self, data: CategoryInsert) -> Result<i32, Error> {
        let mut s = self.0.borrow_mut();
        if s.categories.values().any(|c| c.name == data.name || c.slug == data.slug) {
            return Err(Error::Conflict("duplicate record".into()));
        }
        let id = s.next_id();
        s.categories.insert(
            id,
            Category {
                id,
                name: data.name,
                slug: data.slug,
            },
        );
        Ok(id)
    }

    async fn get(&mut self, id: i32) -> Result<Option<Category>, Error> {
        Ok(self.0.borrow().categories.get(&id).cloned())
    }

    async fn get_by_slug(&mut self, slug: &str) -> Result<Option<Category>, Error> {
        Ok(self.0.borrow().categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn list(&mut self) -> Result<Vec<Category>, Error> {
        Ok(self.0.borrow().categories.values().cloned().collect())
    }

    async fn update(&mut self, id: i32, data: CategoryInsert) -> Result<(), Error> {
        let mut s = self.0.borrow_mut();
        if let Some(category) = s.categories.get_mut(&id) {
            category.name = data.name;
            category.slug = data.slug;
        }
        Ok(())
    }

    async fn delete(&mut self, id: i32) -> Result<(), Error> {
        let mut s = self.0.borrow_mut();
        s.categories.remove(&id);
        for work in s.works.values_mut() {
            if work.category_id == Some(id) {
                work.category_id = None;
            }
        }
        Ok(())
    }

    async fn name_or_slug_exists(&mut self, name: &str, slug: &str) -> Result<bool, Error> {
        Ok(self.0.borrow().categories.values().any(|c| c.name == name || c.slug == slug))
    }
}

impl Store for MemStore {}

impl TxStore for MemStore {
    async fn commit(self) -> Result<(), Error> {
        self.0.borrow_mut().committed = true;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        Ok(())
    }
}

fn matches_work(s: &MemState, work: &Work, param: &WorkQuery) -> bool {
    param.organizer_id.map_or(true, |id| work.organizer_id == id)
        && param.category_id.map_or(true, |id| work.category_id == Some(id))
        && param.participant_id.map_or(true, |uid| s.participants.contains(&(work.id, uid)))
}

fn item_of(s: &MemState, work: &Work) -> WorkItem {
    let ratings: Vec<i32> = s.reviews.values().filter(|r| r.volunteer_work_id == work.id).map(|r| r.rating).collect();
    let average_rating = if ratings.is_empty() {
        0.0
    } else {
        ratings.iter().sum::<i32>() as f64 / ratings.len() as f64
    };
    WorkItem {
        id: work.id,
        title: work.title.clone(),
        description: work.description.clone(),
        image_url: work.image_url.clone(),
        location: work.location.clone(),
        date: work.date,
        organizer: s.username(work.organizer_id),
        organizer_id: work.organizer_id,
        category_id: work.category_id,
        average_rating,
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemNotifier {
    pub sent: Rc<RefCell<Vec<(String, String)>>>,
    pub fail: bool,
}

impl Notifier for MemNotifier {
    async fn send_welcome(&self, address: &str, name: &str) -> Result<(), Error> {
        if self.fail {
            return Err(Error::Notifier("mail api unreachable".into()));
        }
        self.sent.borrow_mut().push((address.into(), name.into()));
        Ok(())
    }
}
