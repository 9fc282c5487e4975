use std::ops::Add;

use hex::ToHex;
use log::warn;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::models::user::{Insert, Patch, Profile, ProfilePatch, User};
use crate::core::ports::notifier::Notifier;
use crate::core::ports::repository::{Store, TxStore, UserCommon};
use crate::core::ports::tokener::Tokener;
use crate::error::Error;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Signup {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub contact_info: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub profile: Profile,
}

pub fn hash_password(pass: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pass);
    hasher.update(salt);
    hasher.finalize().encode_hex()
}

fn random_salt() -> String {
    thread_rng().sample_iter(&Alphanumeric).take(32).map(char::from).collect()
}

pub async fn signup<T, N>(mut tx: T, notifier: &N, data: Signup) -> Result<i32, Error>
where
    T: TxStore,
    N: Notifier,
{
    for (field, value) in [
        ("username", &data.username),
        ("email", &data.email),
        ("password", &data.password),
        ("first_name", &data.first_name),
        ("last_name", &data.last_name),
    ] {
        if value.trim().is_empty() {
            return Err(Error::Validation(format!("{} must not be empty", field)));
        }
    }
    if UserCommon::username_exists(&mut tx, &data.username).await? {
        return Err(Error::Conflict(format!("username {} is already taken", data.username)));
    }
    let salt = random_salt();
    let uid = UserCommon::insert(
        &mut tx,
        Insert {
            username: data.username,
            email: data.email.clone(),
            password: hash_password(&data.password, &salt),
            salt,
            first_name: data.first_name.clone(),
            last_name: data.last_name,
        },
    )
    .await?;
    UserCommon::upsert_profile(
        &mut tx,
        uid,
        ProfilePatch {
            bio: data.bio,
            profile_picture: data.profile_picture,
            contact_info: data.contact_info,
        },
    )
    .await?;
    tx.commit().await?;
    // fire and forget, a lost mail never undoes a registration
    if let Err(e) = notifier.send_welcome(&data.email, &data.first_name).await {
        warn!("failed to send welcome mail to {}: {}", data.email, e);
    }
    Ok(uid)
}

pub async fn login<D, T>(db: &mut D, tokener: &T, username: &str, password: &str) -> Result<String, Error>
where
    D: Store,
    T: Tokener,
{
    let user = UserCommon::get_by_username(db, username)
        .await?
        .ok_or_else(|| Error::Permission("invalid username or password".into()))?;
    if hash_password(password, &user.salt) != user.password {
        return Err(Error::Permission("invalid username or password".into()));
    }
    let claims = Claims {
        sub: user.id.to_string(),
        exp: chrono::Utc::now().add(chrono::Duration::days(30)).timestamp(),
    };
    tokener.issue(&claims)
}

pub async fn edit<D>(db: &mut D, uid: i32, user_patch: Patch, profile_patch: ProfilePatch) -> Result<UserDetail, Error>
where
    D: Store,
{
    let current = UserCommon::get(db, uid)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user {} not found", uid)))?;
    if let Some(username) = &user_patch.username {
        if *username != current.username && UserCommon::username_exists(db, username).await? {
            return Err(Error::Conflict(format!("username {} is already taken", username)));
        }
    }
    UserCommon::update(db, uid, user_patch).await?;
    UserCommon::upsert_profile(db, uid, profile_patch).await?;
    detail(db, uid).await
}

pub async fn detail<D>(db: &mut D, uid: i32) -> Result<UserDetail, Error>
where
    D: Store,
{
    let user = UserCommon::get(db, uid)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user {} not found", uid)))?;
    let profile = UserCommon::get_profile(db, uid).await?.unwrap_or_default();
    Ok(UserDetail { user, profile })
}

pub async fn list<D>(db: &mut D, page: i64, size: i64) -> Result<(Vec<User>, i64), Error>
where
    D: Store,
{
    let total = UserCommon::count(db).await?;
    let users = UserCommon::query(db, page, size).await?;
    Ok((users, total))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::testing::{MemNotifier, MemStore};

    fn signup_data(username: &str) -> Signup {
        Signup {
            username: username.into(),
            email: format!("{}@example.com", username),
            password: "hunter2hunter2".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            bio: Some("volunteer".into()),
            profile_picture: None,
            contact_info: None,
        }
    }

    #[tokio::test]
    async fn test_signup_creates_user_and_profile() {
        let store = MemStore::new();
        let notifier = MemNotifier::default();
        let uid = signup(store.clone(), &notifier, signup_data("ada")).await.unwrap();

        let state = store.0.borrow();
        let user = state.users.get(&uid).unwrap();
        assert_eq!(user.username, "ada");
        assert_ne!(user.password, "hunter2hunter2");
        assert_eq!(state.profiles.get(&uid).unwrap().bio.as_deref(), Some("volunteer"));
        assert!(state.committed);
    }

    #[tokio::test]
    async fn test_signup_sends_one_welcome_mail() {
        let store = MemStore::new();
        let notifier = MemNotifier::default();
        signup(store.clone(), &notifier, signup_data("ada")).await.unwrap();

        let sent = notifier.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], ("ada@example.com".into(), "Ada".into()));
    }

    #[tokio::test]
    async fn test_signup_survives_notifier_failure() {
        let store = MemStore::new();
        let notifier = MemNotifier {
            fail: true,
            ..Default::default()
        };
        let uid = signup(store.clone(), &notifier, signup_data("ada")).await.unwrap();
        assert!(store.0.borrow().users.contains_key(&uid));
    }

    #[tokio::test]
    async fn test_signup_duplicate_username() {
        let store = MemStore::new();
        let notifier = MemNotifier::default();
        signup(store.clone(), &notifier, signup_data("ada")).await.unwrap();
        let err = signup(store.clone(), &notifier, signup_data("ada")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(notifier.sent.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_signup_rejects_blank_fields() {
        let store = MemStore::new();
        let notifier = MemNotifier::default();
        let mut data = signup_data("ada");
        data.first_name = "  ".into();
        let err = signup(store.clone(), &notifier, data).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(store.0.borrow().users.is_empty());
    }

    #[tokio::test]
    async fn test_edit_rejects_taken_username() {
        let store = MemStore::new();
        let ada = store.seed_user("ada");
        store.seed_user("grace");

        let err = edit(
            &mut store.clone(),
            ada,
            Patch {
                username: Some("grace".into()),
                ..Default::default()
            },
            ProfilePatch::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_edit_upserts_profile() {
        let store = MemStore::new();
        let ada = store.seed_user("ada");

        let detail = edit(
            &mut store.clone(),
            ada,
            Patch::default(),
            ProfilePatch {
                bio: Some("new bio".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(detail.profile.bio.as_deref(), Some("new bio"));
    }
}
