use serde::Deserialize;

use crate::core::models::category::{Category, Insert};
use crate::core::ports::repository::{CategoryCommon, Store};
use crate::error::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct Payload {
    pub name: String,
    pub slug: Option<String>,
}

pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

pub async fn create<D>(db: &mut D, data: Payload) -> Result<i32, Error>
where
    D: Store,
{
    if data.name.trim().is_empty() {
        return Err(Error::Validation("category name must not be empty".into()));
    }
    let slug = data.slug.unwrap_or_else(|| slugify(&data.name));
    if CategoryCommon::name_or_slug_exists(db, &data.name, &slug).await? {
        return Err(Error::Conflict(format!("category {} already exists", data.name)));
    }
    let id = CategoryCommon::insert(db, Insert { name: data.name, slug }).await?;
    Ok(id)
}

pub async fn update<D>(db: &mut D, id: i32, data: Payload) -> Result<(), Error>
where
    D: Store,
{
    CategoryCommon::get(db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("category {} not found", id)))?;
    let slug = data.slug.unwrap_or_else(|| slugify(&data.name));
    // a clashing name or slug surfaces via the unique constraints
    CategoryCommon::update(db, id, Insert { name: data.name, slug }).await?;
    Ok(())
}

pub async fn delete<D>(db: &mut D, id: i32) -> Result<(), Error>
where
    D: Store,
{
    CategoryCommon::get(db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("category {} not found", id)))?;
    CategoryCommon::delete(db, id).await?;
    Ok(())
}

pub async fn list<D>(db: &mut D) -> Result<Vec<Category>, Error>
where
    D: Store,
{
    CategoryCommon::list(db).await
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::testing::MemStore;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Environment"), "environment");
        assert_eq!(slugify("Animal  Welfare!"), "animal-welfare");
        assert_eq!(slugify("  Food & Shelter  "), "food-shelter");
    }

    #[tokio::test]
    async fn test_create_derives_slug() {
        let store = MemStore::new();
        let id = create(
            &mut store.clone(),
            Payload {
                name: "Animal Welfare".into(),
                slug: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(store.0.borrow().categories.get(&id).unwrap().slug, "animal-welfare");
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let store = MemStore::new();
        let data = Payload {
            name: "Environment".into(),
            slug: None,
        };
        create(&mut store.clone(), data.clone()).await.unwrap();
        let err = create(&mut store.clone(), data).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_unlinks_works() {
        let store = MemStore::new();
        let organizer = store.seed_user("organizer");
        let work_id = store.seed_work(organizer, "cleanup");
        let category_id = create(
            &mut store.clone(),
            Payload {
                name: "Environment".into(),
                slug: None,
            },
        )
        .await
        .unwrap();
        store.0.borrow_mut().works.get_mut(&work_id).unwrap().category_id = Some(category_id);

        delete(&mut store.clone(), category_id).await.unwrap();
        assert_eq!(store.0.borrow().works.get(&work_id).unwrap().category_id, None);
    }
}
