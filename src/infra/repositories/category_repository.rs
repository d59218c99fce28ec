//! Service category repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::service_category::{self, ActiveModel, Entity as CategoryEntity};
use crate::errors::AppResult;
use domain::Category;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Category definition used when seeding
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by name
    async fn list(&self) -> AppResult<Vec<Category>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>>;

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Category>>;

    async fn create(&self, category: NewCategory) -> AppResult<Category>;
}

pub struct CategoryStore {
    db: DatabaseConnection,
}

impl CategoryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for CategoryStore {
    async fn list(&self) -> AppResult<Vec<Category>> {
        let models = CategoryEntity::find()
            .order_by_asc(service_category::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        let model = CategoryEntity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Category::from))
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Category>> {
        let model = CategoryEntity::find()
            .filter(service_category::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;
        Ok(model.map(Category::from))
    }

    async fn create(&self, category: NewCategory) -> AppResult<Category> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(category.name),
            slug: Set(category.slug),
            description: Set(category.description),
            icon: Set(category.icon),
            parent_id: Set(category.parent_id),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&self.db)
        .await?;
        Ok(model.into())
    }
}
