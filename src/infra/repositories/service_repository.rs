//! Service listing repository.
//!
//! Status changes go through [`ServiceRepository::update_status`], a
//! compare-and-set on the current status, so two concurrent transitions on
//! the same listing cannot both apply.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set,
};
use uuid::Uuid;

use super::entities::service::{self, ActiveModel, Entity as ServiceEntity};
use crate::errors::{AppResult, OptionExt};
use crate::types::PaginationParams;
use domain::{Service, ServiceStatus, DEFAULT_CURRENCY};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Fields of a newly created (DRAFT) listing
#[derive(Debug, Clone, PartialEq)]
pub struct NewService {
    pub contractor_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub base_price_cents: i64,
    pub duration_minutes: i32,
}

/// Content edits; status is never touched here
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceChanges {
    pub category_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub base_price_cents: Option<i64>,
    pub duration_minutes: Option<i32>,
}

impl ServiceChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Public catalog filters (ACTIVE listings only)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogQuery {
    pub category_id: Option<Uuid>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
}

/// Moderation list filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminServiceFilter {
    pub status: Option<ServiceStatus>,
    pub contractor_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Service>>;

    /// Insert a DRAFT listing
    async fn create(&self, service: NewService) -> AppResult<Service>;

    async fn update(&self, id: Uuid, changes: ServiceChanges) -> AppResult<Service>;

    /// Move `id` from `expected` to `to` if it is still in `expected`.
    ///
    /// Returns `None` when the stored status no longer matches. Entering
    /// ACTIVE also stamps `last_published_at` with `at`.
    async fn update_status(
        &self,
        id: Uuid,
        expected: ServiceStatus,
        to: ServiceStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Service>>;

    /// Listings owned by a contractor, newest first
    async fn list_by_contractor(
        &self,
        contractor_id: Uuid,
        status: Option<ServiceStatus>,
    ) -> AppResult<Vec<Service>>;

    /// One page of ACTIVE listings and the total match count
    async fn search_active(
        &self,
        query: CatalogQuery,
        page: PaginationParams,
    ) -> AppResult<(Vec<Service>, u64)>;

    /// One page of listings in any status and the total match count
    async fn list_all(
        &self,
        filter: AdminServiceFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Service>, u64)>;
}

pub struct ServiceStore {
    db: DatabaseConnection,
}

impl ServiceStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch_page(
        &self,
        select: Select<ServiceEntity>,
        page: PaginationParams,
    ) -> AppResult<(Vec<Service>, u64)> {
        let paginator = select
            .order_by_desc(service::Column::CreatedAt)
            .paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.page_index()).await?;

        let services = rows
            .into_iter()
            .map(Service::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((services, total))
    }
}

/// `%term%` with LIKE wildcards in the term escaped
fn contains_pattern(term: &str) -> LikeExpr {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    LikeExpr::new(format!("%{}%", escaped)).escape('\\')
}

fn catalog_condition(query: &CatalogQuery) -> Condition {
    let mut condition =
        Condition::all().add(service::Column::Status.eq(ServiceStatus::Active.as_str()));

    if let Some(category_id) = query.category_id {
        condition = condition.add(service::Column::CategoryId.eq(category_id));
    }
    if let Some(min) = query.min_price_cents {
        condition = condition.add(service::Column::BasePriceCents.gte(min));
    }
    if let Some(max) = query.max_price_cents {
        condition = condition.add(service::Column::BasePriceCents.lte(max));
    }
    if let Some(term) = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        condition = condition.add(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(service::Column::Title)))
                        .like(contains_pattern(term)),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(service::Column::Description)))
                        .like(contains_pattern(term)),
                ),
        );
    }
    condition
}

fn admin_condition(filter: &AdminServiceFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(status) = filter.status {
        condition = condition.add(service::Column::Status.eq(status.as_str()));
    }
    if let Some(contractor_id) = filter.contractor_id {
        condition = condition.add(service::Column::ContractorId.eq(contractor_id));
    }
    if let Some(category_id) = filter.category_id {
        condition = condition.add(service::Column::CategoryId.eq(category_id));
    }
    condition
}

#[async_trait]
impl ServiceRepository for ServiceStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Service>> {
        ServiceEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Service::try_from)
            .transpose()
    }

    async fn create(&self, new: NewService) -> AppResult<Service> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            contractor_id: Set(new.contractor_id),
            category_id: Set(new.category_id),
            title: Set(new.title),
            description: Set(new.description),
            base_price_cents: Set(new.base_price_cents),
            currency: Set(DEFAULT_CURRENCY.to_string()),
            duration_minutes: Set(new.duration_minutes),
            status: Set(ServiceStatus::Draft.as_str().to_string()),
            last_published_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        Service::try_from(model)
    }

    async fn update(&self, id: Uuid, changes: ServiceChanges) -> AppResult<Service> {
        let existing = ServiceEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?;
        let mut active: ActiveModel = existing.into();

        if let Some(category_id) = changes.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(price) = changes.base_price_cents {
            active.base_price_cents = Set(price);
        }
        if let Some(duration) = changes.duration_minutes {
            active.duration_minutes = Set(duration);
        }
        active.updated_at = Set(Utc::now());

        Service::try_from(active.update(&self.db).await?)
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: ServiceStatus,
        to: ServiceStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Service>> {
        let mut update = ServiceEntity::update_many()
            .col_expr(service::Column::Status, Expr::value(to.as_str()))
            .col_expr(service::Column::UpdatedAt, Expr::value(at));
        if to == ServiceStatus::Active {
            update = update.col_expr(service::Column::LastPublishedAt, Expr::value(Some(at)));
        }

        let result = update
            .filter(service::Column::Id.eq(id))
            .filter(service::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn list_by_contractor(
        &self,
        contractor_id: Uuid,
        status: Option<ServiceStatus>,
    ) -> AppResult<Vec<Service>> {
        let mut select =
            ServiceEntity::find().filter(service::Column::ContractorId.eq(contractor_id));
        if let Some(status) = status {
            select = select.filter(service::Column::Status.eq(status.as_str()));
        }

        select
            .order_by_desc(service::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Service::try_from)
            .collect()
    }

    async fn search_active(
        &self,
        query: CatalogQuery,
        page: PaginationParams,
    ) -> AppResult<(Vec<Service>, u64)> {
        self.fetch_page(
            ServiceEntity::find().filter(catalog_condition(&query)),
            page,
        )
        .await
    }

    async fn list_all(
        &self,
        filter: AdminServiceFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Service>, u64)> {
        self.fetch_page(ServiceEntity::find().filter(admin_condition(&filter)), page)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_catalog_query_filters_active_and_price() {
        let query = CatalogQuery {
            min_price_cents: Some(10_000),
            max_price_cents: Some(20_000),
            ..Default::default()
        };
        let sql = ServiceEntity::find()
            .filter(catalog_condition(&query))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""services"."status" = 'ACTIVE'"#));
        assert!(sql.contains(r#""services"."base_price_cents" >= 10000"#));
        assert!(sql.contains(r#""services"."base_price_cents" <= 20000"#));
    }

    #[test]
    fn test_search_term_is_escaped() {
        let query = CatalogQuery {
            search: Some("100%_Plomería".into()),
            ..Default::default()
        };
        let sql = ServiceEntity::find()
            .filter(catalog_condition(&query))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains("LOWER"));
        assert!(sql.contains("ESCAPE"));
        assert!(sql.contains("plomería"));
    }

    #[test]
    fn test_service_changes_is_empty() {
        assert!(ServiceChanges::default().is_empty());
        assert!(!ServiceChanges {
            title: Some("Nuevo".into()),
            ..Default::default()
        }
        .is_empty());
    }
}
