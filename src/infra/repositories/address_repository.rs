//! Client address repository.
//!
//! Every write that touches the default flag runs in one transaction that
//! first clears the user's other defaults, matching the partial unique
//! index on `(user_id) WHERE is_default`.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::user_address::{self, ActiveModel, Entity as AddressEntity};
use crate::errors::{AppError, AppResult, OptionExt};
use domain::{UserAddress, USER_ADDRESS_COUNTRY};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Conflict message when two requests race to become the default
pub const DEFAULT_ADDRESS_TAKEN: &str = "Another address became the default at the same time";

/// Fields of a new client address
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserAddress {
    pub user_id: Uuid,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub is_default: bool,
}

/// Partial address update; `None` leaves a field unchanged.
///
/// The default flag is not part of it, see [`AddressRepository::set_default`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserAddressChanges {
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Addresses of a user, default first, then newest first
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<UserAddress>>;

    /// Address `id` when it belongs to `user_id`
    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<UserAddress>>;

    async fn count_by_user(&self, user_id: Uuid) -> AppResult<u64>;

    /// Insert; when `is_default` is set the user's other defaults are cleared
    async fn create(&self, address: NewUserAddress) -> AppResult<UserAddress>;

    async fn update(&self, id: Uuid, changes: UserAddressChanges) -> AppResult<UserAddress>;

    /// Make `id` the only default address of `user_id`
    async fn set_default(&self, user_id: Uuid, id: Uuid) -> AppResult<UserAddress>;

    /// Delete `id`, promoting `successor` to default in the same transaction
    async fn delete(&self, id: Uuid, successor: Option<Uuid>) -> AppResult<()>;
}

pub struct AddressStore {
    db: DatabaseConnection,
}

impl AddressStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Clear the default flag on every address of `user_id`
async fn clear_defaults<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<()> {
    AddressEntity::update_many()
        .col_expr(user_address::Column::IsDefault, Expr::value(false))
        .col_expr(
            user_address::Column::UpdatedAt,
            Expr::value(chrono::Utc::now()),
        )
        .filter(user_address::Column::UserId.eq(user_id))
        .filter(user_address::Column::IsDefault.eq(true))
        .exec(conn)
        .await?;
    Ok(())
}

/// Flag `id` as default; `NotFound` when it is not an address of `user_id`
async fn mark_default<C: ConnectionTrait>(conn: &C, user_id: Uuid, id: Uuid) -> AppResult<()> {
    let result = AddressEntity::update_many()
        .col_expr(user_address::Column::IsDefault, Expr::value(true))
        .col_expr(
            user_address::Column::UpdatedAt,
            Expr::value(chrono::Utc::now()),
        )
        .filter(user_address::Column::Id.eq(id))
        .filter(user_address::Column::UserId.eq(user_id))
        .exec(conn)
        .await
        .map_err(|e| AppError::on_unique_violation(e, DEFAULT_ADDRESS_TAKEN))?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

#[async_trait]
impl AddressRepository for AddressStore {
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<UserAddress>> {
        let models = AddressEntity::find()
            .filter(user_address::Column::UserId.eq(user_id))
            .order_by_desc(user_address::Column::IsDefault)
            .order_by_desc(user_address::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(UserAddress::from).collect())
    }

    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<UserAddress>> {
        let model = AddressEntity::find_by_id(id)
            .filter(user_address::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(model.map(UserAddress::from))
    }

    async fn count_by_user(&self, user_id: Uuid) -> AppResult<u64> {
        AddressEntity::find()
            .filter(user_address::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn create(&self, address: NewUserAddress) -> AppResult<UserAddress> {
        let txn = self.db.begin().await?;
        if address.is_default {
            clear_defaults(&txn, address.user_id).await?;
        }

        let now = chrono::Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(address.user_id),
            address_line1: Set(address.address_line1),
            address_line2: Set(address.address_line2),
            city: Set(address.city),
            state: Set(address.state),
            postal_code: Set(address.postal_code),
            country: Set(USER_ADDRESS_COUNTRY.to_string()),
            is_default: Set(address.is_default),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::on_unique_violation(e, DEFAULT_ADDRESS_TAKEN))?;

        txn.commit().await?;
        Ok(model.into())
    }

    async fn update(&self, id: Uuid, changes: UserAddressChanges) -> AppResult<UserAddress> {
        let existing = AddressEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?;
        let mut active: ActiveModel = existing.into();

        if let Some(line1) = changes.address_line1 {
            active.address_line1 = Set(line1);
        }
        if let Some(line2) = changes.address_line2 {
            active.address_line2 = Set(Some(line2));
        }
        if let Some(city) = changes.city {
            active.city = Set(city);
        }
        if let Some(state) = changes.state {
            active.state = Set(state);
        }
        if let Some(postal_code) = changes.postal_code {
            active.postal_code = Set(postal_code);
        }
        active.updated_at = Set(chrono::Utc::now());

        Ok(active.update(&self.db).await?.into())
    }

    async fn set_default(&self, user_id: Uuid, id: Uuid) -> AppResult<UserAddress> {
        let txn = self.db.begin().await?;
        clear_defaults(&txn, user_id).await?;
        mark_default(&txn, user_id, id).await?;
        txn.commit().await?;

        AddressEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(UserAddress::from)
            .ok_or_not_found()
    }

    async fn delete(&self, id: Uuid, successor: Option<Uuid>) -> AppResult<()> {
        let txn = self.db.begin().await?;
        let removed = AddressEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_not_found()?;

        AddressEntity::delete_by_id(id).exec(&txn).await?;
        if let Some(next) = successor {
            mark_default(&txn, removed.user_id, next).await?;
        }

        txn.commit().await?;
        Ok(())
    }
}
