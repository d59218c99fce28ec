//! Address service - The caller's own address book.
//!
//! Addresses are private: every operation is scoped to the caller and an
//! address of someone else is reported as missing.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::{NewUserAddress, UserAddressChanges};
use crate::infra::UnitOfWork;
use domain::{can_remove_address, next_default_address, sort_address_book, Actor, UserAddress};

/// A new address as submitted by its owner
#[derive(Debug, Clone, PartialEq)]
pub struct AddressDraft {
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub is_default: bool,
}

/// Edit of an existing address
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressUpdate {
    pub changes: UserAddressChanges,
    /// `Some(true)` promotes the address, `Some(false)` is only accepted
    /// on an address that is not the default
    pub is_default: Option<bool>,
}

#[async_trait]
pub trait AddressService: Send + Sync {
    /// The caller's addresses, default first
    async fn list(&self, actor: &Actor) -> AppResult<Vec<UserAddress>>;

    async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<UserAddress>;

    /// Save an address. The first address always becomes the default.
    async fn create(&self, actor: &Actor, draft: AddressDraft) -> AppResult<UserAddress>;

    async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        update: AddressUpdate,
    ) -> AppResult<UserAddress>;

    /// Remove an address.
    ///
    /// The only address cannot be removed. Removing the default hands the
    /// flag to the oldest remaining address.
    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()>;
}

pub struct AddressManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> AddressManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> AddressService for AddressManager<U> {
    async fn list(&self, actor: &Actor) -> AppResult<Vec<UserAddress>> {
        let mut book = self.uow.addresses().list_by_user(actor.user_id).await?;
        sort_address_book(&mut book);
        Ok(book)
    }

    async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<UserAddress> {
        self.uow
            .addresses()
            .find_for_user(id, actor.user_id)
            .await?
            .ok_or_not_found()
    }

    async fn create(&self, actor: &Actor, draft: AddressDraft) -> AppResult<UserAddress> {
        let addresses = self.uow.addresses();
        let first = addresses.count_by_user(actor.user_id).await? == 0;

        let created = addresses
            .create(NewUserAddress {
                user_id: actor.user_id,
                address_line1: draft.address_line1,
                address_line2: draft.address_line2,
                city: draft.city,
                state: draft.state,
                postal_code: draft.postal_code,
                is_default: first || draft.is_default,
            })
            .await?;

        tracing::info!(
            user_id = %actor.user_id,
            address_id = %created.id,
            is_default = created.is_default,
            "Address saved"
        );
        Ok(created)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        update: AddressUpdate,
    ) -> AppResult<UserAddress> {
        let current = self.get(actor, id).await?;
        if update.is_default == Some(false) && current.is_default {
            return Err(AppError::validation(
                "Choose another default address instead of unsetting this one",
            ));
        }

        let addresses = self.uow.addresses();
        let mut result = if update.changes == UserAddressChanges::default() {
            current
        } else {
            addresses.update(id, update.changes).await?
        };

        if update.is_default == Some(true) && !result.is_default {
            result = addresses.set_default(actor.user_id, id).await?;
            tracing::info!(user_id = %actor.user_id, address_id = %id, "Default address changed");
        }
        Ok(result)
    }

    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        let removed = self.get(actor, id).await?;
        let addresses = self.uow.addresses();

        if !can_remove_address(addresses.count_by_user(actor.user_id).await?) {
            return Err(AppError::Conflict(
                "The only address on file cannot be deleted".into(),
            ));
        }

        let successor = if removed.is_default {
            let book = addresses.list_by_user(actor.user_id).await?;
            next_default_address(&book, id).map(|a| a.id)
        } else {
            None
        };

        addresses.delete(id, successor).await?;
        tracing::info!(
            user_id = %actor.user_id,
            address_id = %id,
            promoted = ?successor,
            "Address deleted"
        );
        Ok(())
    }
}
