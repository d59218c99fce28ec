//! Address book rules: ownership and the single default address.

mod common;

use mockall::predicate::eq;
use uuid::Uuid;

use common::{user_address, Repos};
use domain::{Actor, UserRole};
use reparaya::errors::AppError;
use reparaya::infra::repositories::UserAddressChanges;
use reparaya::services::{AddressDraft, AddressManager, AddressService, AddressUpdate};

fn client(id: Uuid) -> Actor {
    Actor::new(id, UserRole::Client)
}

fn draft(is_default: bool) -> AddressDraft {
    AddressDraft {
        address_line1: "Calle Morelos 45".to_string(),
        address_line2: Some("Interior 2".to_string()),
        city: "Puebla".to_string(),
        state: "Puebla".to_string(),
        postal_code: "72000".to_string(),
        is_default,
    }
}

#[tokio::test]
async fn test_first_address_becomes_default() {
    let owner = Uuid::new_v4();

    let mut repos = Repos::default();
    repos
        .addresses
        .expect_count_by_user()
        .with(eq(owner))
        .returning(|_| Ok(0));
    repos
        .addresses
        .expect_create()
        .withf(move |new| new.user_id == owner && new.is_default)
        .times(1)
        .returning(|new| Ok(user_address(new.user_id, new.is_default, 0)));

    let created = AddressManager::new(repos.build())
        .create(&client(owner), draft(false))
        .await
        .unwrap();

    assert!(created.is_default);
}

#[tokio::test]
async fn test_later_address_keeps_requested_flag() {
    let owner = Uuid::new_v4();

    let mut repos = Repos::default();
    repos.addresses.expect_count_by_user().returning(|_| Ok(2));
    repos
        .addresses
        .expect_create()
        .withf(|new| !new.is_default)
        .times(1)
        .returning(|new| Ok(user_address(new.user_id, new.is_default, 0)));

    let created = AddressManager::new(repos.build())
        .create(&client(owner), draft(false))
        .await
        .unwrap();

    assert!(!created.is_default);
}

#[tokio::test]
async fn test_foreign_address_is_not_found() {
    let mut repos = Repos::default();
    repos
        .addresses
        .expect_find_for_user()
        .returning(|_, _| Ok(None));
    repos.addresses.expect_update().never();
    repos.addresses.expect_delete().never();

    let service = AddressManager::new(repos.build());
    let actor = client(Uuid::new_v4());

    let err = service.get(&actor, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = service.delete(&actor, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = service
        .update(
            &actor,
            Uuid::new_v4(),
            AddressUpdate {
                changes: UserAddressChanges {
                    city: Some("Cholula".to_string()),
                    ..Default::default()
                },
                is_default: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn test_only_address_cannot_be_deleted() {
    let owner = Uuid::new_v4();
    let only = user_address(owner, true, 10);
    let only_id = only.id;

    let mut repos = Repos::default();
    repos
        .addresses
        .expect_find_for_user()
        .with(eq(only_id), eq(owner))
        .returning(move |_, _| Ok(Some(only.clone())));
    repos.addresses.expect_count_by_user().returning(|_| Ok(1));
    repos.addresses.expect_delete().never();

    let err = AddressManager::new(repos.build())
        .delete(&client(owner), only_id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_deleting_secondary_address_keeps_default() {
    let owner = Uuid::new_v4();
    let secondary = user_address(owner, false, 1);
    let secondary_id = secondary.id;

    let mut repos = Repos::default();
    repos
        .addresses
        .expect_find_for_user()
        .returning(move |_, _| Ok(Some(secondary.clone())));
    repos.addresses.expect_count_by_user().returning(|_| Ok(2));
    repos.addresses.expect_list_by_user().never();
    repos
        .addresses
        .expect_delete()
        .with(eq(secondary_id), eq(None::<Uuid>))
        .times(1)
        .returning(|_, _| Ok(()));

    AddressManager::new(repos.build())
        .delete(&client(owner), secondary_id)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_deleting_default_promotes_oldest_remaining() {
    let owner = Uuid::new_v4();
    let current = user_address(owner, true, 5);
    let oldest = user_address(owner, false, 30);
    let newest = user_address(owner, false, 1);
    let (current_id, oldest_id) = (current.id, oldest.id);

    let book = vec![current.clone(), newest, oldest];

    let mut repos = Repos::default();
    repos
        .addresses
        .expect_find_for_user()
        .returning(move |_, _| Ok(Some(current.clone())));
    repos.addresses.expect_count_by_user().returning(|_| Ok(3));
    repos
        .addresses
        .expect_list_by_user()
        .returning(move |_| Ok(book.clone()));
    repos
        .addresses
        .expect_delete()
        .with(eq(current_id), eq(Some(oldest_id)))
        .times(1)
        .returning(|_, _| Ok(()));

    AddressManager::new(repos.build())
        .delete(&client(owner), current_id)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_promoting_address_clears_previous_default() {
    let owner = Uuid::new_v4();
    let secondary = user_address(owner, false, 2);
    let secondary_id = secondary.id;

    let mut repos = Repos::default();
    repos
        .addresses
        .expect_find_for_user()
        .returning(move |_, _| Ok(Some(secondary.clone())));
    repos.addresses.expect_update().never();
    repos
        .addresses
        .expect_set_default()
        .with(eq(owner), eq(secondary_id))
        .times(1)
        .returning(move |user_id, _| {
            let mut promoted = user_address(user_id, true, 2);
            promoted.id = secondary_id;
            Ok(promoted)
        });

    let updated = AddressManager::new(repos.build())
        .update(
            &client(owner),
            secondary_id,
            AddressUpdate {
                is_default: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.is_default);
    assert_eq!(updated.id, secondary_id);
}

#[tokio::test]
async fn test_default_cannot_be_unset_directly() {
    let owner = Uuid::new_v4();
    let current = user_address(owner, true, 2);
    let current_id = current.id;

    let mut repos = Repos::default();
    repos
        .addresses
        .expect_find_for_user()
        .returning(move |_, _| Ok(Some(current.clone())));
    repos.addresses.expect_update().never();
    repos.addresses.expect_set_default().never();

    let err = AddressManager::new(repos.build())
        .update(
            &client(owner),
            current_id,
            AddressUpdate {
                is_default: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_field_edit_leaves_default_untouched() {
    let owner = Uuid::new_v4();
    let current = user_address(owner, true, 2);
    let current_id = current.id;
    let stored = current.clone();

    let mut repos = Repos::default();
    repos
        .addresses
        .expect_find_for_user()
        .returning(move |_, _| Ok(Some(current.clone())));
    repos
        .addresses
        .expect_update()
        .withf(move |id, changes| {
            *id == current_id && changes.postal_code.as_deref() == Some("72100")
        })
        .times(1)
        .returning(move |_, changes| {
            let mut updated = stored.clone();
            updated.postal_code = changes.postal_code.unwrap_or_default();
            Ok(updated)
        });
    repos.addresses.expect_set_default().never();

    let updated = AddressManager::new(repos.build())
        .update(
            &client(owner),
            current_id,
            AddressUpdate {
                changes: UserAddressChanges {
                    postal_code: Some("72100".to_string()),
                    ..Default::default()
                },
                is_default: Some(true),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.postal_code, "72100");
    assert!(updated.is_default);
}

#[tokio::test]
async fn test_list_puts_default_first() {
    let owner = Uuid::new_v4();
    let newest = user_address(owner, false, 0);
    let default = user_address(owner, true, 20);
    let default_id = default.id;

    let mut repos = Repos::default();
    repos
        .addresses
        .expect_list_by_user()
        .with(eq(owner))
        .returning(move |_| Ok(vec![newest.clone(), default.clone()]));

    let book = AddressManager::new(repos.build())
        .list(&client(owner))
        .await
        .unwrap();

    assert_eq!(book.len(), 2);
    assert_eq!(book[0].id, default_id);
}
