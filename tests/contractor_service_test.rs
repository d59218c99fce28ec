//! Contractor profile rules: ownership, uniqueness and verification.

mod common;

use mockall::predicate::eq;
use uuid::Uuid;

use common::{profile, Repos};
use domain::{Actor, UserRole};
use reparaya::errors::AppError;
use reparaya::infra::repositories::ContractorProfileChanges;
use reparaya::services::{ContractorManager, ContractorService, ProfileDraft};

fn draft() -> ProfileDraft {
    ProfileDraft {
        business_name: "  Plomería Hernández ".to_string(),
        description: "Reparaciones de plomería en general".to_string(),
        specialties: vec!["plomería".to_string(), " plomería ".to_string()],
    }
}

#[tokio::test]
async fn test_contractor_creates_profile() {
    let user_id = Uuid::new_v4();

    let mut repos = Repos::default();
    repos
        .contractors
        .expect_find_by_user_id()
        .with(eq(user_id))
        .returning(|_| Ok(None));
    repos
        .contractors
        .expect_create()
        .withf(move |new| {
            new.user_id == user_id
                && new.business_name == "Plomería Hernández"
                && new.specialties == vec!["plomería".to_string()]
        })
        .times(1)
        .returning(|new| Ok(profile(Uuid::new_v4(), new.user_id, false)));

    let created = ContractorManager::new(repos.build())
        .create_profile(&Actor::new(user_id, UserRole::Contractor), draft())
        .await
        .unwrap();

    assert_eq!(created.user_id, user_id);
    assert!(!created.verified);
}

#[tokio::test]
async fn test_only_contractors_create_profiles() {
    let mut repos = Repos::default();
    repos.contractors.expect_create().never();

    let service = ContractorManager::new(repos.build());
    for role in [UserRole::Client, UserRole::Admin] {
        let err = service
            .create_profile(&Actor::new(Uuid::new_v4(), role), draft())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)), "role {}", role);
    }
}

#[tokio::test]
async fn test_second_profile_is_conflict() {
    let mut repos = Repos::default();
    repos
        .contractors
        .expect_find_by_user_id()
        .returning(|user_id| Ok(Some(profile(Uuid::new_v4(), user_id, false))));
    repos.contractors.expect_create().never();

    let err = ContractorManager::new(repos.build())
        .create_profile(&Actor::new(Uuid::new_v4(), UserRole::Contractor), draft())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_blank_specialties_are_rejected() {
    let mut repos = Repos::default();
    repos
        .contractors
        .expect_find_by_user_id()
        .returning(|_| Ok(None));
    repos.contractors.expect_create().never();

    let mut blank = draft();
    blank.specialties = vec!["  ".to_string()];

    let err = ContractorManager::new(repos.build())
        .create_profile(&Actor::new(Uuid::new_v4(), UserRole::Contractor), blank)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_owner_updates_unverified_profile() {
    let user_id = Uuid::new_v4();
    let profile_id = Uuid::new_v4();

    let mut repos = Repos::default();
    repos
        .contractors
        .expect_find_by_user_id()
        .returning(move |user_id| Ok(Some(profile(profile_id, user_id, false))));
    repos
        .contractors
        .expect_update()
        .withf(move |id, changes| {
            *id == profile_id
                && changes.business_name.as_deref() == Some("Hernández e Hijos")
                && changes.description.is_none()
        })
        .times(1)
        .returning(move |id, _| Ok(profile(id, user_id, false)));

    let updated = ContractorManager::new(repos.build())
        .update_own_profile(
            &Actor::new(user_id, UserRole::Contractor),
            ContractorProfileChanges {
                business_name: Some(" Hernández e Hijos ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, profile_id);
}

#[tokio::test]
async fn test_verified_profile_is_locked_for_owner() {
    let mut repos = Repos::default();
    repos
        .contractors
        .expect_find_by_user_id()
        .returning(|user_id| Ok(Some(profile(Uuid::new_v4(), user_id, true))));
    repos.contractors.expect_update().never();

    let err = ContractorManager::new(repos.build())
        .update_own_profile(
            &Actor::new(Uuid::new_v4(), UserRole::Contractor),
            ContractorProfileChanges {
                description: Some("Nueva descripción del negocio".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_admin_verifies_profile() {
    let profile_id = Uuid::new_v4();
    let owner = Uuid::new_v4();

    let mut repos = Repos::default();
    repos
        .contractors
        .expect_find_by_id()
        .with(eq(profile_id))
        .returning(move |id| Ok(Some(profile(id, owner, false))));
    repos
        .contractors
        .expect_set_verified()
        .with(eq(profile_id), eq(true))
        .times(1)
        .returning(move |id, verified| Ok(profile(id, owner, verified)));

    let verified = ContractorManager::new(repos.build())
        .set_verified(
            &Actor::new(Uuid::new_v4(), UserRole::Admin),
            profile_id,
            true,
        )
        .await
        .unwrap();

    assert!(verified.verified);
}

#[tokio::test]
async fn test_verification_requires_admin() {
    let mut repos = Repos::default();
    repos.contractors.expect_set_verified().never();

    let err = ContractorManager::new(repos.build())
        .set_verified(
            &Actor::new(Uuid::new_v4(), UserRole::Contractor),
            Uuid::new_v4(),
            true,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_admin_cannot_verify_own_profile() {
    let admin_id = Uuid::new_v4();

    let mut repos = Repos::default();
    repos
        .contractors
        .expect_find_by_id()
        .returning(move |id| Ok(Some(profile(id, admin_id, false))));
    repos.contractors.expect_set_verified().never();

    let err = ContractorManager::new(repos.build())
        .set_verified(&Actor::new(admin_id, UserRole::Admin), Uuid::new_v4(), true)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_verifying_twice_is_a_no_op() {
    let mut repos = Repos::default();
    repos
        .contractors
        .expect_find_by_id()
        .returning(|id| Ok(Some(profile(id, Uuid::new_v4(), true))));
    repos.contractors.expect_set_verified().never();

    let result = ContractorManager::new(repos.build())
        .set_verified(
            &Actor::new(Uuid::new_v4(), UserRole::Admin),
            Uuid::new_v4(),
            true,
        )
        .await
        .unwrap();

    assert!(result.verified);
}
