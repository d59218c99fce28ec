//! Catalog service tests: visibility transitions, moderation and images.

mod common;

use mockall::predicate::{always, eq};
use uuid::Uuid;

use common::{image, profile, service, with_status, Repos};
use domain::{Actor, ServiceAction, ServiceStatus, UnmetRequirement, UserRole};
use reparaya::errors::AppError;
use reparaya::services::{CatalogService, ImageManager, ImageService, ImageUpload, ServiceCatalog};

fn contractor(id: Uuid) -> Actor {
    Actor::new(id, UserRole::Contractor)
}

fn admin() -> Actor {
    Actor::new(Uuid::new_v4(), UserRole::Admin)
}

#[tokio::test]
async fn test_publish_draft_when_requirements_met() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();
    let draft = service(id, owner, ServiceStatus::Draft);

    let mut repos = Repos::default();
    let stored = draft.clone();
    repos
        .services
        .expect_find_by_id()
        .with(eq(id))
        .returning(move |_| Ok(Some(stored.clone())));
    repos
        .contractors
        .expect_find_by_user_id()
        .with(eq(owner))
        .returning(move |user_id| Ok(Some(profile(Uuid::new_v4(), user_id, true))));
    repos
        .images
        .expect_count_by_service()
        .with(eq(id))
        .returning(|_| Ok(2));
    let published = with_status(draft, ServiceStatus::Active);
    repos
        .services
        .expect_update_status()
        .with(
            eq(id),
            eq(ServiceStatus::Draft),
            eq(ServiceStatus::Active),
            always(),
        )
        .times(1)
        .returning(move |_, _, _, _| Ok(Some(published.clone())));

    let catalog = ServiceCatalog::new(repos.build());
    let result = catalog
        .transition(&contractor(owner), id, ServiceAction::Publish)
        .await
        .unwrap();

    assert_eq!(result.status, ServiceStatus::Active);
}

#[tokio::test]
async fn test_publish_reports_every_unmet_requirement() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();
    let mut draft = service(id, owner, ServiceStatus::Draft);
    draft.category_id = None;

    let mut repos = Repos::default();
    repos
        .services
        .expect_find_by_id()
        .returning(move |_| Ok(Some(draft.clone())));
    repos
        .contractors
        .expect_find_by_user_id()
        .returning(move |user_id| Ok(Some(profile(Uuid::new_v4(), user_id, false))));
    repos.images.expect_count_by_service().returning(|_| Ok(0));
    repos.services.expect_update_status().never();

    let catalog = ServiceCatalog::new(repos.build());
    let err = catalog
        .transition(&contractor(owner), id, ServiceAction::Publish)
        .await
        .unwrap_err();

    match err {
        AppError::PublicationRequirementsNotMet(unmet) => assert_eq!(
            unmet,
            vec![
                UnmetRequirement::ContractorVerified,
                UnmetRequirement::AtLeastOneImage,
                UnmetRequirement::CategorySet,
            ]
        ),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_stale_status_is_a_conflict() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();
    let active = service(id, owner, ServiceStatus::Active);

    let mut repos = Repos::default();
    repos
        .services
        .expect_find_by_id()
        .returning(move |_| Ok(Some(active.clone())));
    // Someone else moved it first
    repos
        .services
        .expect_update_status()
        .returning(|_, _, _, _| Ok(None));

    let catalog = ServiceCatalog::new(repos.build());
    let err = catalog
        .transition(&contractor(owner), id, ServiceAction::Pause)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_archive_blocked_by_active_bookings() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();
    let paused = service(id, owner, ServiceStatus::Paused);

    let mut repos = Repos::default();
    repos
        .services
        .expect_find_by_id()
        .returning(move |_| Ok(Some(paused.clone())));
    repos
        .bookings
        .expect_count_active_for_service()
        .with(eq(id))
        .returning(|_| Ok(2));
    repos.services.expect_update_status().never();

    let catalog = ServiceCatalog::new(repos.build());
    let err = catalog
        .transition(&contractor(owner), id, ServiceAction::Archive)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ActiveBookings(2)));
}

#[tokio::test]
async fn test_archive_without_bookings() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();
    let draft = service(id, owner, ServiceStatus::Draft);

    let mut repos = Repos::default();
    let stored = draft.clone();
    repos
        .services
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    repos
        .bookings
        .expect_count_active_for_service()
        .returning(|_| Ok(0));
    let archived = with_status(draft, ServiceStatus::Archived);
    repos
        .services
        .expect_update_status()
        .with(
            eq(id),
            eq(ServiceStatus::Draft),
            eq(ServiceStatus::Archived),
            always(),
        )
        .returning(move |_, _, _, _| Ok(Some(archived.clone())));

    let catalog = ServiceCatalog::new(repos.build());
    let result = catalog
        .transition(&contractor(owner), id, ServiceAction::Archive)
        .await
        .unwrap();

    assert_eq!(result.status, ServiceStatus::Archived);
}

#[tokio::test]
async fn test_resume_from_draft_is_invalid() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();
    let draft = service(id, owner, ServiceStatus::Draft);

    let mut repos = Repos::default();
    repos
        .services
        .expect_find_by_id()
        .returning(move |_| Ok(Some(draft.clone())));
    repos
        .contractors
        .expect_find_by_user_id()
        .returning(move |user_id| Ok(Some(profile(Uuid::new_v4(), user_id, true))));
    repos.images.expect_count_by_service().returning(|_| Ok(1));

    let catalog = ServiceCatalog::new(repos.build());
    let err = catalog
        .transition(&contractor(owner), id, ServiceAction::Resume)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::InvalidStateTransition {
            from: ServiceStatus::Draft,
            to: ServiceStatus::Active
        }
    ));
}

#[tokio::test]
async fn test_other_contractor_cannot_transition() {
    let id = Uuid::new_v4();
    let active = service(id, Uuid::new_v4(), ServiceStatus::Active);

    let mut repos = Repos::default();
    repos
        .services
        .expect_find_by_id()
        .returning(move |_| Ok(Some(active.clone())));

    let catalog = ServiceCatalog::new(repos.build());
    let err = catalog
        .transition(&contractor(Uuid::new_v4()), id, ServiceAction::Pause)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_admin_cannot_publish_for_owner() {
    let id = Uuid::new_v4();
    let draft = service(id, Uuid::new_v4(), ServiceStatus::Draft);

    let mut repos = Repos::default();
    repos
        .services
        .expect_find_by_id()
        .returning(move |_| Ok(Some(draft.clone())));

    let catalog = ServiceCatalog::new(repos.build());
    let err = catalog
        .transition(&admin(), id, ServiceAction::Publish)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_admin_pause_moderates_active_service() {
    let id = Uuid::new_v4();
    let active = service(id, Uuid::new_v4(), ServiceStatus::Active);

    let mut repos = Repos::default();
    let stored = active.clone();
    repos
        .services
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    let paused = with_status(active, ServiceStatus::Paused);
    repos
        .services
        .expect_update_status()
        .with(
            eq(id),
            eq(ServiceStatus::Active),
            eq(ServiceStatus::Paused),
            always(),
        )
        .returning(move |_, _, _, _| Ok(Some(paused.clone())));

    let catalog = ServiceCatalog::new(repos.build());
    let result = catalog
        .admin_pause(&admin(), id, Some("Misleading pricing".into()))
        .await
        .unwrap();

    assert_eq!(result.status, ServiceStatus::Paused);
}

#[tokio::test]
async fn test_admin_endpoints_require_admin() {
    let owner = Uuid::new_v4();
    let catalog = ServiceCatalog::new(Repos::default().build());

    let err = catalog
        .admin_pause(&contractor(owner), Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = catalog
        .admin_activate(&contractor(owner), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_draft_hidden_from_public_but_visible_to_owner() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();
    let draft = service(id, owner, ServiceStatus::Draft);

    let mut repos = Repos::default();
    repos
        .services
        .expect_find_by_id()
        .returning(move |_| Ok(Some(draft.clone())));
    repos
        .images
        .expect_list_by_service()
        .times(1)
        .returning(move |service_id| Ok(vec![image(service_id, 0)]));

    let catalog = ServiceCatalog::new(repos.build());

    let err = catalog.get_service(None, id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let stranger = Actor::new(Uuid::new_v4(), UserRole::Client);
    assert!(matches!(
        catalog.get_service(Some(&stranger), id).await,
        Err(AppError::NotFound)
    ));

    let (found, images) = catalog
        .get_service(Some(&contractor(owner)), id)
        .await
        .unwrap();
    assert_eq!(found.id, id);
    assert_eq!(images.len(), 1);
}

#[tokio::test]
async fn test_update_archived_service_is_rejected() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();
    let archived = service(id, owner, ServiceStatus::Archived);

    let mut repos = Repos::default();
    repos
        .services
        .expect_find_by_id()
        .returning(move |_| Ok(Some(archived.clone())));
    repos.services.expect_update().never();

    let catalog = ServiceCatalog::new(repos.build());
    let err = catalog
        .update_service(
            &contractor(owner),
            id,
            reparaya::infra::repositories::ServiceChanges {
                title: Some("Nuevo título".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_search_rejects_inverted_price_range() {
    let catalog = ServiceCatalog::new(Repos::default().build());
    let err = catalog
        .search(
            reparaya::infra::repositories::CatalogQuery {
                min_price_cents: Some(90_000),
                max_price_cents: Some(10_000),
                ..Default::default()
            },
            Default::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

fn upload() -> ImageUpload {
    ImageUpload {
        storage_key: "services/abc/new.jpg".into(),
        url: "https://cdn.example.com/services/abc/new.jpg".into(),
        width: Some(1024),
        height: Some(768),
        alt_text: Some("  Tubería reparada  ".into()),
    }
}

#[tokio::test]
async fn test_image_takes_next_position() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();
    let draft = service(id, owner, ServiceStatus::Draft);

    let mut repos = Repos::default();
    repos
        .services
        .expect_find_by_id()
        .returning(move |_| Ok(Some(draft.clone())));
    // Position 1 was deleted earlier
    repos
        .images
        .expect_list_by_service()
        .returning(move |service_id| Ok(vec![image(service_id, 0), image(service_id, 2)]));
    repos
        .images
        .expect_create()
        .withf(|new| new.position == 3 && new.alt_text.as_deref() == Some("Tubería reparada"))
        .returning(|new| {
            let mut created = image(new.service_id, new.position);
            created.alt_text = new.alt_text;
            Ok(created)
        });

    let images = ImageManager::new(repos.build());
    let created = images
        .add_image(&contractor(owner), id, upload())
        .await
        .unwrap();

    assert_eq!(created.position, 3);
}

#[tokio::test]
async fn test_image_limit_is_enforced() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();
    let draft = service(id, owner, ServiceStatus::Draft);

    let mut repos = Repos::default();
    repos
        .services
        .expect_find_by_id()
        .returning(move |_| Ok(Some(draft.clone())));
    repos
        .images
        .expect_list_by_service()
        .returning(move |service_id| Ok((0..5).map(|p| image(service_id, p)).collect()));
    repos.images.expect_create().never();

    let images = ImageManager::new(repos.build());
    let err = images
        .add_image(&contractor(owner), id, upload())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_delete_image_of_other_service_is_not_found() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();
    let draft = service(id, owner, ServiceStatus::Draft);
    let foreign = image(Uuid::new_v4(), 0);
    let foreign_id = foreign.id;

    let mut repos = Repos::default();
    repos
        .services
        .expect_find_by_id()
        .returning(move |_| Ok(Some(draft.clone())));
    repos
        .images
        .expect_find_by_id()
        .with(eq(foreign_id))
        .returning(move |_| Ok(Some(foreign.clone())));
    repos.images.expect_delete().never();

    let images = ImageManager::new(repos.build());
    let err = images
        .delete_image(&contractor(owner), id, foreign_id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound));
}

fn racing_upload_repos(owner: Uuid, id: Uuid, conflicts: usize) -> common::Repos {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let draft = service(id, owner, ServiceStatus::Draft);
    let lists = Arc::new(AtomicUsize::new(0));
    let inserts = Arc::new(AtomicUsize::new(0));

    let mut repos = Repos::default();
    repos
        .services
        .expect_find_by_id()
        .returning(move |_| Ok(Some(draft.clone())));
    // The second read sees the image the concurrent upload stored at position 1
    repos
        .images
        .expect_list_by_service()
        .returning(move |service_id| {
            let read = lists.fetch_add(1, Ordering::SeqCst);
            Ok((0..=read as i32).map(|p| image(service_id, p)).collect())
        });
    repos.images.expect_create().returning(move |new| {
        if inserts.fetch_add(1, Ordering::SeqCst) < conflicts {
            Err(AppError::Conflict("position taken".into()))
        } else {
            Ok(image(new.service_id, new.position))
        }
    });
    repos
}

#[tokio::test]
async fn test_image_retries_after_losing_position_race() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();

    let images = ImageManager::new(racing_upload_repos(owner, id, 1).build());
    let created = images
        .add_image(&contractor(owner), id, upload())
        .await
        .unwrap();

    assert_eq!(created.position, 2);
}

#[tokio::test]
async fn test_image_gives_up_after_repeated_conflicts() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();

    let images = ImageManager::new(racing_upload_repos(owner, id, 2).build());
    let err = images
        .add_image(&contractor(owner), id, upload())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}
