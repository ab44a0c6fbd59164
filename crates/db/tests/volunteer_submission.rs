//! Integration tests for the volunteer submission and anonymous session
//! repositories and the port adapters built on them.

use assert_matches::assert_matches;
use sqlx::PgPool;
use volunteer_core::ports::{
    AuthProvider, NewVolunteerSubmission, RecordStore, StoreError, SubmissionStatus,
};
use volunteer_db::models::anonymous_session::CreateAnonymousSession;
use volunteer_db::repositories::{AnonymousSessionRepo, VolunteerSubmissionRepo};
use volunteer_db::{PgAuthProvider, PgRecordStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_submission(mobile: &str, email: Option<&str>) -> NewVolunteerSubmission {
    NewVolunteerSubmission {
        full_name: "Karim Rahman".to_string(),
        mobile: mobile.to_string(),
        email: email.map(str::to_string),
        facebook_url: None,
        twitter_url: None,
        instagram_url: Some("https://instagram.com/karim".to_string()),
        volunteer_types: vec!["field".to_string(), "event".to_string()],
        has_organization: false,
        organization: None,
        status: SubmissionStatus::Pending,
    }
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_find_submission(pool: PgPool) {
    let created = VolunteerSubmissionRepo::create(&pool, &new_submission("01812345678", None))
        .await
        .unwrap();
    assert!(created.id > 0);
    assert_eq!(created.status().unwrap(), SubmissionStatus::Pending);
    assert_eq!(created.email, None);
    assert_eq!(created.organization, None);
    assert_eq!(created.volunteer_types, vec!["field", "event"]);

    let found = VolunteerSubmissionRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .expect("submission should exist");
    assert_eq!(found.mobile, "01812345678");
    assert_eq!(
        found.instagram_url.as_deref(),
        Some("https://instagram.com/karim")
    );

    let missing = VolunteerSubmissionRepo::find_by_id(&pool, created.id + 1000)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_exists_lookups(pool: PgPool) {
    VolunteerSubmissionRepo::create(
        &pool,
        &new_submission("01712345678", Some("karim@example.com")),
    )
    .await
    .unwrap();

    assert!(VolunteerSubmissionRepo::exists_by_mobile(&pool, "01712345678")
        .await
        .unwrap());
    assert!(!VolunteerSubmissionRepo::exists_by_mobile(&pool, "01812345678")
        .await
        .unwrap());
    assert!(VolunteerSubmissionRepo::exists_by_email(&pool, "karim@example.com")
        .await
        .unwrap());
    assert!(!VolunteerSubmissionRepo::exists_by_email(&pool, "other@example.com")
        .await
        .unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_volunteer_types_rejected(pool: PgPool) {
    let mut input = new_submission("01812345678", None);
    input.volunteer_types.clear();

    let result = VolunteerSubmissionRepo::create(&pool, &input).await;
    assert!(result.is_err(), "empty volunteer_types must violate the check");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_organization_requires_flag(pool: PgPool) {
    let mut input = new_submission("01812345678", None);
    input.organization = Some("Red Crescent".to_string());

    let result = VolunteerSubmissionRepo::create(&pool, &input).await;
    assert!(result.is_err(), "organization without has_organization must be rejected");

    input.has_organization = true;
    let created = VolunteerSubmissionRepo::create(&pool, &input).await.unwrap();
    assert_eq!(created.organization.as_deref(), Some("Red Crescent"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_active_session_ignores_expired(pool: PgPool) {
    let active = CreateAnonymousSession {
        token_hash: "a".repeat(64),
        expires_at: chrono::Utc::now() + chrono::Duration::hours(1),
    };
    let expired = CreateAnonymousSession {
        token_hash: "b".repeat(64),
        expires_at: chrono::Utc::now() - chrono::Duration::hours(1),
    };
    AnonymousSessionRepo::create(&pool, &active).await.unwrap();
    AnonymousSessionRepo::create(&pool, &expired).await.unwrap();

    assert!(AnonymousSessionRepo::find_active(&pool, &active.token_hash)
        .await
        .unwrap()
        .is_some());
    assert!(AnonymousSessionRepo::find_active(&pool, &expired.token_hash)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Adapters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_record_store_round_trip(pool: PgPool) {
    let store = PgRecordStore::new(pool.clone());

    let id = store
        .insert(&new_submission("01912345678", Some("r@example.com")))
        .await
        .unwrap();
    assert!(store.exists_by_mobile("01912345678").await.unwrap());
    assert!(store.exists_by_email("r@example.com").await.unwrap());

    let row = VolunteerSubmissionRepo::find_by_id(&pool, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.full_name, "Karim Rahman");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_record_store_maps_constraint_violation(pool: PgPool) {
    let store = PgRecordStore::new(pool);
    let mut input = new_submission("01812345678", None);
    input.volunteer_types = vec!["gardening".to_string()];

    let err = store.insert(&input).await.unwrap_err();
    assert_matches!(err, StoreError::Rejected(ref msg) if msg.contains("ck_volunteer_submissions_types_known"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_auth_provider_bootstraps_once(pool: PgPool) {
    let auth = PgAuthProvider::new(pool.clone());
    assert!(auth.get_session().await.unwrap().is_none());

    let session = auth.create_anonymous_session().await.unwrap();
    assert!(session.anonymous);
    assert!(session.expires_at.is_some());

    let current = auth.get_session().await.unwrap().expect("session cached");
    assert_eq!(current.id, session.id);

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM anonymous_sessions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_auth_provider_drops_expired_session(pool: PgPool) {
    let auth = PgAuthProvider::with_ttl(pool, chrono::Duration::seconds(-1));
    auth.create_anonymous_session().await.unwrap();
    assert!(auth.get_session().await.unwrap().is_none());
}
