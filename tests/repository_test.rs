mod common;

use appstore_client::domain::account::{RegisterForm, UserStatus};
use appstore_client::domain::download::DownloadStatus;
use appstore_client::domain::model::RankingType;
use appstore_client::domain::report::{ReportReason, ReportStatus, ReportType};
use appstore_client::{Repository, StoreError, StoreRepository};
use common::{sample_user, FakeStore, RecordingDownloadManager, PASSWORD};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn repository(status: UserStatus) -> StoreRepository<FakeStore> {
    StoreRepository::new(FakeStore::new(sample_user(status)))
}

async fn logged_in(status: UserStatus) -> StoreRepository<FakeStore> {
    let repo = repository(status);
    assert_ok!(repo.login("alice@example.com", PASSWORD).await);
    repo
}

fn is_validation(result: &Result<impl std::fmt::Debug, StoreError>, expected_field: &str) -> bool {
    matches!(result, Err(StoreError::Validation { field, .. }) if field == expected_field)
}

#[tokio::test]
async fn test_invalid_input_never_reaches_the_backend() {
    let repo = logged_in(UserStatus::Normal).await;
    let calls_after_login = repo.api().calls();

    assert!(is_validation(&repo.post_comment("chess", 0, "nice").await, "rating"));
    assert!(is_validation(&repo.post_comment("chess", 6, "nice").await, "rating"));
    assert!(is_validation(&repo.post_comment("chess", 5, "   ").await, "content"));
    assert!(is_validation(
        &repo.post_comment("chess", 5, &"x".repeat(1001)).await,
        "content"
    ));
    assert!(is_validation(&repo.search_apps("", 1, 20).await, "keyword"));
    assert!(is_validation(&repo.search_apps("chess", 0, 20).await, "page"));
    assert!(is_validation(&repo.get_ranking_apps(RankingType::TopFree, 1, 0).await, "pageSize"));
    assert!(is_validation(&repo.get_category_apps("games", 1, 101).await, "pageSize"));
    assert!(is_validation(&repo.get_app_detail(" ").await, "appId"));
    assert!(is_validation(
        &repo
            .submit_report(ReportType::App, "chess", ReportReason::Other, "")
            .await,
        "description"
    ));
    assert!(is_validation(&repo.login("not-an-email", PASSWORD).await, "email"));

    assert_eq!(repo.api().calls(), calls_after_login);
}

#[tokio::test]
async fn test_register_checks_password_locally() {
    let repo = repository(UserStatus::Normal);
    let form = |password: &str, confirm: &str| RegisterForm {
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        password: password.to_string(),
        confirm_password: confirm.to_string(),
    };

    assert!(is_validation(&repo.register(form("short", "short")).await, "password"));
    assert!(is_validation(
        &repo.register(form("long-enough", "different")).await,
        "confirmPassword"
    ));
    assert_eq!(repo.api().calls(), 0);

    let registered = assert_ok!(repo.register(form("long-enough", "long-enough")).await);
    assert!(registered.verification_sent);
    assert!(!registered.user.is_verified);

    let verified = assert_ok!(repo.verify_email("123456").await);
    assert!(verified.is_verified);
    assert_eq!(repo.current_user().await.map(|u| u.is_verified), Some(true));
}

#[tokio::test]
async fn test_wrong_password_is_auth_error_and_keeps_session_empty() {
    let repo = repository(UserStatus::Normal);

    let result = repo.login("alice@example.com", "wrong-password").await;
    assert!(matches!(result, Err(StoreError::Auth { .. })));
    assert!(repo.current_user().await.is_none());
}

#[tokio::test]
async fn test_favorites_follow_toggle() {
    let repo = logged_in(UserStatus::Normal).await;

    assert_ok!(repo.toggle_favorite("chess", true).await);
    assert_ok!(repo.toggle_favorite("radio", true).await);

    let favorites = assert_ok!(repo.get_favorite_apps(1, 20).await);
    let ids: Vec<&str> = favorites.items.iter().map(|app| app.id.as_str()).collect();
    assert_eq!(ids, vec!["chess", "radio"]);
    assert!(favorites.items.iter().all(|app| app.is_favorite));
    assert!(!favorites.has_more());

    assert_ok!(repo.toggle_favorite("chess", false).await);
    let favorites = assert_ok!(repo.get_favorite_apps(1, 20).await);
    assert_eq!(favorites.total_count, 1);
    assert_eq!(favorites.items[0].id, "radio");
}

#[tokio::test]
async fn test_mutations_require_login() {
    let repo = repository(UserStatus::Normal);

    assert!(matches!(
        repo.toggle_favorite("chess", true).await,
        Err(StoreError::Auth { .. })
    ));
    assert!(matches!(
        repo.get_favorite_apps(1, 20).await,
        Err(StoreError::Auth { .. })
    ));
    assert_eq!(repo.api().calls(), 0);
}

#[tokio::test]
async fn test_banned_account_can_read_but_not_write() {
    let repo = logged_in(UserStatus::Banned).await;

    assert_ok!(repo.get_featured_apps().await);
    assert!(matches!(
        repo.post_comment("chess", 4, "great").await,
        Err(StoreError::Auth { .. })
    ));
    assert!(matches!(
        repo.toggle_favorite("chess", true).await,
        Err(StoreError::Auth { .. })
    ));
    assert!(matches!(
        repo.submit_report(ReportType::App, "chess", ReportReason::Spam, "").await,
        Err(StoreError::Auth { .. })
    ));
}

#[tokio::test]
async fn test_post_comment_and_report() {
    let repo = logged_in(UserStatus::Normal).await;

    let comment = assert_ok!(repo.post_comment("chess", 5, "  love it  ").await);
    assert_eq!(comment.rating.value(), 5);
    assert_eq!(comment.content, "love it");

    let report = assert_ok!(
        repo.submit_report(ReportType::Comment, "c-1", ReportReason::Other, "spoilers")
            .await
    );
    assert_eq!(report.status, ReportStatus::Pending);
    assert_eq!(report.reporter_user_id, "u-1");
    assert!(report.status.can_transition_to(ReportStatus::Reviewing));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let repo = logged_in(UserStatus::Normal).await;
    assert!(repo.current_user().await.is_some());

    assert_ok!(repo.logout().await);
    assert!(repo.current_user().await.is_none());

    // A second logout is a no-op.
    let calls = repo.api().calls();
    assert_ok!(repo.logout().await);
    assert_eq!(repo.api().calls(), calls);
}

#[tokio::test]
async fn test_logout_with_rejected_token_still_clears_session() {
    let repo = logged_in(UserStatus::Normal).await;
    *repo.api().logout_status.lock().await = Some(StoreError::auth("token expired"));

    assert_ok!(repo.logout().await);
    assert!(repo.current_user().await.is_none());
}

#[tokio::test]
async fn test_logout_transport_failure_keeps_session() {
    let repo = logged_in(UserStatus::Normal).await;
    *repo.api().logout_status.lock().await = Some(StoreError::transport("connection reset"));

    assert_err!(repo.logout().await);
    assert!(repo.current_user().await.is_some());
}

#[tokio::test]
async fn test_request_download_queues_pending_download() {
    let repo = repository(UserStatus::Normal);
    let manager = RecordingDownloadManager::default();

    let download = assert_ok!(repo.request_download("chess", &manager).await);
    assert_eq!(download.status, DownloadStatus::Pending);
    assert_eq!(download.app_id, "chess");
    assert_eq!(download.urls, vec!["https://cdn.example.com/chess.apk".to_string()]);
    assert!(download.id.starts_with("chess-12-"));

    let queued = manager.queued.lock().await;
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0], download);
}

#[tokio::test]
async fn test_request_download_without_url_is_not_found() {
    let repo = repository(UserStatus::Normal);
    let manager = RecordingDownloadManager::default();

    assert!(matches!(
        repo.request_download("notes", &manager).await,
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        repo.request_download("missing", &manager).await,
        Err(StoreError::NotFound { .. })
    ));
    assert!(manager.queued.lock().await.is_empty());
}

#[tokio::test]
async fn test_check_for_update() {
    let repo = repository(UserStatus::Normal);

    let update = assert_ok!(repo.check_for_update(29).await);
    assert_eq!(update.map(|v| v.version_code), Some(30));

    assert_eq!(assert_ok!(repo.check_for_update(30).await), None);
    assert_eq!(assert_ok!(repo.check_for_update(31).await), None);
}

#[tokio::test]
async fn test_search_pages_through_results() {
    let repo = repository(UserStatus::Normal);

    let first = assert_ok!(repo.search_apps("App", 1, 2).await);
    assert_eq!(first.apps.items.len(), 2);
    assert_eq!(first.apps.total_count, 3);
    assert!(first.apps.has_more());

    let second = assert_ok!(repo.search_apps("App", 2, 2).await);
    assert_eq!(second.apps.items.len(), 1);
    assert!(!second.apps.has_more());
}

#[tokio::test]
async fn test_recommendations_personalized_after_login() {
    let repo = logged_in(UserStatus::Normal).await;
    assert_ok!(repo.toggle_favorite("radio", true).await);

    let recommended = assert_ok!(repo.get_recommended_apps().await);
    let radio = recommended.iter().find(|app| app.id == "radio").unwrap();
    assert!(radio.is_favorite);
}

#[tokio::test]
async fn test_abandoned_login_leaves_no_session() {
    let repo = repository(UserStatus::Normal);
    repo.api().stalled.store(true, Ordering::SeqCst);

    let attempt = tokio::time::timeout(
        Duration::from_millis(20),
        repo.login("alice@example.com", PASSWORD),
    )
    .await;
    assert!(attempt.is_err());
    assert!(repo.current_user().await.is_none());

    repo.api().stalled.store(false, Ordering::SeqCst);
    assert_ok!(repo.login("alice@example.com", PASSWORD).await);
    assert!(repo.current_user().await.is_some());
}

#[tokio::test]
async fn test_abandoned_logout_keeps_session() {
    let repo = logged_in(UserStatus::Normal).await;
    let before = repo.current_user().await;
    repo.api().stalled.store(true, Ordering::SeqCst);

    tokio::select! {
        _ = repo.logout() => panic!("stalled logout must not complete"),
        _ = tokio::time::sleep(Duration::from_millis(20)) => {}
    }

    assert_eq!(repo.current_user().await, before);
    assert_ok!(repo.toggle_favorite("chess", true).await);
}
