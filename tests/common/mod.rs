#![allow(dead_code)]

use appstore_client::domain::account::{LoginResponse, RegisterForm, RegisterResponse, User, UserRole, UserStatus};
use appstore_client::domain::download::Download;
use appstore_client::domain::envelope::{ApiResponse, PageRequest, PagedResponse};
use appstore_client::domain::model::{
    App, Banner, Category, Comment, RankingType, Rating, SearchResult, VersionInfo,
};
use appstore_client::domain::report::{Report, ReportStatus, ReportSubmission};
use appstore_client::{DownloadManager, Result, StoreApi};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

pub const PASSWORD: &str = "secret-pass";

pub fn sample_user(status: UserStatus) -> User {
    User {
        id: "u-1".to_string(),
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        is_verified: true,
        role: UserRole::User,
        status,
        avatar: None,
        created_at: Utc::now(),
    }
}

pub fn sample_app(id: &str, download_url: Option<&str>) -> App {
    App {
        id: id.to_string(),
        name: format!("App {}", id),
        developer: "Acme".to_string(),
        version: "1.2.0".to_string(),
        version_code: 12,
        icon: format!("https://cdn.example.com/{}.png", id),
        screenshots: vec![],
        description: "An app".to_string(),
        short_description: String::new(),
        size_bytes: 1024,
        category_id: "games".to_string(),
        rating: 4.5,
        download_count: 10,
        price: 0.0,
        released_at: Utc::now(),
        updated_at: None,
        permissions: BTreeSet::new(),
        tags: vec![],
        compatible_devices: vec![],
        download_url: download_url.map(str::to_string),
        is_installed: false,
        is_favorite: false,
    }
}

pub fn sample_version(version_code: u32) -> VersionInfo {
    VersionInfo {
        version_name: format!("2.{}", version_code),
        version_code,
        download_url: "https://cdn.example.com/client.apk".to_string(),
        force_update: false,
        min_android_version: 21,
        release_notes: None,
    }
}

fn page_of<T: Clone>(all: &[T], page: PageRequest) -> PagedResponse<T> {
    let start = ((page.page() - 1) * page.page_size()) as usize;
    PagedResponse {
        items: all.iter().skip(start).take(page.page_size() as usize).cloned().collect(),
        total_count: all.len() as u64,
        page: page.page(),
        page_size: page.page_size(),
    }
}

/// In-memory backend. Counts every call so tests can prove that local
/// validation happened before any round-trip.
pub struct FakeStore {
    pub apps: Vec<App>,
    pub user: User,
    pub latest: VersionInfo,
    pub favorites: Mutex<HashMap<String, Vec<String>>>,
    pub logout_status: Mutex<Option<appstore_client::StoreError>>,
    /// When set, login and logout never answer.
    pub stalled: AtomicBool,
    calls: AtomicUsize,
}

impl FakeStore {
    pub fn new(user: User) -> Self {
        Self {
            apps: vec![
                sample_app("chess", Some("https://cdn.example.com/chess.apk")),
                sample_app("notes", None),
                sample_app("radio", Some("https://cdn.example.com/radio.apk")),
            ],
            user,
            latest: sample_version(30),
            favorites: Mutex::new(HashMap::new()),
            logout_status: Mutex::new(None),
            stalled: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn stall_if_requested(&self) {
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }

    fn token(&self) -> String {
        format!("token-{}", self.user.id)
    }

    fn check_token<T>(&self, token: &str) -> Option<ApiResponse<T>> {
        (token != self.token()).then(|| ApiResponse::failure("INVALID_TOKEN", "token rejected"))
    }

    fn find_app(&self, app_id: &str) -> Option<App> {
        self.apps.iter().find(|app| app.id == app_id).cloned()
    }
}

#[async_trait]
impl StoreApi for FakeStore {
    async fn login(&self, email: &str, password: &str) -> Result<ApiResponse<LoginResponse>> {
        self.hit();
        self.stall_if_requested().await;
        if email != self.user.email || password != PASSWORD {
            return Ok(ApiResponse::failure("INVALID_CREDENTIALS", "wrong email or password"));
        }
        Ok(ApiResponse::ok(LoginResponse {
            token: self.token(),
            user: self.user.clone(),
        }))
    }

    async fn register(&self, form: &RegisterForm) -> Result<ApiResponse<RegisterResponse>> {
        self.hit();
        let mut user = self.user.clone();
        user.username = form.username.clone();
        user.email = form.email.clone();
        user.is_verified = false;
        Ok(ApiResponse::ok(RegisterResponse {
            token: self.token(),
            user,
            verification_sent: true,
        }))
    }

    async fn verify_email(&self, token: &str, code: &str) -> Result<ApiResponse<User>> {
        self.hit();
        if let Some(rejected) = self.check_token(token) {
            return Ok(rejected);
        }
        if code != "123456" {
            return Ok(ApiResponse::failure("INVALID_CODE", "verification code mismatch"));
        }
        let mut user = self.user.clone();
        user.is_verified = true;
        Ok(ApiResponse::ok(user))
    }

    async fn logout(&self, _token: &str) -> Result<ApiResponse<()>> {
        self.hit();
        self.stall_if_requested().await;
        match self.logout_status.lock().await.clone() {
            Some(err) => Err(err),
            None => Ok(ApiResponse::ok(())),
        }
    }

    async fn get_user_profile(&self, token: &str) -> Result<ApiResponse<User>> {
        self.hit();
        if let Some(rejected) = self.check_token(token) {
            return Ok(rejected);
        }
        Ok(ApiResponse::ok(self.user.clone()))
    }

    async fn get_featured_apps(&self) -> Result<ApiResponse<Vec<App>>> {
        self.hit();
        Ok(ApiResponse::ok(self.apps.clone()))
    }

    async fn get_new_apps(&self) -> Result<ApiResponse<Vec<App>>> {
        self.hit();
        Ok(ApiResponse::ok(self.apps.iter().rev().cloned().collect()))
    }

    async fn get_recommended_apps(&self, token: Option<&str>) -> Result<ApiResponse<Vec<App>>> {
        self.hit();
        let favorites = match token {
            Some(token) => self.favorites.lock().await.get(token).cloned().unwrap_or_default(),
            None => Vec::new(),
        };
        let apps = self
            .apps
            .iter()
            .cloned()
            .map(|mut app| {
                app.is_favorite = favorites.contains(&app.id);
                app
            })
            .collect();
        Ok(ApiResponse::ok(apps))
    }

    async fn get_app_detail(&self, app_id: &str, _token: Option<&str>) -> Result<ApiResponse<App>> {
        self.hit();
        Ok(match self.find_app(app_id) {
            Some(app) => ApiResponse::ok(app),
            None => ApiResponse::failure("APP_NOT_FOUND", "no such app"),
        })
    }

    async fn search_apps(&self, keyword: &str, page: PageRequest) -> Result<ApiResponse<SearchResult>> {
        self.hit();
        let matches: Vec<App> = self
            .apps
            .iter()
            .filter(|app| app.id.contains(keyword) || app.name.contains(keyword))
            .cloned()
            .collect();
        Ok(ApiResponse::ok(SearchResult {
            keyword: keyword.to_string(),
            apps: page_of(&matches, page),
            suggestions: vec![],
        }))
    }

    async fn get_categories(&self) -> Result<ApiResponse<Vec<Category>>> {
        self.hit();
        Ok(ApiResponse::ok(vec![]))
    }

    async fn get_category_apps(
        &self,
        category_id: &str,
        page: PageRequest,
    ) -> Result<ApiResponse<PagedResponse<App>>> {
        self.hit();
        let apps: Vec<App> = self
            .apps
            .iter()
            .filter(|app| app.category_id == category_id)
            .cloned()
            .collect();
        Ok(ApiResponse::ok(page_of(&apps, page)))
    }

    async fn get_ranking_apps(
        &self,
        _ranking: RankingType,
        page: PageRequest,
    ) -> Result<ApiResponse<PagedResponse<App>>> {
        self.hit();
        Ok(ApiResponse::ok(page_of(&self.apps, page)))
    }

    async fn get_banners(&self) -> Result<ApiResponse<Vec<Banner>>> {
        self.hit();
        Ok(ApiResponse::ok(vec![]))
    }

    async fn get_app_comments(
        &self,
        _app_id: &str,
        page: PageRequest,
    ) -> Result<ApiResponse<PagedResponse<Comment>>> {
        self.hit();
        Ok(ApiResponse::ok(page_of(&[], page)))
    }

    async fn post_comment(
        &self,
        token: &str,
        app_id: &str,
        rating: Rating,
        content: &str,
    ) -> Result<ApiResponse<Comment>> {
        self.hit();
        if let Some(rejected) = self.check_token(token) {
            return Ok(rejected);
        }
        Ok(ApiResponse::ok(Comment {
            id: "c-1".to_string(),
            app_id: app_id.to_string(),
            user_id: self.user.id.clone(),
            user_name: Some(self.user.username.clone()),
            rating,
            content: content.to_string(),
            posted_at: Utc::now(),
            likes: 0,
            dislikes: 0,
            developer_response: None,
        }))
    }

    async fn toggle_favorite(&self, token: &str, app_id: &str, favorite: bool) -> Result<ApiResponse<()>> {
        self.hit();
        if let Some(rejected) = self.check_token(token) {
            return Ok(rejected);
        }
        let mut favorites = self.favorites.lock().await;
        let ids = favorites.entry(token.to_string()).or_default();
        ids.retain(|id| id != app_id);
        if favorite {
            ids.push(app_id.to_string());
        }
        Ok(ApiResponse::ok(()))
    }

    async fn get_favorite_apps(
        &self,
        token: &str,
        page: PageRequest,
    ) -> Result<ApiResponse<PagedResponse<App>>> {
        self.hit();
        if let Some(rejected) = self.check_token(token) {
            return Ok(rejected);
        }
        let ids = self.favorites.lock().await.get(token).cloned().unwrap_or_default();
        let apps: Vec<App> = ids
            .iter()
            .filter_map(|id| self.find_app(id))
            .map(|mut app| {
                app.is_favorite = true;
                app
            })
            .collect();
        Ok(ApiResponse::ok(page_of(&apps, page)))
    }

    async fn submit_report(&self, token: &str, report: &ReportSubmission) -> Result<ApiResponse<Report>> {
        self.hit();
        if let Some(rejected) = self.check_token(token) {
            return Ok(rejected);
        }
        Ok(ApiResponse::ok(Report {
            id: "r-1".to_string(),
            report_type: report.report_type,
            target_id: report.target_id.clone(),
            reason: report.reason,
            description: report.description.clone(),
            reporter_user_id: self.user.id.clone(),
            status: ReportStatus::Pending,
            created_at: Some(Utc::now()),
        }))
    }

    async fn get_latest_version(&self) -> Result<ApiResponse<VersionInfo>> {
        self.hit();
        Ok(ApiResponse::ok(self.latest.clone()))
    }
}

/// Accepts every download and remembers it.
#[derive(Default)]
pub struct RecordingDownloadManager {
    pub queued: Mutex<Vec<Download>>,
}

#[async_trait]
impl DownloadManager for RecordingDownloadManager {
    async fn enqueue(&self, download: Download) -> Result<()> {
        self.queued.lock().await.push(download);
        Ok(())
    }
}
