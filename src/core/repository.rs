use crate::domain::account::{RegisterForm, RegisterResponse, User};
use crate::domain::download::Download;
use crate::domain::envelope::{PageRequest, PagedResponse};
use crate::domain::model::{App, Banner, Category, Comment, RankingType, Rating, SearchResult, VersionInfo};
use crate::domain::ports::{DownloadManager, Repository, StoreApi};
use crate::domain::report::{Report, ReportReason, ReportSubmission, ReportType};
use crate::utils::error::{Result, StoreError};
use crate::utils::validation::{validate_email, validate_max_length, validate_non_empty_string};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;
pub const MAX_COMMENT_LENGTH: usize = 1000;
pub const MAX_REPORT_DESCRIPTION_LENGTH: usize = 500;
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone)]
struct Session {
    token: String,
    user: User,
}

/// The repository the application is handed at startup. It owns the login
/// session; everything else is fetched fresh from the backend.
pub struct StoreRepository<A: StoreApi> {
    api: A,
    session: RwLock<Option<Session>>,
    max_page_size: u32,
}

impl<A: StoreApi> StoreRepository<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            session: RwLock::new(None),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size.max(1);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn page(&self, page: u32, page_size: u32) -> Result<PageRequest> {
        PageRequest::new(page, page_size, self.max_page_size)
    }

    async fn token(&self) -> Option<String> {
        self.session.read().await.as_ref().map(|s| s.token.clone())
    }

    async fn require_session(&self) -> Result<Session> {
        self.session
            .read()
            .await
            .clone()
            .ok_or_else(|| StoreError::auth("not logged in"))
    }

    /// Session for a state-changing call; banned accounts stop here.
    async fn require_active_session(&self) -> Result<Session> {
        let session = self.require_session().await?;
        if session.user.is_banned() {
            tracing::warn!(user_id = %session.user.id, "mutating call refused for banned account");
            return Err(StoreError::auth("account is banned"));
        }
        Ok(session)
    }

    async fn start_session(&self, token: String, user: User) {
        tracing::info!(user_id = %user.id, "session started");
        *self.session.write().await = Some(Session { token, user });
    }

    /// Refreshes the cached user unless another login replaced the session
    /// while the request was in flight.
    async fn refresh_session_user(&self, token: &str, user: &User) {
        let mut guard = self.session.write().await;
        if let Some(session) = guard.as_mut() {
            if session.token == token {
                session.user = user.clone();
            }
        }
    }

    async fn end_session(&self, token: &str) {
        let mut guard = self.session.write().await;
        if guard.as_ref().map(|s| s.token.as_str()) == Some(token) {
            tracing::info!("session ended");
            *guard = None;
        }
    }
}

fn require_id(field: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field, value)
}

#[async_trait]
impl<A: StoreApi> Repository for StoreRepository<A> {
    async fn login(&self, email: &str, password: &str) -> Result<User> {
        validate_email("email", email)?;
        validate_non_empty_string("password", password)?;

        let response = self.api.login(email.trim(), password).await?.into_data()?;
        self.start_session(response.token, response.user.clone()).await;
        Ok(response.user)
    }

    async fn register(&self, form: RegisterForm) -> Result<RegisterResponse> {
        validate_non_empty_string("username", &form.username)?;
        validate_email("email", &form.email)?;
        if form.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(StoreError::validation(
                "password",
                format!("at least {} characters required", MIN_PASSWORD_LENGTH),
            ));
        }
        if form.password != form.confirm_password {
            return Err(StoreError::validation("confirmPassword", "passwords do not match"));
        }

        let response = self.api.register(&form).await?.into_data()?;
        self.start_session(response.token.clone(), response.user.clone())
            .await;
        Ok(response)
    }

    async fn verify_email(&self, code: &str) -> Result<User> {
        validate_non_empty_string("code", code)?;
        let session = self.require_session().await?;

        let user = self
            .api
            .verify_email(&session.token, code.trim())
            .await?
            .into_data()?;
        self.refresh_session_user(&session.token, &user).await;
        Ok(user)
    }

    async fn logout(&self) -> Result<()> {
        let Some(token) = self.token().await else {
            return Ok(());
        };

        let outcome = match self.api.logout(&token).await {
            Ok(response) => response.into_unit(),
            Err(err) => Err(err),
        };
        match outcome {
            // A rejected token is as good as logged out.
            Ok(()) | Err(StoreError::Auth { .. }) => {
                self.end_session(&token).await;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn current_user(&self) -> Option<User> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    async fn get_user_profile(&self) -> Result<User> {
        let session = self.require_session().await?;
        let user = self
            .api
            .get_user_profile(&session.token)
            .await?
            .into_data()?;
        self.refresh_session_user(&session.token, &user).await;
        Ok(user)
    }

    async fn get_featured_apps(&self) -> Result<Vec<App>> {
        self.api.get_featured_apps().await?.into_data()
    }

    async fn get_new_apps(&self) -> Result<Vec<App>> {
        self.api.get_new_apps().await?.into_data()
    }

    async fn get_recommended_apps(&self) -> Result<Vec<App>> {
        let token = self.token().await;
        self.api
            .get_recommended_apps(token.as_deref())
            .await?
            .into_data()
    }

    async fn get_app_detail(&self, app_id: &str) -> Result<App> {
        require_id("appId", app_id)?;
        let token = self.token().await;
        self.api
            .get_app_detail(app_id, token.as_deref())
            .await?
            .into_data()
    }

    async fn search_apps(&self, keyword: &str, page: u32, page_size: u32) -> Result<SearchResult> {
        validate_non_empty_string("keyword", keyword)?;
        let page = self.page(page, page_size)?;

        let mut result = self.api.search_apps(keyword.trim(), page).await?.into_data()?;
        result.apps = result.apps.validate()?;
        Ok(result)
    }

    async fn get_categories(&self) -> Result<Vec<Category>> {
        self.api.get_categories().await?.into_data()
    }

    async fn get_category_apps(
        &self,
        category_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<PagedResponse<App>> {
        require_id("categoryId", category_id)?;
        let page = self.page(page, page_size)?;
        self.api
            .get_category_apps(category_id, page)
            .await?
            .into_data()?
            .validate()
    }

    async fn get_ranking_apps(
        &self,
        ranking: RankingType,
        page: u32,
        page_size: u32,
    ) -> Result<PagedResponse<App>> {
        let page = self.page(page, page_size)?;
        self.api
            .get_ranking_apps(ranking, page)
            .await?
            .into_data()?
            .validate()
    }

    async fn get_banners(&self) -> Result<Vec<Banner>> {
        self.api.get_banners().await?.into_data()
    }

    async fn get_app_comments(&self, app_id: &str, page: u32, page_size: u32) -> Result<PagedResponse<Comment>> {
        require_id("appId", app_id)?;
        let page = self.page(page, page_size)?;
        self.api
            .get_app_comments(app_id, page)
            .await?
            .into_data()?
            .validate()
    }

    async fn post_comment(&self, app_id: &str, rating: u8, content: &str) -> Result<Comment> {
        let rating = Rating::try_from(rating).map_err(|message| StoreError::validation("rating", message))?;
        require_id("appId", app_id)?;
        validate_non_empty_string("content", content)?;
        validate_max_length("content", content, MAX_COMMENT_LENGTH)?;
        let session = self.require_active_session().await?;

        self.api
            .post_comment(&session.token, app_id, rating, content.trim())
            .await?
            .into_data()
    }

    async fn toggle_favorite(&self, app_id: &str, favorite: bool) -> Result<()> {
        require_id("appId", app_id)?;
        let session = self.require_active_session().await?;

        self.api
            .toggle_favorite(&session.token, app_id, favorite)
            .await?
            .into_unit()
    }

    async fn get_favorite_apps(&self, page: u32, page_size: u32) -> Result<PagedResponse<App>> {
        let page = self.page(page, page_size)?;
        let session = self.require_session().await?;
        self.api
            .get_favorite_apps(&session.token, page)
            .await?
            .into_data()?
            .validate()
    }

    async fn submit_report(
        &self,
        report_type: ReportType,
        target_id: &str,
        reason: ReportReason,
        description: &str,
    ) -> Result<Report> {
        require_id("targetId", target_id)?;
        validate_max_length("description", description, MAX_REPORT_DESCRIPTION_LENGTH)?;
        if reason.requires_description() {
            validate_non_empty_string("description", description)?;
        }
        let session = self.require_active_session().await?;

        let submission = ReportSubmission {
            report_type,
            target_id: target_id.to_string(),
            reason,
            description: description.trim().to_string(),
        };
        self.api
            .submit_report(&session.token, &submission)
            .await?
            .into_data()
    }

    async fn get_latest_version(&self) -> Result<VersionInfo> {
        self.api.get_latest_version().await?.into_data()
    }

    async fn check_for_update(&self, installed_version_code: u32) -> Result<Option<VersionInfo>> {
        let latest = self.get_latest_version().await?;
        Ok(latest.is_newer_than(installed_version_code).then_some(latest))
    }

    async fn request_download(&self, app_id: &str, manager: &dyn DownloadManager) -> Result<Download> {
        let app = self.get_app_detail(app_id).await?;
        let url = app.download_url.clone().ok_or_else(|| StoreError::NotFound {
            resource: format!("download URL for app {}", app.id),
        })?;

        let id = format!("{}-{}-{}", app.id, app.version_code, Utc::now().timestamp_millis());
        let download = Download::new(id, app.id.clone(), vec![url])?;
        manager.enqueue(download.clone()).await?;
        tracing::info!(app_id = %app.id, download_id = %download.id, "download queued");
        Ok(download)
    }
}
