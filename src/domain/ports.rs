use crate::domain::account::{LoginResponse, RegisterForm, RegisterResponse, User};
use crate::domain::download::Download;
use crate::domain::envelope::{ApiResponse, PageRequest, PagedResponse};
use crate::domain::model::{App, Banner, Category, Comment, RankingType, Rating, SearchResult, VersionInfo};
use crate::domain::report::{Report, ReportReason, ReportSubmission, ReportType};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// The backend has been deployed with two path conventions. Neither is
/// assumed; the deployment picks one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiDialect {
    /// `api/auth/login` style paths, every body wrapped in the envelope.
    V1,
    /// `user/login` style paths, bare entity bodies.
    Legacy,
}

impl FromStr for ApiDialect {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" => Ok(ApiDialect::V1),
            "legacy" => Ok(ApiDialect::Legacy),
            other => Err(format!("unknown API dialect '{}', expected v1 or legacy", other)),
        }
    }
}

impl fmt::Display for ApiDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiDialect::V1 => f.write_str("v1"),
            ApiDialect::Legacy => f.write_str("legacy"),
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn dialect(&self) -> ApiDialect;
    fn request_timeout(&self) -> Duration;
    fn user_agent(&self) -> &str;
    fn max_page_size(&self) -> u32;

    /// Headers sent with every request, e.g. a client channel tag.
    fn default_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Typed transport contract of the store backend. Implementations perform
/// the round-trip and always hand back an envelope; they never validate
/// caller input.
#[async_trait]
pub trait StoreApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<ApiResponse<LoginResponse>>;
    async fn register(&self, form: &RegisterForm) -> Result<ApiResponse<RegisterResponse>>;
    async fn verify_email(&self, token: &str, code: &str) -> Result<ApiResponse<User>>;
    async fn logout(&self, token: &str) -> Result<ApiResponse<()>>;
    async fn get_user_profile(&self, token: &str) -> Result<ApiResponse<User>>;

    async fn get_featured_apps(&self) -> Result<ApiResponse<Vec<App>>>;
    async fn get_new_apps(&self) -> Result<ApiResponse<Vec<App>>>;
    async fn get_recommended_apps(&self, token: Option<&str>) -> Result<ApiResponse<Vec<App>>>;
    async fn get_app_detail(&self, app_id: &str, token: Option<&str>) -> Result<ApiResponse<App>>;
    async fn search_apps(&self, keyword: &str, page: PageRequest) -> Result<ApiResponse<SearchResult>>;
    async fn get_categories(&self) -> Result<ApiResponse<Vec<Category>>>;
    async fn get_category_apps(
        &self,
        category_id: &str,
        page: PageRequest,
    ) -> Result<ApiResponse<PagedResponse<App>>>;
    async fn get_ranking_apps(
        &self,
        ranking: RankingType,
        page: PageRequest,
    ) -> Result<ApiResponse<PagedResponse<App>>>;
    async fn get_banners(&self) -> Result<ApiResponse<Vec<Banner>>>;

    async fn get_app_comments(
        &self,
        app_id: &str,
        page: PageRequest,
    ) -> Result<ApiResponse<PagedResponse<Comment>>>;
    async fn post_comment(
        &self,
        token: &str,
        app_id: &str,
        rating: Rating,
        content: &str,
    ) -> Result<ApiResponse<Comment>>;
    async fn toggle_favorite(&self, token: &str, app_id: &str, favorite: bool) -> Result<ApiResponse<()>>;
    async fn get_favorite_apps(
        &self,
        token: &str,
        page: PageRequest,
    ) -> Result<ApiResponse<PagedResponse<App>>>;

    async fn submit_report(&self, token: &str, report: &ReportSubmission) -> Result<ApiResponse<Report>>;

    async fn get_latest_version(&self) -> Result<ApiResponse<VersionInfo>>;
}

/// Executes downloads outside this crate and advances their status.
#[async_trait]
pub trait DownloadManager: Send + Sync {
    async fn enqueue(&self, download: Download) -> Result<()>;
}

/// What the rest of the application talks to. Every expected failure comes
/// back as a [`crate::utils::error::StoreError`].
#[async_trait]
pub trait Repository: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<User>;
    async fn register(&self, form: RegisterForm) -> Result<RegisterResponse>;
    async fn verify_email(&self, code: &str) -> Result<User>;
    async fn logout(&self) -> Result<()>;
    async fn current_user(&self) -> Option<User>;
    async fn get_user_profile(&self) -> Result<User>;

    async fn get_featured_apps(&self) -> Result<Vec<App>>;
    async fn get_new_apps(&self) -> Result<Vec<App>>;
    async fn get_recommended_apps(&self) -> Result<Vec<App>>;
    async fn get_app_detail(&self, app_id: &str) -> Result<App>;
    async fn search_apps(&self, keyword: &str, page: u32, page_size: u32) -> Result<SearchResult>;
    async fn get_categories(&self) -> Result<Vec<Category>>;
    async fn get_category_apps(
        &self,
        category_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<PagedResponse<App>>;
    async fn get_ranking_apps(
        &self,
        ranking: RankingType,
        page: u32,
        page_size: u32,
    ) -> Result<PagedResponse<App>>;
    async fn get_banners(&self) -> Result<Vec<Banner>>;

    async fn get_app_comments(&self, app_id: &str, page: u32, page_size: u32) -> Result<PagedResponse<Comment>>;
    async fn post_comment(&self, app_id: &str, rating: u8, content: &str) -> Result<Comment>;
    async fn toggle_favorite(&self, app_id: &str, favorite: bool) -> Result<()>;
    async fn get_favorite_apps(&self, page: u32, page_size: u32) -> Result<PagedResponse<App>>;

    async fn submit_report(
        &self,
        report_type: ReportType,
        target_id: &str,
        reason: ReportReason,
        description: &str,
    ) -> Result<Report>;

    async fn get_latest_version(&self) -> Result<VersionInfo>;
    async fn check_for_update(&self, installed_version_code: u32) -> Result<Option<VersionInfo>>;

    async fn request_download(&self, app_id: &str, manager: &dyn DownloadManager) -> Result<Download>;
}
