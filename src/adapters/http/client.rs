use crate::adapters::http::endpoints::{self, Endpoint, PreparedRequest, RequestBody, RequestParams};
use crate::domain::account::{LoginResponse, RegisterForm, RegisterResponse, User};
use crate::domain::envelope::{ApiResponse, PageRequest, PagedResponse};
use crate::domain::model::{App, Banner, Category, Comment, RankingType, Rating, SearchResult, VersionInfo};
use crate::domain::ports::{ApiDialect, ConfigProvider, StoreApi};
use crate::domain::report::{Report, ReportSubmission};
use crate::utils::error::{Result, StoreError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// reqwest-backed implementation of the store contract.
#[derive(Debug, Clone)]
pub struct HttpStoreApi {
    client: Client,
    base_url: Url,
    dialect: ApiDialect,
}

/// Fields we try to salvage from a non-2xx body.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(rename = "message", alias = "msg")]
    message: Option<String>,
    #[serde(rename = "errorCode", alias = "code")]
    error_code: Option<String>,
}

impl HttpStoreApi {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in config.default_headers() {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| StoreError::Config {
                message: format!("invalid header name '{}': {}", name, e),
            })?;
            let value = HeaderValue::from_str(&value).map_err(|e| StoreError::Config {
                message: format!("invalid value for header {}: {}", name, e),
            })?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent())
            .default_headers(headers)
            .build()?;
        Self::with_client(client, config.base_url(), config.dialect())
    }

    pub fn with_client(client: Client, base_url: &str, dialect: ApiDialect) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Config {
                message: format!("{} cannot be used as a base URL", base_url),
            });
        }
        Ok(Self {
            client,
            base_url,
            dialect,
        })
    }

    pub fn dialect(&self) -> ApiDialect {
        self.dialect
    }

    pub fn url_for(&self, request: &PreparedRequest) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::internal("base URL cannot carry a path"))?;
            segments.pop_if_empty();
            segments.extend(request.path_segments.iter());
        }
        Ok(url)
    }

    async fn call<T: DeserializeOwned + Send>(
        &self,
        endpoint: &'static Endpoint,
        params: RequestParams,
    ) -> Result<ApiResponse<T>> {
        let prepared = endpoint.prepare(self.dialect, &params)?;
        let url = self.url_for(&prepared)?;
        let resource = prepared.display_path();

        tracing::debug!(
            endpoint = endpoint.name,
            method = %prepared.method,
            path = %resource,
            "sending request"
        );

        let mut request = self
            .client
            .request(prepared.method.as_reqwest(), url)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(token) = &prepared.bearer {
            request = request.bearer_auth(token);
        }
        if !prepared.query.is_empty() {
            request = request.query(&prepared.query);
        }
        request = match &prepared.body {
            RequestBody::Empty => request,
            RequestBody::Form(fields) => request.form(fields),
            RequestBody::Json(map) => request.json(map),
        };

        let response = request.send().await.map_err(|e| {
            let err = StoreError::from(e);
            tracing::warn!(endpoint = endpoint.name, error = %err, "request did not complete");
            err
        })?;

        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(endpoint = endpoint.name, status = status.as_u16(), "response received");

        if !status.is_success() {
            let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
            let err = StoreError::from_status(
                status.as_u16(),
                &resource,
                body.error_code.as_deref(),
                body.message.as_deref(),
            );
            tracing::warn!(endpoint = endpoint.name, status = status.as_u16(), error = %err, "request failed");
            return Err(err);
        }

        decode_body(self.dialect, &text).inspect_err(|err| {
            tracing::warn!(endpoint = endpoint.name, error = %err, "response could not be decoded");
        })
    }

    async fn call_unit(&self, endpoint: &'static Endpoint, params: RequestParams) -> Result<ApiResponse<()>> {
        let response: ApiResponse<Value> = self.call(endpoint, params).await?;
        Ok(response.map_data(|_| ()))
    }
}

/// Turns a 2xx body into an envelope. Legacy deployments send bare
/// entities, which are wrapped so callers only ever see one convention.
pub fn decode_body<T: DeserializeOwned>(dialect: ApiDialect, body: &str) -> Result<ApiResponse<T>> {
    let value: Value = if body.trim().is_empty() {
        match dialect {
            ApiDialect::V1 => return Err(StoreError::transport("malformed response: empty body")),
            ApiDialect::Legacy => Value::Null,
        }
    } else {
        serde_json::from_str(body)?
    };

    // A failure is classified by its code; whatever sits in `data` is not
    // held against the success type.
    if is_failure_envelope(&value) {
        let failure: ApiResponse<Value> = serde_json::from_value(value)?;
        return Ok(ApiResponse {
            success: false,
            data: None,
            message: failure.message,
            error_code: failure.error_code,
        });
    }

    match dialect {
        ApiDialect::V1 => Ok(serde_json::from_value(value)?),
        ApiDialect::Legacy => Ok(ApiResponse::ok(serde_json::from_value(value)?)),
    }
}

fn is_failure_envelope(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|obj| obj.get("success"))
        .and_then(Value::as_bool)
        == Some(false)
}

fn paging(params: RequestParams, page: PageRequest) -> RequestParams {
    params
        .with("page", page.page())
        .with("pageSize", page.page_size())
}

#[async_trait]
impl StoreApi for HttpStoreApi {
    async fn login(&self, email: &str, password: &str) -> Result<ApiResponse<LoginResponse>> {
        let params = RequestParams::new()
            .with("email", email)
            .with("password", password);
        self.call(&endpoints::LOGIN, params).await
    }

    async fn register(&self, form: &RegisterForm) -> Result<ApiResponse<RegisterResponse>> {
        let params = RequestParams::new()
            .with("username", form.username.as_str())
            .with("email", form.email.as_str())
            .with("password", form.password.as_str())
            .with("confirmPassword", form.confirm_password.as_str());
        self.call(&endpoints::REGISTER, params).await
    }

    async fn verify_email(&self, token: &str, code: &str) -> Result<ApiResponse<User>> {
        let params = RequestParams::new().with("code", code).bearer(Some(token));
        self.call(&endpoints::VERIFY_EMAIL, params).await
    }

    async fn logout(&self, token: &str) -> Result<ApiResponse<()>> {
        self.call_unit(&endpoints::LOGOUT, RequestParams::new().bearer(Some(token)))
            .await
    }

    async fn get_user_profile(&self, token: &str) -> Result<ApiResponse<User>> {
        self.call(&endpoints::USER_PROFILE, RequestParams::new().bearer(Some(token)))
            .await
    }

    async fn get_featured_apps(&self) -> Result<ApiResponse<Vec<App>>> {
        self.call(&endpoints::FEATURED_APPS, RequestParams::new()).await
    }

    async fn get_new_apps(&self) -> Result<ApiResponse<Vec<App>>> {
        self.call(&endpoints::NEW_APPS, RequestParams::new()).await
    }

    async fn get_recommended_apps(&self, token: Option<&str>) -> Result<ApiResponse<Vec<App>>> {
        self.call(&endpoints::RECOMMENDED_APPS, RequestParams::new().bearer(token))
            .await
    }

    async fn get_app_detail(&self, app_id: &str, token: Option<&str>) -> Result<ApiResponse<App>> {
        let params = RequestParams::new().with("appId", app_id).bearer(token);
        self.call(&endpoints::APP_DETAIL, params).await
    }

    async fn search_apps(&self, keyword: &str, page: PageRequest) -> Result<ApiResponse<SearchResult>> {
        let params = paging(RequestParams::new().with("keyword", keyword), page);
        self.call(&endpoints::SEARCH_APPS, params).await
    }

    async fn get_categories(&self) -> Result<ApiResponse<Vec<Category>>> {
        self.call(&endpoints::CATEGORIES, RequestParams::new()).await
    }

    async fn get_category_apps(
        &self,
        category_id: &str,
        page: PageRequest,
    ) -> Result<ApiResponse<PagedResponse<App>>> {
        let params = paging(RequestParams::new().with("categoryId", category_id), page);
        self.call(&endpoints::CATEGORY_APPS, params).await
    }

    async fn get_ranking_apps(
        &self,
        ranking: RankingType,
        page: PageRequest,
    ) -> Result<ApiResponse<PagedResponse<App>>> {
        let params = paging(RequestParams::new().with("type", ranking.as_wire()), page);
        self.call(&endpoints::RANKING_APPS, params).await
    }

    async fn get_banners(&self) -> Result<ApiResponse<Vec<Banner>>> {
        self.call(&endpoints::BANNERS, RequestParams::new()).await
    }

    async fn get_app_comments(
        &self,
        app_id: &str,
        page: PageRequest,
    ) -> Result<ApiResponse<PagedResponse<Comment>>> {
        let params = paging(RequestParams::new().with("appId", app_id), page);
        self.call(&endpoints::APP_COMMENTS, params).await
    }

    async fn post_comment(
        &self,
        token: &str,
        app_id: &str,
        rating: Rating,
        content: &str,
    ) -> Result<ApiResponse<Comment>> {
        let params = RequestParams::new()
            .with("appId", app_id)
            .with("rating", rating.value())
            .with("content", content)
            .bearer(Some(token));
        self.call(&endpoints::POST_COMMENT, params).await
    }

    async fn toggle_favorite(&self, token: &str, app_id: &str, favorite: bool) -> Result<ApiResponse<()>> {
        let params = RequestParams::new()
            .with("appId", app_id)
            .with("favorite", favorite)
            .bearer(Some(token));
        self.call_unit(&endpoints::TOGGLE_FAVORITE, params).await
    }

    async fn get_favorite_apps(
        &self,
        token: &str,
        page: PageRequest,
    ) -> Result<ApiResponse<PagedResponse<App>>> {
        let params = paging(RequestParams::new().bearer(Some(token)), page);
        self.call(&endpoints::FAVORITE_APPS, params).await
    }

    async fn submit_report(&self, token: &str, report: &ReportSubmission) -> Result<ApiResponse<Report>> {
        let mut params = RequestParams::new()
            .with("reportType", serde_json::to_value(report.report_type)?)
            .with("targetId", report.target_id.as_str())
            .with("reason", serde_json::to_value(report.reason)?)
            .bearer(Some(token));
        if !report.description.is_empty() {
            params = params.with("description", report.description.as_str());
        }
        self.call(&endpoints::SUBMIT_REPORT, params).await
    }

    async fn get_latest_version(&self) -> Result<ApiResponse<VersionInfo>> {
        self.call(&endpoints::LATEST_VERSION, RequestParams::new()).await
    }
}
