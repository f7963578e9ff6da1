//! Declared backend operations.
//!
//! Each [`Endpoint`] states the method, the path template for both backend
//! dialects, where every parameter goes and whether a bearer token is sent.
//! Nothing here performs I/O; [`Endpoint::prepare`] only resolves a call
//! into a [`PreparedRequest`] that a transport can execute.

use crate::domain::ports::ApiDialect;
use crate::utils::error::{Result, StoreError};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_reqwest(&self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Auth,
    Catalog,
    Social,
    Governance,
    Versioning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    None,
    /// Token is attached when the caller has one; responses get per-user flags.
    Optional,
    Bearer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    None,
    Form,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub location: ParamLocation,
    pub required: bool,
    pub default: Option<&'static str>,
}

const fn path(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        location: ParamLocation::Path,
        required: true,
        default: None,
    }
}

const fn query(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        location: ParamLocation::Query,
        required: true,
        default: None,
    }
}

const fn body(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        location: ParamLocation::Body,
        required: true,
        default: None,
    }
}

const fn optional_body(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        location: ParamLocation::Body,
        required: false,
        default: None,
    }
}

const PAGE: ParamSpec = ParamSpec {
    name: "page",
    location: ParamLocation::Query,
    required: false,
    default: Some("1"),
};

const PAGE_SIZE: ParamSpec = ParamSpec {
    name: "pageSize",
    location: ParamLocation::Query,
    required: false,
    default: Some("20"),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub resource: Resource,
    pub method: HttpMethod,
    pub v1_path: &'static str,
    pub legacy_path: &'static str,
    pub auth: AuthRequirement,
    pub body: BodyEncoding,
    pub params: &'static [ParamSpec],
}

pub const LOGIN: Endpoint = Endpoint {
    name: "login",
    resource: Resource::Auth,
    method: HttpMethod::Post,
    v1_path: "api/auth/login",
    legacy_path: "user/login",
    auth: AuthRequirement::None,
    body: BodyEncoding::Form,
    params: &[body("email"), body("password")],
};

pub const REGISTER: Endpoint = Endpoint {
    name: "register",
    resource: Resource::Auth,
    method: HttpMethod::Post,
    v1_path: "api/auth/register",
    legacy_path: "user/register",
    auth: AuthRequirement::None,
    body: BodyEncoding::Form,
    params: &[
        body("username"),
        body("email"),
        body("password"),
        body("confirmPassword"),
    ],
};

pub const VERIFY_EMAIL: Endpoint = Endpoint {
    name: "verifyEmail",
    resource: Resource::Auth,
    method: HttpMethod::Post,
    v1_path: "api/auth/verify-email",
    legacy_path: "user/verifyEmail",
    auth: AuthRequirement::Bearer,
    body: BodyEncoding::Form,
    params: &[body("code")],
};

pub const LOGOUT: Endpoint = Endpoint {
    name: "logout",
    resource: Resource::Auth,
    method: HttpMethod::Post,
    v1_path: "api/auth/logout",
    legacy_path: "user/logout",
    auth: AuthRequirement::Bearer,
    body: BodyEncoding::None,
    params: &[],
};

pub const USER_PROFILE: Endpoint = Endpoint {
    name: "getUserProfile",
    resource: Resource::Auth,
    method: HttpMethod::Get,
    v1_path: "api/user/profile",
    legacy_path: "user/profile",
    auth: AuthRequirement::Bearer,
    body: BodyEncoding::None,
    params: &[],
};

pub const FEATURED_APPS: Endpoint = Endpoint {
    name: "getFeatured",
    resource: Resource::Catalog,
    method: HttpMethod::Get,
    v1_path: "api/apps/featured",
    legacy_path: "app/featured",
    auth: AuthRequirement::None,
    body: BodyEncoding::None,
    params: &[],
};

pub const NEW_APPS: Endpoint = Endpoint {
    name: "getNew",
    resource: Resource::Catalog,
    method: HttpMethod::Get,
    v1_path: "api/apps/new",
    legacy_path: "app/new",
    auth: AuthRequirement::None,
    body: BodyEncoding::None,
    params: &[],
};

pub const RECOMMENDED_APPS: Endpoint = Endpoint {
    name: "getRecommended",
    resource: Resource::Catalog,
    method: HttpMethod::Get,
    v1_path: "api/apps/recommended",
    legacy_path: "app/recommended",
    auth: AuthRequirement::Optional,
    body: BodyEncoding::None,
    params: &[],
};

pub const APP_DETAIL: Endpoint = Endpoint {
    name: "getAppDetail",
    resource: Resource::Catalog,
    method: HttpMethod::Get,
    v1_path: "api/apps/{appId}",
    legacy_path: "app/detail/{appId}",
    auth: AuthRequirement::Optional,
    body: BodyEncoding::None,
    params: &[path("appId")],
};

pub const SEARCH_APPS: Endpoint = Endpoint {
    name: "searchApps",
    resource: Resource::Catalog,
    method: HttpMethod::Get,
    v1_path: "api/apps/search",
    legacy_path: "app/search",
    auth: AuthRequirement::None,
    body: BodyEncoding::None,
    params: &[query("keyword"), PAGE, PAGE_SIZE],
};

pub const CATEGORIES: Endpoint = Endpoint {
    name: "getCategories",
    resource: Resource::Catalog,
    method: HttpMethod::Get,
    v1_path: "api/categories",
    legacy_path: "category/list",
    auth: AuthRequirement::None,
    body: BodyEncoding::None,
    params: &[],
};

pub const CATEGORY_APPS: Endpoint = Endpoint {
    name: "getCategoryApps",
    resource: Resource::Catalog,
    method: HttpMethod::Get,
    v1_path: "api/categories/{categoryId}/apps",
    legacy_path: "category/{categoryId}/apps",
    auth: AuthRequirement::None,
    body: BodyEncoding::None,
    params: &[path("categoryId"), PAGE, PAGE_SIZE],
};

pub const RANKING_APPS: Endpoint = Endpoint {
    name: "getRankingApps",
    resource: Resource::Catalog,
    method: HttpMethod::Get,
    v1_path: "api/apps/ranking",
    legacy_path: "app/ranking",
    auth: AuthRequirement::None,
    body: BodyEncoding::None,
    params: &[query("type"), PAGE, PAGE_SIZE],
};

pub const BANNERS: Endpoint = Endpoint {
    name: "getBanners",
    resource: Resource::Catalog,
    method: HttpMethod::Get,
    v1_path: "api/banners",
    legacy_path: "app/banners",
    auth: AuthRequirement::None,
    body: BodyEncoding::None,
    params: &[],
};

pub const APP_COMMENTS: Endpoint = Endpoint {
    name: "getAppComments",
    resource: Resource::Social,
    method: HttpMethod::Get,
    v1_path: "api/apps/{appId}/comments",
    legacy_path: "comment/list/{appId}",
    auth: AuthRequirement::None,
    body: BodyEncoding::None,
    params: &[path("appId"), PAGE, PAGE_SIZE],
};

pub const POST_COMMENT: Endpoint = Endpoint {
    name: "postComment",
    resource: Resource::Social,
    method: HttpMethod::Post,
    v1_path: "api/apps/{appId}/comments",
    legacy_path: "comment/post/{appId}",
    auth: AuthRequirement::Bearer,
    body: BodyEncoding::Json,
    params: &[path("appId"), body("rating"), body("content")],
};

pub const TOGGLE_FAVORITE: Endpoint = Endpoint {
    name: "toggleFavorite",
    resource: Resource::Social,
    method: HttpMethod::Post,
    v1_path: "api/apps/{appId}/favorite",
    legacy_path: "user/favorite/{appId}",
    auth: AuthRequirement::Bearer,
    body: BodyEncoding::Json,
    params: &[path("appId"), body("favorite")],
};

pub const FAVORITE_APPS: Endpoint = Endpoint {
    name: "getFavoriteApps",
    resource: Resource::Social,
    method: HttpMethod::Get,
    v1_path: "api/user/favorites",
    legacy_path: "user/favorites",
    auth: AuthRequirement::Bearer,
    body: BodyEncoding::None,
    params: &[PAGE, PAGE_SIZE],
};

pub const SUBMIT_REPORT: Endpoint = Endpoint {
    name: "submitReport",
    resource: Resource::Governance,
    method: HttpMethod::Post,
    v1_path: "api/reports",
    legacy_path: "report/submit",
    auth: AuthRequirement::Bearer,
    body: BodyEncoding::Json,
    params: &[
        body("reportType"),
        body("targetId"),
        body("reason"),
        optional_body("description"),
    ],
};

pub const LATEST_VERSION: Endpoint = Endpoint {
    name: "getLatestVersion",
    resource: Resource::Versioning,
    method: HttpMethod::Get,
    v1_path: "api/version/latest",
    legacy_path: "version/latest",
    auth: AuthRequirement::None,
    body: BodyEncoding::None,
    params: &[],
};

pub const ALL: &[&Endpoint] = &[
    &LOGIN,
    &REGISTER,
    &VERIFY_EMAIL,
    &LOGOUT,
    &USER_PROFILE,
    &FEATURED_APPS,
    &NEW_APPS,
    &RECOMMENDED_APPS,
    &APP_DETAIL,
    &SEARCH_APPS,
    &CATEGORIES,
    &CATEGORY_APPS,
    &RANKING_APPS,
    &BANNERS,
    &APP_COMMENTS,
    &POST_COMMENT,
    &TOGGLE_FAVORITE,
    &FAVORITE_APPS,
    &SUBMIT_REPORT,
    &LATEST_VERSION,
];

/// Values supplied for one call, keyed by the declared parameter name.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    values: Vec<(&'static str, Value)>,
    token: Option<String>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.values.push((name, value.into()));
        self
    }

    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Form(Vec<(String, String)>),
    Json(Map<String, Value>),
}

/// A declared call with every parameter resolved. Path segments are kept
/// unescaped; the transport percent-encodes them when building the URL.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub path_segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub bearer: Option<String>,
}

impl PreparedRequest {
    pub fn display_path(&self) -> String {
        self.path_segments.join("/")
    }
}

impl Endpoint {
    pub fn path_template(&self, dialect: ApiDialect) -> &'static str {
        match dialect {
            ApiDialect::V1 => self.v1_path,
            ApiDialect::Legacy => self.legacy_path,
        }
    }

    /// Safe reads may be repeated; anything that changes server state may not.
    pub fn is_retryable(&self) -> bool {
        self.method == HttpMethod::Get
    }

    pub fn prepare(&self, dialect: ApiDialect, params: &RequestParams) -> Result<PreparedRequest> {
        for (name, _) in &params.values {
            if !self.params.iter().any(|spec| spec.name == *name) {
                return Err(StoreError::internal(format!(
                    "{} does not declare a parameter named '{}'",
                    self.name, name
                )));
            }
        }

        let bearer = match (self.auth, &params.token) {
            (AuthRequirement::Bearer, None) => {
                return Err(StoreError::auth(format!("{} requires a logged-in user", self.name)));
            }
            (AuthRequirement::None, _) => None,
            (_, token) => token.clone(),
        };

        let mut path_values = Vec::new();
        let mut query = Vec::new();
        let mut form = Vec::new();
        let mut json = Map::new();

        for spec in self.params {
            let value = match (params.get(spec.name), spec.default) {
                (Some(value), _) => value.clone(),
                (None, Some(default)) => Value::String(default.to_string()),
                (None, None) if spec.required => {
                    return Err(StoreError::internal(format!(
                        "{} is missing required parameter '{}'",
                        self.name, spec.name
                    )));
                }
                (None, None) => continue,
            };

            match spec.location {
                ParamLocation::Path => path_values.push((spec.name, value_to_string(&value))),
                ParamLocation::Query => query.push((spec.name.to_string(), value_to_string(&value))),
                ParamLocation::Body => match self.body {
                    BodyEncoding::Json => {
                        json.insert(spec.name.to_string(), value);
                    }
                    BodyEncoding::Form | BodyEncoding::None => {
                        form.push((spec.name.to_string(), value_to_string(&value)))
                    }
                },
            }
        }

        let mut path_segments = Vec::new();
        for segment in self.path_template(dialect).split('/').filter(|s| !s.is_empty()) {
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => {
                    let (_, value) = path_values
                        .iter()
                        .find(|(key, _)| *key == name)
                        .ok_or_else(|| {
                            StoreError::internal(format!(
                                "{}: unresolved placeholder {{{}}}",
                                self.name, name
                            ))
                        })?;
                    if value.is_empty() {
                        return Err(StoreError::validation(name, "path parameter cannot be empty"));
                    }
                    path_segments.push(value.clone());
                }
                None => path_segments.push(segment.to_string()),
            }
        }

        let body = match self.body {
            BodyEncoding::None => RequestBody::Empty,
            BodyEncoding::Form => RequestBody::Form(form),
            BodyEncoding::Json => RequestBody::Json(json),
        };

        Ok(PreparedRequest {
            method: self.method,
            path_segments,
            query,
            body,
            bearer,
        })
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
