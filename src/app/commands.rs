use crate::adapters::http::endpoints::{self, Endpoint};
use crate::config::cli::{Command, PageArgs};
use crate::core::{with_retry, RetryPolicy};
use crate::domain::ports::Repository;
use crate::utils::error::Result;
use serde::Serialize;
use serde_json::{json, Value};

/// Runs one CLI subcommand against a repository and renders the result as
/// JSON. Read commands go through [`with_retry`]; login never does.
pub struct CommandRunner<'a, R: Repository> {
    repo: &'a R,
    policy: RetryPolicy,
    default_page_size: u32,
}

impl<'a, R: Repository> CommandRunner<'a, R> {
    pub fn new(repo: &'a R, policy: RetryPolicy, default_page_size: u32) -> Self {
        Self {
            repo,
            policy,
            default_page_size,
        }
    }

    fn page_size(&self, paging: &PageArgs) -> u32 {
        paging.page_size.unwrap_or(self.default_page_size)
    }

    pub async fn run(&self, command: &Command) -> Result<Value> {
        let repo = self.repo;
        let policy = &self.policy;

        match command {
            Command::Featured => render(with_retry(policy, &endpoints::FEATURED_APPS, move || repo.get_featured_apps()).await?),
            Command::New => render(with_retry(policy, &endpoints::NEW_APPS, move || repo.get_new_apps()).await?),
            Command::Recommended => {
                render(with_retry(policy, &endpoints::RECOMMENDED_APPS, move || repo.get_recommended_apps()).await?)
            }
            Command::App { id } => render(with_retry(policy, &endpoints::APP_DETAIL, move || repo.get_app_detail(id)).await?),
            Command::Search { keyword, paging } => {
                let page_size = self.page_size(paging);
                render(
                    with_retry(policy, &endpoints::SEARCH_APPS, move || {
                        repo.search_apps(keyword, paging.page, page_size)
                    })
                    .await?,
                )
            }
            Command::Categories => render(with_retry(policy, &endpoints::CATEGORIES, move || repo.get_categories()).await?),
            Command::Category { id, paging } => {
                let page_size = self.page_size(paging);
                render(
                    with_retry(policy, &endpoints::CATEGORY_APPS, move || {
                        repo.get_category_apps(id, paging.page, page_size)
                    })
                    .await?,
                )
            }
            Command::Ranking { ranking, paging } => {
                let page_size = self.page_size(paging);
                render(
                    with_retry(policy, &endpoints::RANKING_APPS, move || {
                        repo.get_ranking_apps(*ranking, paging.page, page_size)
                    })
                    .await?,
                )
            }
            Command::Banners => render(with_retry(policy, &endpoints::BANNERS, move || repo.get_banners()).await?),
            Command::Comments { app_id, paging } => {
                let page_size = self.page_size(paging);
                render(
                    with_retry(policy, &endpoints::APP_COMMENTS, move || {
                        repo.get_app_comments(app_id, paging.page, page_size)
                    })
                    .await?,
                )
            }
            Command::Favorites { credentials, paging } => {
                let user = repo.login(&credentials.email, &credentials.password).await?;
                tracing::debug!(user_id = %user.id, "logged in for favorites");

                let page_size = self.page_size(paging);
                let favorites = with_retry(policy, &endpoints::FAVORITE_APPS, move || {
                    repo.get_favorite_apps(paging.page, page_size)
                })
                .await;

                if let Err(e) = repo.logout().await {
                    tracing::warn!("logout after favorites failed: {}", e);
                }
                render(favorites?)
            }
            Command::Version { current_code } => match current_code {
                Some(code) => {
                    let update = with_retry(policy, &endpoints::LATEST_VERSION, move || repo.check_for_update(*code)).await?;
                    Ok(json!({
                        "updateAvailable": update.is_some(),
                        "latest": update,
                    }))
                }
                None => render(with_retry(policy, &endpoints::LATEST_VERSION, move || repo.get_latest_version()).await?),
            },
            Command::Endpoints => Ok(describe_endpoints()),
        }
    }
}

fn render<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn describe(endpoint: &Endpoint) -> Value {
    json!({
        "name": endpoint.name,
        "resource": format!("{:?}", endpoint.resource).to_lowercase(),
        "method": endpoint.method.to_string(),
        "v1": endpoint.v1_path,
        "legacy": endpoint.legacy_path,
        "auth": format!("{:?}", endpoint.auth).to_lowercase(),
        "retryable": endpoint.is_retryable(),
    })
}

/// Every declared backend operation with both path conventions.
pub fn describe_endpoints() -> Value {
    Value::Array(endpoints::ALL.iter().map(|endpoint| describe(endpoint)).collect())
}
