use crate::config::toml_config::ClientConfig;
use crate::domain::model::RankingType;
use crate::domain::ports::ApiDialect;
use crate::utils::error::{Result, StoreError};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "appstore-client")]
#[command(about = "Query the app store backend from the command line")]
pub struct CliConfig {
    #[arg(long, env = "APPSTORE_CONFIG", help = "Path to a TOML client configuration")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "APPSTORE_BASE_URL", help = "Backend base URL, overrides the file")]
    pub base_url: Option<String>,

    #[arg(long, help = "Backend path convention: v1 or legacy")]
    pub dialect: Option<ApiDialect>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Do not retry failed read requests")]
    pub no_retry: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, help = "Defaults to pagination.default_page_size")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Args)]
pub struct Credentials {
    #[arg(long, env = "APPSTORE_EMAIL")]
    pub email: String,

    #[arg(long, env = "APPSTORE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Featured apps on the home screen
    Featured,
    /// Newly published apps
    New,
    /// Recommendations (personalized when logged in)
    Recommended,
    /// Full detail of one app
    App { id: String },
    Search {
        keyword: String,
        #[command(flatten)]
        paging: PageArgs,
    },
    Categories,
    /// Apps in one category
    Category {
        id: String,
        #[command(flatten)]
        paging: PageArgs,
    },
    Ranking {
        #[arg(help = "top-free, top-paid, top-grossing, trending or new-releases")]
        ranking: RankingType,
        #[command(flatten)]
        paging: PageArgs,
    },
    Banners,
    Comments {
        app_id: String,
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Log in and list the account's favorite apps
    Favorites {
        #[command(flatten)]
        credentials: Credentials,
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Latest client release, optionally compared with an installed build
    Version {
        #[arg(long)]
        current_code: Option<u32>,
    },
    /// Print the declared backend operations
    Endpoints,
}

impl CliConfig {
    /// Builds the client configuration: the file (if any) first, then
    /// command-line overrides on top.
    pub fn resolve(&self) -> Result<ClientConfig> {
        let mut config = match (&self.config, &self.base_url) {
            (Some(path), _) => ClientConfig::from_file(path)?,
            (None, Some(base_url)) => {
                let dialect = self.dialect.ok_or_else(|| StoreError::Config {
                    message: "--dialect must be given when no configuration file is used".to_string(),
                })?;
                ClientConfig::new(base_url.clone(), dialect)
            }
            (None, None) => {
                return Err(StoreError::Config {
                    message: "either --config or --base-url is required".to_string(),
                })
            }
        };

        if let Some(base_url) = &self.base_url {
            config.backend.base_url = base_url.clone();
        }
        if let Some(dialect) = self.dialect {
            config.backend.dialect = dialect;
        }
        if let Some(timeout) = self.timeout_seconds {
            config.backend.timeout_seconds = Some(timeout);
        }
        if self.no_retry {
            config.retry.attempts = 1;
        }
        if self.json_logs {
            config.logging.json = Some(true);
        }

        Ok(config)
    }
}
