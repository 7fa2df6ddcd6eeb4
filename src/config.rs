use anyhow::{Context, Result};
use derive_builder::Builder;
use url::Url;

pub const GALLERY_BASE_URL: &str = "https://slackmojis.com";
pub const DEFAULT_CATALOG_PATH: &str = "/emojis/popular";

const USER_AGENT: &str = "\
    Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) \
    Chrome/110.0.0.0 Safari/537.36";

/// Every URL the tool talks to, derived once from the team name.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct Config {
    pub team: String,
    /// `https://{team}.slack.com` for real workspaces
    pub workspace_url: String,
    #[builder(default = "GALLERY_BASE_URL.to_owned()")]
    pub gallery_base_url: String,
    #[builder(default = "DEFAULT_CATALOG_PATH.to_owned()")]
    pub catalog_path: String,
    #[builder(default = "USER_AGENT.to_owned()")]
    pub user_agent: String,
    /// `None` retries rate limited uploads for as long as the server asks
    #[builder(default)]
    pub max_rate_limit_retries: Option<u32>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn for_team(team: &str) -> Result<Config> {
        Ok(Config::builder()
            .team(team)
            .workspace_url(format!("https://{team}.slack.com"))
            .build()?)
    }

    pub fn customize_url(&self) -> String {
        format!("{}/customize/emoji", self.workspace_url)
    }
    pub fn emoji_list_url(&self) -> String {
        format!("{}/api/emoji.list", self.workspace_url)
    }
    pub fn emoji_add_url(&self) -> String {
        format!("{}/api/emoji.add", self.workspace_url)
    }
    pub fn catalog_url(&self, path: &str) -> String {
        format!("{}{path}", self.gallery_base_url)
    }

    /// Resolve an anchor `href` from the gallery into an absolute URL.
    pub fn resolve_download(&self, href: &str) -> Result<String> {
        let base = Url::parse(&self.gallery_base_url)
            .with_context(|| format!("invalid gallery url `{}`", self.gallery_base_url))?;
        let url = base
            .join(href)
            .with_context(|| format!("invalid download link `{href}`"))?;
        Ok(url.into())
    }
}
