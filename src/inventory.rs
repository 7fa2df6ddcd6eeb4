use std::collections::{HashMap, HashSet};

use anyhow::Result;
use log::info;
use serde::Deserialize;

use crate::config::Config;
use crate::error::FatalError;
use crate::remote::Remote;
use crate::session::Session;

/// Body of `emoji.list`. Only the names are of interest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmojiListResponse {
    pub ok: bool,
    #[serde(default)]
    pub emoji: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Emoji names present in the workspace, grown as uploads succeed.
#[derive(Debug, Clone, Default)]
pub struct ExistingEmoji(HashSet<String>);

impl ExistingEmoji {
    pub fn from_response(response: EmojiListResponse) -> Result<ExistingEmoji> {
        if response.ok {
            Ok(response.emoji.into_keys().collect())
        } else {
            let error = response.error.unwrap_or_else(|| "unknown error".to_owned());
            Err(FatalError::InventoryFailed(error).into())
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }
    pub fn insert(&mut self, name: String) -> bool {
        self.0.insert(name)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for ExistingEmoji {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub async fn fetch_existing_emoji<R: Remote>(
    remote: &R,
    config: &Config,
    session: &Session,
) -> Result<ExistingEmoji> {
    info!("Fetching existing emoji names...");
    let response = remote
        .list_emoji(&config.emoji_list_url(), session.api_token())
        .await?;
    let existing = ExistingEmoji::from_response(response)?;
    info!("{} emoji already in {}'s Slack", existing.len(), session.team);
    Ok(existing)
}
