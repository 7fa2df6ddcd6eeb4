use std::fmt::Debug;

use anyhow::Result;

use crate::config::Config;
use crate::remote::Remote;
use crate::token::fetch_api_token;

/// An authenticated workspace. The cookie is only needed to obtain the API
/// token, which is fetched once and kept for the rest of the run.
pub struct Session {
    pub team: String,
    api_token: String,
}

impl Session {
    pub fn new(team: impl Into<String>, api_token: impl Into<String>) -> Session {
        Session {
            team: team.into(),
            api_token: api_token.into(),
        }
    }

    pub async fn open<R: Remote>(remote: &R, config: &Config, cookie: &str) -> Result<Session> {
        let api_token = fetch_api_token(remote, config, cookie).await?;
        Ok(Session::new(config.team.clone(), api_token))
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("team", &self.team)
            .field("api_token", &"<redacted>")
            .finish()
    }
}
