use anyhow::{Context, Result};
use lazy_regex::regex_captures;
use log::info;
use scraper::Html;

use crate::config::Config;
use crate::error::FatalError;
use crate::gallery::selector;
use crate::remote::Remote;

/// Find the session's API token in the inline scripts of the emoji
/// customization page. First match in document order wins.
pub fn extract_api_token(html: &str) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let scripts = selector("script")?;

    Ok(document.select(&scripts).find_map(|script| {
        let text = script.text().collect::<String>();
        regex_captures!(r#""api_token":"([A-Za-z0-9\-]+)""#, &text)
            .map(|(_, token)| token.to_owned())
    }))
}

pub async fn fetch_api_token<R: Remote>(remote: &R, config: &Config, cookie: &str) -> Result<String> {
    info!("Fetching API token...");
    let html = remote
        .fetch_page(&config.customize_url(), Some(cookie))
        .await
        .context("couldn't load the emoji customization page")?;

    extract_api_token(&html)?.ok_or_else(|| FatalError::TokenNotFound.into())
}
