use anyhow::{anyhow, Context, Result};
use log::warn;
use scraper::{Html, Selector};

use crate::config::Config;
use crate::remote::Remote;

/// An emoji found on the gallery, not yet known to exist in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiCandidate {
    pub name: String,
    pub url: String,
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow!("invalid selector `{css}`: {err:?}"))
}

/// The gallery shows names as `:name:`. Removes at most one colon per side.
pub fn strip_colons(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix(':').unwrap_or(text);
    text.strip_suffix(':').unwrap_or(text)
}

/// Collect the `a.downloader` anchors of a gallery page in document order.
pub fn parse_catalog(html: &str, config: &Config) -> Result<Vec<EmojiCandidate>> {
    let document = Html::parse_document(html);
    let downloaders = selector("a.downloader")?;

    let mut candidates = Vec::new();
    for anchor in document.select(&downloaders) {
        let text = anchor.text().collect::<String>();
        let name = strip_colons(&text);
        let Some(href) = anchor.value().attr("href") else {
            warn!("anchor `{name}` has no download link, skipping");
            continue;
        };
        if name.is_empty() {
            warn!("download link `{href}` has no emoji name, skipping");
            continue;
        }
        candidates.push(EmojiCandidate {
            name: name.to_owned(),
            url: config.resolve_download(href)?,
        });
    }
    Ok(candidates)
}

pub async fn fetch_catalog<R: Remote>(
    remote: &R,
    config: &Config,
    path: &str,
) -> Result<Vec<EmojiCandidate>> {
    let url = config.catalog_url(path);
    let html = remote
        .fetch_page(&url, None)
        .await
        .with_context(|| format!("couldn't load emoji gallery {url}"))?;
    parse_catalog(&html, config)
}
