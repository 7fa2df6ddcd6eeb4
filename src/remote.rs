use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::header::{COOKIE, RETRY_AFTER};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::Config;
use crate::inventory::EmojiListResponse;

/// Used when a 429 carries no usable `retry-after` header.
const FALLBACK_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Fields of an `emoji.add` request. Resubmitted unchanged on every retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddEmojiForm {
    pub name: String,
    pub token: String,
    pub image: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddReply {
    RateLimited { retry_after: Duration },
    Done(AddResponse),
}

/// Everything the tool needs from the outside world.
#[allow(async_fn_in_trait)]
pub trait Remote {
    /// GET an HTML page, optionally sending a raw `Cookie` header.
    async fn fetch_page(&self, url: &str, cookie: Option<&str>) -> Result<String>;
    async fn list_emoji(&self, url: &str, token: &str) -> Result<EmojiListResponse>;
    async fn download(&self, url: &str) -> Result<Bytes>;
    async fn add_emoji(&self, url: &str, form: &AddEmojiForm) -> Result<AddReply>;
}

impl<T: Remote + ?Sized> Remote for &T {
    async fn fetch_page(&self, url: &str, cookie: Option<&str>) -> Result<String> {
        (**self).fetch_page(url, cookie).await
    }
    async fn list_emoji(&self, url: &str, token: &str) -> Result<EmojiListResponse> {
        (**self).list_emoji(url, token).await
    }
    async fn download(&self, url: &str) -> Result<Bytes> {
        (**self).download(url).await
    }
    async fn add_emoji(&self, url: &str, form: &AddEmojiForm) -> Result<AddReply> {
        (**self).add_emoji(url, form).await
    }
}

pub fn parse_retry_after(value: Option<&str>) -> Duration {
    value
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(FALLBACK_RETRY_AFTER)
}

#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
}

impl HttpRemote {
    pub fn new(config: &Config) -> Result<HttpRemote> {
        Ok(HttpRemote {
            client: reqwest::ClientBuilder::new()
                .user_agent(config.user_agent.as_str())
                .build()?,
        })
    }
}

impl Remote for HttpRemote {
    async fn fetch_page(&self, url: &str, cookie: Option<&str>) -> Result<String> {
        let mut request = self.client.get(url);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    async fn list_emoji(&self, url: &str, token: &str) -> Result<EmojiListResponse> {
        let response = self
            .client
            .get(url)
            .query(&[("token", token)])
            .send()
            .await?;
        response
            .json()
            .await
            .context("emoji.list returned something that isn't json")
    }

    async fn download(&self, url: &str) -> Result<Bytes> {
        Ok(self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?)
    }

    async fn add_emoji(&self, url: &str, form: &AddEmojiForm) -> Result<AddReply> {
        let data = tokio::fs::read(&form.image)
            .await
            .with_context(|| format!("couldn't read image {:?}", form.image))?;
        let file_name = form
            .image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| form.name.clone());

        let multipart = Form::new()
            .text("mode", "data")
            .text("name", form.name.clone())
            .text("token", form.token.clone())
            .part(
                "image",
                Part::bytes(data)
                    .file_name(file_name)
                    .mime_str("application/octet-stream")?,
            );

        let response = self.client.post(url).multipart(multipart).send().await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let header = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok());
            return Ok(AddReply::RateLimited {
                retry_after: parse_retry_after(header),
            });
        }

        let body = response
            .json()
            .await
            .context("emoji.add returned something that isn't json")?;
        Ok(AddReply::Done(body))
    }
}
