use std::path::Path;

use anyhow::{Context as _, Result};
use log::{info, warn};

use crate::context::Context;
use crate::download::Download;
use crate::error::FatalError;
use crate::gallery::EmojiCandidate;
use crate::remote::{AddEmojiForm, AddReply, AddResponse, Remote};

const NAME_TAKEN: &str = "error_name_taken";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    /// Already in the workspace inventory, nothing was sent.
    SkippedDuplicate,
    /// Slack refused the name, someone else got there first.
    SkippedNameTaken,
}

impl<R: Remote> Context<R> {
    pub async fn copy_emoji(&mut self, candidate: &EmojiCandidate) -> Result<UploadOutcome> {
        let name = &candidate.name;
        if self.existing.contains(name) {
            info!("emoji with name: {name} already exists, skipping...");
            return Ok(UploadOutcome::SkippedDuplicate);
        }

        let data = self
            .remote
            .download(&candidate.url)
            .await
            .with_context(|| format!("couldn't download `{name}` from {}", candidate.url))?;
        let image = Download::new(&candidate.url, data).save_to_temp_file().await?;

        // `image` is removed when it goes out of scope, error or not
        self.upload_emoji(name, image.path()).await
    }

    /// Submit the image to `emoji.add`, sleeping and resubmitting for as
    /// long as the server rate limits us (or up to the configured cap).
    pub async fn upload_emoji(&mut self, name: &str, image: &Path) -> Result<UploadOutcome> {
        info!("Uploading: {name}");
        let url = self.config.emoji_add_url();
        let form = AddEmojiForm {
            name: name.to_owned(),
            token: self.session.api_token().to_owned(),
            image: image.to_owned(),
        };

        let mut rate_limited = 0u32;
        loop {
            match self.remote.add_emoji(&url, &form).await? {
                AddReply::RateLimited { retry_after } => {
                    rate_limited += 1;
                    if let Some(max) = self.config.max_rate_limit_retries {
                        if rate_limited > max {
                            return Err(FatalError::RateLimitRetriesExhausted {
                                name: name.to_owned(),
                                attempts: rate_limited,
                            }
                            .into());
                        }
                    }
                    warn!(
                        "Rate limited. Waiting for {} seconds",
                        retry_after.as_secs()
                    );
                    tokio::time::sleep(retry_after).await;
                }
                AddReply::Done(response) => return self.check_upload(name, response),
            }
        }
    }

    fn check_upload(&mut self, name: &str, response: AddResponse) -> Result<UploadOutcome> {
        if response.ok {
            self.existing.insert(name.to_owned());
            return Ok(UploadOutcome::Uploaded);
        }

        let error = response.error.unwrap_or_default();
        if error.contains(NAME_TAKEN) {
            // not recorded as existing, a repeated anchor is submitted again
            warn!("Name already taken: {name}");
            Ok(UploadOutcome::SkippedNameTaken)
        } else {
            Err(FatalError::UploadFailed {
                name: name.to_owned(),
                error,
            }
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::config::Config;
    use crate::inventory::ExistingEmoji;
    use crate::remote::fake::{failed, ok, FakeRemote};
    use crate::session::Session;

    fn context(remote: FakeRemote, existing: &[&str]) -> Context<FakeRemote> {
        Context::new(
            remote,
            Config::for_team("acme").unwrap(),
            Session::new("acme", "xoxc-1"),
            existing.iter().map(|name| name.to_string()).collect::<ExistingEmoji>(),
        )
    }

    fn candidate(name: &str) -> EmojiCandidate {
        EmojiCandidate {
            name: name.to_owned(),
            url: format!("https://slackmojis.com/e/{name}.png"),
        }
    }

    fn rate_limited(secs: u64) -> AddReply {
        AddReply::RateLimited {
            retry_after: Duration::from_secs(secs),
        }
    }

    #[tokio::test]
    async fn duplicate_makes_no_calls() {
        let mut ctx = context(FakeRemote::default(), &["doge"]);

        let outcome = ctx.copy_emoji(&candidate("doge")).await.unwrap();

        assert_eq!(outcome, UploadOutcome::SkippedDuplicate);
        assert!(ctx.remote.calls().is_empty());
    }

    #[tokio::test]
    async fn upload_sends_form_and_records_name() {
        let remote = FakeRemote::default().file("https://slackmojis.com/e/doge.png", b"wow");
        let mut ctx = context(remote, &[]);

        let outcome = ctx.copy_emoji(&candidate("doge")).await.unwrap();

        assert_eq!(outcome, UploadOutcome::Uploaded);
        assert!(ctx.existing.contains("doge"));

        let forms = ctx.remote.add_calls();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].name, "doge");
        assert_eq!(forms[0].token, "xoxc-1");
        assert_eq!(forms[0].image.extension().unwrap(), "png");
        assert_eq!(
            ctx.remote.seen_images.borrow()[0].contents.as_deref(),
            Some(&b"wow"[..])
        );
        assert!(!forms[0].image.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn waits_out_rate_limit_and_resubmits() {
        let remote = FakeRemote::default()
            .file("https://slackmojis.com/e/doge.png", b"wow")
            .reply(rate_limited(2))
            .reply(ok());
        let mut ctx = context(remote, &[]);

        let start = Instant::now();
        let outcome = ctx.copy_emoji(&candidate("doge")).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(2));
        assert_eq!(outcome, UploadOutcome::Uploaded);

        let forms = ctx.remote.add_calls();
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[0], forms[1]);
        assert_eq!(ctx.remote.downloads().len(), 1);

        let seen = ctx.remote.seen_images.borrow();
        assert!(seen.iter().all(|image| image.contents.as_deref() == Some(&b"wow"[..])));
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_retrying_without_cap() {
        let mut remote = FakeRemote::default().file("https://slackmojis.com/e/doge.png", b"wow");
        for _ in 0..10 {
            remote = remote.reply(rate_limited(60));
        }
        let mut ctx = context(remote, &[]);

        let start = Instant::now();
        let outcome = ctx.copy_emoji(&candidate("doge")).await.unwrap();

        assert_eq!(outcome, UploadOutcome::Uploaded);
        assert_eq!(ctx.remote.add_calls().len(), 11);
        assert!(start.elapsed() >= Duration::from_secs(600));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_configured_retries() {
        let remote = FakeRemote::default()
            .file("https://slackmojis.com/e/doge.png", b"wow")
            .reply(rate_limited(1))
            .reply(rate_limited(1))
            .reply(rate_limited(1));
        let mut ctx = context(remote, &[]);
        ctx.config.max_rate_limit_retries = Some(2);

        let err = ctx.copy_emoji(&candidate("doge")).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<FatalError>(),
            Some(&FatalError::RateLimitRetriesExhausted {
                name: "doge".to_owned(),
                attempts: 3,
            })
        );
        assert_eq!(ctx.remote.add_calls().len(), 3);
        assert!(!ctx.remote.add_calls()[0].image.exists());
    }

    #[tokio::test]
    async fn name_taken_is_skipped_not_recorded() {
        let remote = FakeRemote::default()
            .file("https://slackmojis.com/e/doge.png", b"wow")
            .reply(failed("error_name_taken"));
        let mut ctx = context(remote, &[]);

        let outcome = ctx.copy_emoji(&candidate("doge")).await.unwrap();

        assert_eq!(outcome, UploadOutcome::SkippedNameTaken);
        assert!(!ctx.existing.contains("doge"));
    }

    #[tokio::test]
    async fn repeated_taken_name_is_submitted_again() {
        let remote = FakeRemote::default()
            .file("https://slackmojis.com/e/doge.png", b"wow")
            .reply(failed("error_name_taken"))
            .reply(failed("error_name_taken"));
        let mut ctx = context(remote, &[]);

        for _ in 0..2 {
            let outcome = ctx.copy_emoji(&candidate("doge")).await.unwrap();
            assert_eq!(outcome, UploadOutcome::SkippedNameTaken);
        }

        assert_eq!(ctx.remote.downloads().len(), 2);
        assert_eq!(ctx.remote.add_calls().len(), 2);
    }

    #[tokio::test]
    async fn other_errors_are_fatal() {
        let remote = FakeRemote::default()
            .file("https://slackmojis.com/e/doge.png", b"wow")
            .reply(failed("too_many_frames"));
        let mut ctx = context(remote, &[]);

        let err = ctx.copy_emoji(&candidate("doge")).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<FatalError>(),
            Some(&FatalError::UploadFailed {
                name: "doge".to_owned(),
                error: "too_many_frames".to_owned(),
            })
        );
        assert!(!ctx.existing.contains("doge"));
        assert!(!ctx.remote.add_calls()[0].image.exists());
    }

    #[tokio::test]
    async fn failed_download_uploads_nothing() {
        let mut ctx = context(FakeRemote::default(), &[]);

        assert!(ctx.copy_emoji(&candidate("doge")).await.is_err());
        assert!(ctx.remote.add_calls().is_empty());
    }
}
