use std::fmt::Display;

use anyhow::Result;
use log::info;

use crate::config::Config;
use crate::gallery::fetch_catalog;
use crate::inventory::{fetch_existing_emoji, ExistingEmoji};
use crate::remote::Remote;
use crate::session::Session;
use crate::upload::UploadOutcome;

#[derive(Debug)]
pub struct Context<R> {
    pub remote: R,
    pub config: Config,
    pub session: Session,
    pub existing: ExistingEmoji,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopySummary {
    pub uploaded: usize,
    pub skipped_duplicate: usize,
    pub skipped_name_taken: usize,
}

impl CopySummary {
    fn record(&mut self, outcome: UploadOutcome) {
        match outcome {
            UploadOutcome::Uploaded => self.uploaded += 1,
            UploadOutcome::SkippedDuplicate => self.skipped_duplicate += 1,
            UploadOutcome::SkippedNameTaken => self.skipped_name_taken += 1,
        }
    }
}

impl Display for CopySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "uploaded {}, skipped {} existing, skipped {} taken",
            self.uploaded, self.skipped_duplicate, self.skipped_name_taken
        )
    }
}

impl<R: Remote> Context<R> {
    pub fn new(remote: R, config: Config, session: Session, existing: ExistingEmoji) -> Self {
        Context {
            remote,
            config,
            session,
            existing,
        }
    }

    /// Authenticate and take stock of the workspace before copying anything.
    pub async fn open(remote: R, config: Config, cookie: &str) -> Result<Self> {
        let session = Session::open(&remote, &config, cookie).await?;
        let existing = fetch_existing_emoji(&remote, &config, &session).await?;
        Ok(Context::new(remote, config, session, existing))
    }

    /// Copy every emoji listed at `path` on the gallery, one at a time.
    /// Stops at the first fatal error.
    pub async fn copy_emojis(&mut self, path: &str) -> Result<CopySummary> {
        info!(
            "Copying emojis from {} to {}'s Slack",
            self.config.catalog_url(path),
            self.session.team
        );
        let candidates = fetch_catalog(&self.remote, &self.config, path).await?;

        let mut summary = CopySummary::default();
        for candidate in &candidates {
            summary.record(self.copy_emoji(candidate).await?);
        }
        info!("Done!");
        Ok(summary)
    }
}
