mod config;
mod context;
mod download;
mod error;
mod gallery;
mod inventory;
mod logging;
mod opt;
mod remote;
mod session;
mod token;
mod upload;

use anyhow::Result;
use log::{error, info};
use structopt::StructOpt;

use config::Config;
use context::Context;
use opt::Opt;
use remote::HttpRemote;

async fn run(opt: Opt) -> Result<()> {
    let config = Config::for_team(&opt.team)?;
    let remote = HttpRemote::new(&config)?;

    let mut ctx = Context::open(remote, config, &opt.cookie).await?;
    let path = ctx.config.catalog_path.clone();
    let summary = ctx.copy_emojis(&path).await?;

    info!("{summary}");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = logging::init() {
        eprintln!("couldn't set up logging: {err}");
    }

    let opt = Opt::from_args();

    if let Err(err) = run(opt).await {
        error!("{err:#}");
        std::process::exit(1);
    }
}
