mod add;
mod check_links;
mod list;

use std::future::Future;

use anyhow::Context;
use tracing::info;

use crate::cli::Command;
use crate::config::Config;
use crate::render::Renderer;

pub use add::{
  PlannedEvent,
  build_entry,
  resolve_submit_mode
};
pub use list::{
  Listing,
  select_entries
};

#[tracing::instrument(skip_all)]
pub fn dispatch(
  cfg: &Config,
  renderer: &mut Renderer,
  command: Command
) -> anyhow::Result<()> {
  match command {
    | Command::List(args) => {
      info!("running list");
      list::run(cfg, renderer, args)
    }
    | Command::Add(args) => {
      info!("running add");
      add::run(cfg, renderer, args)
    }
    | Command::CheckLinks(args) => {
      info!("running check-links");
      check_links::run(cfg, renderer, args)
    }
  }
}

fn block_on<F: Future>(
  future: F
) -> anyhow::Result<F::Output> {
  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context("failed building tokio runtime")?;
  Ok(runtime.block_on(future))
}
