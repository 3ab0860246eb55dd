pub mod cli;
pub mod commands;
pub mod config;
pub mod entry_date;
pub mod events_file;
pub mod links;
pub mod render;
pub mod submit;

use std::ffi::OsString;

use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli = cli::Cli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting eventboard CLI"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  )?;
  if let Some(events_file) = cli.events_file {
    cfg.events_file = events_file;
  }
  debug!(?cfg, "resolved configuration");

  let mut renderer =
    render::Renderer::new(!cli.no_color);

  commands::dispatch(
    &cfg,
    &mut renderer,
    cli.command
  )?;

  info!("done");
  Ok(())
}
