use anyhow::bail;

use super::block_on;
use crate::cli::CheckLinksArgs;
use crate::config::Config;
use crate::links::{
  check_links,
  extract_links
};
use crate::render::Renderer;

#[tracing::instrument(skip_all)]
pub fn run(
  cfg: &Config,
  renderer: &mut Renderer,
  args: CheckLinksArgs
) -> anyhow::Result<()> {
  let dir = args
    .dir
    .unwrap_or_else(|| cfg.public_dir.clone());
  if !dir.is_dir() {
    bail!(
      "site directory {} does not exist; \
       build the site first",
      dir.display()
    );
  }

  println!("Checking for dead links...");
  let links = extract_links(&dir)?;
  if links.is_empty() {
    println!("No external links found.");
    return Ok(());
  }
  println!(
    "Found {} unique external links to check\n",
    links.len()
  );

  let reports = block_on(check_links(
    links,
    &cfg.skip_domains
  ))??;
  renderer.print_link_reports(&reports)?;

  let dead = reports
    .iter()
    .filter(|report| report.is_dead())
    .count();
  if dead > 0 {
    bail!("found {dead} dead links");
  }

  println!("\nAll links are valid!");
  Ok(())
}
