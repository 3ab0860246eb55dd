use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::{
  Arc,
  LazyLock
};
use std::time::Duration;

use anyhow::Context;
use regex::Regex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{
  debug,
  info,
  warn
};
use walkdir::WalkDir;

static ANCHOR_RE: LazyLock<Regex> =
  LazyLock::new(|| {
    Regex::new(
      r#"<a\s[^>]*href=["']?(https?://[^"'\s>]+)["']?"#
    )
    .expect("valid anchor regex")
  });
static TRACKED_RE: LazyLock<Regex> =
  LazyLock::new(|| {
    Regex::new(
      r#"data-track[^>]*href=["']?(https?://[^"'\s>]+)["']?"#
    )
    .expect("valid data-track regex")
  });

const MAX_IN_FLIGHT: usize = 5;
const CHECK_TIMEOUT: Duration =
  Duration::from_secs(10);
const MAX_REDIRECTS: usize = 3;
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub enum LinkStatus {
  Ok,
  Skipped,
  Dead(String)
}

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct LinkReport {
  pub url:    String,
  pub status: LinkStatus
}

impl LinkReport {
  pub fn is_dead(&self) -> bool {
    matches!(self.status, LinkStatus::Dead(_))
  }
}

/// Unique external links found in one
/// HTML document.
pub fn links_in_html(
  html: &str
) -> BTreeSet<String> {
  [&*ANCHOR_RE, &*TRACKED_RE]
    .iter()
    .flat_map(|re| {
      re.captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|link| {
          link
            .as_str()
            .trim_end_matches(['"', '\''])
            .to_string()
        })
        .collect::<Vec<_>>()
    })
    .collect()
}

/// Every unique external link under
/// `dir`, from `*.html` files only.
#[tracing::instrument(skip(dir), fields(dir = %dir.display()))]
pub fn extract_links(
  dir: &Path
) -> anyhow::Result<BTreeSet<String>> {
  let mut links = BTreeSet::new();
  for entry in WalkDir::new(dir) {
    let entry = entry.with_context(|| {
      format!(
        "failed walking {}",
        dir.display()
      )
    })?;
    let path = entry.path();
    if !entry.file_type().is_file()
      || path.extension().and_then(|ext| {
        ext.to_str()
      }) != Some("html")
    {
      continue;
    }

    let html = fs::read_to_string(path)
      .with_context(|| {
        format!(
          "failed reading {}",
          path.display()
        )
      })?;
    let found = links_in_html(&html);
    debug!(file = %path.display(), count = found.len(), "scanned page");
    links.extend(found);
  }
  Ok(links)
}

pub fn should_skip(
  url: &str,
  skip_domains: &[String]
) -> bool {
  skip_domains
    .iter()
    .any(|domain| url.contains(domain.as_str()))
}

/// Checks every link with at most five
/// requests in flight. Reports come back
/// sorted by URL.
#[tracing::instrument(skip_all, fields(links = links.len()))]
pub async fn check_links(
  links: BTreeSet<String>,
  skip_domains: &[String]
) -> anyhow::Result<Vec<LinkReport>> {
  let client = reqwest::Client::builder()
    .timeout(CHECK_TIMEOUT)
    .redirect(reqwest::redirect::Policy::limited(
      MAX_REDIRECTS
    ))
    .build()
    .context(
      "failed building HTTP client for \
       link checks"
    )?;

  let permits =
    Arc::new(Semaphore::new(MAX_IN_FLIGHT));
  let mut tasks = JoinSet::new();
  let mut reports = Vec::new();

  for url in links {
    if should_skip(&url, skip_domains) {
      reports.push(LinkReport {
        url,
        status: LinkStatus::Skipped
      });
      continue;
    }

    let client = client.clone();
    let permits = Arc::clone(&permits);
    tasks.spawn(async move {
      let _permit =
        permits.acquire_owned().await;
      let status =
        check_link(&client, &url).await;
      LinkReport { url, status }
    });
  }

  while let Some(joined) =
    tasks.join_next().await
  {
    let report = joined
      .context("link check task failed")?;
    match &report.status {
      | LinkStatus::Dead(reason) => {
        warn!(url = %report.url, reason = %reason, "dead link");
      }
      | _ => {
        debug!(url = %report.url, "link ok");
      }
    }
    reports.push(report);
  }

  reports.sort_by(|a, b| a.url.cmp(&b.url));
  info!(
    checked = reports.len(),
    dead = reports
      .iter()
      .filter(|report| report.is_dead())
      .count(),
    "link check finished"
  );
  Ok(reports)
}

async fn check_link(
  client: &reqwest::Client,
  url: &str
) -> LinkStatus {
  let request = client
    .get(url)
    .header(
      reqwest::header::USER_AGENT,
      BROWSER_USER_AGENT
    )
    .header(
      reqwest::header::ACCEPT,
      "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
    )
    .header(
      reqwest::header::ACCEPT_LANGUAGE,
      "en-US,en;q=0.5"
    );

  match request.send().await {
    | Ok(response) => {
      let status = response.status();
      if status.as_u16() >= 400 {
        LinkStatus::Dead(format!(
          "HTTP {}",
          status.as_u16()
        ))
      } else {
        LinkStatus::Ok
      }
    }
    | Err(err) => LinkStatus::Dead(format!(
      "request failed: {err}"
    ))
  }
}
