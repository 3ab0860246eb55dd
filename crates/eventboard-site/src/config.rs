use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use eventboard_core::BoardConfig;
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info,
  warn
};

pub const CONFIG_FILE_NAME: &str =
  "eventboard.toml";
pub const CONFIG_ENV: &str =
  "EVENTBOARD_CONFIG";
pub const HORIZON_ENV: &str =
  "EVENTBOARD_HORIZON_DAYS";
pub const DEFAULT_API_ENDPOINT: &str =
  "https://www.shift2bikes.org/api/manage_event.php";

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(default)]
pub struct Config {
  pub events_file:  PathBuf,
  pub horizon_days: u32,
  pub api_endpoint: String,
  pub organizer:    String,
  pub email:        String,
  pub web_name:     String,
  pub web_url:      String,
  pub public_dir:   PathBuf,
  pub skip_domains: Vec<String>,
  #[serde(skip)]
  pub loaded_file:  Option<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      events_file:  PathBuf::from(
        "content/events.md"
      ),
      horizon_days: BoardConfig::default()
        .horizon_days,
      api_endpoint: DEFAULT_API_ENDPOINT
        .to_string(),
      organizer:    "Ride Westside"
        .to_string(),
      email:        "ridewestside2023@gmail.com"
        .to_string(),
      web_name:     "Ride Westside"
        .to_string(),
      web_url:      "https://ridewestside.org"
        .to_string(),
      public_dir:   PathBuf::from("public"),
      skip_domains: vec![
        "facebook.com".to_string(),
        "www.facebook.com".to_string(),
      ],
      loaded_file:  None
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = match resolve_config_path(
      config_override
    ) {
      | Some(path) => {
        info!(config = %path.display(), "loading config");
        Self::load_file(&path)?
      }
      | None => {
        debug!(
          "no eventboard.toml found; \
           using defaults"
        );
        Self::default()
      }
    };

    if let Ok(days) =
      std::env::var(HORIZON_ENV)
    {
      cfg.apply_overrides([(
        "horizon_days".to_string(),
        days
      )])?;
    }

    Ok(cfg)
  }

  #[tracing::instrument]
  fn load_file(
    path: &Path
  ) -> anyhow::Result<Self> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    let mut cfg: Self = toml::from_str(
      &text
    )
    .with_context(|| {
      format!(
        "failed to parse {}",
        path.display()
      )
    })?;
    cfg.events_file =
      expand_tilde(&cfg.events_file);
    cfg.public_dir =
      expand_tilde(&cfg.public_dir);
    cfg.loaded_file = Some(path);
    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      let value = value.trim().to_string();
      debug!(key = %key, value = %value, "applying override");
      match key.as_str() {
        | "events_file" => {
          self.events_file = expand_tilde(
            Path::new(&value)
          );
        }
        | "horizon_days" => {
          self.horizon_days = value
            .parse()
            .with_context(|| {
              format!(
                "invalid horizon_days: \
                 {value}"
              )
            })?;
        }
        | "api_endpoint" => {
          self.api_endpoint = value
        }
        | "organizer" => {
          self.organizer = value
        }
        | "email" => self.email = value,
        | "web_name" => {
          self.web_name = value
        }
        | "web_url" => self.web_url = value,
        | "public_dir" => {
          self.public_dir = expand_tilde(
            Path::new(&value)
          );
        }
        | "skip_domains" => {
          self.skip_domains = value
            .split(',')
            .map(str::trim)
            .filter(|domain| {
              !domain.is_empty()
            })
            .map(str::to_string)
            .collect();
        }
        | other => {
          return Err(anyhow!(
            "unknown config key: {other}"
          ));
        }
      }
    }
    Ok(())
  }

  pub fn board(&self) -> BoardConfig {
    BoardConfig {
      horizon_days: self.horizon_days,
      ..BoardConfig::default()
    }
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Ok(env_path) =
    std::env::var(CONFIG_ENV)
    && !env_path.trim().is_empty()
  {
    return Some(PathBuf::from(env_path));
  }

  let local = PathBuf::from(CONFIG_FILE_NAME);
  if local.exists() {
    return Some(local);
  }

  let Some(config_dir) = dirs::config_dir()
  else {
    warn!(
      "cannot determine config \
       directory"
    );
    return None;
  };
  let candidate = config_dir
    .join("eventboard")
    .join(CONFIG_FILE_NAME);
  candidate.exists().then_some(candidate)
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}
