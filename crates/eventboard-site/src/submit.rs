use std::time::Duration;

use anyhow::{
  Context,
  anyhow,
  bail
};
use serde::{
  Deserialize,
  Serialize
};
use serde_json::Value;
use tracing::{
  info,
  warn
};

use crate::config::Config;
use crate::entry_date::EntryDate;

pub const EVENT_URL_PREFIX: &str =
  "https://www.shift2bikes.org/calendar/event-";
const SUBMIT_TIMEOUT: Duration =
  Duration::from_secs(15);

const HAPPY_HOUR_DETAILS: &str = "Join us on the westside for Bike Happy Hour. Meet new friends and old, hang out, grab a beverage (alcoholic or not), grab some food, and let's talk bikes! \r\n\r\nEveryone welcome!\r\n\r\nEvery 2nd and 4th Monday, 4:30 to 7 p.m.";

#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct DateStatus {
  pub id:        String,
  pub date:      String,
  pub status:    String,
  pub newsflash: String
}

/// The calendar's create-event body.
/// Every field is sent, empty or not.
#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct EventPayload {
  pub id:              String,
  pub secret:          String,
  pub title:           String,
  pub details:         String,
  pub audience:        String,
  pub time:            String,
  pub timedetails:     String,
  pub eventduration:   String,
  pub area:            String,
  pub venue:           String,
  pub address:         String,
  pub locdetails:      String,
  pub locend:          String,
  pub length:          String,
  pub organizer:       String,
  pub email:           String,
  pub hideemail:       String,
  pub webname:         String,
  pub weburl:          String,
  pub phone:           String,
  pub contact:         String,
  pub tinytitle:       String,
  pub printdescr:      String,
  pub code_of_conduct: String,
  pub read_comic:      String,
  pub datestatuses:    Vec<DateStatus>
}

/// Venue and schedule fields of a
/// custom event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
  pub title:        String,
  pub details:      String,
  pub time:         String,
  pub time_details: String,
  pub venue:        String,
  pub address:      String,
  pub area:         String,
  pub loc_details:  String
}

impl Default for EventDetails {
  fn default() -> Self {
    Self {
      title:        String::new(),
      details:      String::new(),
      time:         "10:00:00".to_string(),
      time_details: String::new(),
      venue:        "Beaverton Central MAX Station"
        .to_string(),
      address:      "12700 SW Crescent St, Beaverton, OR 97005"
        .to_string(),
      area:         "W".to_string(),
      loc_details:  String::new()
    }
  }
}

impl EventPayload {
  fn for_organizer(
    cfg: &Config,
    date: &EntryDate
  ) -> Self {
    Self {
      audience: "G".to_string(),
      length: "--".to_string(),
      organizer: cfg.organizer.clone(),
      email: cfg.email.clone(),
      hideemail: "1".to_string(),
      webname: cfg.web_name.clone(),
      weburl: cfg.web_url.clone(),
      code_of_conduct: "1".to_string(),
      read_comic: "1".to_string(),
      datestatuses: vec![DateStatus {
        date: date.api(),
        status: "A".to_string(),
        ..DateStatus::default()
      }],
      ..Self::default()
    }
  }

  /// The recurring westside happy hour.
  pub fn happy_hour(
    cfg: &Config,
    date: &EntryDate
  ) -> Self {
    Self {
      title: format!(
        "Westside Bike Happy Hour {}",
        date.short()
      ),
      details: HAPPY_HOUR_DETAILS
        .to_string(),
      time: "16:30:00".to_string(),
      timedetails: "4:30 to 7pm"
        .to_string(),
      area: "W".to_string(),
      venue: "BGs Food Cartel".to_string(),
      address: "4250 SW Rose Biggi Ave Beaverton, OR"
        .to_string(),
      locdetails: "Meet in the back by the bar or in the indoor seating"
        .to_string(),
      ..Self::for_organizer(cfg, date)
    }
  }

  pub fn custom(
    cfg: &Config,
    date: &EntryDate,
    details: &EventDetails
  ) -> Self {
    Self {
      title: details.title.clone(),
      details: details.details.clone(),
      time: details.time.clone(),
      timedetails: details
        .time_details
        .clone(),
      area: details.area.clone(),
      venue: details.venue.clone(),
      address: details.address.clone(),
      locdetails: details
        .loc_details
        .clone(),
      ..Self::for_organizer(cfg, date)
    }
  }
}

pub fn event_url(id: &str) -> String {
  format!("{EVENT_URL_PREFIX}{id}")
}

/// Pulls the new event id out of a
/// create response:
/// `datestatuses[0].id`, then a top-level
/// `id`. Ids may arrive as strings or
/// numbers.
pub fn extract_event_id(
  body: &str
) -> anyhow::Result<String> {
  let value: Value =
    serde_json::from_str(body)
      .context("failed to parse response")?;

  let candidates = [
    value.pointer("/datestatuses/0/id"),
    value.get("id")
  ];
  candidates
    .into_iter()
    .flatten()
    .find_map(id_text)
    .ok_or_else(|| {
      anyhow!("no event ID in API response")
    })
}

fn id_text(value: &Value) -> Option<String> {
  match value {
    | Value::String(id)
      if !id.trim().is_empty() =>
    {
      Some(id.trim().to_string())
    }
    | Value::Number(id) => {
      Some(id.to_string())
    }
    | _ => None
  }
}

/// Posts the payload and returns the
/// public calendar URL of the new event.
#[tracing::instrument(skip_all, fields(title = %payload.title))]
pub async fn submit_event(
  endpoint: &str,
  payload: &EventPayload
) -> anyhow::Result<String> {
  let client = reqwest::Client::builder()
    .timeout(SUBMIT_TIMEOUT)
    .build()
    .context(
      "failed building HTTP client for \
       event submission"
    )?;

  let response = client
    .post(endpoint)
    .json(payload)
    .send()
    .await
    .with_context(|| {
      format!("request to {endpoint} failed")
    })?;

  let status = response.status();
  let body = response
    .text()
    .await
    .context("failed to read response")?;

  if status.is_client_error()
    || status.is_server_error()
  {
    warn!(status = %status, "event submission rejected");
    bail!("API returned HTTP {status}: {body}");
  }

  info!(status = %status, body = %body, "event submission accepted");
  let id = extract_event_id(&body)?;
  Ok(event_url(&id))
}
