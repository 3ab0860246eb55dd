use std::fs;
use std::io::{
  self,
  BufRead,
  IsTerminal,
  Write
};
use std::path::Path;

use anyhow::{
  Context,
  bail
};
use eventboard_core::today_local;
use tracing::{
  info,
  warn
};

use super::block_on;
use crate::cli::{
  AddArgs,
  EventKind,
  SubmitMode
};
use crate::config::Config;
use crate::entry_date::EntryDate;
use crate::events_file::{
  EventEntry,
  append_event,
  format_event_block,
  insert_event_block
};
use crate::render::Renderer;
use crate::submit::{
  EventDetails,
  EventPayload,
  submit_event
};

const BEAVERTON_SECTION: &str =
  "# Beaverton Bike Happy Hours";
const TIGARD_SECTION: &str =
  "# Tigard Happy Hours";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEvent {
  pub entry:   EventEntry,
  pub payload: Option<EventPayload>,
  pub section: Option<String>
}

fn non_empty(
  value: Option<&String>
) -> Option<String> {
  value
    .map(|value| value.trim())
    .filter(|value| !value.is_empty())
    .map(str::to_string)
}

fn section_comment(
  raw: Option<&String>
) -> Option<String> {
  non_empty(raw).map(|section| {
    if section.starts_with('#') {
      section
    } else {
      format!("# {section}")
    }
  })
}

/// Turns the flags into the document
/// entry, the calendar payload (when the
/// kind has one) and the target section.
pub fn build_entry(
  cfg: &Config,
  args: &AddArgs,
  date: &EntryDate
) -> anyhow::Result<PlannedEvent> {
  let start = non_empty(args.start.as_ref());
  let end = non_empty(args.end.as_ref());
  let route = non_empty(args.route.as_ref());

  let planned = match args.kind {
    | EventKind::Beaverton => PlannedEvent {
      entry:   EventEntry {
        title: format!(
          "{} Bike Happy Hour",
          date.short()
        ),
        date: date.display(),
        route,
        start: start
          .or(Some("Beaverton".to_string())),
        end: end
          .or(Some("Beaverton".to_string())),
        ..EventEntry::default()
      },
      payload: Some(EventPayload::happy_hour(
        cfg, date
      )),
      section: Some(
        BEAVERTON_SECTION.to_string()
      )
    },
    | EventKind::Tigard => PlannedEvent {
      entry:   EventEntry {
        title: format!(
          "{} Tigard Happy Hour",
          date.short()
        ),
        date: date.display(),
        route,
        start: start
          .or(Some("Tigard".to_string())),
        end: end
          .or(Some("Tigard".to_string())),
        ..EventEntry::default()
      },
      payload: None,
      section: Some(TIGARD_SECTION.to_string())
    },
    | EventKind::Custom => {
      let Some(title) =
        non_empty(args.title.as_ref())
      else {
        bail!(
          "--title is required for custom \
           events"
        );
      };

      let defaults = EventDetails::default();
      let details = EventDetails {
        title:        title.clone(),
        details:      non_empty(
          args.details.as_ref()
        )
        .unwrap_or(defaults.details),
        time:         non_empty(
          args.time.as_ref()
        )
        .unwrap_or(defaults.time),
        time_details: non_empty(
          args.time_details.as_ref()
        )
        .unwrap_or(defaults.time_details),
        venue:        non_empty(
          args.venue.as_ref()
        )
        .unwrap_or(defaults.venue),
        address:      non_empty(
          args.address.as_ref()
        )
        .unwrap_or(defaults.address),
        area:         non_empty(
          args.area.as_ref()
        )
        .unwrap_or(defaults.area),
        loc_details:  non_empty(
          args.loc_details.as_ref()
        )
        .unwrap_or(defaults.loc_details)
      };

      PlannedEvent {
        entry:   EventEntry {
          title,
          date: date.display(),
          route,
          start: start
            .or(Some("Beaverton".to_string())),
          end: end
            .or(Some("Beaverton".to_string())),
          ..EventEntry::default()
        },
        payload: Some(EventPayload::custom(
          cfg, date, &details
        )),
        section: section_comment(
          args.section.as_ref()
        )
      }
    }
  };

  Ok(planned)
}

pub fn is_yes(answer: &str) -> bool {
  matches!(
    answer.trim().to_ascii_lowercase().as_str(),
    "y" | "yes"
  )
}

/// Asks once on `output` and reads one
/// line from `input`; only `y`/`yes`
/// confirms.
pub fn confirm_write<R, W>(
  events_file: &Path,
  mut input: R,
  mut output: W
) -> anyhow::Result<bool>
where
  R: BufRead,
  W: Write
{
  write!(
    output,
    "Add this event to {}? (y/n): ",
    events_file.display()
  )?;
  output.flush()?;

  let mut answer = String::new();
  input
    .read_line(&mut answer)
    .context("failed reading confirmation")?;
  Ok(is_yes(&answer))
}

/// An explicit `--submit` wins. Otherwise
/// a given `--url` means `existing` and
/// everything else is `skip`.
pub fn resolve_submit_mode(
  args: &AddArgs
) -> SubmitMode {
  match args.submit {
    | Some(mode) => mode,
    | None if non_empty(args.url.as_ref())
      .is_some() =>
    {
      SubmitMode::Existing
    }
    | None => SubmitMode::Skip
  }
}

#[tracing::instrument(skip_all, fields(kind = ?args.kind))]
pub fn run(
  cfg: &Config,
  renderer: &mut Renderer,
  args: AddArgs
) -> anyhow::Result<()> {
  let date =
    EntryDate::parse(&args.date, today_local())?;
  let PlannedEvent {
    mut entry,
    payload,
    section
  } = build_entry(cfg, &args, &date)?;
  let mode = resolve_submit_mode(&args);
  info!(?mode, title = %entry.title, "planned event");

  // fail before anything goes out if the
  // document cannot take the entry
  let content =
    fs::read_to_string(&cfg.events_file)
      .with_context(|| {
        format!(
          "failed reading {}",
          cfg.events_file.display()
        )
      })?;
  insert_event_block(
    &content,
    &entry,
    section.as_deref()
  )
  .with_context(|| {
    format!(
      "failed to update {}",
      cfg.events_file.display()
    )
  })?;

  match mode {
    | SubmitMode::Create => {
      let Some(payload) = payload else {
        bail!(
          "no calendar payload available \
           for this event type"
        );
      };
      if args.dry_run {
        println!(
          "{}",
          serde_json::to_string_pretty(
            &payload
          )?
        );
      } else {
        let url = block_on(submit_event(
          &cfg.api_endpoint,
          &payload
        ))?
        .context("calendar API error")?;
        println!(
          "\nREMINDER: check the organizer \
           inbox for the confirmation email"
        );
        println!(
          "and click the link to publish \
           the event on the calendar!"
        );
        entry.url = Some(url);
      }
    }
    | SubmitMode::Existing => {
      let Some(url) = non_empty(args.url.as_ref())
      else {
        bail!(
          "--url is required with --submit \
           existing"
        );
      };
      entry.url = Some(url);
    }
    | SubmitMode::Skip => {
      if args.url.is_some() {
        warn!("ignoring --url with --submit skip");
      }
    }
  }

  renderer.print_event_summary(&entry)?;

  if args.dry_run {
    println!("\n{}", format_event_block(&entry));
    return Ok(());
  }

  if !args.yes {
    if !io::stdin().is_terminal() {
      bail!(
        "not a terminal: pass --yes to \
         write without confirmation"
      );
    }
    let confirmed = confirm_write(
      &cfg.events_file,
      io::stdin().lock(),
      io::stdout().lock()
    )?;
    if !confirmed {
      info!("add canceled at confirmation");
      println!("Canceled.");
      return Ok(());
    }
  }

  append_event(
    &cfg.events_file,
    &entry,
    section.as_deref()
  )?;
  println!(
    "\nEvent added to {}",
    cfg.events_file.display()
  );
  renderer.print_social_templates(&entry)?;
  Ok(())
}
