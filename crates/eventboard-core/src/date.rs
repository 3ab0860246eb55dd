use std::sync::LazyLock;

use anyhow::anyhow;
use chrono::{
  DateTime,
  Local,
  NaiveDate,
  NaiveDateTime,
  NaiveTime
};
use regex::Regex;

static CLOCK_RE: LazyLock<Regex> =
  LazyLock::new(|| {
    Regex::new(
      r"(?i)^(?P<hour>\d{1,2})(?::(?P<minute>\d{2}))?(?::(?P<second>\d{2}))?\s*(?P<ampm>[ap])\.?\s*m?\.?$|^(?P<hour24>\d{1,2}):(?P<minute24>\d{2})(?::(?P<second24>\d{2}))?$"
    )
    .expect("valid clock regex")
  });

const STRUCTURED_DATETIME_FORMATS: [&str;
  4] = [
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%d %H:%M"
];

const NATURAL_DATE_FORMATS: [&str; 7] = [
  "%B %d, %Y",
  "%B %d %Y",
  "%d %B %Y",
  "%d %B, %Y",
  "%m/%d/%Y",
  "%Y/%m/%d",
  "%b. %d, %Y"
];

/// Start of the current local calendar
/// day. Read from the clock on every
/// call.
pub fn today_local() -> NaiveDate {
  Local::now().date_naive()
}

pub fn start_of_day(
  date: NaiveDate
) -> NaiveDateTime {
  date.and_time(NaiveTime::MIN)
}

/// Parses an event date attribute into a
/// local wall-clock instant.
///
/// ISO 8601 forms are tried first, then
/// the looser written forms used on
/// listing pages ("January 12, 2026",
/// "Mon, Jan 12 2026 4:30pm", "1/12/2026").
#[tracing::instrument(level = "trace")]
pub fn parse_event_date(
  input: &str
) -> anyhow::Result<NaiveDateTime> {
  let token = input.trim();
  if token.is_empty() {
    return Err(anyhow!(
      "empty event date"
    ));
  }

  if let Some(instant) =
    parse_structured(token)
  {
    return Ok(instant);
  }

  parse_natural(token).ok_or_else(|| {
    anyhow!(
      "unrecognized event date \
       {input:?}; supported formats: \
       YYYY-MM-DD, YYYY-MM-DDTHH:MM, \
       RFC3339, \"January 12, 2026\", \
       \"12 January 2026\", MM/DD/YYYY"
    )
  })
}

fn parse_structured(
  token: &str
) -> Option<NaiveDateTime> {
  if let Ok(date) =
    NaiveDate::parse_from_str(
      token, "%Y-%m-%d"
    )
  {
    return Some(start_of_day(date));
  }

  for fmt in STRUCTURED_DATETIME_FORMATS
  {
    if let Ok(ndt) =
      NaiveDateTime::parse_from_str(
        token, fmt
      )
    {
      return Some(ndt);
    }
  }

  // offsets are kept as written; the
  // wall clock is what the page shows
  DateTime::parse_from_rfc3339(token)
    .ok()
    .map(|dt| dt.naive_local())
}

fn parse_natural(
  token: &str
) -> Option<NaiveDateTime> {
  let token = strip_weekday(token);

  for fmt in NATURAL_DATE_FORMATS {
    let Ok((date, rest)) =
      NaiveDate::parse_and_remainder(
        token, fmt
      )
    else {
      continue;
    };

    let rest = rest
      .trim()
      .trim_start_matches(',')
      .trim();
    let rest = rest
      .strip_prefix("at ")
      .unwrap_or(rest)
      .trim();

    if rest.is_empty() {
      return Some(start_of_day(date));
    }

    if let Some(time) =
      parse_clock_time(rest)
    {
      return Some(date.and_time(time));
    }
  }

  None
}

fn strip_weekday(token: &str) -> &str {
  let Some((head, tail)) =
    token.split_once([' ', ','])
  else {
    return token;
  };

  let head = head
    .trim_end_matches('.')
    .to_ascii_lowercase();
  if is_weekday_name(&head) {
    tail
      .trim_start_matches([' ', ','])
  } else {
    token
  }
}

fn is_weekday_name(token: &str) -> bool {
  matches!(
    token,
    "monday"
      | "mon"
      | "tuesday"
      | "tue"
      | "tues"
      | "wednesday"
      | "wed"
      | "thursday"
      | "thu"
      | "thur"
      | "thurs"
      | "friday"
      | "fri"
      | "saturday"
      | "sat"
      | "sunday"
      | "sun"
  )
}

fn parse_clock_time(
  token: &str
) -> Option<NaiveTime> {
  let captures =
    CLOCK_RE.captures(token.trim())?;

  let number = |name: &str| {
    captures
      .name(name)
      .map(|m| m.as_str().parse::<u32>())
      .transpose()
      .ok()
      .flatten()
  };

  if let Some(raw_hour) = number("hour")
  {
    let minute =
      number("minute").unwrap_or(0);
    let second =
      number("second").unwrap_or(0);
    if raw_hour == 0 || raw_hour > 12 {
      return None;
    }
    let pm = captures
      .name("ampm")
      .is_some_and(|m| {
        m.as_str()
          .eq_ignore_ascii_case("p")
      });
    let hour = match (pm, raw_hour) {
      | (false, 12) => 0,
      | (false, hour) => hour,
      | (true, 12) => 12,
      | (true, hour) => hour + 12
    };
    return NaiveTime::from_hms_opt(
      hour, minute, second
    );
  }

  NaiveTime::from_hms_opt(
    number("hour24")?,
    number("minute24")?,
    number("second24").unwrap_or(0)
  )
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::parse_event_date;

  fn ymd(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn parses_iso_date_at_midnight() {
    let parsed =
      parse_event_date("2026-01-05")
        .expect("parse iso");
    assert_eq!(parsed.date(), ymd(2026, 1, 5));
    assert_eq!(
      parsed.format("%H:%M").to_string(),
      "00:00"
    );
  }

  #[test]
  fn parses_iso_datetime_and_rfc3339() {
    let local =
      parse_event_date("2026-03-14T18:30")
        .expect("parse datetime");
    assert_eq!(
      local
        .format("%Y-%m-%d %H:%M")
        .to_string(),
      "2026-03-14 18:30"
    );

    let offset = parse_event_date(
      "2026-03-14T18:30:00-07:00"
    )
    .expect("parse rfc3339");
    assert_eq!(
      offset
        .format("%Y-%m-%d %H:%M")
        .to_string(),
      "2026-03-14 18:30"
    );
  }

  #[test]
  fn parses_written_month_forms() {
    for raw in [
      "January 12, 2026",
      "january 12 2026",
      "Jan 12, 2026",
      "12 January 2026",
      "Monday, January 12, 2026",
      "1/12/2026",
      "  January 12, 2026  "
    ] {
      let parsed = parse_event_date(raw)
        .unwrap_or_else(|err| {
          panic!("{raw}: {err:#}")
        });
      assert_eq!(
        parsed.date(),
        ymd(2026, 1, 12),
        "{raw}"
      );
    }
  }

  #[test]
  fn parses_written_date_with_clock_time()
  {
    let parsed = parse_event_date(
      "January 12, 2026 4:30pm"
    )
    .expect("parse with time");
    assert_eq!(
      parsed
        .format("%Y-%m-%d %H:%M")
        .to_string(),
      "2026-01-12 16:30"
    );

    let noon = parse_event_date(
      "January 12, 2026 at 12 PM"
    )
    .expect("parse noon");
    assert_eq!(
      noon.format("%H:%M").to_string(),
      "12:00"
    );
  }

  #[test]
  fn rejects_garbage() {
    for raw in [
      "not-a-date",
      "",
      "   ",
      "2026-13-01",
      "February 30, 2026",
      "January 12, 2026 whenever"
    ] {
      assert!(
        parse_event_date(raw).is_err(),
        "{raw:?} should not parse"
      );
    }
  }
}
