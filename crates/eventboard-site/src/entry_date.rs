use anyhow::{
  anyhow,
  bail
};
use chrono::{
  Datelike,
  NaiveDate
};
use regex::Regex;

/// A date typed by whoever adds an
/// event: `MM/DD` or `MM/DD/YYYY`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct EntryDate(NaiveDate);

impl EntryDate {
  /// `MM/DD` takes the year from
  /// `today`.
  pub fn parse(
    raw: &str,
    today: NaiveDate
  ) -> anyhow::Result<Self> {
    let raw = raw.trim();
    let entry_re = Regex::new(
      r"^(?P<month>\d{1,2})/(?P<day>\d{1,2})(?:/(?P<year>\d{4}))?$"
    )
    .map_err(|e| {
      anyhow!("internal regex compile failure: {e}")
    })?;
    let caps = entry_re
      .captures(raw)
      .ok_or_else(|| {
        anyhow!(
          "invalid date format {raw:?}; \
           use MM/DD/YYYY or MM/DD"
        )
      })?;

    let month: u32 = caps["month"].parse()?;
    let day: u32 = caps["day"].parse()?;
    let year = match caps.name("year") {
      | Some(year) => {
        year.as_str().parse::<i32>()?
      }
      | None => today.year()
    };

    let Some(date) =
      NaiveDate::from_ymd_opt(
        year, month, day
      )
    else {
      bail!("invalid date: {raw}");
    };
    Ok(Self(date))
  }

  pub fn date(&self) -> NaiveDate {
    self.0
  }

  /// `2026-01-02`
  pub fn api(&self) -> String {
    self.0.format("%Y-%m-%d").to_string()
  }

  /// `January 2, 2026`
  pub fn display(&self) -> String {
    self.0.format("%B %-d, %Y").to_string()
  }

  /// `1/2`
  pub fn short(&self) -> String {
    format!(
      "{}/{}",
      self.0.month(),
      self.0.day()
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14)
      .expect("valid date")
  }

  #[test]
  fn month_day_uses_current_year() {
    let date = EntryDate::parse("1/2", today())
      .expect("parse");
    assert_eq!(date.api(), "2026-01-02");
    assert_eq!(
      date.display(),
      "January 2, 2026"
    );
    assert_eq!(date.short(), "1/2");
  }

  #[test]
  fn full_form_keeps_its_year() {
    let date =
      EntryDate::parse("12/25/2027", today())
        .expect("parse");
    assert_eq!(date.api(), "2027-12-25");
    assert_eq!(
      date.display(),
      "December 25, 2027"
    );
    assert_eq!(date.short(), "12/25");
  }

  #[test]
  fn rejects_impossible_and_malformed_dates()
  {
    assert!(
      EntryDate::parse("2/30", today()).is_err()
    );
    assert!(
      EntryDate::parse("13/01/2026", today())
        .is_err()
    );
    assert!(
      EntryDate::parse("2026-01-02", today())
        .is_err()
    );
    assert!(
      EntryDate::parse("1/2/26", today())
        .is_err()
    );
  }
}
