use std::io::{self, IsTerminal, Write};

use eventboard_core::{Bucket, ItemId, LocationVocabulary, location_label};
use unicode_width::UnicodeWidthStr;

use crate::events_file::EventEntry;
use crate::links::{LinkReport, LinkStatus};

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    #[tracing::instrument(skip(self, entries))]
    pub fn print_bucket(&mut self, bucket: Bucket, entries: &[&EventEntry]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let heading = format!("{} ({})", bucket.label(), entries.len());
        writeln!(out, "{}", self.paint(&heading, "1"))?;

        if entries.is_empty() {
            writeln!(out, "  none")?;
            writeln!(out)?;
            return Ok(());
        }

        let headers = vec![
            "Date".to_string(),
            "Title".to_string(),
            "Route".to_string(),
            "Link".to_string(),
        ];
        let rows = entries
            .iter()
            .map(|entry| {
                let date = match bucket {
                    Bucket::Past => self.paint(&entry.date, "2"),
                    Bucket::Upcoming => self.paint(&entry.date, "32"),
                    Bucket::Future => entry.date.clone(),
                };
                let route = location_label(&entry.to_item(ItemId(0)))
                    .unwrap_or_default();
                let link = entry.url.clone().unwrap_or_default();
                vec![date, entry.title.clone(), route, link]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        writeln!(out)?;
        Ok(())
    }

    pub fn print_undated(&mut self, entries: &[&EventEntry]) -> anyhow::Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut out = io::stdout().lock();
        writeln!(
            out,
            "{}",
            self.paint(&format!("Unreadable dates ({})", entries.len()), "31")
        )?;
        for entry in entries {
            writeln!(out, "  {:?}  {}", entry.date, entry.title)?;
        }
        writeln!(out)?;
        Ok(())
    }

    pub fn print_locations(&mut self, vocabulary: &LocationVocabulary) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", self.paint("Start locations", "1"))?;
        for start in &vocabulary.starts {
            writeln!(out, "  {start}")?;
        }
        writeln!(out, "{}", self.paint("End locations", "1"))?;
        for end in &vocabulary.ends {
            writeln!(out, "  {end}")?;
        }
        Ok(())
    }

    pub fn print_event_summary(&mut self, entry: &EventEntry) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        write_summary(&mut out, entry)
    }

    pub fn print_social_templates(&mut self, entry: &EventEntry) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        write_social_templates(&mut out, entry)
    }

    #[tracing::instrument(skip_all)]
    pub fn print_link_reports(&mut self, reports: &[LinkReport]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        for report in reports {
            let line = match &report.status {
                LinkStatus::Ok => format!("  {} {}", self.paint("ok", "32"), report.url),
                LinkStatus::Skipped => format!(
                    "  {} {} (skipped - bot protection)",
                    self.paint("--", "33"),
                    report.url
                ),
                LinkStatus::Dead(reason) => format!(
                    "  {} {}\n    Status: {reason}",
                    self.paint("dead", "31"),
                    report.url
                ),
            };
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_summary<W: Write>(mut writer: W, entry: &EventEntry) -> anyhow::Result<()> {
    writeln!(writer, "\n===== EVENT SUMMARY =====")?;
    writeln!(writer, "Title: {}", entry.title)?;
    writeln!(writer, "Date:  {}", entry.date)?;
    if let Some(url) = entry.url.as_deref().filter(|url| !url.is_empty()) {
        writeln!(writer, "URL:   {url}")?;
    }
    if let Some(route) = entry.route.as_deref().filter(|route| !route.is_empty()) {
        writeln!(writer, "Route: {route}")?;
    }
    writeln!(writer, "Start: {}", entry.start.as_deref().unwrap_or_default())?;
    writeln!(writer, "End:   {}", entry.end.as_deref().unwrap_or_default())?;
    writeln!(writer, "=========================")?;
    Ok(())
}

fn write_social_templates<W: Write>(mut writer: W, entry: &EventEntry) -> anyhow::Result<()> {
    let url = entry.url.as_deref().filter(|url| !url.is_empty());

    writeln!(writer, "\n===== INSTAGRAM POST TEMPLATE =====")?;
    writeln!(writer, "Join us for {} on {}!", entry.title, entry.date)?;
    if let Some(url) = url {
        writeln!(writer, "Details: {url}")?;
    }
    writeln!(writer, "#BikeHappyHour #RideWestside #BikeLife #Beaverton")?;
    writeln!(writer, "===================================")?;

    writeln!(writer, "\n===== BLUESKY POST TEMPLATE =====")?;
    writeln!(writer, "{} - {}", entry.title, entry.date)?;
    if let Some(url) = url {
        writeln!(writer, "Details and directions: {url}")?;
    }
    writeln!(writer, "#BikeHappyHour #RideWestside")?;
    writeln!(writer, "=================================")?;
    Ok(())
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (header, width) in headers.iter().zip(&widths) {
        write!(writer, "{:width$} ", header, width = *width)?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, width) in row.iter().zip(&widths) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = width.saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
