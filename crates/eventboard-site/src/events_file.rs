use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, anyhow, bail};
use eventboard_core::{Item, ItemId};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

const FENCE: &str = "---";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntry {
    pub title: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    events: Vec<EventEntry>,
}

impl EventEntry {
    /// The entry as the page script sees it; the id is the entry's
    /// position in the document.
    pub fn to_item(&self, id: ItemId) -> Item {
        Item::from_attributes(
            id,
            Some(self.date.clone()),
            self.start.clone(),
            self.end.clone(),
        )
    }
}

pub fn to_items(entries: &[EventEntry]) -> Vec<Item> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| entry.to_item(ItemId(idx)))
        .collect()
}

#[tracing::instrument(skip(path), fields(file = %path.display()))]
pub fn load_events(path: &Path) -> anyhow::Result<Vec<EventEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    let events = parse_events(&content)
        .with_context(|| format!("failed parsing front matter of {}", path.display()))?;
    debug!(count = events.len(), "loaded events");
    Ok(events)
}

pub fn parse_events(content: &str) -> anyhow::Result<Vec<EventEntry>> {
    let front = front_matter(content)?;
    if front.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parsed: FrontMatter = serde_yaml::from_str(&front)?;
    Ok(parsed.events)
}

fn front_matter(content: &str) -> anyhow::Result<String> {
    let mut lines = content.lines();
    match lines.next() {
        Some(first) if first.trim() == FENCE => {}
        _ => bail!("document does not start with {FENCE}"),
    }

    let mut body = Vec::new();
    for line in lines {
        if line.trim() == FENCE {
            return Ok(body.join("\n"));
        }
        body.push(line);
    }
    Err(anyhow!("front matter has no closing {FENCE}"))
}

/// The YAML list item written for one entry, without a trailing newline.
pub fn format_event_block(entry: &EventEntry) -> String {
    let mut lines = vec![
        format!("  - title: {}", quote(&entry.title)),
        format!("    date: {}", quote(&entry.date)),
    ];
    if let Some(url) = entry.url.as_deref().filter(|url| !url.is_empty()) {
        lines.push(format!("    url: {}", quote(url)));
    }
    if let Some(route) = entry.route.as_deref().filter(|route| !route.is_empty()) {
        lines.push(format!("    route: {}", quote(route)));
    }
    lines.push(format!(
        "    start: {}",
        quote(entry.start.as_deref().unwrap_or_default())
    ));
    lines.push(format!(
        "    end: {}",
        quote(entry.end.as_deref().unwrap_or_default())
    ));
    lines.join("\n")
}

// JSON string escaping is valid YAML double-quoted scalar syntax
fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Splices the entry into the document. With a section comment the block
/// lands after the last non-blank line of that section; without one it
/// lands just before the closing fence.
#[tracing::instrument(skip(content, entry), fields(title = %entry.title))]
pub fn insert_event_block(
    content: &str,
    entry: &EventEntry,
    section: Option<&str>,
) -> anyhow::Result<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    let block = format!("\n{}", format_event_block(entry));

    let insert_at = match section.filter(|section| !section.trim().is_empty()) {
        Some(section) => section_end(&lines, section)
            .ok_or_else(|| anyhow!("section comment {section:?} not found"))?,
        None => lines
            .iter()
            .rposition(|line| line.trim() == FENCE)
            .ok_or_else(|| anyhow!("could not find closing {FENCE}"))?,
    };
    debug!(line = insert_at, "inserting event block");

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 1);
    out.extend_from_slice(&lines[..insert_at]);
    out.push(&block);
    out.extend_from_slice(&lines[insert_at..]);
    Ok(out.join("\n"))
}

fn section_end(lines: &[&str], section: &str) -> Option<usize> {
    let start = lines
        .iter()
        .position(|line| line.trim().contains(section))?;

    let mut last = start;
    for (idx, line) in lines.iter().enumerate().skip(start + 1) {
        let trimmed = line.trim();
        if trimmed.starts_with('#') || trimmed == FENCE {
            break;
        }
        if !trimmed.is_empty() {
            last = idx;
        }
    }
    Some(last + 1)
}

/// Reads, splices and atomically rewrites the events document. The file is
/// untouched when the splice fails.
#[tracing::instrument(skip(path, entry), fields(file = %path.display()))]
pub fn append_event(
    path: &Path,
    entry: &EventEntry,
    section: Option<&str>,
) -> anyhow::Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    let updated = insert_event_block(&content, entry, section)
        .with_context(|| format!("failed to update {}", path.display()))?;
    write_atomic(path, &updated)?;
    info!(title = %entry.title, "event added");
    Ok(())
}

fn write_atomic(path: &Path, content: &str) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content.as_bytes())?;
    temp.flush()?;
    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;
    Ok(())
}
