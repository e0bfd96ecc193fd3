use chrono::{DateTime, NaiveDateTime};
use colored::{ColoredString, Colorize};
use regex::Regex;

use crate::api::{Particle, QueryHit};

/// Persisted display theme. Anything that does not parse is treated as the
/// dark default by callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

pub fn heading(theme: Theme, text: &str) -> ColoredString {
    match theme {
        Theme::Dark => text.bold().white(),
        Theme::Light => text.bold().blue(),
    }
}

pub fn accent(theme: Theme, text: &str) -> ColoredString {
    match theme {
        Theme::Dark => text.cyan(),
        Theme::Light => text.blue(),
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// The only place particle body markup is interpreted. Block-level closers
/// become line breaks, list items become dashes, every other tag is dropped
/// and a small entity table is decoded.
pub fn html_to_text(html: &str) -> String {
    let break_re =
        Regex::new(r"(?i)<br\s*/?>|</(?:p|div|li|ul|ol|h[1-6]|tr|table|blockquote|pre)\s*>")
            .unwrap();
    let bullet_re = Regex::new(r"(?i)<li(?:\s[^>]*)?>").unwrap();
    let tag_re = Regex::new(r"<[^>]*>").unwrap();

    let text = break_re.replace_all(html, "\n");
    let text = bullet_re.replace_all(&text, "- ");
    let text = tag_re.replace_all(&text, "");
    let text = decode_entities(&text);

    let mut lines: Vec<&str> = Vec::new();
    let mut blank_run = 0usize;
    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            lines.push("");
        } else {
            blank_run = 0;
            lines.push(line);
        }
    }
    lines.join("\n").trim().to_string()
}

/// A body whose rendered text is blank counts as empty, whatever markup it
/// carries ("<p><br></p>", entity-only content, and so on).
pub fn is_effectively_empty(html: &str) -> bool {
    html_to_text(html).is_empty()
}

/// Date-only display of a `created_at` timestamp; unparseable values pass
/// through untouched.
pub fn format_date(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%Y-%m-%d").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn flatten_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Renders search hits as a table, rebuilt from scratch on every call so the
/// same hits always produce the same output. The particle column carries the
/// id that `view`/`edit`/`delete` take.
pub fn search_table(hits: &[QueryHit], theme: Theme) -> String {
    let mut out = String::new();
    let header = format!("{:<8} {:<12} {:<34} {}", "ID", "CREATED", "TITLE", "PARTICLE");
    out.push_str(&heading(theme, &header).to_string());
    out.push('\n');
    for hit in hits {
        let id = format!("#{}", hit.user_facing_id);
        let line = format!(
            "{:<8} {:<12} {:<34} {}",
            id,
            format_date(&hit.created_at),
            truncate(&flatten_whitespace(&hit.title), 34),
            hit.id,
        );
        out.push_str(line.trim_end());
        out.push('\n');
        let snippet = flatten_whitespace(&hit.snippet);
        if !snippet.is_empty() {
            let line = format!("         {}", accent(theme, &truncate(&snippet, 72)));
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

pub fn particle_detail(particle: &Particle, theme: Theme) -> String {
    let mut out = String::new();
    out.push_str(&heading(theme, &particle.title).to_string());
    out.push('\n');

    let mut meta = vec![
        format!("#{}", particle.user_facing_id),
        format_date(&particle.created_at),
    ];
    if !particle.author.is_empty() {
        meta.push(particle.author.clone());
    }
    if !particle.tags.is_empty() {
        meta.push(particle.tags.join(", "));
    }
    out.push_str(&accent(theme, &meta.join(" | ")).to_string());
    out.push('\n');

    let body = html_to_text(&particle.body);
    if !body.is_empty() {
        out.push('\n');
        out.push_str(&body);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{format_date, html_to_text, is_effectively_empty};

    #[test]
    fn quill_empty_document_is_empty() {
        assert!(is_effectively_empty("<p><br></p>"));
        assert!(is_effectively_empty("<p>&nbsp;</p>"));
        assert!(!is_effectively_empty("<p>hello</p>"));
    }

    #[test]
    fn block_tags_become_line_breaks() {
        let text = html_to_text("<h1>Title</h1><p>one</p><p>two</p>");
        assert_eq!(text, "Title\none\ntwo");
    }

    #[test]
    fn list_items_become_dashes() {
        let text = html_to_text("<ul><li>milk</li><li>eggs</li></ul>");
        assert_eq!(text, "- milk\n- eggs");
    }

    #[test]
    fn entities_decode_after_tag_stripping() {
        assert_eq!(html_to_text("<p>a &amp; b &lt;c&gt;</p>"), "a & b <c>");
    }

    #[test]
    fn format_date_handles_naive_and_offset_timestamps() {
        assert_eq!(format_date("2024-05-01T12:30:00.123456"), "2024-05-01");
        assert_eq!(format_date("2024-05-01T12:30:00+02:00"), "2024-05-01");
        assert_eq!(format_date("yesterday"), "yesterday");
    }
}
