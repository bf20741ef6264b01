//! Human-friendly CLI output formatters.
//!
//! Each `fmt_*` function formats one kind of result for terminal display.
//! When `color` is true, ANSI escape codes are emitted via `owo_colors`.

use crate::types::{Candidate, QueryKey, ReadyEvent};
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Longest blurb printed before truncation.
const MAX_BLURB_CHARS: usize = 300;

fn type_names(candidate: &Candidate) -> String {
    candidate
        .types
        .iter()
        .map(|t| t.name.as_deref().unwrap_or(&t.id))
        .collect::<Vec<_>>()
        .join(", ")
}

// ── candidates ──────────────────────────────────────────────────────────────

pub fn fmt_candidates(
    w: &mut impl Write,
    key: &QueryKey,
    list: &[Candidate],
    color: bool,
) -> io::Result<()> {
    for (i, c) in list.iter().enumerate() {
        let types = type_names(c);
        if color {
            write!(w, "{} {}  {}", format!("{i:>3}.").dimmed(), c.name.bold(), c.id.cyan())?;
        } else {
            write!(w, "{i:>3}. {}  {}", c.name, c.id)?;
        }
        if !types.is_empty() {
            if color {
                write!(w, "  ({})", types.dimmed())?;
            } else {
                write!(w, "  ({types})")?;
            }
        }
        writeln!(w)?;

        if !c.aliases.is_empty() {
            writeln!(w, "       aka {}", c.aliases.join(", "))?;
        }
    }

    let summary = format!("{} candidates for {}", list.len(), key);
    if color {
        writeln!(w, "{}", summary.dimmed())?;
    } else {
        writeln!(w, "{summary}")?;
    }
    Ok(())
}

// ── no match ────────────────────────────────────────────────────────────────

pub fn fmt_no_match(
    w: &mut impl Write,
    key: &QueryKey,
    suggest_new: Option<&str>,
    color: bool,
) -> io::Result<()> {
    if color {
        writeln!(w, "{} {}", "no matches for".yellow(), key.text().bold())?;
    } else {
        writeln!(w, "no matches for {}", key.text())?;
    }
    if let Some(label) = suggest_new {
        writeln!(w, "  → {label}: {}", key.text())?;
    }
    Ok(())
}

// ── flyout ──────────────────────────────────────────────────────────────────

pub fn fmt_flyout(
    w: &mut impl Write,
    ready: &ReadyEvent,
    browse_url: &str,
    color: bool,
) -> io::Result<()> {
    let c = &ready.candidate;
    if color {
        writeln!(w, "{}  {}", c.name.bold(), c.id.cyan())?;
    } else {
        writeln!(w, "{}  {}", c.name, c.id)?;
    }

    let types = type_names(c);
    if !types.is_empty() {
        writeln!(w, "{types}")?;
    }

    if !ready.text.is_empty() {
        let mut blurb: String = ready.text.chars().take(MAX_BLURB_CHARS).collect();
        if blurb.len() < ready.text.len() {
            blurb.push('…');
        }
        writeln!(w)?;
        writeln!(w, "{blurb}")?;
        writeln!(w)?;
    }

    if color {
        writeln!(w, "{:<7} {}", "image:".dimmed(), ready.image_url)?;
        writeln!(w, "{:<7} {}", "link:".dimmed(), browse_url.underline())?;
    } else {
        writeln!(w, "{:<7} {}", "image:", ready.image_url)?;
        writeln!(w, "{:<7} {}", "link:", browse_url)?;
    }
    Ok(())
}

// ── urls ────────────────────────────────────────────────────────────────────

pub fn fmt_urls(w: &mut impl Write, urls: &[(&str, String)], color: bool) -> io::Result<()> {
    for (label, url) in urls {
        if color {
            writeln!(w, "{:<8} {}", format!("{label}:").bold(), url)?;
        } else {
            writeln!(w, "{:<8} {}", format!("{label}:"), url)?;
        }
    }
    Ok(())
}
