//! Line-of-code extraction from the external counting tool.
//!
//! [`StatsExtractor`] runs `cloc` against a mirror and turns its report into
//! [`Metrics`]. The JSON report (`cloc --json`) is preferred. Output that is
//! not JSON goes through the positional text parser, which understands the
//! classic table:
//!
//! ```text
//! -------------------------------------------------------------------------------
//! Language                     files          blank        comment           code
//! -------------------------------------------------------------------------------
//! Rust                             3             10              4            120
//! Bourne Shell                     1              2              1              9
//! -------------------------------------------------------------------------------
//! SUM:                             4             12              5            129
//! -------------------------------------------------------------------------------
//! ```
//!
//! The `SUM:` row is left out by cloc when only one language is found, so the
//! text parsers return empty results without it unless `force` is set.

use crate::core::config::StatsFormat;
use crate::core::error::{RepoStatsError, Result};
use crate::core::exec::CommandRunner;
use crate::core::state::{LanguageStat, Metrics, TOTAL_LANGUAGE};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const SUM_MARKER: &str = "SUM:";
const HEADER_PREFIX: &str = "Language";
const SEPARATOR_PREFIX: &str = "---";
const JSON_HEADER_KEY: &str = "header";
const JSON_SUM_KEY: &str = "SUM";

pub struct StatsExtractor<'a> {
    runner: &'a CommandRunner,
    cloc_bin: &'a str,
    format: StatsFormat,
}

impl<'a> StatsExtractor<'a> {
    pub fn new(runner: &'a CommandRunner, cloc_bin: &'a str, format: StatsFormat) -> Self {
        Self {
            runner,
            cloc_bin,
            format,
        }
    }

    /// Raw counting tool output, or an empty string when `path` is missing.
    pub fn count(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            log::debug!("Mirror {} missing, nothing to count", path.display());
            return Ok(String::new());
        }

        let path = path.to_string_lossy().into_owned();
        let mut args = vec![self.cloc_bin];
        if self.format == StatsFormat::Json {
            args.push("--json");
        }
        args.push(path.as_str());

        self.runner.run(&args, None, &[])
    }

    pub fn extract(&self, path: &Path) -> Result<Metrics> {
        let raw = self.count(path)?;
        parse_report(&raw)
    }
}

/// Parse a counting tool report, JSON or text.
///
/// A zero `loc` means no usable total was found.
pub fn parse_report(raw: &str) -> Result<Metrics> {
    if let Some(metrics) = parse_json_report(raw)? {
        return Ok(metrics);
    }

    let loc = parse_loc(raw, false)?;
    let pls = parse_pls(raw, false)?;
    if loc == 0 && pls.is_empty() {
        log::debug!("No {SUM_MARKER} marker in counting output, retrying forced");
        return Ok(Metrics {
            loc: parse_loc(raw, true)?,
            pls: parse_pls(raw, true)?,
        });
    }

    Ok(Metrics { loc, pls })
}

#[derive(Debug, Deserialize)]
struct ClocCounts {
    #[serde(rename = "nFiles")]
    files: u64,
    blank: u64,
    comment: u64,
    code: u64,
}

impl ClocCounts {
    fn into_stat(self, language: &str) -> LanguageStat {
        LanguageStat {
            language: language.to_string(),
            files: self.files,
            blank: self.blank,
            comment: self.comment,
            code: self.code,
        }
    }
}

/// `Ok(None)` when `raw` is not a JSON report.
pub fn parse_json_report(raw: &str) -> Result<Option<Metrics>> {
    if !raw.trim_start().starts_with('{') {
        return Ok(None);
    }
    let Ok(document) = serde_json::from_str::<BTreeMap<String, serde_json::Value>>(raw) else {
        return Ok(None);
    };

    let mut total = None;
    let mut languages = Vec::new();
    for (key, value) in document {
        if key == JSON_HEADER_KEY {
            continue;
        }
        let counts: ClocCounts = serde_json::from_value(value).map_err(|e| {
            RepoStatsError::extraction_failed(format!("bad counts for '{key}': {e}"))
        })?;
        if key == JSON_SUM_KEY {
            total = Some(counts.into_stat(TOTAL_LANGUAGE));
        } else {
            languages.push(counts.into_stat(&key));
        }
    }

    languages.sort_by(|a, b| a.code.cmp(&b.code).then_with(|| b.language.cmp(&a.language)));

    let loc = match &total {
        Some(sum) => sum.code,
        None => languages.iter().map(|stat| stat.code).sum(),
    };
    let pls = total.into_iter().chain(languages).collect();

    Ok(Some(Metrics { loc, pls }))
}

fn has_total_marker(raw: &str, force: bool) -> bool {
    !raw.is_empty() && (force || raw.contains(SUM_MARKER))
}

/// Total LOC from the text report: the last token of the line before the
/// closing separator.
pub fn parse_loc(raw: &str, force: bool) -> Result<u64> {
    if !has_total_marker(raw, force) {
        return Ok(0);
    }

    let lines: Vec<&str> = raw.split('\n').collect();
    let line = lines
        .len()
        .checked_sub(3)
        .map(|index| lines[index])
        .ok_or_else(|| RepoStatsError::extraction_failed("output too short"))?;

    let token = line
        .split_whitespace()
        .last()
        .ok_or_else(|| RepoStatsError::extraction_failed("empty total line"))?;

    token
        .parse()
        .map_err(|_| RepoStatsError::extraction_failed(format!("'{token}' is not a count")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Blank,
    Separator,
    Header,
    Row,
}

fn classify(line: &str) -> LineKind {
    if line.is_empty() {
        LineKind::Blank
    } else if line.starts_with(SEPARATOR_PREFIX) {
        LineKind::Separator
    } else if line.starts_with(HEADER_PREFIX) {
        LineKind::Header
    } else {
        LineKind::Row
    }
}

/// Per-language summary from the text report, scanned bottom-up until the
/// header. The `SUM:` row becomes `Total`.
pub fn parse_pls(raw: &str, force: bool) -> Result<Vec<LanguageStat>> {
    let mut stats = Vec::new();
    if !has_total_marker(raw, force) {
        return Ok(stats);
    }

    for line in raw.split('\n').rev() {
        match classify(line) {
            LineKind::Blank | LineKind::Separator => continue,
            LineKind::Header => break,
            LineKind::Row => stats.push(parse_row(line)?),
        }
    }

    Ok(stats)
}

fn parse_row(line: &str) -> Result<LanguageStat> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 5 {
        return Err(RepoStatsError::extraction_failed(format!(
            "unexpected row '{line}'"
        )));
    }

    let (label, counts) = tokens.split_at(tokens.len() - 4);
    let mut parsed = [0u64; 4];
    for (slot, token) in parsed.iter_mut().zip(counts) {
        *slot = token.parse().map_err(|_| {
            RepoStatsError::extraction_failed(format!("'{token}' is not a count in '{line}'"))
        })?;
    }

    let language = label.join(" ");
    let language = if language == SUM_MARKER {
        TOTAL_LANGUAGE.to_string()
    } else {
        language
    };

    Ok(LanguageStat {
        language,
        files: parsed[0],
        blank: parsed[1],
        comment: parsed[2],
        code: parsed[3],
    })
}
