//! Staged diff collection and normalization.

use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::debug;

use super::GitRepo;
use crate::error::DiffError;

/// Line substituted for `Binary files ... differ`.
pub const BINARY_PLACEHOLDER: &str = "[Binary file diff omitted]";

/// Appended on its own line when the diff is cut to the maximum length.
pub const TRUNCATION_MARKER: &str = "...diff truncated...";

static BINARY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Binary files .* differ$").expect("Invalid regex"));

static INDEX_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^index [0-9a-fA-F]+\.\.[0-9a-fA-F]+").expect("Invalid regex"));

/// One `:(exclude)` pathspec per ignored path, in configuration order.
pub fn exclusion_pathspecs(ignore_files: &[String]) -> Vec<String> {
    ignore_files
        .iter()
        .map(|file| format!(":(exclude){file}"))
        .collect()
}

/// Arguments for the staged diff: index only, added/copied/modified/renamed
/// files, no color, exclusions appended after the pathspec separator.
pub fn staged_diff_args(ignore_files: &[String]) -> Vec<String> {
    let mut args: Vec<String> = ["diff", "--cached", "--diff-filter=ACMR", "--no-color", "--", "."]
        .into_iter()
        .map(String::from)
        .collect();
    args.extend(exclusion_pathspecs(ignore_files));
    args
}

/// Run the staged diff and normalize it.
///
/// A diff that writes nothing at all means nothing is staged and is an error.
/// Output that normalizes to an empty string is returned as `Ok("")`.
pub(crate) fn read_staged_diff(repo: &GitRepo, max_length: usize) -> Result<String, DiffError> {
    let args = staged_diff_args(repo.ignore_files());
    let output = repo.run_git(args.as_slice()).map_err(DiffError::SpawnFailed)?;

    if !output.status.success() {
        return Err(DiffError::GitFailed {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    if output.stdout.is_empty() {
        return Err(DiffError::NoStagedChanges);
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let normalized = normalize_diff(&raw, max_length);
    debug!(
        raw_len = raw.len(),
        normalized_len = normalized.len(),
        "Normalized staged diff"
    );
    Ok(normalized)
}

/// Normalize raw diff text for the prompt.
///
/// Binary-file lines become [`BINARY_PLACEHOLDER`], `index <hash>..<hash>`
/// lines are dropped, surrounding whitespace is trimmed, and anything past
/// `max_length` characters is cut and followed by [`TRUNCATION_MARKER`].
/// Applying it to its own output changes nothing.
pub fn normalize_diff(diff: &str, max_length: usize) -> String {
    truncate_diff(&clean_diff(diff), max_length)
}

/// Rewrite and trim until stable, so no metadata line is left for trimming
/// to uncover.
fn clean_diff(diff: &str) -> String {
    let mut current = diff.trim().to_string();
    loop {
        let rewritten = rewrite_lines(&current);
        let next = rewritten.trim();
        if next == current {
            return current;
        }
        current = next.to_string();
    }
}

fn rewrite_lines(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());

    for line in text.split_inclusive('\n') {
        let (content, ending) = split_line_ending(line);

        if INDEX_LINE.is_match(content) {
            continue;
        }

        if BINARY_LINE.is_match(content) {
            cleaned.push_str(BINARY_PLACEHOLDER);
            cleaned.push_str(ending);
        } else {
            cleaned.push_str(line);
        }
    }

    cleaned
}

fn split_line_ending(line: &str) -> (&str, &str) {
    let content = line
        .strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line);
    (content, &line[content.len()..])
}

fn is_metadata_line(content: &str) -> bool {
    INDEX_LINE.is_match(content) || BINARY_LINE.is_match(content)
}

/// Cut `text` to `max_length` characters and append the marker.
///
/// Text already ending in the marker is measured without it, so the marker
/// is never added twice. A cut that leaves a partial last line looking like
/// metadata drops that line; the kept part never ends in whitespace.
fn truncate_diff(text: &str, max_length: usize) -> String {
    let body = text
        .strip_suffix(TRUNCATION_MARKER)
        .map(|t| t.strip_suffix('\n').unwrap_or(t))
        .unwrap_or(text);

    let Some((cut, _)) = body.char_indices().nth(max_length) else {
        return text.to_string();
    };

    let mut kept = body[..cut].trim_end();
    loop {
        let last_line_start = kept.rfind('\n').map_or(0, |i| i + 1);
        if !is_metadata_line(&kept[last_line_start..]) {
            break;
        }
        kept = kept[..last_line_start].trim_end();
    }

    if kept.is_empty() {
        TRUNCATION_MARKER.to_string()
    } else {
        format!("{kept}\n{TRUNCATION_MARKER}")
    }
}
