//! Unified diff parser
//!
//! Recognizes `--- `/`+++ ` header pairs followed by `@@` hunks. Anything
//! between file sections (`diff ...` command lines, `Only in ...`,
//! `Binary files ... differ`) is ignored.

use super::{ChangeKind, Hunk, HunkLine, PatchEntry};
use crate::error::{Result, tools};
use crate::member::MemberKind;

const NO_NEWLINE_MARKER: u8 = b'\\';
const DEV_NULL: &str = "/dev/null";

/// One side of a file header
struct HeaderPath {
    name: String,
    absent: bool,
}

pub(super) fn parse_entries(text: &[u8]) -> Result<Vec<PatchEntry>> {
    let lines: Vec<&[u8]> = text.split_inclusive(|&b| b == b'\n').collect();
    let mut entries: Vec<PatchEntry> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let is_header = lines[i].starts_with(b"--- ")
            && lines.get(i + 1).is_some_and(|next| next.starts_with(b"+++ "));
        if !is_header {
            i += 1;
            continue;
        }

        let from = parse_header(&lines[i][4..]);
        let to = parse_header(&lines[i + 1][4..]);
        i += 2;

        let mut hunks = Vec::new();
        while i < lines.len() && lines[i].starts_with(b"@@ ") {
            let (hunk, next) = parse_hunk(&lines, i)?;
            hunks.push(hunk);
            i = next;
        }

        let header_name = if from.name == DEV_NULL { &to.name } else { &from.name };
        let path = strip_first_component(header_name);
        validate_path(&path, i)?;

        let change = change_kind(&from, &to, &hunks);
        let kind = MemberKind::classify_bundle_path(&path);

        match entries.iter_mut().find(|e| e.path == path) {
            Some(existing) => existing.hunks.extend(hunks),
            None => entries.push(PatchEntry {
                path,
                kind,
                change,
                hunks,
            }),
        }
    }

    Ok(entries)
}

fn parse_header(rest: &[u8]) -> HeaderPath {
    let line = String::from_utf8_lossy(rest);
    let line = line.trim_end_matches(['\n', '\r']);
    let (name, timestamp) = match line.split_once('\t') {
        Some((name, timestamp)) => (name, Some(timestamp)),
        None => (line, None),
    };
    let name = name.trim_end().to_string();
    let absent = name == DEV_NULL || timestamp.is_some_and(is_epoch_timestamp);
    HeaderPath { name, absent }
}

/// `diff -N` stamps the side of a file that does not exist with the epoch
/// (printed in local time, so west of UTC it falls on the previous day)
fn is_epoch_timestamp(timestamp: &str) -> bool {
    timestamp.starts_with("1970-01-01") || timestamp.starts_with("1969-12-31")
}

fn strip_first_component(name: &str) -> String {
    match name.split_once('/') {
        Some((_, rest)) if !rest.is_empty() => rest.to_string(),
        _ => name.to_string(),
    }
}

fn validate_path(path: &str, line: usize) -> Result<()> {
    let escapes = path.starts_with('/') || path.split('/').any(|component| component == "..");
    if path.is_empty() || escapes {
        return Err(tools::patch_failed(format!(
            "unsafe member path '{path}' before line {line}"
        )));
    }
    Ok(())
}

fn change_kind(from: &HeaderPath, to: &HeaderPath, hunks: &[Hunk]) -> ChangeKind {
    if from.absent {
        return ChangeKind::Added;
    }
    if to.absent {
        return ChangeKind::Removed;
    }
    match hunks {
        [only] if only.old_start == 0 && only.old_len == 0 => ChangeKind::Added,
        [only] if only.new_start == 0 && only.new_len == 0 => ChangeKind::Removed,
        _ => ChangeKind::Modified,
    }
}

/// Parse the hunk starting at `lines[start]`, returning it and the index after it
fn parse_hunk(lines: &[&[u8]], start: usize) -> Result<(Hunk, usize)> {
    let malformed =
        |why: &str| tools::patch_failed(format!("malformed hunk at line {}: {why}", start + 1));

    let header = String::from_utf8_lossy(lines[start]);
    let (old_start, old_len, new_start, new_len) =
        parse_hunk_header(&header).ok_or_else(|| malformed("bad @@ header"))?;

    let mut old_remaining = old_len;
    let mut new_remaining = new_len;
    let mut hunk_lines = Vec::new();
    let mut i = start + 1;

    while old_remaining > 0 || new_remaining > 0 {
        let Some(line) = lines.get(i) else {
            return Err(malformed("unexpected end of bundle"));
        };
        let (tag, body) = match line.split_first() {
            // A blank line is an empty context line whose leading space was lost
            Some((b'\n', _)) => (b' ', b"\n".to_vec()),
            Some((tag, body)) => (*tag, body.to_vec()),
            None => return Err(malformed("empty line")),
        };

        match tag {
            b' ' if old_remaining > 0 && new_remaining > 0 => {
                old_remaining -= 1;
                new_remaining -= 1;
                hunk_lines.push(HunkLine::Context(body));
            }
            b'-' if old_remaining > 0 => {
                old_remaining -= 1;
                hunk_lines.push(HunkLine::Delete(body));
            }
            b'+' if new_remaining > 0 => {
                new_remaining -= 1;
                hunk_lines.push(HunkLine::Insert(body));
            }
            NO_NEWLINE_MARKER => strip_last_newline(&mut hunk_lines),
            _ => return Err(malformed("line count does not match header")),
        }
        i += 1;
    }

    if lines.get(i).is_some_and(|line| line.first() == Some(&NO_NEWLINE_MARKER)) {
        strip_last_newline(&mut hunk_lines);
        i += 1;
    }

    Ok((
        Hunk {
            old_start,
            old_len,
            new_start,
            new_len,
            lines: hunk_lines,
        },
        i,
    ))
}

fn strip_last_newline(lines: &mut [HunkLine]) {
    if let Some(HunkLine::Context(l) | HunkLine::Delete(l) | HunkLine::Insert(l)) = lines.last_mut()
    {
        if l.last() == Some(&b'\n') {
            l.pop();
        }
    }
}

/// Parse `@@ -a[,b] +c[,d] @@`; omitted lengths default to 1
fn parse_hunk_header(header: &str) -> Option<(usize, usize, usize, usize)> {
    let rest = header.strip_prefix("@@ -")?;
    let (ranges, _) = rest.split_once(" @@")?;
    let (old, new) = ranges.split_once(" +")?;
    let (old_start, old_len) = parse_range(old)?;
    let (new_start, new_len) = parse_range(new)?;
    Some((old_start, old_len, new_start, new_len))
}

fn parse_range(range: &str) -> Option<(usize, usize)> {
    match range.split_once(',') {
        Some((start, len)) => Some((start.parse().ok()?, len.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}
