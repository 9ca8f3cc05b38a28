use crate::domain::value_objects::SubtreePrefix;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use walkdir::WalkDir;

/// Files larger than this are not scanned for markers
const MAX_SCANNED_FILE_SIZE: u64 = 4 * 1024 * 1024;

fn start_marker() -> &'static Regex {
    static START: OnceLock<Regex> = OnceLock::new();
    START.get_or_init(|| Regex::new(r"(?m)^<{7}(?:\s|$)").expect("valid conflict start pattern"))
}

fn end_marker() -> &'static Regex {
    static END: OnceLock<Regex> = OnceLock::new();
    END.get_or_init(|| Regex::new(r"(?m)^>{7}(?:\s|$)").expect("valid conflict end pattern"))
}

/// Whether `content` holds at least one complete conflict block
pub fn has_conflict_markers(content: &str) -> bool {
    start_marker().is_match(content) && end_marker().is_match(content)
}

/// Repository-relative paths of text files under `prefix` that still
/// contain conflict markers
pub fn scan_prefix(workdir: &Path, prefix: &SubtreePrefix) -> std::io::Result<Vec<String>> {
    let root = workdir.join(prefix.to_path());
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    let entries = WalkDir::new(&root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git");

    for entry in entries {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.metadata().map(|m| m.len()).unwrap_or(u64::MAX) > MAX_SCANNED_FILE_SIZE {
            continue;
        }

        let Ok(content) = fs::read_to_string(entry.path()) else {
            // binary or unreadable
            continue;
        };
        if has_conflict_markers(&content) {
            if let Some(relative) = pathdiff::diff_paths(entry.path(), workdir) {
                found.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }

    found.sort();
    Ok(found)
}
