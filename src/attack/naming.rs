//! Filesystem-safe storage keys for captions and seeds

use crate::io::configuration::{GENERATION_EXTENSION, MAX_FOLDER_NAME_LEN};
use std::path::{Path, PathBuf};

/// Map a caption to a folder name
///
/// Markup tags are removed, every character that is neither alphanumeric nor
/// `_` becomes `_`, runs of `_` collapse to one, and the result is cut to
/// `max_len` characters.
pub fn prompt_to_folder(prompt: &str, max_len: usize) -> String {
    let stripped = strip_tags(prompt);
    let mut folder = String::with_capacity(stripped.len());

    for ch in stripped.chars() {
        let ch = if ch.is_alphanumeric() || ch == '_' {
            ch
        } else {
            '_'
        };
        if ch == '_' && folder.ends_with('_') {
            continue;
        }
        folder.push(ch);
    }

    folder.chars().take(max_len).collect()
}

/// File name of the generation for `seed`, zero padded to four digits
pub fn seed_file_name(seed: u64) -> String {
    format!("{seed:04}.{GENERATION_EXTENSION}")
}

/// Location of one saved generation below `root`
pub fn generation_path(root: &Path, prompt: &str, seed: u64) -> PathBuf {
    root.join(prompt_to_folder(prompt, MAX_FOLDER_NAME_LEN))
        .join(seed_file_name(seed))
}

// Shortest `<...>` spans are removed; a tag never crosses a line break
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('<') {
        let (before, tail) = rest.split_at(start);
        out.push_str(before);
        let after_open = tail.get(1..).unwrap_or_default();

        match after_open.find(['>', '\n']) {
            Some(end) if after_open.get(end..).is_some_and(|t| t.starts_with('>')) => {
                rest = after_open.get(end + 1..).unwrap_or_default();
            }
            _ => {
                out.push('<');
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}
