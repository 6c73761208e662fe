// creating entries

use crate::error::{Error, Result};
use crate::utils::config::FragmentsConfig;
use crate::utils::format::get_format_tools;
use chrono::NaiveDateTime;
use regex::Regex;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static NON_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_]").expect("valid branch name regex"));

/// the path of a new entry, relative to the repository root
///
/// the file name is the timestamp and the user's nick, plus the last
/// segment of the branch name when working off a main branch
pub fn new_entry_path(
    config: &FragmentsConfig,
    now: NaiveDateTime,
    nick: &str,
    branch: Option<&str>,
) -> PathBuf {
    let mut file_name = format!("{}_{}", now.format("%Y%m%d_%H%M"), nick);

    if let Some(branch) = branch.filter(|b| !b.is_empty() && !config.is_main_branch(b)) {
        let last_segment = branch.rsplit('/').next().unwrap_or(branch);
        let suffix = NON_NAME_CHARS.replace_all(last_segment, "_");
        tracing::debug!(branch, %suffix, "adding branch name to entry");
        file_name.push('_');
        file_name.push_str(&suffix);
    }

    file_name.push('.');
    file_name.push_str(config.format.extension());

    config.entry_directory.join(file_name)
}

/// the initial contents of a new entry
pub fn new_entry_contents(config: &FragmentsConfig) -> String {
    get_format_tools(config).new_template()
}

/// write a new entry below `root`, returning its full path
///
/// an existing entry is never overwritten
pub fn create_entry(
    config: &FragmentsConfig,
    root: &Path,
    nick: &str,
    branch: Option<&str>,
    now: NaiveDateTime,
) -> Result<PathBuf> {
    let directory = root.join(&config.entry_directory);
    fs::create_dir_all(&directory).map_err(|e| Error::FileWriteError {
        path: directory.clone(),
        source: e,
    })?;

    let path = root.join(new_entry_path(config, now, nick, branch));
    tracing::info!(path = %path.display(), "creating entry");

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => Error::EntryExists { path: path.clone() },
            _ => Error::FileWriteError {
                path: path.clone(),
                source: e,
            },
        })?;

    file.write_all(new_entry_contents(config).as_bytes())
        .map_err(|e| Error::FileWriteError {
            path: path.clone(),
            source: e,
        })?;

    Ok(path)
}
