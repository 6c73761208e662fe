// collecting entries into the changelog

use crate::error::{Error, Result};
use crate::utils::config::FragmentsConfig;
use crate::utils::format::{FormatTools, Sections, get_format_tools};
use crate::utils::ordering::order_map;
use crate::utils::text::partition_lines;
use crate::utils::version::Version;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// knobs for a single collect run
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    /// text holding the version being released, overrides the config
    pub version: Option<String>,
    /// leave the fragment files in place
    pub keep: bool,
    /// release date, today when unset
    pub date: Option<NaiveDate>,
}

/// what a collect run did
#[derive(Debug, Clone, Serialize)]
pub struct CollectReport {
    pub output_file: PathBuf,
    pub title: String,
    pub version: Option<Version>,
    pub prerelease: bool,
    pub fragments: Vec<PathBuf>,
    pub removed: bool,
}

/// fragment files in the entry directory, oldest first
///
/// entry names start with a timestamp, so name order is creation order
pub fn fragment_files(config: &FragmentsConfig, root: &Path) -> Result<Vec<PathBuf>> {
    let directory = root.join(&config.entry_directory);
    let entries = match fs::read_dir(&directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(Error::FileReadError {
                path: directory,
                source: e,
            });
        }
    };

    let extension = config.format.extension();
    let mut files = Vec::new();

    for entry in entries {
        let path = entry.map_err(Error::IoError)?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let is_readme = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.eq_ignore_ascii_case("readme"));
        if is_readme {
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

/// parse every fragment and merge the sections, in file order
pub fn combine_fragments(tools: &dyn FormatTools, files: &[PathBuf]) -> Result<Sections> {
    let mut combined = Sections::new();

    for path in files {
        let text = fs::read_to_string(path).map_err(|e| Error::FileReadError {
            path: path.clone(),
            source: e,
        })?;
        for (category, items) in tools.parse_text(&text) {
            combined.entry(category).or_default().extend(items);
        }
    }

    Ok(combined)
}

/// sections in configured category order, uncategorized text first
pub fn order_sections(config: &FragmentsConfig, sections: &Sections) -> Sections {
    let priority: Vec<Option<String>> = std::iter::once(None)
        .chain(config.categories.iter().cloned().map(Some))
        .collect();
    order_map(sections, &priority)
}

fn resolve_version(config: &FragmentsConfig, options: &CollectOptions) -> Result<Option<Version>> {
    let text = options
        .version
        .as_deref()
        .or(config.version.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty());

    match text {
        Some(text) => Version::find_in(text)
            .map(Some)
            .ok_or_else(|| Error::VersionNotFound {
                text: text.to_string(),
            }),
        None => Ok(None),
    }
}

/// check the changelog headings for the version being collected
fn check_version_is_new(
    tools: &dyn FormatTools,
    changelog: &str,
    version: &Version,
    output_file: &Path,
) -> Result<()> {
    let exists = tools
        .find_headers(changelog)
        .iter()
        .filter_map(|header| Version::find_in(header))
        .any(|existing| existing == *version);

    if exists {
        return Err(Error::VersionExists {
            version: version.to_string(),
            path: output_file.to_path_buf(),
        });
    }
    Ok(())
}

/// insert `new_text` after the marker line, or at the top without a marker
fn insert_section(changelog: &str, marker: &str, new_text: &str) -> String {
    let (before, marker_line, after) = partition_lines(changelog, marker);
    if marker_line.is_empty() {
        return format!("{}{}", new_text, changelog);
    }

    let mut updated = String::with_capacity(changelog.len() + new_text.len() + 1);
    updated.push_str(before);
    updated.push_str(marker_line);
    if !marker_line.ends_with('\n') {
        updated.push('\n');
    }
    updated.push('\n');
    updated.push_str(new_text);
    updated.push_str(after);
    updated
}

/// collect all fragments into the changelog under a new heading
pub fn collect_entries(
    config: &FragmentsConfig,
    root: &Path,
    options: &CollectOptions,
) -> Result<CollectReport> {
    let tools = get_format_tools(config);
    let version = resolve_version(config, options)?;

    let fragments = fragment_files(config, root)?;
    if fragments.is_empty() {
        return Err(Error::NothingToCollect {
            directory: root.join(&config.entry_directory),
        });
    }
    tracing::info!(count = fragments.len(), "collecting fragments");

    let sections = order_sections(config, &combine_fragments(tools.as_ref(), &fragments)?);

    let output_file = root.join(config.output_file());
    let changelog = match fs::read_to_string(&output_file) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(Error::FileReadError {
                path: output_file,
                source: e,
            });
        }
    };

    if let Some(version) = &version {
        check_version_is_new(tools.as_ref(), &changelog, version, &output_file)?;
    }

    let date = options
        .date
        .unwrap_or_else(|| Local::now().date_naive())
        .format("%Y-%m-%d");
    let title = match &version {
        Some(version) => format!("{} - {}", version, date),
        None => date.to_string(),
    };

    let new_text = format!(
        "{}\n{}",
        tools.format_header(&title),
        tools.format_sections(&sections)
    );
    let updated = insert_section(&changelog, &config.insert_marker, &new_text);

    tracing::info!(path = %output_file.display(), %title, "writing changelog");
    fs::write(&output_file, updated).map_err(|e| Error::FileWriteError {
        path: output_file.clone(),
        source: e,
    })?;

    if !options.keep {
        for path in &fragments {
            tracing::debug!(path = %path.display(), "deleting fragment");
            fs::remove_file(path).map_err(|e| Error::FileWriteError {
                path: path.clone(),
                source: e,
            })?;
        }
    }

    // only versions that came out of the grammar can be checked
    let prerelease = version.as_ref().is_some_and(Version::is_prerelease);

    Ok(CollectReport {
        output_file,
        title,
        version,
        prerelease,
        fragments,
        removed: !options.keep,
    })
}
