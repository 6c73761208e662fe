use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// name of the configuration file looked up in the repository
pub const CONFIG_FILE_NAME: &str = "fragments.toml";

/// markup language used for entries and the changelog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryFormat {
    #[default]
    Md,
    Rst,
}

impl EntryFormat {
    /// file extension for entries in this format
    pub fn extension(&self) -> &'static str {
        match self {
            EntryFormat::Md => "md",
            EntryFormat::Rst => "rst",
        }
    }
}

impl fmt::Display for EntryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for EntryFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md" | "markdown" => Ok(EntryFormat::Md),
            "rst" => Ok(EntryFormat::Rst),
            _ => Err(format!("invalid entry format: {}, use 'md' or 'rst'", s)),
        }
    }
}

/// main configuration for fragments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentsConfig {
    /// directory holding the changelog fragments (default: "changelog.d")
    pub entry_directory: PathBuf,

    /// markup format of fragments and changelog
    pub format: EntryFormat,

    /// categories offered in new entries, in changelog order
    pub categories: Vec<String>,

    /// branches that don't contribute their name to entry file names
    pub main_branches: Vec<String>,

    /// changelog file, defaults to `CHANGELOG.<format>`
    pub output_file: Option<PathBuf>,

    /// text marking where collected entries are inserted
    pub insert_marker: String,

    /// heading level of version sections in markdown
    pub md_header_level: usize,

    /// underline characters for rst version and category headings
    pub rst_header_chars: String,

    /// text to find the version number in when none is given to collect
    pub version: Option<String>,
}

impl Default for FragmentsConfig {
    fn default() -> Self {
        Self {
            entry_directory: PathBuf::from("changelog.d"),
            format: EntryFormat::Md,
            categories: vec![
                "Removed".to_string(),
                "Added".to_string(),
                "Changed".to_string(),
                "Deprecated".to_string(),
                "Fixed".to_string(),
                "Security".to_string(),
            ],
            main_branches: vec![
                "master".to_string(),
                "main".to_string(),
                "develop".to_string(),
            ],
            output_file: None,
            insert_marker: "fragments-insert-here".to_string(),
            md_header_level: 1,
            rst_header_chars: "=-".to_string(),
            version: None,
        }
    }
}

impl FragmentsConfig {
    /// create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.entry_directory = directory.into();
        self
    }

    pub fn format(mut self, format: EntryFormat) -> Self {
        self.format = format;
        self
    }

    pub fn categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn main_branches(mut self, branches: Vec<String>) -> Self {
        self.main_branches = branches;
        self
    }

    pub fn output_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    pub fn insert_marker(mut self, marker: impl Into<String>) -> Self {
        self.insert_marker = marker.into();
        self
    }

    pub fn version_text(mut self, text: impl Into<String>) -> Self {
        self.version = Some(text.into());
        self
    }

    /// the changelog file, relative to the repository root
    pub fn output_file(&self) -> PathBuf {
        match &self.output_file {
            Some(path) => path.clone(),
            None => PathBuf::from(format!("CHANGELOG.{}", self.format.extension())),
        }
    }

    /// check if a branch is one of the main branches
    pub fn is_main_branch(&self, branch: &str) -> bool {
        self.main_branches.iter().any(|b| b == branch)
    }

    /// underline character for rst headings at `level` (0 = version)
    pub fn rst_header_char(&self, level: usize) -> char {
        self.rst_header_chars
            .chars()
            .nth(level)
            .or_else(|| self.rst_header_chars.chars().last())
            .unwrap_or('-')
    }

    /// load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| Error::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: FragmentsConfig =
            toml::from_str(&contents).map_err(|e| Error::TomlParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(config)
    }

    /// find and load configuration file in repository
    ///
    /// returns default config if file is not found
    pub fn load_or_default<P: AsRef<Path>>(repo_path: P) -> Result<Self> {
        match Self::find_config_file(&repo_path) {
            Some(config_path) => {
                tracing::debug!(path = %config_path.display(), "loading configuration");
                Self::load_from_file(&config_path)
            }
            None => Ok(Self::default()),
        }
    }

    /// find configuration file in repository
    ///
    /// looks for `fragments.toml` in the repository root, then in the
    /// default entry directory
    pub fn find_config_file<P: AsRef<Path>>(repo_path: P) -> Option<PathBuf> {
        let repo_path = repo_path.as_ref();
        let default_dir = Self::default().entry_directory;

        [
            repo_path.join(CONFIG_FILE_NAME),
            repo_path.join(default_dir).join(CONFIG_FILE_NAME),
        ]
        .into_iter()
        .find(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = FragmentsConfig::default();
        assert_eq!(config.entry_directory, PathBuf::from("changelog.d"));
        assert_eq!(config.format, EntryFormat::Md);
        assert_eq!(config.categories.len(), 6);
        assert_eq!(config.output_file(), PathBuf::from("CHANGELOG.md"));
        assert!(config.is_main_branch("main"));
        assert!(!config.is_main_branch("feature/x"));
    }

    #[test]
    fn test_output_file_follows_format() {
        let config = FragmentsConfig::new().format(EntryFormat::Rst);
        assert_eq!(config.output_file(), PathBuf::from("CHANGELOG.rst"));

        let config = config.output_file_name("docs/changes.rst");
        assert_eq!(config.output_file(), PathBuf::from("docs/changes.rst"));
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: FragmentsConfig = toml::from_str(
            r#"
            format = "rst"
            categories = ["Fixed", "Added"]
            "#,
        )
        .unwrap();

        assert_eq!(config.format, EntryFormat::Rst);
        assert_eq!(config.categories, vec!["Fixed", "Added"]);
        assert_eq!(config.entry_directory, PathBuf::from("changelog.d"));
        assert_eq!(config.insert_marker, "fragments-insert-here");
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result: std::result::Result<FragmentsConfig, _> = toml::from_str("format = \"txt\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_rst_header_chars() {
        let config = FragmentsConfig::default();
        assert_eq!(config.rst_header_char(0), '=');
        assert_eq!(config.rst_header_char(1), '-');
        assert_eq!(config.rst_header_char(5), '-');
    }

    #[test]
    fn test_find_config_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(FragmentsConfig::find_config_file(temp_dir.path()).is_none());

        let nested = temp_dir.path().join("changelog.d");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join(CONFIG_FILE_NAME), "format = \"rst\"\n").unwrap();
        assert_eq!(
            FragmentsConfig::find_config_file(temp_dir.path()),
            Some(nested.join(CONFIG_FILE_NAME))
        );

        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "format = \"md\"\n").unwrap();
        assert_eq!(
            FragmentsConfig::find_config_file(temp_dir.path()),
            Some(temp_dir.path().join(CONFIG_FILE_NAME))
        );
    }

    #[test]
    fn test_load_errors() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        assert!(matches!(
            FragmentsConfig::load_from_file(&missing),
            Err(Error::FileReadError { .. })
        ));

        let broken = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&broken, "categories = 3\n").unwrap();
        assert!(matches!(
            FragmentsConfig::load_or_default(temp_dir.path()),
            Err(Error::TomlParseError { .. })
        ));
    }
}
