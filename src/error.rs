use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    RepositoryNotFound {
        path: PathBuf,
    },
    FileReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    FileWriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    TomlParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    GitError(Box<dyn std::error::Error + Send + Sync>),
    GitDiscoverError(Box<gix::discover::Error>),
    IoError(std::io::Error),
    CommandFailed {
        command: String,
        stderr: String,
    },
    EntryExists {
        path: PathBuf,
    },
    VersionNotFound {
        text: String,
    },
    VersionExists {
        version: String,
        path: PathBuf,
    },
    NothingToCollect {
        directory: PathBuf,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::RepositoryNotFound { path } => {
                write!(f, "git repository not found in path: {}", path.display())
            }
            Error::FileReadError { path, source } => {
                write!(f, "failed to read file: {} ({})", path.display(), source)
            }
            Error::FileWriteError { path, source } => {
                write!(f, "failed to write file: {} ({})", path.display(), source)
            }
            Error::TomlParseError { path, source } => {
                write!(
                    f,
                    "failed to parse toml file: {} ({})",
                    path.display(),
                    source
                )
            }
            Error::GitError(err) => {
                write!(f, "git error: {}", err)
            }
            Error::GitDiscoverError(err) => {
                write!(f, "git discover error: {}", err)
            }
            Error::IoError(err) => {
                write!(f, "io error: {}", err)
            }
            Error::CommandFailed { command, stderr } => {
                write!(f, "command failed: {} ({})", command, stderr.trim())
            }
            Error::EntryExists { path } => {
                write!(f, "entry already exists: {}", path.display())
            }
            Error::VersionNotFound { text } => {
                write!(f, "no version number found in '{}'", text)
            }
            Error::VersionExists { version, path } => {
                write!(
                    f,
                    "entry for version {} already exists in {}",
                    version,
                    path.display()
                )
            }
            Error::NothingToCollect { directory } => {
                write!(
                    f,
                    "no changelog fragments to collect in {}",
                    directory.display()
                )
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FileReadError { source, .. } => Some(source),
            Error::FileWriteError { source, .. } => Some(source),
            Error::TomlParseError { source, .. } => Some(source),
            Error::GitError(err) => Some(err.as_ref()),
            Error::GitDiscoverError(err) => Some(err.as_ref()),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<gix::open::Error> for Error {
    fn from(err: gix::open::Error) -> Self {
        Error::GitError(Box::new(err))
    }
}

impl From<gix::discover::Error> for Error {
    fn from(err: gix::discover::Error) -> Self {
        Error::GitDiscoverError(Box::new(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

// helper function to convert various git errors
impl Error {
    pub fn from_git_error<T: std::error::Error + Send + Sync + 'static>(err: T) -> Self {
        Error::GitError(Box::new(err))
    }
}
