use crate::error::{Error, Result};
use gix::bstr::ByteSlice;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

/// fallback nickname when git and the environment don't provide one
pub const DEFAULT_NICK: &str = "somebody";

pub struct GitOps;

impl GitOps {
    pub fn new() -> Self {
        Self
    }

    /// detect root of the repository (path as a result)
    pub fn detect_repository_root<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
        let path = path.as_ref();

        // if it's a file, use its parent directory for discovery
        let check_path = if path.is_file() {
            match path.parent() {
                Some(parent) => parent,
                None => {
                    return Err(Error::RepositoryNotFound {
                        path: path.to_path_buf(),
                    });
                }
            }
        } else {
            path
        };

        let repo = gix::discover(check_path)?;

        let root_path = if let Some(work_dir) = repo.work_dir() {
            work_dir.to_path_buf()
        } else {
            repo.git_dir().to_path_buf()
        };

        Ok(root_path)
    }

    /// get the current branch name, `None` when HEAD is detached
    ///
    /// an unborn branch (fresh repository) still has a name
    pub fn current_branch_name<P: AsRef<Path>>(repo_path: P) -> Result<Option<String>> {
        let repo = gix::discover(repo_path.as_ref())?;

        let head_name = repo.head_name().map_err(Error::from_git_error)?;

        Ok(head_name.map(|name| name.shorten().to_str_lossy().into_owned()))
    }

    /// read a string value from the git configuration
    pub fn config_string<P: AsRef<Path>>(repo_path: P, key: &str) -> Result<Option<String>> {
        let repo = gix::discover(repo_path.as_ref())?;
        let config = repo.config_snapshot();

        Ok(config
            .string(key)
            .map(|value| value.to_str_lossy().trim().to_string())
            .filter(|value| !value.is_empty()))
    }

    /// read a boolean flag from the git configuration, unset means false
    pub fn config_bool<P: AsRef<Path>>(repo_path: P, key: &str) -> Result<bool> {
        let repo = gix::discover(repo_path.as_ref())?;
        let config = repo.config_snapshot();

        Ok(config.boolean(key).unwrap_or(false))
    }

    /// a short name for the current user, used in entry file names
    ///
    /// tries `github.user`, then the local part of `user.email`, then the
    /// login name from the environment
    pub fn user_nick<P: AsRef<Path>>(repo_path: P) -> String {
        let repo_path = repo_path.as_ref();

        let from_git = |key: &str| match Self::config_string(repo_path, key) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(key, error = %e, "could not read git config");
                None
            }
        };

        from_git("github.user")
            .or_else(|| {
                from_git("user.email")
                    .map(|email| email.split('@').next().unwrap_or_default().to_string())
                    .filter(|nick| !nick.is_empty())
            })
            .or_else(|| std::env::var("USER").ok().filter(|nick| !nick.is_empty()))
            .or_else(|| std::env::var("USERNAME").ok().filter(|nick| !nick.is_empty()))
            .unwrap_or_else(|| DEFAULT_NICK.to_string())
    }

    /// stage files with `git add`
    pub fn add<P, I, S>(repo_path: P, paths: I) -> Result<()>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Self::run_git(repo_path.as_ref(), &["add", "--"], paths)
    }

    /// stage the removal of files that are already gone from the work tree
    pub fn stage_removal<P, I, S>(repo_path: P, paths: I) -> Result<()>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Self::run_git(
            repo_path.as_ref(),
            &["rm", "--quiet", "--cached", "--ignore-unmatch", "--"],
            paths,
        )
    }

    /// open a file in the user's editor and wait for it to close
    pub fn edit<P: AsRef<Path>, F: AsRef<Path>>(repo_path: P, file: F) -> Result<()> {
        let repo_path = repo_path.as_ref();

        let output = Command::new("git")
            .arg("-C")
            .arg(repo_path)
            .args(["var", "GIT_EDITOR"])
            .output()
            .map_err(Error::IoError)?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: "git var GIT_EDITOR".to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let editor = String::from_utf8_lossy(&output.stdout).trim().to_string();
        tracing::debug!(editor, file = %file.as_ref().display(), "launching editor");

        // the editor setting may carry its own arguments, let the shell split them
        let status = Command::new("sh")
            .current_dir(repo_path)
            .arg("-c")
            .arg(format!("{} \"$@\"", editor))
            .arg(&editor)
            .arg(file.as_ref())
            .status()
            .map_err(Error::IoError)?;

        if !status.success() {
            return Err(Error::CommandFailed {
                command: editor,
                stderr: format!("editor exited with {}", status),
            });
        }

        Ok(())
    }

    fn run_git<I, S>(repo_path: &Path, args: &[&str], paths: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = Command::new("git")
            .arg("-C")
            .arg(repo_path)
            .args(args)
            .args(paths)
            .output()
            .map_err(Error::IoError)?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: format!("git {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(())
    }
}

impl Default for GitOps {
    fn default() -> Self {
        Self::new()
    }
}
