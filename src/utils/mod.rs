pub mod config;
pub mod format;
pub mod fragment;
pub mod git_ops;
pub mod ordering;
pub mod text;
pub mod version;
