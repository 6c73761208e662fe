pub mod repository;

pub use repository::{DEFAULT_NICK, GitOps};
