pub mod error;
pub mod utils;

pub use error::*;
pub use utils::config::{CONFIG_FILE_NAME, EntryFormat, FragmentsConfig};
pub use utils::format::{FormatTools, MdTools, RstTools, Sections, get_format_tools};
pub use utils::fragment::{
    CollectOptions, CollectReport, collect_entries, combine_fragments, create_entry,
    fragment_files, new_entry_contents, new_entry_path, order_sections,
};
pub use utils::git_ops::GitOps;
pub use utils::ordering::order_map;
pub use utils::text::partition_lines;
pub use utils::version::{VERSION_PATTERN, Version};
