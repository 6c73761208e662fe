// changelog fragments: creating and collecting entries

pub mod collect;
pub mod create;

pub use collect::{
    CollectOptions, CollectReport, collect_entries, combine_fragments, fragment_files,
    order_sections,
};
pub use create::{create_entry, new_entry_contents, new_entry_path};
