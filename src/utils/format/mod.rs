// markup knowledge for entries and changelogs

pub mod markdown;
pub mod rst;

pub use markdown::MdTools;
pub use rst::RstTools;

use crate::utils::config::{EntryFormat, FragmentsConfig};
use indexmap::IndexMap;

/// items of a changelog, grouped by category
///
/// the `None` key holds text that isn't under any category heading
pub type Sections = IndexMap<Option<String>, Vec<String>>;

/// format-specific operations on entries and changelogs
pub trait FormatTools {
    /// initial contents of a new entry
    fn new_template(&self) -> String;

    /// parse entry text into sections
    fn parse_text(&self, text: &str) -> Sections;

    /// titles of all headings in a changelog
    fn find_headers(&self, text: &str) -> Vec<String>;

    /// heading for a collected version
    fn format_header(&self, title: &str) -> String;

    /// render sections under a version heading
    fn format_sections(&self, sections: &Sections) -> String;
}

/// pick the tools for the configured format
pub fn get_format_tools(config: &FragmentsConfig) -> Box<dyn FormatTools + '_> {
    match config.format {
        EntryFormat::Md => Box::new(MdTools::new(config)),
        EntryFormat::Rst => Box::new(RstTools::new(config)),
    }
}

fn is_bullet(line: &str) -> bool {
    ["- ", "* ", "+ "].iter().any(|b| line.starts_with(b)) || ["-", "*", "+"].contains(&line)
}

/// split body lines into items: top-level bullets with their continuation
/// lines, or paragraphs separated by blank lines
pub(crate) fn split_items(lines: &[&str]) -> Vec<String> {
    let mut items = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    let mut flush = |current: &mut Vec<&str>| {
        if !current.is_empty() {
            items.push(current.join("\n"));
            current.clear();
        }
    };

    for line in lines {
        let line = line.trim_end();
        if line.is_empty() {
            flush(&mut current);
            continue;
        }
        if is_bullet(line) {
            flush(&mut current);
        }
        current.push(line);
    }
    flush(&mut current);

    items
}

/// join items back into text, keeping bullet lists tight
pub(crate) fn join_items(items: &[String]) -> String {
    let mut text = String::new();
    let mut previous_bullet = false;

    for (index, item) in items.iter().enumerate() {
        let bullet = is_bullet(item.lines().next().unwrap_or_default());
        if index > 0 {
            text.push_str(if bullet && previous_bullet { "\n" } else { "\n\n" });
        }
        text.push_str(item);
        previous_bullet = bullet;
    }

    text
}

/// append the items in `lines` to the section for `category`
pub(crate) fn add_section(sections: &mut Sections, category: Option<String>, lines: &[&str]) {
    let items = split_items(lines);
    if items.is_empty() {
        return;
    }
    sections.entry(category).or_default().extend(items);
}
