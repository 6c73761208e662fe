// markdown knowledge

use super::{FormatTools, Sections, add_section, join_items};
use crate::utils::config::FragmentsConfig;
use regex::Regex;
use std::sync::LazyLock;

static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#+)\s+(.*?)\s*#*\s*$").expect("valid heading regex"));

/// specifics about how to work with markdown
pub struct MdTools<'a> {
    config: &'a FragmentsConfig,
}

impl<'a> MdTools<'a> {
    pub fn new(config: &'a FragmentsConfig) -> Self {
        Self { config }
    }

    fn heading(level: usize, title: &str) -> String {
        format!("{} {}", "#".repeat(level.max(1)), title)
    }
}

fn heading_title(line: &str) -> Option<&str> {
    HEADING
        .captures(line)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
        .filter(|title| !title.is_empty())
}

impl FormatTools for MdTools<'_> {
    fn new_template(&self) -> String {
        let mut text = String::from(
            "<!--\n\
             A new changelog entry.\n\
             \n\
             Uncomment the section that is right (remove the HTML comment wrapper).\n\
             -->\n\
             \n",
        );

        for category in &self.config.categories {
            text.push_str("<!--\n");
            text.push_str(&Self::heading(self.config.md_header_level + 2, category));
            text.push_str("\n\n");
            text.push_str(&format!("- A bullet item for the {} category.\n", category));
            text.push_str("\n-->\n");
        }

        text
    }

    fn parse_text(&self, text: &str) -> Sections {
        let text = HTML_COMMENT.replace_all(text, "");
        let mut sections = Sections::new();
        let mut category: Option<String> = None;
        let mut lines: Vec<&str> = Vec::new();

        for line in text.lines() {
            if let Some(title) = heading_title(line) {
                add_section(&mut sections, category.take(), &lines);
                lines.clear();
                category = Some(title.to_string());
                continue;
            }
            lines.push(line);
        }
        add_section(&mut sections, category, &lines);

        sections
    }

    fn find_headers(&self, text: &str) -> Vec<String> {
        let text = HTML_COMMENT.replace_all(text, "");
        text.lines()
            .filter_map(heading_title)
            .map(str::to_string)
            .collect()
    }

    fn format_header(&self, title: &str) -> String {
        format!("{}\n", Self::heading(self.config.md_header_level, title))
    }

    fn format_sections(&self, sections: &Sections) -> String {
        let mut text = String::new();

        for (category, items) in sections {
            if let Some(category) = category {
                text.push_str(&Self::heading(self.config.md_header_level + 1, category));
                text.push_str("\n\n");
            }
            text.push_str(&join_items(items));
            text.push_str("\n\n");
        }

        text
    }
}
