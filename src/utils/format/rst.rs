// reStructuredText knowledge

use super::{FormatTools, Sections, add_section, join_items};
use crate::utils::config::FragmentsConfig;

/// specifics about how to work with reStructuredText
pub struct RstTools<'a> {
    config: &'a FragmentsConfig,
}

impl<'a> RstTools<'a> {
    pub fn new(config: &'a FragmentsConfig) -> Self {
        Self { config }
    }

    fn heading(&self, level: usize, title: &str) -> String {
        let underline = self
            .config
            .rst_header_char(level)
            .to_string()
            .repeat(title.chars().count());
        format!("{}\n{}", title, underline)
    }
}

fn is_comment(line: &str) -> bool {
    match line.strip_prefix("..") {
        Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
        None => false,
    }
}

fn is_underline_for(line: &str, title: &str) -> bool {
    let line = line.trim_end();
    let mut chars = line.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    !first.is_alphanumeric()
        && !first.is_whitespace()
        && chars.all(|c| c == first)
        && line.chars().count() >= title.trim().chars().count()
}

/// walk the lines, reporting `Some(title)` for each heading and `None`
/// for each body line
fn classify(text: &str) -> Vec<(Option<&str>, &str)> {
    let lines: Vec<&str> = text.lines().filter(|line| !is_comment(line)).collect();
    let mut classified = Vec::with_capacity(lines.len());
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        let title = line.trim();
        let is_heading = !title.is_empty()
            && !line.starts_with(char::is_whitespace)
            && lines
                .get(index + 1)
                .is_some_and(|next| is_underline_for(next, title));

        if is_heading {
            classified.push((Some(title), line));
            index += 2;
        } else {
            classified.push((None, line));
            index += 1;
        }
    }

    classified
}

impl FormatTools for RstTools<'_> {
    fn new_template(&self) -> String {
        let mut text = String::from(
            ".. A new changelog entry.\n\
             ..\n\
             .. Uncomment the header that is right (remove the leading dots).\n\
             ..\n",
        );

        for category in &self.config.categories {
            for line in self.heading(1, category).lines() {
                text.push_str(&format!(".. {}\n", line));
            }
            text.push_str("..\n");
            text.push_str(&format!(".. - A bullet item for the {} category.\n", category));
            text.push_str("..\n");
        }

        text
    }

    fn parse_text(&self, text: &str) -> Sections {
        let mut sections = Sections::new();
        let mut category: Option<String> = None;
        let mut lines: Vec<&str> = Vec::new();

        for (title, line) in classify(text) {
            match title {
                Some(title) => {
                    add_section(&mut sections, category.take(), &lines);
                    lines.clear();
                    category = Some(title.to_string());
                }
                None => lines.push(line),
            }
        }
        add_section(&mut sections, category, &lines);

        sections
    }

    fn find_headers(&self, text: &str) -> Vec<String> {
        classify(text)
            .into_iter()
            .filter_map(|(title, _)| title.map(str::to_string))
            .collect()
    }

    fn format_header(&self, title: &str) -> String {
        format!("{}\n", self.heading(0, title))
    }

    fn format_sections(&self, sections: &Sections) -> String {
        let mut text = String::new();

        for (category, items) in sections {
            if let Some(category) = category {
                text.push_str(&self.heading(1, category));
                text.push_str("\n\n");
            }
            text.push_str(&join_items(items));
            text.push_str("\n\n");
        }

        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::EntryFormat;

    fn rst_config() -> FragmentsConfig {
        FragmentsConfig::default().format(EntryFormat::Rst)
    }

    #[test]
    fn test_new_template() {
        let config = rst_config().categories(vec!["Added".to_string()]);
        let template = RstTools::new(&config).new_template();
        assert_eq!(
            template,
            ".. A new changelog entry.\n\
             ..\n\
             .. Uncomment the header that is right (remove the leading dots).\n\
             ..\n\
             .. Added\n\
             .. -----\n\
             ..\n\
             .. - A bullet item for the Added category.\n\
             ..\n"
        );
    }

    #[test]
    fn test_untouched_template_parses_empty() {
        let config = rst_config();
        let tools = RstTools::new(&config);
        assert!(tools.parse_text(&tools.new_template()).is_empty());
    }

    #[test]
    fn test_parse_text() {
        let config = rst_config();
        let tools = RstTools::new(&config);
        let text = "\
.. comment line
Fixed
-----

- Fixed the thing.
- Fixed another
  thing.

.. Added
.. -----

Security
--------

- Patched it.
";
        let sections = tools.parse_text(text);
        let keys: Vec<_> = sections.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![Some("Fixed".to_string()), Some("Security".to_string())]
        );
        assert_eq!(
            sections[&Some("Fixed".to_string())],
            vec![
                "- Fixed the thing.".to_string(),
                "- Fixed another\n  thing.".to_string()
            ]
        );
    }

    #[test]
    fn test_short_underline_is_not_a_heading() {
        let config = rst_config();
        let tools = RstTools::new(&config);
        assert!(tools.find_headers("Too long title\n---\n").is_empty());
        assert_eq!(tools.find_headers("1.0\n===\n\ntext\n"), vec!["1.0".to_string()]);
    }

    #[test]
    fn test_format_sections() {
        let config = rst_config();
        let tools = RstTools::new(&config);
        let mut sections = Sections::new();
        sections.insert(Some("Fixed".to_string()), vec!["- Fix.".to_string()]);
        assert_eq!(tools.format_sections(&sections), "Fixed\n-----\n\n- Fix.\n\n");
        assert_eq!(tools.format_header("2.0"), "2.0\n===\n");
    }
}
