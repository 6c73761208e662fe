// version numbers embedded in free-form text

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

/// grammar of a version token, loosely following PEP 440
///
/// compiled case-insensitive with insignificant whitespace
pub const VERSION_PATTERN: &str = r"
    \b                      # at a word boundary
    v?                      # maybe a leading 'v'
    (\d+!)?                 # maybe a version epoch
    \d+(\.\d+)+             # the meat of the version number: N.N.N
    (?P<pre>
        [-._]?[a-z]+\.?\d*
    )?                      # maybe a pre-release: .beta3
    ([-._][a-z]+\d*)*       # maybe post and dev releases
    (\+\w[\w.]*\w)?         # maybe a local version
    \b
";

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| build_regex(VERSION_PATTERN));

static VERSION_FULL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| build_regex(&format!("\\A(?:{})\\z", VERSION_PATTERN)));

fn build_regex(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .ignore_whitespace(true)
        .build()
        .expect("version pattern is a valid regex")
}

/// strip the leading 'v' so "v1.2.3" and "1.2.3" compare the same
fn normalized(text: &str) -> &str {
    text.trim_start_matches(['v', 'V'])
}

/// a version string that compares correctly
///
/// "v1.2.3" and "1.2.3" are considered the same version, both when
/// comparing two `Version`s and when comparing a `Version` with raw text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version {
    vtext: String,
}

impl Version {
    /// wrap a string that is already a version number, without validation
    pub fn parse(text: impl Into<String>) -> Self {
        Self { vtext: text.into() }
    }

    /// find the first version number in a text string
    pub fn find_in(text: &str) -> Option<Self> {
        VERSION_REGEX.find(text).map(|m| Self::parse(m.as_str()))
    }

    /// the text exactly as it was constructed or matched
    pub fn to_text(&self) -> &str {
        &self.vtext
    }

    /// a version is truthy when it has any text at all
    pub fn is_truthy(&self) -> bool {
        !self.vtext.is_empty()
    }

    /// is this version number a pre-release?
    ///
    /// # Panics
    ///
    /// panics if the text is not a complete version token; only call this
    /// on versions produced by [`Version::find_in`] or known-good text.
    pub fn is_prerelease(&self) -> bool {
        let captures = VERSION_FULL_REGEX
            .captures(&self.vtext)
            .unwrap_or_else(|| panic!("not a valid version number: {:?}", self.vtext));
        captures.name("pre").is_some()
    }

    fn normalized(&self) -> &str {
        normalized(&self.vtext)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.vtext)
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.vtext
    }
}

impl From<&str> for Version {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for Version {
    fn from(text: String) -> Self {
        Self::parse(text)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl PartialEq<str> for Version {
    fn eq(&self, other: &str) -> bool {
        self.normalized() == normalized(other)
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        self.normalized() == normalized(other)
    }
}

impl PartialEq<String> for Version {
    fn eq(&self, other: &String) -> bool {
        self.normalized() == normalized(other)
    }
}

impl PartialEq<Version> for str {
    fn eq(&self, other: &Version) -> bool {
        other == self
    }
}

impl PartialEq<Version> for &str {
    fn eq(&self, other: &Version) -> bool {
        other == self
    }
}

impl PartialEq<Version> for String {
    fn eq(&self, other: &Version) -> bool {
        other == self
    }
}
