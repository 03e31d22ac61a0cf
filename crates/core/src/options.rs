// ABOUTME: Configuration for the cleanup pipeline including ParserKind, Options and OptionsBuilder.
// ABOUTME: OptionsBuilder provides a fluent API; repeated remove_tag/keep_attr calls extend the defaults.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::CleanError;

/// Tags removed (with their whole subtree) unless configured otherwise.
pub const DEFAULT_REMOVE_TAGS: &[&str] = &["style", "span", "meta", "script"];

/// Attributes kept unless configured otherwise.
pub const DEFAULT_KEEP_ATTRS: &[&str] = &["href", "src", "alt"];

/// Which parser front-end builds the document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserKind {
    /// Full documents go through the HTML5 document parser, anything else is a fragment.
    #[default]
    Auto,
    /// HTML5 document parsing; `html`, `head` and `body` are synthesized.
    Document,
    /// HTML5 fragment parsing in a body context; nothing is synthesized.
    Fragment,
    /// Strict XML.
    Xml,
}

impl ParserKind {
    /// Settle `Auto` into a concrete parser by sniffing the input.
    pub fn resolve(self, input: &str) -> ParserKind {
        match self {
            ParserKind::Auto => {
                let head: String = input
                    .trim_start_matches('\u{feff}')
                    .trim_start()
                    .chars()
                    .take(9)
                    .collect::<String>()
                    .to_ascii_lowercase();
                if head.starts_with("<!doctype") || head.starts_with("<html") {
                    ParserKind::Document
                } else {
                    ParserKind::Fragment
                }
            }
            other => other,
        }
    }

    pub fn is_xml(self) -> bool {
        self == ParserKind::Xml
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParserKind::Auto => "auto",
            ParserKind::Document => "document",
            ParserKind::Fragment => "fragment",
            ParserKind::Xml => "xml",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ParserKind {
    type Err = CleanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ParserKind::Auto),
            "document" | "html" | "html5" | "lxml" | "html5lib" => Ok(ParserKind::Document),
            "fragment" | "html.parser" => Ok(ParserKind::Fragment),
            "xml" | "lxml-xml" => Ok(ParserKind::Xml),
            other => Err(CleanError::input(
                "select parser",
                Some(anyhow::anyhow!("unknown parser {:?}", other)),
            )),
        }
    }
}

/// Configuration options for the cleanup pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub remove_tags: HashSet<String>,
    pub keep_attrs: HashSet<String>,
    pub remove_comments: bool,
    pub same_name_only: bool,
    pub minimize_nesting: bool,
    pub remove_empty: bool,
    pub prettify: bool,
    pub parser: ParserKind,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            remove_tags: DEFAULT_REMOVE_TAGS.iter().map(|s| s.to_string()).collect(),
            keep_attrs: DEFAULT_KEEP_ATTRS.iter().map(|s| s.to_string()).collect(),
            remove_comments: true,
            same_name_only: true,
            minimize_nesting: true,
            remove_empty: true,
            prettify: true,
            parser: ParserKind::Auto,
        }
    }
}

impl Options {
    /// Start a builder from the default options.
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::new()
    }
}

/// Builder for constructing Options with custom settings.
#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    opts: Options,
}

impl OptionsBuilder {
    /// Create a new OptionsBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Add one tag to the removal set.
    pub fn remove_tag(mut self, tag: impl Into<String>) -> Self {
        self.opts.remove_tags.insert(tag.into());
        self
    }

    /// Replace the removal set.
    pub fn remove_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.remove_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Add one attribute name to the allow-set.
    pub fn keep_attr(mut self, attr: impl Into<String>) -> Self {
        self.opts.keep_attrs.insert(attr.into());
        self
    }

    /// Replace the allow-set.
    pub fn keep_attrs<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.keep_attrs = attrs.into_iter().map(Into::into).collect();
        self
    }

    pub fn remove_comments(mut self, enabled: bool) -> Self {
        self.opts.remove_comments = enabled;
        self
    }

    /// Only unwrap when the wrapper and its child share a tag name.
    pub fn same_name_only(mut self, enabled: bool) -> Self {
        self.opts.same_name_only = enabled;
        self
    }

    /// Enable or disable the wrapper collapser.
    pub fn minimize_nesting(mut self, enabled: bool) -> Self {
        self.opts.minimize_nesting = enabled;
        self
    }

    /// Enable or disable the empty element pruner.
    pub fn remove_empty(mut self, enabled: bool) -> Self {
        self.opts.remove_empty = enabled;
        self
    }

    pub fn prettify(mut self, enabled: bool) -> Self {
        self.opts.prettify = enabled;
        self
    }

    pub fn parser(mut self, parser: ParserKind) -> Self {
        self.opts.parser = parser;
        self
    }

    /// Finish building.
    pub fn build(self) -> Options {
        self.opts
    }
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
