// ABOUTME: Orchestrates the cleanup passes in their fixed order and reports what each pass did.
// ABOUTME: Also provides the parse -> clean -> serialize convenience entry points.

use serde::Serialize;
use tracing::{debug, info_span};

use crate::dom::cleaners::{
    collapse_wrappers, filter_attributes, prune_empty, remove_comments, remove_tags,
};
use crate::dom::parse::parse;
use crate::dom::serialize::{serialize, Markup, SerializeOptions};
use crate::dom::Document;
use crate::error::Result;
use crate::options::Options;

/// What a single pipeline run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub nodes_before: usize,
    pub nodes_after: usize,
    pub tags_removed: usize,
    pub comments_removed: usize,
    pub attrs_dropped: usize,
    pub wrappers_unwrapped: usize,
    pub empty_removed: usize,
    /// Collapse/prune rounds needed to reach a stable tree.
    pub rounds: usize,
}

impl CleanReport {
    /// Whether the run left the tree untouched.
    pub fn is_noop(&self) -> bool {
        self.tags_removed == 0
            && self.comments_removed == 0
            && self.attrs_dropped == 0
            && self.wrappers_unwrapped == 0
            && self.empty_removed == 0
    }
}

/// Runs the cleanup passes over documents with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    opts: Options,
}

impl Cleaner {
    pub fn new(opts: Options) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Clean `doc` in place.
    ///
    /// Order: tag removal, comment removal, attribute filtering, wrapper
    /// collapsing, empty pruning. Pruning can expose a new wrapper (a sibling
    /// that kept a wrapper alive disappears), so when both are enabled the
    /// collapse/prune pair repeats until a prune round deletes nothing. The
    /// pruner always runs last.
    pub fn clean(&self, doc: &mut Document) -> CleanReport {
        let _span = info_span!("clean").entered();
        let opts = &self.opts;
        let mut report = CleanReport {
            nodes_before: doc.node_count(),
            ..CleanReport::default()
        };

        report.tags_removed = remove_tags(doc, &opts.remove_tags);
        if opts.remove_comments {
            report.comments_removed = remove_comments(doc);
        }
        report.attrs_dropped = filter_attributes(doc, &opts.keep_attrs);

        loop {
            report.rounds += 1;
            if opts.minimize_nesting {
                report.wrappers_unwrapped += collapse_wrappers(doc, opts.same_name_only);
            }
            if !opts.remove_empty {
                break;
            }
            let pruned = prune_empty(doc);
            report.empty_removed += pruned;
            if pruned == 0 || !opts.minimize_nesting {
                break;
            }
        }

        report.nodes_after = doc.node_count();
        debug!(?report, "clean finished");
        report
    }

    /// Parse `input` with the configured parser and clean it.
    pub fn clean_document(&self, input: &str) -> Result<(Document, CleanReport)> {
        let mut doc = parse(input, self.opts.parser)?;
        let report = self.clean(&mut doc);
        Ok((doc, report))
    }

    /// Parse, clean and serialize `input`.
    pub fn clean_str(&self, input: &str) -> Result<String> {
        let (doc, _) = self.clean_document(input)?;
        Ok(self.render(&doc))
    }

    /// Serialize `doc` the way this cleaner is configured to.
    pub fn render(&self, doc: &Document) -> String {
        serialize(doc, &self.serialize_options())
    }

    fn serialize_options(&self) -> SerializeOptions {
        let markup = if self.opts.parser.is_xml() {
            Markup::Xml
        } else {
            Markup::Html
        };
        SerializeOptions {
            pretty: self.opts.prettify,
            markup,
        }
    }
}

/// Parse, clean and serialize `input` with `opts`.
pub fn clean_html(input: &str, opts: &Options) -> Result<String> {
    Cleaner::new(opts.clone()).clean_str(input)
}
