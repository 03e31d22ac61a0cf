// ABOUTME: The cleanup passes: tag removal, comment removal, attribute filtering,
// ABOUTME: wrapper collapsing and empty-element pruning, each mutating the Document in place.

use std::collections::HashSet;

use tracing::{debug, trace};

use super::{Document, Node, NodeId};

/// Detach every element whose name is in `tags`, subtree included.
/// Returns the number of subtrees removed.
pub fn remove_tags(doc: &mut Document, tags: &HashSet<String>) -> usize {
    if tags.is_empty() {
        return 0;
    }
    let doomed: Vec<NodeId> = doc
        .root()
        .descendants()
        .filter(|n| {
            n.value()
                .as_element()
                .is_some_and(|el| tags.contains(el.name()))
        })
        .map(|n| n.id())
        .collect();

    let mut removed = 0;
    for id in doomed {
        // Nested matches went away with an ancestor already.
        if !doc.is_attached(id) {
            continue;
        }
        if doc.detach(id) {
            removed += 1;
        }
    }
    debug!(removed, "removed tags");
    removed
}

/// Detach every comment node. Returns the number removed.
pub fn remove_comments(doc: &mut Document) -> usize {
    let comments: Vec<NodeId> = doc
        .root()
        .descendants()
        .filter(|n| n.value().is_comment())
        .map(|n| n.id())
        .collect();

    let mut removed = 0;
    for id in comments {
        if doc.detach(id) {
            removed += 1;
        }
    }
    debug!(removed, "removed comments");
    removed
}

/// Keep only attributes named in `keep` on every element.
/// Returns the number of attributes dropped.
pub fn filter_attributes(doc: &mut Document, keep: &HashSet<String>) -> usize {
    let mut dropped = 0;
    for id in doc.elements() {
        if let Some(mut node) = doc.get_mut(id) {
            if let Some(el) = node.value().as_element_mut() {
                dropped += el.retain_attrs(|key| keep.contains(key));
            }
        }
    }
    debug!(dropped, "filtered attributes");
    dropped
}

/// The child an element would be replaced by, if it is a redundant wrapper:
/// no attributes and exactly one significant child, which is an element
/// (with the same name when `same_name_only` is set).
pub fn unwrap_target(doc: &Document, id: NodeId, same_name_only: bool) -> Option<NodeId> {
    let node = doc.get(id)?;
    let el = node.value().as_element()?;
    if el.has_attrs() {
        return None;
    }
    let mut significant = node.children().filter(|c| c.value().is_significant());
    let only = significant.next()?;
    if significant.next().is_some() {
        return None;
    }
    let child = only.value().as_element()?;
    if same_name_only && child.name() != el.name() {
        return None;
    }
    Some(only.id())
}

/// Unwrap redundant single-child wrappers until none remain.
/// Returns the number of unwraps.
pub fn collapse_wrappers(doc: &mut Document, same_name_only: bool) -> usize {
    let seed = doc.elements();
    collapse_wrappers_from(doc, seed, same_name_only)
}

/// Work-list form of the collapser. Ids are popped from the end of `pending`;
/// after each unwrap the hoisted child and the wrapper's old parent are
/// re-checked, which is the only place a new candidate can appear.
pub(crate) fn collapse_wrappers_from(
    doc: &mut Document,
    mut pending: Vec<NodeId>,
    same_name_only: bool,
) -> usize {
    let mut unwrapped = 0;
    while let Some(id) = pending.pop() {
        if !doc.is_attached(id) {
            continue;
        }
        let Some(child) = unwrap_target(doc, id, same_name_only) else {
            continue;
        };
        let parent = doc.get(id).and_then(|n| n.parent()).map(|p| p.id());

        doc.hoist(id, child);
        unwrapped += 1;
        trace!(?id, ?child, "unwrapped wrapper");

        pending.push(child);
        if let Some(parent) = parent {
            pending.push(parent);
        }
    }
    debug!(unwrapped, "collapsed wrappers");
    unwrapped
}

/// Whether an element holds nothing but whitespace.
pub fn is_empty_element(doc: &Document, id: NodeId) -> bool {
    match doc.get(id) {
        Some(node) if node.value().is_element() => {
            !node.children().any(|c| c.value().is_significant())
        }
        _ => false,
    }
}

/// Delete elements without significant children until none remain.
/// The root is never touched. Returns the number of elements deleted.
pub fn prune_empty(doc: &mut Document) -> usize {
    // Popping from the end of a document-order list visits children first.
    let mut pending = doc.elements();
    let mut pruned = 0;
    while let Some(id) = pending.pop() {
        if !doc.is_attached(id) || !is_empty_element(doc, id) {
            continue;
        }
        let parent = doc
            .get(id)
            .and_then(|n| n.parent())
            .filter(|p| matches!(p.value(), Node::Element(_)))
            .map(|p| p.id());

        if doc.detach(id) {
            pruned += 1;
            trace!(?id, "pruned empty element");
            if let Some(parent) = parent {
                pending.push(parent);
            }
        }
    }
    debug!(pruned, "pruned empty elements");
    pruned
}
