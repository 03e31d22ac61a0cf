// ABOUTME: Parser front-ends that build a Document from HTML (scraper/html5ever) or XML (quick-xml).
// ABOUTME: The cleanup core never parses markup itself; it only sees the Document built here.

use ego_tree::NodeRef;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use scraper::Html;
use tracing::debug;

use super::{Document, Element, Node, NodeId};
use crate::error::{CleanError, Result};
use crate::options::ParserKind;

/// Parse `input` with the chosen front-end. `Auto` is resolved by sniffing.
pub fn parse(input: &str, kind: ParserKind) -> Result<Document> {
    let resolved = kind.resolve(input);
    debug!(parser = %resolved, bytes = input.len(), "parsing input");
    match resolved {
        ParserKind::Xml => parse_xml(input),
        ParserKind::Fragment => Ok(parse_html_fragment(input)),
        ParserKind::Document | ParserKind::Auto => Ok(parse_html_document(input)),
    }
}

/// Full HTML5 document parsing; html5ever synthesizes `html`, `head` and `body`.
pub fn parse_html_document(input: &str) -> Document {
    let html = Html::parse_document(input);
    let mut doc = Document::new();
    let root = doc.root_id();
    for child in html.tree.root().children() {
        copy_html_node(child, &mut doc, root);
    }
    doc
}

/// HTML5 fragment parsing. The synthetic `<html>` context element is dropped
/// and its children hang directly off the root.
pub fn parse_html_fragment(input: &str) -> Document {
    let html = Html::parse_fragment(input);
    let mut doc = Document::new();
    let root = doc.root_id();
    for child in html.root_element().children() {
        copy_html_node(child, &mut doc, root);
    }
    doc
}

fn copy_html_node(node: NodeRef<scraper::Node>, doc: &mut Document, parent: NodeId) {
    match node.value() {
        scraper::Node::Text(text) => {
            push_text(doc, parent, &**text);
        }
        scraper::Node::Comment(comment) => {
            doc.append_comment(parent, &**comment);
        }
        scraper::Node::Doctype(doctype) => {
            let mut decl = doctype.name().to_string();
            if !doctype.public_id().is_empty() {
                decl.push_str(&format!(" PUBLIC \"{}\"", doctype.public_id()));
            }
            if !doctype.system_id().is_empty() {
                decl.push_str(&format!(" \"{}\"", doctype.system_id()));
            }
            doc.append(parent, Node::Doctype(decl));
        }
        scraper::Node::Element(el) => {
            let element = Element::with_attrs(el.name(), el.attrs());
            let id = doc.append_element(parent, element);
            for child in node.children() {
                copy_html_node(child, doc, id);
            }
        }
        _ => {}
    }
}

/// Strict XML parsing. Mismatched or unclosed tags are parse errors.
pub fn parse_xml(input: &str) -> Result<Document> {
    let mut reader = Reader::from_str(input);
    let mut doc = Document::new();
    let mut open: Vec<NodeId> = vec![doc.root_id()];

    loop {
        let event = reader.read_event().map_err(|e| {
            CleanError::parse(
                "parse xml",
                Some(anyhow::anyhow!("at byte {}: {}", reader.buffer_position(), e)),
            )
        })?;
        let parent = open.last().copied().unwrap_or_else(|| doc.root_id());

        match event {
            Event::Start(ref e) => {
                let id = doc.append_element(parent, xml_element(e)?);
                open.push(id);
            }
            Event::Empty(ref e) => {
                doc.append_element(parent, xml_element(e)?);
            }
            Event::End(_) => {
                // The reader has already checked the end name against the open tag.
                if open.len() > 1 {
                    open.pop();
                }
            }
            Event::Text(ref e) => {
                let text = e.decode().map_err(xml_error)?;
                push_text(&mut doc, parent, &text);
            }
            Event::CData(ref e) => {
                push_text(&mut doc, parent, &String::from_utf8_lossy(e));
            }
            Event::GeneralRef(ref e) => {
                let name = e.decode().map_err(xml_error)?;
                push_text(&mut doc, parent, &resolve_reference(&name));
            }
            Event::Comment(ref e) => {
                let text = e.decode().map_err(xml_error)?;
                doc.append_comment(parent, text.into_owned());
            }
            Event::Decl(ref e) => {
                let decl = String::from_utf8_lossy(e).into_owned();
                doc.append(parent, Node::ProcessingInstruction(decl));
            }
            Event::PI(ref e) => {
                let pi = String::from_utf8_lossy(e).into_owned();
                doc.append(parent, Node::ProcessingInstruction(pi));
            }
            Event::DocType(ref e) => {
                let text = e.decode().map_err(xml_error)?;
                doc.append(parent, Node::Doctype(text.trim().to_string()));
            }
            Event::Eof => break,
        }
    }

    if open.len() > 1 {
        let name = open
            .last()
            .and_then(|id| doc.get(*id))
            .and_then(|n| n.value().as_element().map(|el| el.name().to_string()))
            .unwrap_or_default();
        return Err(CleanError::parse(
            "parse xml",
            Some(anyhow::anyhow!("unclosed element <{}>", name)),
        ));
    }

    Ok(doc)
}

fn xml_element(start: &BytesStart) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value).into_owned();
        let value = match quick_xml::escape::unescape(&raw) {
            Ok(value) => value.into_owned(),
            Err(_) => raw,
        };
        attrs.push((key, value));
    }
    Ok(Element::with_attrs(name, attrs))
}

/// Resolve `&name;`. Predefined entities and character references are
/// expanded; anything else is kept literally.
fn resolve_reference(name: &str) -> String {
    let literal = format!("&{};", name);
    match quick_xml::escape::unescape(&literal) {
        Ok(text) => text.into_owned(),
        Err(_) => literal,
    }
}

fn xml_error<E>(err: E) -> CleanError
where
    E: std::error::Error + Send + Sync + 'static,
{
    CleanError::parse("parse xml", Some(anyhow::Error::new(err)))
}

/// Append text, merging into a preceding text sibling so references and
/// CDATA sections do not split a run into several nodes.
fn push_text(doc: &mut Document, parent: NodeId, text: &str) {
    if text.is_empty() {
        return;
    }
    let last = doc
        .get(parent)
        .and_then(|p| p.last_child())
        .filter(|c| matches!(c.value(), Node::Text(_)))
        .map(|c| c.id());
    if let Some(id) = last {
        if let Some(mut node) = doc.get_mut(id) {
            if let Node::Text(existing) = node.value() {
                existing.push_str(text);
                return;
            }
        }
    }
    doc.append_text(parent, text);
}
