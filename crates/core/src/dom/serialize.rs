// ABOUTME: Renders a Document back to markup text, compact or pretty-printed.
// ABOUTME: Handles attribute/text escaping, void elements and raw-text elements.

use ego_tree::NodeRef;

use super::{Document, Node};

const INDENT: &str = " ";

/// Output flavour; decides void-element and raw-text handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Markup {
    #[default]
    Html,
    Xml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SerializeOptions {
    pub pretty: bool,
    pub markup: Markup,
}

impl SerializeOptions {
    pub fn compact() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    pub fn with_markup(mut self, markup: Markup) -> Self {
        self.markup = markup;
        self
    }
}

/// Serialize every child of the root.
pub fn serialize(doc: &Document, opts: &SerializeOptions) -> String {
    let mut out = String::new();
    for child in doc.root().children() {
        if opts.pretty {
            write_pretty(child, opts.markup, 0, &mut out);
        } else {
            write_compact(child, opts.markup, false, &mut out);
        }
    }
    out
}

fn write_compact(node: NodeRef<Node>, markup: Markup, raw: bool, out: &mut String) {
    match node.value() {
        Node::Document => {
            for child in node.children() {
                write_compact(child, markup, raw, out);
            }
        }
        Node::Text(text) => {
            if raw {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::Doctype(text) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(text);
            out.push('>');
        }
        Node::ProcessingInstruction(text) => {
            out.push_str("<?");
            out.push_str(text);
            out.push_str("?>");
        }
        Node::Element(el) => {
            open_tag(el, out);
            if is_self_closing(el.name(), node.has_children(), markup) {
                out.push_str("/>");
                return;
            }
            out.push('>');
            let raw = raw || is_raw_text(el.name(), markup);
            for child in node.children() {
                write_compact(child, markup, raw, out);
            }
            close_tag(el.name(), out);
        }
    }
}

fn write_pretty(node: NodeRef<Node>, markup: Markup, depth: usize, out: &mut String) {
    match node.value() {
        Node::Document => {
            for child in node.children() {
                write_pretty(child, markup, depth, out);
            }
        }
        Node::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return;
            }
            indent(depth, out);
            out.push_str(&escape_text(text));
            out.push('\n');
        }
        Node::Element(el) => {
            indent(depth, out);
            open_tag(el, out);
            if is_self_closing(el.name(), node.has_children(), markup) {
                out.push_str("/>\n");
                return;
            }
            out.push('>');
            if keeps_whitespace(el.name(), markup) {
                let raw = is_raw_text(el.name(), markup);
                for child in node.children() {
                    write_compact(child, markup, raw, out);
                }
            } else {
                out.push('\n');
                for child in node.children() {
                    write_pretty(child, markup, depth + 1, out);
                }
                indent(depth, out);
            }
            close_tag(el.name(), out);
            out.push('\n');
        }
        _ => {
            indent(depth, out);
            write_compact(node, markup, false, out);
            out.push('\n');
        }
    }
}

fn open_tag(el: &super::Element, out: &mut String) {
    out.push('<');
    out.push_str(el.name());
    for (name, value) in el.attrs() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
}

fn close_tag(name: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn is_self_closing(name: &str, has_children: bool, markup: Markup) -> bool {
    match markup {
        Markup::Html => !has_children && is_void_element(name),
        Markup::Xml => !has_children,
    }
}

fn is_raw_text(name: &str, markup: Markup) -> bool {
    markup == Markup::Html && matches!(name, "script" | "style")
}

fn keeps_whitespace(name: &str, markup: Markup) -> bool {
    markup == Markup::Html && matches!(name, "pre" | "textarea" | "script" | "style")
}

/// Escape attribute value
fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Check if tag is void element
fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;
    use pretty_assertions::assert_eq;

    fn sample() -> Document {
        let mut doc = Document::new();
        let root = doc.root_id();
        let div = doc.append_element(root, Element::new("div"));
        let a = doc.append_element(div, Element::with_attrs("a", [("href", "/q?a=1&b=\"2\"")]));
        doc.append_text(a, "Tom & <Jerry>");
        doc.append_element(div, Element::with_attrs("img", [("src", "x.png")]));
        doc.append_comment(div, " note ");
        doc
    }

    #[test]
    fn compact_escapes_and_voids() {
        assert_eq!(
            serialize(&sample(), &SerializeOptions::compact()),
            "<div><a href=\"/q?a=1&amp;b=&quot;2&quot;\">Tom &amp; &lt;Jerry&gt;</a><img src=\"x.png\"/><!-- note --></div>"
        );
    }

    #[test]
    fn pretty_puts_each_node_on_its_own_line() {
        let expected = "<div>\n <a href=\"/q?a=1&amp;b=&quot;2&quot;\">\n  Tom &amp; &lt;Jerry&gt;\n </a>\n <img src=\"x.png\"/>\n <!-- note -->\n</div>\n";
        assert_eq!(serialize(&sample(), &SerializeOptions::pretty()), expected);
    }

    #[test]
    fn pretty_skips_whitespace_and_keeps_pre() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let body = doc.append_element(root, Element::new("body"));
        doc.append_text(body, "\n   ");
        let pre = doc.append_element(body, Element::new("pre"));
        doc.append_text(pre, "  a\n   b");
        assert_eq!(
            serialize(&doc, &SerializeOptions::pretty()),
            "<body>\n <pre>  a\n   b</pre>\n</body>\n"
        );
    }

    #[test]
    fn script_text_is_raw_in_html_only() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let script = doc.append_element(root, Element::new("script"));
        doc.append_text(script, "if (a < b) {}");
        assert_eq!(
            serialize(&doc, &SerializeOptions::compact()),
            "<script>if (a < b) {}</script>"
        );
        assert_eq!(
            serialize(&doc, &SerializeOptions::compact().with_markup(Markup::Xml)),
            "<script>if (a &lt; b) {}</script>"
        );
    }

    #[test]
    fn xml_self_closes_childless_elements() {
        let mut doc = Document::new();
        let root = doc.root_id();
        doc.append(root, Node::ProcessingInstruction("xml version=\"1.0\"".into()));
        let note = doc.append_element(root, Element::new("note"));
        doc.append_element(note, Element::new("to"));
        assert_eq!(
            serialize(&doc, &SerializeOptions::compact().with_markup(Markup::Xml)),
            "<?xml version=\"1.0\"?><note><to/></note>"
        );
        assert_eq!(
            serialize(&doc, &SerializeOptions::compact()),
            "<?xml version=\"1.0\"?><note><to></to></note>"
        );
    }

    #[test]
    fn empty_document_serializes_to_nothing() {
        let doc = Document::new();
        assert_eq!(serialize(&doc, &SerializeOptions::compact()), "");
        assert_eq!(serialize(&doc, &SerializeOptions::pretty()), "");
    }
}
