// ABOUTME: Main library entry point for declutter, a markup tree simplifier.
// ABOUTME: Re-exports the public API: Cleaner, CleanReport, Options, Document, parse/serialize helpers.

//! declutter - simplify parsed HTML/XML trees.
//!
//! The cleanup removes unwanted tags and comments, restricts attributes to an
//! allow-list, collapses redundant single-child wrappers and prunes elements
//! left empty, then serializes the stable tree.
//!
//! # Example
//!
//! ```
//! use declutter_core::{clean_html, Options, ParserKind};
//!
//! let opts = Options::builder()
//!     .prettify(false)
//!     .parser(ParserKind::Fragment)
//!     .build();
//! let out = clean_html("<div><div>Hello</div></div>", &opts).unwrap();
//! assert_eq!(out, "<div>Hello</div>");
//! ```

pub mod dom;
pub mod encoding;
pub mod error;
pub mod options;
pub mod pipeline;

pub use crate::dom::parse::{parse, parse_html_document, parse_html_fragment, parse_xml};
pub use crate::dom::serialize::{serialize, Markup, SerializeOptions};
pub use crate::dom::{Document, Element, Node, NodeId};
pub use crate::encoding::decode_input;
pub use crate::error::{CleanError, ErrorCode, Result};
pub use crate::options::{Options, OptionsBuilder, ParserKind, DEFAULT_KEEP_ATTRS, DEFAULT_REMOVE_TAGS};
pub use crate::pipeline::{clean_html, CleanReport, Cleaner};
