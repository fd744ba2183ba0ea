//! Tolerant markup parser for wallpaper catalog documents.
//!
//! The parser accepts the XML subset used by desktop background catalogs and
//! never rejects input. Unbalanced or mismatched closing tags are resolved
//! against the stack of open elements, unterminated elements are closed at
//! the end of input, and character references are decoded in text.
//!
//! The result is a tree rooted at a synthetic, unnamed [`Element`] whose
//! children are the top-level nodes of the document.

mod entities;
mod tokenizer;

pub use entities::decode;
pub use tokenizer::{Token, Tokenizer};

/// A node in a parsed markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    /// A named element with its children.
    Element(Element),
    /// Trimmed, entity-decoded character data. Never empty.
    Text(String),
    /// Raw content of a CDATA section. Not decoded.
    CData(String),
    /// A comment or `<!...>` declaration.
    Comment(String),
    /// A `<?...?>` processing instruction.
    ProcessingInstruction(String),
}

impl MarkupNode {
    /// Returns the element if this node is one.
    #[must_use]
    pub const fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the character data carried by a text or CDATA node.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::CData(text) => Some(text),
            _ => None,
        }
    }
}

/// An element of the markup tree.
///
/// The synthetic document root has an empty name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: String,
    children: Vec<MarkupNode>,
}

impl Element {
    /// Creates an element with the given name and raw attribute text.
    #[must_use]
    pub fn new(name: impl Into<String>, attributes: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: attributes.into(),
            children: Vec::new(),
        }
    }

    /// The tag name as written in the document.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Everything after the tag name in the opening tag, unparsed.
    #[must_use]
    pub fn attributes(&self) -> &str { &self.attributes }

    #[must_use]
    pub fn children(&self) -> &[MarkupNode] { &self.children }

    /// Whether this is the synthetic document root.
    #[must_use]
    pub fn is_root(&self) -> bool { self.name.is_empty() }

    /// Iterates over the child elements, skipping text and other nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(MarkupNode::as_element)
    }

    /// Returns the first child element whose name matches `name` exactly.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.elements().find(|element| element.name == name)
    }

    /// Returns the character data of the first child, if that child is text.
    #[must_use]
    pub fn text(&self) -> Option<&str> { self.children.first().and_then(MarkupNode::as_text) }

    fn push(&mut self, node: MarkupNode) { self.children.push(node); }
}

/// Parses `input` into a tree rooted at a synthetic, unnamed element.
///
/// Parsing never fails:
///
/// - text runs are trimmed, dropped when empty, and entity-decoded
/// - a closing tag pops open elements until one with the same name
///   (case-insensitive) has been closed, or until only the root remains
/// - a tag whose body ends in `/` is self-closing
/// - elements still open at the end of input are closed implicitly
#[must_use]
pub fn parse(input: &str) -> Element {
    // The bottom of the stack is the root. Elements are attached to their
    // parent when they close, which keeps sibling order intact because a
    // parent cannot receive children while one of its children is open.
    let mut stack: Vec<Element> = vec![Element::default()];

    for token in Tokenizer::new(input) {
        match token {
            Token::Text(raw) => {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    current(&mut stack).push(MarkupNode::Text(decode(trimmed)));
                }
            }
            Token::CData(raw) => {
                if !raw.is_empty() {
                    current(&mut stack).push(MarkupNode::CData(raw.to_string()));
                }
            }
            Token::Comment(raw) => current(&mut stack).push(MarkupNode::Comment(raw.to_string())),
            Token::Instruction(raw) => {
                current(&mut stack).push(MarkupNode::ProcessingInstruction(raw.to_string()));
            }
            Token::Open { body } => {
                let (element, self_closing) = open_tag(body);
                if self_closing {
                    current(&mut stack).push(MarkupNode::Element(element));
                } else {
                    stack.push(element);
                }
            }
            Token::Close { body } => close_tag(&mut stack, &close_tag_name(body)),
        }
    }

    while stack.len() > 1 {
        pop_into_parent(&mut stack);
    }

    stack.pop().unwrap_or_default()
}

fn current(stack: &mut [Element]) -> &mut Element {
    // The root is never popped while tokens remain.
    let last = stack.len() - 1;
    &mut stack[last]
}

/// Pops the innermost open element and attaches it to its parent.
fn pop_into_parent(stack: &mut Vec<Element>) -> Option<String> {
    if stack.len() < 2 {
        return None;
    }

    let element = stack.pop()?;
    let name = element.name.to_lowercase();
    current(stack).push(MarkupNode::Element(element));
    Some(name)
}

fn close_tag(stack: &mut Vec<Element>, closed: &str) {
    while let Some(name) = pop_into_parent(stack) {
        if name == closed {
            break;
        }
    }
}

/// Splits an opening tag body into an element and its self-closing flag.
fn open_tag(body: &str) -> (Element, bool) {
    let trimmed = body.trim_end();
    let (trimmed, self_closing) = match trimmed.strip_suffix('/') {
        Some(stripped) => (stripped.trim_end(), true),
        None => (trimmed, false),
    };

    let split = trimmed
        .find(|c: char| c.is_whitespace() || matches!(c, '=' | '\'' | '"' | '/'))
        .unwrap_or(trimmed.len());
    let (name, attributes) = trimmed.split_at(split);

    (Element::new(name, attributes), self_closing)
}

/// Extracts the lower-cased name from a closing tag body.
fn close_tag_name(body: &str) -> String {
    let end = body.find(|c: char| c.is_whitespace() || c == '/').unwrap_or(body.len());
    body[..end].to_lowercase()
}
