//! Sanitized HTML fragment model
//!
//! Renderer output is a tree of [`HtmlNode`]s rather than a string. Text
//! leaves and attribute values are [`SafeText`], which can only be built by
//! escaping, so the serialized fragment never contains markup that did not
//! come from the renderer itself.

use std::fmt;

use pulldown_cmark::escape::escape_html;

/// Escaped text, safe to place in element content or a quoted attribute
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SafeText(String);

impl SafeText {
    /// Escape `&`, `<`, `>` and `"` in raw text
    pub fn escape(raw: &str) -> Self {
        let mut out = String::with_capacity(raw.len());
        // Writing into a String cannot fail
        let _ = escape_html(&mut out, raw);
        Self(out)
    }

    /// Static markup-free text owned by the renderer
    pub(crate) fn trusted(text: &'static str) -> Self {
        Self(text.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The original text with entities decoded
    pub fn unescaped(&self) -> String {
        self.0
            .replace("&quot;", "\"")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&")
    }
}

impl fmt::Display for SafeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Element attribute. `value: None` renders as a bare boolean attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: &'static str,
    pub value: Option<SafeText>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: &'static str,
    pub attrs: Vec<Attribute>,
    pub children: Vec<HtmlNode>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute, escaping the value
    pub fn attr(mut self, name: &'static str, value: &str) -> Self {
        self.attrs.push(Attribute {
            name,
            value: Some(SafeText::escape(value)),
        });
        self
    }

    /// Add a valueless attribute such as `disabled`
    pub fn flag(mut self, name: &'static str) -> Self {
        self.attrs.push(Attribute { name, value: None });
        self
    }

    pub fn child(mut self, node: impl Into<HtmlNode>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn with_children(mut self, nodes: Vec<HtmlNode>) -> Self {
        self.children.extend(nodes);
        self
    }

    /// Look up an attribute value (escaped form)
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.value.as_ref().map(SafeText::as_str))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    pub fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
    Element(Element),
    Text(SafeText),
}

impl HtmlNode {
    /// Text leaf from raw (unescaped) text
    pub fn text(raw: &str) -> Self {
        HtmlNode::Text(SafeText::escape(raw))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            HtmlNode::Element(el) => Some(el),
            HtmlNode::Text(_) => None,
        }
    }
}

impl From<Element> for HtmlNode {
    fn from(el: Element) -> Self {
        HtmlNode::Element(el)
    }
}

impl From<SafeText> for HtmlNode {
    fn from(text: SafeText) -> Self {
        HtmlNode::Text(text)
    }
}

const VOID_TAGS: &[&str] = &["hr", "img", "input", "br"];

/// Elements followed by a newline when serialized
const BLOCK_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "ul", "ol", "li", "blockquote", "pre", "table",
    "thead", "tbody", "tr", "th", "td", "hr", "section",
];

/// Block containers whose first child starts on a new line
const CONTAINER_TAGS: &[&str] = &[
    "ul", "ol", "blockquote", "table", "thead", "tbody", "tr", "section",
];

/// Output of rendering a document: an ordered list of top-level nodes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedFragment {
    pub nodes: Vec<HtmlNode>,
}

impl RenderedFragment {
    pub fn new(nodes: Vec<HtmlNode>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialize to an HTML string
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(node, &mut out);
        }
        out
    }

    /// Decoded text content of the whole fragment
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            collect_text(node, &mut out);
        }
        out
    }

    /// All elements with the given tag, in document order
    pub fn find_all(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        for node in &self.nodes {
            find_elements(node, tag, &mut found);
        }
        found
    }
}

impl fmt::Display for RenderedFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

fn write_node(node: &HtmlNode, out: &mut String) {
    match node {
        HtmlNode::Text(text) => out.push_str(text.as_str()),
        HtmlNode::Element(el) => write_element(el, out),
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(el.tag);
    for attr in &el.attrs {
        out.push(' ');
        out.push_str(attr.name);
        if let Some(value) = &attr.value {
            out.push_str("=\"");
            out.push_str(value.as_str());
            out.push('"');
        }
    }
    out.push('>');

    if el.is_void() {
        if BLOCK_TAGS.contains(&el.tag) {
            out.push('\n');
        }
        return;
    }

    if CONTAINER_TAGS.contains(&el.tag) {
        out.push('\n');
    }

    for child in &el.children {
        write_node(child, out);
    }

    out.push_str("</");
    out.push_str(el.tag);
    out.push('>');
    if BLOCK_TAGS.contains(&el.tag) {
        out.push('\n');
    }
}

fn collect_text(node: &HtmlNode, out: &mut String) {
    match node {
        HtmlNode::Text(text) => out.push_str(&text.unescaped()),
        HtmlNode::Element(el) => {
            for child in &el.children {
                collect_text(child, out);
            }
        }
    }
}

fn find_elements<'a>(node: &'a HtmlNode, tag: &str, found: &mut Vec<&'a Element>) {
    if let HtmlNode::Element(el) = node {
        if el.tag == tag {
            found.push(el);
        }
        for child in &el.children {
            find_elements(child, tag, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        let text = SafeText::escape(r#"<script>alert("x") & more</script>"#);
        assert_eq!(
            text.as_str(),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; more&lt;/script&gt;"
        );
        assert_eq!(text.unescaped(), r#"<script>alert("x") & more</script>"#);
    }

    #[test]
    fn test_unescape_does_not_double_decode() {
        let text = SafeText::escape("&lt;");
        assert_eq!(text.as_str(), "&amp;lt;");
        assert_eq!(text.unescaped(), "&lt;");
    }

    #[test]
    fn test_serialize_nested() {
        let fragment = RenderedFragment::new(vec![Element::new("p")
            .child(HtmlNode::text("a < b "))
            .child(Element::new("strong").child(HtmlNode::text("bold")))
            .into()]);
        assert_eq!(fragment.to_html(), "<p>a &lt; b <strong>bold</strong></p>\n");
    }

    #[test]
    fn test_attributes_are_quoted_and_escaped() {
        let el = Element::new("a").attr("href", "x\" onclick=\"y");
        let html = RenderedFragment::new(vec![el.into()]).to_html();
        assert_eq!(html, "<a href=\"x&quot; onclick=&quot;y\"></a>");
    }

    #[test]
    fn test_void_and_flag_attributes() {
        let input = Element::new("input")
            .attr("type", "checkbox")
            .flag("disabled");
        let html = RenderedFragment::new(vec![input.into(), Element::new("hr").into()]).to_html();
        assert_eq!(html, "<input type=\"checkbox\" disabled><hr>\n");
    }

    #[test]
    fn test_container_newlines() {
        let list = Element::new("ul").child(Element::new("li").child(HtmlNode::text("one")));
        let html = RenderedFragment::new(vec![list.into()]).to_html();
        assert_eq!(html, "<ul>\n<li>one</li>\n</ul>\n");
    }

    #[test]
    fn test_find_all_and_text_content() {
        let fragment = RenderedFragment::new(vec![
            Element::new("h1").child(HtmlNode::text("Title")).into(),
            Element::new("p")
                .child(Element::new("a").attr("href", "#").child(HtmlNode::text("link")))
                .into(),
        ]);
        assert_eq!(fragment.find_all("a").len(), 1);
        assert_eq!(fragment.find_all("a")[0].get_attr("href"), Some("#"));
        assert_eq!(fragment.text_content(), "Titlelink");
    }
}
