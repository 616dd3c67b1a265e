//! Owned XML element tree.
//!
//! Elements live in one arena (`Vec<Element>`) and refer to each other by
//! index, so indentation and serialization are plain recursive walks over
//! the same owned document. The model keeps exactly what a project
//! manifest needs: element names, ordered attributes, and the
//! `text`/`tail` strings that carry character data (including the
//! whitespace that makes a file look indented).

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub type NodeId = usize;

const XML_DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8'?>\n";
const INDENT_UNIT: &str = "\t";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Character data between the start tag and the first child.
    pub text: Option<String>,
    /// Character data after the end tag, up to the next sibling.
    pub tail: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            tail: None,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
}

impl Document {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Element::new(root_name)],
            root: 0,
        }
    }

    /// Parse a document. Errors carry the reader position and the
    /// underlying message; callers attach the file path.
    pub fn parse(input: &str) -> std::result::Result<Self, String> {
        let mut reader = Reader::from_str(input);
        reader.trim_text(false);

        let mut nodes: Vec<Element> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| format!("at byte {}: {e}", reader.buffer_position()))?;
            match event {
                Event::Start(ref start) | Event::Empty(ref start) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    if stack.is_empty() && root.is_some() {
                        return Err(format!(
                            "at byte {}: multiple root elements",
                            reader.buffer_position()
                        ));
                    }
                    let mut element = element_from_start(start)
                        .map_err(|e| format!("at byte {}: {e}", reader.buffer_position()))?;
                    let id = nodes.len();
                    element.parent = stack.last().copied();
                    if let Some(parent) = element.parent {
                        nodes[parent].children.push(id);
                    } else {
                        root = Some(id);
                    }
                    nodes.push(element);
                    if !is_empty {
                        stack.push(id);
                    }
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| format!("at byte {}: {e}", reader.buffer_position()))?;
                    append_character_data(&mut nodes, &stack, &text);
                }
                Event::CData(data) => {
                    let data = data.into_inner();
                    append_character_data(&mut nodes, &stack, &String::from_utf8_lossy(&data));
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and
                // doctypes are not kept.
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(format!(
                "unexpected end of document: <{}> is not closed",
                nodes[stack[stack.len() - 1]].name
            ));
        }
        let root = root.ok_or_else(|| "document has no root element".to_string())?;
        Ok(Self { nodes, root })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn element(&self, id: NodeId) -> &Element {
        &self.nodes[id]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn children_named<'a>(
        &'a self,
        id: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .filter(move |child| self.nodes[*child].name == name)
    }

    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children_named(id, name).next()
    }

    pub fn append_child(&mut self, parent: NodeId, mut element: Element) -> NodeId {
        let id = self.nodes.len();
        element.parent = Some(parent);
        self.nodes.push(element);
        self.nodes[parent].children.push(id);
        id
    }

    /// Detach `child` from `parent`. The arena slot stays allocated but is
    /// no longer reachable from the root.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let children = &mut self.nodes[parent].children;
        let Some(pos) = children.iter().position(|c| *c == child) else {
            return false;
        };
        children.remove(pos);
        self.nodes[child].parent = None;
        true
    }

    /// Rewrite whitespace-only `text`/`tail` so that every element sits on
    /// its own line, indented by its depth. Non-blank character data is
    /// never touched, so running this twice yields the same document.
    pub fn indent(&mut self) {
        self.indent_node(self.root, 0);
    }

    fn indent_node(&mut self, id: NodeId, level: usize) {
        let newline = format!("\n{}", INDENT_UNIT.repeat(level));
        let children = self.nodes[id].children.clone();

        if let Some(last) = children.last().copied() {
            let node = &mut self.nodes[id];
            if is_blank(node.text.as_deref()) {
                node.text = Some(format!("{newline}{INDENT_UNIT}"));
            }
            if is_blank(node.tail.as_deref()) {
                node.tail = Some(newline.clone());
            }
            for child in &children {
                self.indent_node(*child, level + 1);
            }
            // The last child closes back to the parent's depth.
            let last = &mut self.nodes[last];
            if is_blank(last.tail.as_deref()) {
                last.tail = Some(newline);
            }
        } else if level > 0 && is_blank(self.nodes[id].tail.as_deref()) {
            self.nodes[id].tail = Some(newline);
        }
    }

    pub fn to_xml_string(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        self.write_element(self.root, &mut out);
        out
    }

    fn write_element(&self, id: NodeId, out: &mut String) {
        let element = &self.nodes[id];
        out.push('<');
        out.push_str(&element.name);
        for (key, value) in &element.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&quick_xml::escape::escape(value.as_str()));
            out.push('"');
        }

        let text = element.text.as_deref().unwrap_or_default();
        if element.children.is_empty() && text.is_empty() {
            out.push_str(" />");
        } else {
            out.push('>');
            out.push_str(&quick_xml::escape::escape(text));
            for child in &element.children {
                self.write_element(*child, out);
            }
            out.push_str("</");
            out.push_str(&element.name);
            out.push('>');
        }

        if let Some(tail) = element.tail.as_deref() {
            out.push_str(&quick_xml::escape::escape(tail));
        }
    }
}

fn element_from_start(start: &BytesStart<'_>) -> std::result::Result<Element, String> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn append_character_data(nodes: &mut [Element], stack: &[NodeId], data: &str) {
    // Character data outside the root element is dropped.
    let Some(&current) = stack.last() else {
        return;
    };
    let slot = match nodes[current].children.last().copied() {
        Some(last_child) => &mut nodes[last_child].tail,
        None => &mut nodes[current].text,
    };
    slot.get_or_insert_with(String::new).push_str(data);
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{Document, Element};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_nested_elements_and_attributes() {
        let doc = Document::parse(
            r#"<?xml version="1.0"?>
<root><Project><Option title="A &amp; B"/><Unit filename="x.c"></Unit></Project></root>"#,
        )
        .unwrap();

        let root = doc.root();
        assert_eq!(doc.element(root).name, "root");
        let project = doc.find_child(root, "Project").unwrap();
        let option = doc.find_child(project, "Option").unwrap();
        assert_eq!(doc.element(option).attr("title"), Some("A & B"));
        let units: Vec<_> = doc.children_named(project, "Unit").collect();
        assert_eq!(units.len(), 1);
        assert_eq!(doc.element(units[0]).attr("filename"), Some("x.c"));
        assert_eq!(doc.element(units[0]).parent(), Some(project));
    }

    #[test]
    fn rejects_unclosed_and_mismatched_documents() {
        assert!(Document::parse("<root><Project></root>").is_err());
        assert!(Document::parse("<root><Project>").is_err());
        assert!(Document::parse("").is_err());
        assert!(Document::parse("<a/><b/>").is_err());
    }

    #[test]
    fn indent_places_each_element_on_its_own_line() {
        let mut doc = Document::new("root");
        let root = doc.root();
        let project = doc.append_child(root, Element::new("Project"));
        doc.append_child(project, Element::new("Option").with_attr("title", "Demo"));
        doc.append_child(project, Element::new("Unit").with_attr("filename", "main.c"));
        doc.indent();

        let expected = "<?xml version='1.0' encoding='UTF-8'?>\n\
<root>\n\
\t<Project>\n\
\t\t<Option title=\"Demo\" />\n\
\t\t<Unit filename=\"main.c\" />\n\
\t</Project>\n\
</root>\n";
        assert_eq!(doc.to_xml_string(), expected);
    }

    #[test]
    fn indent_is_stable_across_reparse() {
        let mut doc = Document::new("root");
        let root = doc.root();
        let project = doc.append_child(root, Element::new("Project"));
        doc.append_child(project, Element::new("Unit").with_attr("filename", "a.c"));
        doc.indent();
        let first = doc.to_xml_string();

        let mut reparsed = Document::parse(&first).unwrap();
        reparsed.indent();
        assert_eq!(reparsed.to_xml_string(), first);
    }

    #[test]
    fn indent_keeps_meaningful_text() {
        let mut doc = Document::parse("<root><note>keep me</note></root>").unwrap();
        doc.indent();
        let note = doc.find_child(doc.root(), "note").unwrap();
        assert_eq!(doc.element(note).text.as_deref(), Some("keep me"));
    }

    #[test]
    fn remove_child_detaches_from_parent() {
        let mut doc = Document::new("root");
        let root = doc.root();
        let a = doc.append_child(root, Element::new("a"));
        let b = doc.append_child(root, Element::new("b"));
        assert!(doc.remove_child(root, a));
        assert!(!doc.remove_child(root, a));
        assert_eq!(doc.children(root), &[b]);
        assert_eq!(doc.to_xml_string(), "<?xml version='1.0' encoding='UTF-8'?>\n<root><b /></root>");
    }
}
