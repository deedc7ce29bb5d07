//! HTML fragments
//!
//! The translated tree is written as-is. Style declarations collected on a
//! node become its `style` attribute and outlet nodes are tagged with
//! [`OUTLET_ATTRIBUTE`] so the TypeScript binding can find them.

use super::{into_string, xml_error};
use crate::dest::{DestTree, NodeId};
use crate::error::Result;
use crate::translator::Translation;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::io::{Cursor, Write};

pub const OUTLET_ATTRIBUTE: &str = "data-outlet";

/// Elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &["area", "br", "col", "embed", "hr", "img", "input", "source", "wbr"];

pub fn write(translation: &Translation) -> Result<String> {
    let tree = &translation.tree;
    let outlets: BTreeMap<NodeId, &str> = translation
        .outlets
        .iter()
        .filter_map(|outlet| Some((outlet.node?, outlet.name.as_str())))
        .collect();

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    if let Some(root) = tree.root() {
        write_node(&mut writer, tree, root, &outlets)?;
    }
    let mut html = into_string(writer.into_inner())?;
    html.push('\n');
    Ok(html)
}

/// `a: b; c: d`, in insertion order.
pub fn style_attribute(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(property, value)| format!("{property}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn write_node<W: Write>(
    writer: &mut Writer<W>,
    tree: &DestTree,
    id: NodeId,
    outlets: &BTreeMap<NodeId, &str>,
) -> Result<()> {
    let node = tree.node(id);
    let mut start = BytesStart::new(node.name.as_str());
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if !node.style.is_empty() {
        start.push_attribute(("style", style_attribute(&node.style).as_str()));
    }
    if let Some(name) = outlets.get(&id) {
        start.push_attribute((OUTLET_ATTRIBUTE, *name));
    }

    if VOID_ELEMENTS.contains(&node.name.as_str()) {
        if !node.children.is_empty() || node.text.is_some() {
            log::warn!("<{}> cannot have content; its children are dropped", node.name);
        }
        return writer.write_event(Event::Empty(start)).map_err(xml_error);
    }

    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    if let Some(text) = &node.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_error)?;
    }
    for child in &node.children {
        write_node(writer, tree, *child, outlets)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.name.as_str())))
        .map_err(xml_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translator::Outlet;
    use std::collections::BTreeSet;

    #[test]
    fn test_fragment() {
        let mut tree = DestTree::new("layout/card.xml");
        let root = tree.add_node("div", None);
        tree.set_style(root, "display", "flex");
        tree.set_style(root, "flex-direction", "column");
        let title = tree.add_node("span", Some(root));
        tree.set_text(title, "Tom & Jerry");
        let image = tree.add_node("img", Some(root));
        tree.set_attribute(image, "src", "logo.png");

        let translation = Translation {
            name: "card".to_string(),
            file: "layout/card.xml".to_string(),
            tree,
            outlets: vec![Outlet {
                name: "title".to_string(),
                type_name: "HTMLSpanElement".to_string(),
                node: Some(title),
                optional: false,
            }],
            used_resources: BTreeSet::new(),
            element_count: 3,
            wrapper_count: 0,
            synthetic_count: 0,
        };
        let html = write(&translation).unwrap();

        assert!(html.starts_with(r#"<div style="display: flex; flex-direction: column">"#));
        assert!(html.contains(r#"<span data-outlet="title">Tom &amp; Jerry</span>"#));
        assert!(html.contains(r#"<img src="logo.png"/>"#));
        assert!(html.trim_end().ends_with("</div>"));
    }
}
