//! Interface Builder documents

use super::{binding_name, into_string, xml_error};
use crate::dest::{Constraint, DestTree, NodeId, REQUIRED_PRIORITY};
use crate::error::Result;
use crate::resources::ResourceTable;
use crate::translator::Translation;
use crate::value::{format_number, Drawable, Rgba};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::io::{Cursor, Write};

pub const DOCUMENT_TYPE: &str = "com.apple.InterfaceBuilder3.CocoaTouch.XIB";
pub const PLUGIN_ID: &str = "com.apple.InterfaceBuilder.IBCocoaTouchPlugin";
pub const TOOLS_VERSION: &str = "21701";
pub const PLUGIN_VERSION: &str = "21679";
/// Size declared for image resources; IB reads the real size from the asset.
const IMAGE_PLACEHOLDER_SIZE: &str = "16";

type Hosted<'t> = BTreeMap<NodeId, Vec<&'t Constraint>>;

pub fn write(translation: &Translation, resources: &ResourceTable) -> Result<String> {
    let tree = &translation.tree;
    let hosted = tree.hosted_constraints()?;
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 4);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;

    let mut document = BytesStart::new("document");
    document.extend_attributes([
        ("type", DOCUMENT_TYPE),
        ("version", "3.0"),
        ("toolsVersion", TOOLS_VERSION),
        ("targetRuntime", "iOS.CocoaTouch"),
        ("propertyAccessControl", "none"),
        ("useAutolayout", "YES"),
        ("useTraitCollections", "YES"),
        ("colorMatched", "YES"),
    ]);
    writer.write_event(Event::Start(document)).map_err(xml_error)?;

    writer
        .create_element("dependencies")
        .write_inner_content(|w| {
            w.create_element("plugIn")
                .with_attributes([("identifier", PLUGIN_ID), ("version", PLUGIN_VERSION)])
                .write_empty()?;
            Ok::<(), quick_xml::Error>(())
        })
        .map_err(xml_error)?;

    writer
        .write_event(Event::Start(BytesStart::new("objects")))
        .map_err(xml_error)?;
    write_owner(&mut writer, translation)?;
    writer
        .create_element("placeholder")
        .with_attributes([
            ("placeholderIdentifier", "IBFirstResponder"),
            ("id", "-2"),
            ("customClass", "UIResponder"),
        ])
        .write_empty()
        .map_err(xml_error)?;
    if let Some(root) = tree.root() {
        write_node(&mut writer, tree, root, &hosted)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("objects")))
        .map_err(xml_error)?;

    write_resources(&mut writer, translation, resources)?;

    writer
        .write_event(Event::End(BytesEnd::new("document")))
        .map_err(xml_error)?;
    let mut xml = into_string(writer.into_inner())?;
    xml.push('\n');
    Ok(xml)
}

fn write_owner<W: Write>(writer: &mut Writer<W>, translation: &Translation) -> Result<()> {
    let tree = &translation.tree;
    let binding = binding_name(&translation.name);
    let mut owner = BytesStart::new("placeholder");
    owner.extend_attributes([
        ("placeholderIdentifier", "IBFilesOwner"),
        ("id", "-1"),
        ("userLabel", "File's Owner"),
        ("customClass", binding.as_str()),
    ]);

    let connections: Vec<(&str, &str)> = translation
        .outlets
        .iter()
        .filter_map(|outlet| {
            let ident = tree.node(outlet.node?).ident.as_deref()?;
            Some((outlet.name.as_str(), ident))
        })
        .collect();
    if connections.is_empty() {
        return writer.write_event(Event::Empty(owner)).map_err(xml_error);
    }

    writer.write_event(Event::Start(owner)).map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("connections")))
        .map_err(xml_error)?;
    for (index, (property, destination)) in connections.iter().enumerate() {
        let id = format!("{}-outlet-{}", translation.name, index);
        writer
            .create_element("outlet")
            .with_attributes([
                ("property", *property),
                ("destination", *destination),
                ("id", id.as_str()),
            ])
            .write_empty()
            .map_err(xml_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("connections")))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("placeholder")))
        .map_err(xml_error)?;
    Ok(())
}

fn write_node<W: Write>(writer: &mut Writer<W>, tree: &DestTree, id: NodeId, hosted: &Hosted<'_>) -> Result<()> {
    let node = tree.node(id);
    let mut start = BytesStart::new(node.name.as_str());
    if let Some(ident) = &node.ident {
        start.push_attribute(("id", ident.as_str()));
    }
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let constraints = hosted.get(&id);
    if node.children.is_empty() && node.text.is_none() && constraints.is_none() {
        return writer.write_event(Event::Empty(start)).map_err(xml_error);
    }

    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    if let Some(text) = &node.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_error)?;
    }
    for child in &node.children {
        write_node(writer, tree, *child, hosted)?;
    }
    if let Some(constraints) = constraints {
        writer
            .write_event(Event::Start(BytesStart::new("constraints")))
            .map_err(xml_error)?;
        for constraint in constraints {
            writer
                .write_event(Event::Empty(constraint_element(tree, id, constraint)))
                .map_err(xml_error)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("constraints")))
            .map_err(xml_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.name.as_str())))
        .map_err(xml_error)?;
    Ok(())
}

/// The first item is left implicit when it is the host itself.
pub fn constraint_element<'c>(tree: &DestTree, host: NodeId, constraint: &'c Constraint) -> BytesStart<'c> {
    let ident = |node: NodeId| tree.node(node).ident.clone().unwrap_or_default();
    let mut element = BytesStart::new("constraint");
    if constraint.first.node != host {
        element.push_attribute(("firstItem", ident(constraint.first.node).as_str()));
    }
    element.push_attribute(("firstAttribute", constraint.first.attribute.as_str()));
    if let Some(relation) = constraint.relation.as_ib() {
        element.push_attribute(("relation", relation));
    }
    if let Some(second) = constraint.second {
        element.push_attribute(("secondItem", ident(second.node).as_str()));
        element.push_attribute(("secondAttribute", second.attribute.as_str()));
    }
    if constraint.multiplier != 1.0 {
        element.push_attribute(("multiplier", format_number(constraint.multiplier).as_str()));
    }
    if constraint.constant != 0.0 {
        element.push_attribute(("constant", format_number(constraint.constant).as_str()));
    }
    if constraint.priority != REQUIRED_PRIORITY {
        element.push_attribute(("priority", constraint.priority.to_string().as_str()));
    }
    element.push_attribute(("id", constraint.ident.as_str()));
    element
}

fn write_resources<W: Write>(writer: &mut Writer<W>, translation: &Translation, resources: &ResourceTable) -> Result<()> {
    let mut colors: Vec<(&str, Rgba)> = Vec::new();
    let mut images: Vec<&str> = Vec::new();
    for key in &translation.used_resources {
        match key.split_once('/') {
            Some(("color", name)) => {
                let color = resources
                    .colors
                    .get(name)
                    .copied()
                    .or_else(|| resources.color_states.get(name).map(|states| states.normal));
                if let Some(color) = color {
                    colors.push((name, color));
                }
            }
            Some(("drawable", name)) => {
                if let Some(Drawable::Bitmap { .. } | Drawable::Vector { .. }) = resources.drawables.get(name) {
                    images.push(name);
                }
            }
            _ => {}
        }
    }
    if colors.is_empty() && images.is_empty() {
        return Ok(());
    }

    writer
        .write_event(Event::Start(BytesStart::new("resources")))
        .map_err(xml_error)?;
    for name in images {
        writer
            .create_element("image")
            .with_attributes([
                ("name", name),
                ("width", IMAGE_PLACEHOLDER_SIZE),
                ("height", IMAGE_PLACEHOLDER_SIZE),
            ])
            .write_empty()
            .map_err(xml_error)?;
    }
    for (name, color) in colors {
        let channel = |value: u8| format_number(value as f64 / 255.0);
        let (red, green, blue, alpha) = (
            channel(color.red),
            channel(color.green),
            channel(color.blue),
            channel(color.alpha),
        );
        writer
            .create_element("namedColor")
            .with_attribute(("name", name))
            .write_inner_content(|w| {
                w.create_element("color")
                    .with_attributes([
                        ("red", red.as_str()),
                        ("green", green.as_str()),
                        ("blue", blue.as_str()),
                        ("alpha", alpha.as_str()),
                        ("colorSpace", "custom"),
                        ("customColorSpace", "sRGB"),
                    ])
                    .write_empty()?;
                Ok::<(), quick_xml::Error>(())
            })
            .map_err(xml_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("resources")))
        .map_err(xml_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dest::{Anchor, AnchorAttribute};
    use crate::resources::RawResources;
    use crate::rules::DestinationTemplate;
    use crate::template::Template;
    use crate::translator::Outlet;
    use std::collections::BTreeSet;

    fn translation() -> Translation {
        let template = DestinationTemplate {
            name: "view".to_string(),
            holder: Some("subviews".to_string()),
            ..DestinationTemplate::default()
        };
        let render = |t: &Template| t.write(|_| None);
        let mut tree = DestTree::new("layout/main.xml");
        let root = tree.instantiate(&template, None, &render);
        let child = tree.instantiate(&template, Some(root), &render);
        tree.pin(
            Anchor::new(child, AnchorAttribute::Top),
            Anchor::new(root, AnchorAttribute::Top),
            8.0,
        );
        tree.set_to(Anchor::new(child, AnchorAttribute::Height), 44.0, 999);

        Translation {
            name: "main".to_string(),
            file: "layout/main.xml".to_string(),
            tree,
            outlets: vec![Outlet {
                name: "header".to_string(),
                type_name: "UIView".to_string(),
                node: Some(child),
                optional: false,
            }],
            used_resources: BTreeSet::from(["color/accent".to_string()]),
            element_count: 2,
            wrapper_count: 0,
            synthetic_count: 0,
        }
    }

    #[test]
    fn test_document_structure() {
        let resources = RawResources::new().with_color("accent", "#FF8800").resolve().unwrap();
        let xml = write(&translation(), &resources).unwrap();

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(r#"customClass="MainBinding""#));
        assert!(xml.contains(r#"<outlet property="header""#));
        assert!(xml.contains("<subviews>"));
        assert!(xml.contains(r#"<namedColor name="accent">"#));
        assert!(xml.contains(r#"firstAttribute="top""#));
        assert!(xml.contains(r#"constant="8""#));
        assert!(xml.contains(r#"priority="999""#));
    }

    #[test]
    fn test_host_is_left_implicit() {
        let translation = translation();
        let tree = &translation.tree;
        let hosted = tree.hosted_constraints().unwrap();
        let root = tree.root().unwrap();

        for (host, constraints) in &hosted {
            for constraint in constraints {
                let element = constraint_element(tree, *host, constraint);
                let has_first_item = element
                    .attributes()
                    .flatten()
                    .any(|a| a.key.as_ref() == b"firstItem");
                assert_eq!(has_first_item, constraint.first.node != *host);
            }
        }
        assert!(hosted.contains_key(&root));
    }
}
