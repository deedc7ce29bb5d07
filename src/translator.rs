//! Layout translation
//!
//! Walks a source layout top-down. Every element is matched against the
//! element rules, instantiated from its rule chain's template, laid out by
//! its container kind and finally decorated by the attribute rules of the
//! chain. Elements carrying an attribute their rule cannot express directly
//! (`auto-wrap-for`) are split into an outer base view and an inner view.

use crate::dest::{parse_node_path, parse_path, DestTree, NodeId};
use crate::error::{Result, TranslateError};
use crate::layout::{self, Axis, LayoutChild, LayoutParams, Size};
use crate::resources::ResourceTable;
use crate::rules::{AttributeRule, ContainerKind, DestinationTemplate, ElementRule, EmitKind, Emission, RuleRegistry};
use crate::source::{AttrMap, ElementScope, SourceElement, STYLE_ATTRIBUTE};
use crate::template::{Root, Template, TemplateContext};
use crate::value::{camel_case, Value};
use crate::TranslatorOptions;
use std::collections::{BTreeMap, BTreeSet};

pub const RUNTIME_ATTRIBUTES_NODE: &str = "userDefinedRuntimeAttributes";
pub const RUNTIME_ATTRIBUTE_NODE: &str = "userDefinedRuntimeAttribute";
pub const DEFAULT_RUNTIME_TYPE: &str = "string";

/// A named reference from generated binding code into the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outlet {
    pub name: String,
    pub type_name: String,
    /// The outlet's node; `None` for outlets only other variants declare.
    pub node: Option<NodeId>,
    /// Absent from at least one variant of the layout.
    pub optional: bool,
}

/// The result of translating one layout file.
#[derive(Debug, Clone)]
pub struct Translation {
    /// Layout name (file stem).
    pub name: String,
    pub file: String,
    pub tree: DestTree,
    pub outlets: Vec<Outlet>,
    /// `color/x`, `drawable/y`, `font/z` keys of resources the output uses.
    pub used_resources: BTreeSet<String>,
    pub element_count: usize,
    pub wrapper_count: usize,
    pub synthetic_count: usize,
}

impl Translation {
    pub fn constraint_count(&self) -> usize {
        self.tree.constraints().len()
    }

    pub fn outlet(&self, name: &str) -> Option<&Outlet> {
        self.outlets.iter().find(|outlet| outlet.name == name)
    }
}

/// Shared, read-only inputs of a translation run.
pub struct Translator<'a> {
    registry: &'a RuleRegistry,
    resources: &'a ResourceTable,
    options: &'a TranslatorOptions,
    base: Option<DestinationTemplate>,
}

/// What a translated element hands back to its parent.
struct Placed {
    node: NodeId,
    params: LayoutParams,
}

impl<'a> Translator<'a> {
    pub fn new(registry: &'a RuleRegistry, resources: &'a ResourceTable, options: &'a TranslatorOptions) -> Self {
        let base = registry
            .match_element(&options.base_kind, &AttrMap::new())
            .map(|rule| registry.rule_chain(rule, &AttrMap::new()))
            .and_then(|chain| chain.into_iter().find_map(|rule| rule.template.clone()));
        if base.is_none() {
            log::warn!("No template for base kind '{}'; wrappers and spacers are unavailable", options.base_kind);
        }
        Self {
            registry,
            resources,
            options,
            base,
        }
    }

    /// Translate a parsed layout. `file` names the layout file and seeds the
    /// stable identifiers.
    pub fn translate(&self, root: &SourceElement, file: &str) -> Result<Translation> {
        let name = file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(file)
            .split('.')
            .next()
            .unwrap_or(file)
            .to_string();
        log::debug!("Translating {} ({} elements)", file, root.count());

        let mut pass = Pass {
            translator: self,
            file,
            tree: DestTree::new(file),
            outlets: Vec::new(),
            used: BTreeSet::new(),
            elements: 0,
            wrappers: 0,
            synthetic: 0,
        };
        pass.element(root, None, None, [0, 0])?;

        if self.options.target.uses_constraints() {
            // Surfaces constraints whose participants share no ancestor.
            pass.tree.hosted_constraints()?;
        }

        log::debug!(
            "Translated {}: {} nodes, {} constraints, {} outlets",
            file,
            pass.tree.len(),
            pass.tree.constraints().len(),
            pass.outlets.len()
        );
        Ok(Translation {
            name,
            file: file.to_string(),
            tree: pass.tree,
            outlets: pass.outlets,
            used_resources: pass.used,
            element_count: pass.elements,
            wrapper_count: pass.wrappers,
            synthetic_count: pass.synthetic,
        })
    }

    fn base_template(&self) -> Result<&DestinationTemplate> {
        self.base.as_ref().ok_or_else(|| TranslateError::NoElementRule {
            file: "rules".to_string(),
            tag: self.options.base_kind.clone(),
        })
    }
}

/// Mutable state of one file's translation.
struct Pass<'t, 'a> {
    translator: &'t Translator<'a>,
    file: &'t str,
    tree: DestTree,
    outlets: Vec<Outlet>,
    used: BTreeSet<String>,
    elements: usize,
    wrappers: usize,
    synthetic: usize,
}

impl<'t, 'a> Pass<'t, 'a> {
    /// Translate `element` under `parent_node`. `wrap_depth` counts
    /// wrap_content ancestors per axis (horizontal, vertical).
    fn element<'s>(
        &mut self,
        element: &'s SourceElement,
        parent: Option<&'s ElementScope<'s>>,
        parent_node: Option<NodeId>,
        wrap_depth: [usize; 2],
    ) -> Result<Placed> {
        let translator = self.translator;
        let (registry, resources, options) = (translator.registry, translator.resources, translator.options);
        let file = self.file;
        let tag = element.tag.as_str();
        self.elements += 1;

        let merged = resources
            .styles
            .merge_attributes(&element.attributes)
            .map_err(|e| e.within(file, tag, Some(STYLE_ATTRIBUTE)))?;
        let rule = registry
            .match_element(tag, &merged)
            .ok_or_else(|| TranslateError::NoElementRule {
                file: file.to_string(),
                tag: tag.to_string(),
            })?;
        let chain = registry.rule_chain(rule, &merged);
        let template = chain
            .iter()
            .find_map(|rule| rule.template.as_ref())
            .ok_or_else(|| TranslateError::rule(&rule.origin, format!("element rule '{}' has no template", rule.id)))?;

        let wrap_set: BTreeSet<&str> = chain
            .iter()
            .flat_map(|rule| rule.auto_wrap_for.iter().map(String::as_str))
            .collect();
        let (forcing, rest): (AttrMap, AttrMap) = merged
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .partition(|(name, _)| wrap_set.contains(name.as_str()));

        let params = LayoutParams::read(&merged, resources).map_err(|e| e.within(file, tag, None))?;
        let scope = ElementScope::new(element, merged, parent);
        let context = TemplateContext::new(resources, &options.overrides, Root::Element(&scope));
        let render = |template: &Template| context.render(template);
        let constraints = options.target.uses_constraints();

        let (outer, inner) = if forcing.is_empty() {
            let node = self.tree.instantiate(template, parent_node, &render);
            self.apply_attributes(&chain, node, scope.attributes.iter(), &scope)?;
            (node, node)
        } else {
            let base_rule = registry
                .match_element(&options.base_kind, &forcing)
                .ok_or_else(|| TranslateError::NoElementRule {
                    file: file.to_string(),
                    tag: options.base_kind.clone(),
                })?;
            let base_chain = registry.rule_chain(base_rule, &forcing);
            let base_template = base_chain
                .iter()
                .find_map(|rule| rule.template.as_ref())
                .ok_or_else(|| {
                    TranslateError::rule(&base_rule.origin, format!("element rule '{}' has no template", base_rule.id))
                })?;
            log::trace!(
                "Wrapping <{}> for {}",
                tag,
                forcing.keys().cloned().collect::<Vec<_>>().join(", ")
            );

            let outer = self.tree.instantiate(base_template, parent_node, &render);
            let inner = self.tree.instantiate(template, Some(outer), &render);
            self.wrappers += 1;
            self.apply_attributes(&base_chain, outer, forcing.iter(), &scope)?;
            self.apply_attributes(&chain, inner, rest.iter(), &scope)?;

            if constraints {
                let padding = LayoutParams::read(&forcing, resources)
                    .map_err(|e| e.within(file, tag, None))?
                    .padding;
                for axis in [Axis::Horizontal, Axis::Vertical] {
                    layout::pin_edges(&mut self.tree, inner, outer, axis, padding.start(axis), padding.end(axis));
                }
            }
            (outer, inner)
        };

        if let Some(id) = element.id() {
            let type_name = chain
                .iter()
                .find_map(|rule| rule.outlet_type.clone())
                .unwrap_or_else(|| template.name.clone());
            self.outlets.push(Outlet {
                name: camel_case(id),
                type_name,
                node: Some(inner),
                optional: false,
            });
        }

        let mut child_depth = wrap_depth;
        for (slot, axis) in [Axis::Horizontal, Axis::Vertical].into_iter().enumerate() {
            if params.size(axis) == Size::WrapContent {
                if constraints {
                    // The parent arranges the outer node; the inner one still hugs its content.
                    layout::apply_wrap_power(&mut self.tree, outer, axis, wrap_depth[slot]);
                    if inner != outer {
                        layout::apply_wrap_power(&mut self.tree, inner, axis, wrap_depth[slot]);
                    }
                }
                child_depth[slot] += 1;
            }
        }

        let mut children = Vec::with_capacity(element.children.len());
        for child in &element.children {
            let placed = self.element(child, Some(&scope), Some(inner), child_depth)?;
            children.push(LayoutChild {
                node: placed.node,
                params: placed.params,
            });
        }

        let kind = chain
            .iter()
            .find_map(|rule| rule.container)
            .unwrap_or(ContainerKind::None);
        if constraints && !children.is_empty() && kind != ContainerKind::None {
            let base = translator.base_template()?;
            self.synthetic += layout::arrange(kind, &mut self.tree, base, inner, &params, &children)
                .map_err(|e| e.within(file, tag, None))?;
        }

        Ok(Placed { node: outer, params })
    }

    /// Apply the best attribute rule of each attribute to `node`. The chain
    /// is searched in order; the first element kind with a match wins.
    fn apply_attributes<'i>(
        &mut self,
        chain: &[&ElementRule],
        node: NodeId,
        attributes: impl Iterator<Item = (&'i String, &'i String)>,
        scope: &ElementScope<'_>,
    ) -> Result<()> {
        let translator = self.translator;
        let (registry, resources) = (translator.registry, translator.resources);
        let (file, tag) = (self.file, scope.element.tag.as_str());

        for (name, raw) in attributes {
            if name == STYLE_ATTRIBUTE || !registry.knows_attribute(name) {
                log::trace!("No attribute rule for {} on <{}>", name, tag);
                continue;
            }
            let value = resources.read(raw).map_err(|e| e.within(file, tag, Some(name)))?;
            let value_type = value.value_type();
            let Some(rule) = chain
                .iter()
                .find_map(|kind| registry.match_attribute(&kind.id, name, value_type, raw))
            else {
                log::trace!("No attribute rule for {}={} ({}) on <{}>", name, raw, value_type, tag);
                continue;
            };

            self.record_used(&value);
            self.emit(rule, node, &value, scope)
                .map_err(|e| e.within(file, tag, Some(name)))?;
        }
        Ok(())
    }

    fn record_used(&mut self, value: &Value) {
        if let Some(key) = value.resource_key() {
            self.used.insert(key);
        }
        for nested in value.nested() {
            self.record_used(nested);
        }
    }

    fn emit(&mut self, rule: &AttributeRule, node: NodeId, value: &Value, scope: &ElementScope<'_>) -> Result<()> {
        let no_extras = BTreeMap::new();
        for emission in &rule.emit {
            match emission.kind {
                EmitKind::State => {
                    for (state, state_value) in value.state_values() {
                        let extras = BTreeMap::from([("state".to_string(), state.key().to_string())]);
                        self.emit_one(emission, EmitKind::Attribute, node, &state_value, scope, &extras)?;
                    }
                }
                kind => self.emit_one(emission, kind, node, value, scope, &no_extras)?,
            }
        }
        Ok(())
    }

    fn emit_one(
        &mut self,
        emission: &Emission,
        kind: EmitKind,
        node: NodeId,
        value: &Value,
        scope: &ElementScope<'_>,
        extras: &BTreeMap<String, String>,
    ) -> Result<()> {
        let translator = self.translator;
        let context = TemplateContext::new(
            translator.resources,
            &translator.options.overrides,
            Root::Value {
                value,
                element: scope,
                extras,
            },
        );
        let path = context.render(&emission.path);
        let text = context.render(&emission.template);

        match kind {
            EmitKind::Text => {
                let steps = parse_node_path(&path)?;
                let target = self.tree.walk_path(node, &steps);
                self.tree.set_text(target, &text);
            }
            EmitKind::Attribute | EmitKind::State | EmitKind::Style | EmitKind::Runtime => {
                let (steps, last) = parse_path(&path)?;
                let Some(last) = last else {
                    log::warn!("Emission path '{}' names no attribute", path);
                    return Ok(());
                };
                let target = self.tree.walk_path(node, &steps);
                match kind {
                    EmitKind::Style => self.tree.set_style(target, &last, &text),
                    EmitKind::Runtime => {
                        let holder = self.tree.find_or_create_child(target, RUNTIME_ATTRIBUTES_NODE, None);
                        let entry = self
                            .tree
                            .find_or_create_child(holder, RUNTIME_ATTRIBUTE_NODE, Some(("keyPath", last.as_str())));
                        let runtime_type = emission.runtime_type.as_deref().unwrap_or(DEFAULT_RUNTIME_TYPE);
                        self.tree.set_attribute(entry, "type", runtime_type);
                        self.tree.set_attribute(entry, "value", &text);
                    }
                    _ => self.tree.set_attribute(target, &last, &text),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::RawResources;
    use crate::rules::DocumentFormat;
    use crate::source::parse_layout;
    use crate::style::StyleDef;
    use crate::Target;

    const RULES: &str = r#"
[[element]]
id = "View"
outlet-type = "UIView"
template = { name = "view", attributes = { translatesAutoresizingMaskIntoConstraints = "NO" }, holder = "subviews" }

[[element]]
id = "LinearLayout"
parent = "View"
container = "linear"
outlet-type = "UIStackView"
template = { name = "stackView", holder = "subviews" }

[[element]]
id = "TextView"
parent = "View"
outlet-type = "UILabel"
auto-wrap-for = ["android:padding", "android:background"]
template = { name = "label" }

[[element]]
id = "Button"
parent = "View"
outlet-type = "UIButton"
template = { name = "button" }

[[attribute]]
id = "android:text"
element = "TextView"
type = "text"
emit = [{ path = "text", template = "~value~" }]

[[attribute]]
id = "android:textColor"
element = "TextView"
type = "color"
emit = [{ path = "color[key=textColor]/name", template = "~name~" }]

[[attribute]]
id = "android:background"
element = "View"
type = "color"
emit = [{ path = "color[key=backgroundColor]/hex", template = "~hex~" }]

[[attribute]]
id = "android:textColor"
element = "Button"
type = "color"
emit = [{ path = "state[key=~state~]/color[key=titleColor]/hex", kind = "state", template = "~hex~" }]

[[attribute]]
id = "android:contentDescription"
element = "View"
type = "text"
emit = [{ path = "accessibilityLabel", kind = "runtime", template = "~value~" }]
"#;

    fn registry() -> RuleRegistry {
        let mut registry = RuleRegistry::new();
        registry.load_str(RULES, "test.toml", DocumentFormat::Toml).unwrap();
        registry
    }

    fn resources() -> ResourceTable {
        let mut raw = RawResources::new()
            .with_color("ink", "#222222")
            .with_color("paper", "#FAFAFA")
            .with_string("hello", "Hello")
            .with_style(StyleDef::new("Caption", None).with_item("android:textColor", "@color/ink"));
        raw.color_states.insert(
            "button_text".to_string(),
            vec![
                crate::resources::RawStateItem::new(crate::value::InteractionState::Highlighted, "#FF0000"),
                crate::resources::RawStateItem::new(crate::value::InteractionState::Normal, "#000000"),
            ],
        );
        raw.resolve().unwrap()
    }

    fn options() -> TranslatorOptions {
        TranslatorOptions {
            target: Target::Ios,
            ..TranslatorOptions::default()
        }
    }

    fn translate(xml: &str) -> Result<Translation> {
        let registry = registry();
        let resources = resources();
        let options = options();
        let root = parse_layout(xml, "main.xml")?;
        Translator::new(&registry, &resources, &options).translate(&root, "main.xml")
    }

    const NS: &str = r#"xmlns:android="http://schemas.android.com/apk/res/android""#;

    #[test]
    fn test_single_leaf_gives_single_node() {
        let translation = translate(&format!(r#"<TextView {NS} android:text="@string/hello"/>"#)).unwrap();
        let tree = &translation.tree;
        let root = tree.root().unwrap();
        assert_eq!(tree.node(root).name, "label");
        assert_eq!(tree.node(root).attribute("text"), Some("Hello"));
        assert_eq!(tree.len(), 1);
        assert_eq!(translation.element_count, 1);
        assert_eq!(translation.wrapper_count, 0);
    }

    #[test]
    fn test_translation_is_deterministic() {
        let xml = format!(
            r#"<LinearLayout {NS} android:orientation="vertical" android:layout_width="match_parent" android:layout_height="match_parent">
                <TextView android:id="@+id/title" android:text="A" android:layout_marginTop="8dp"/>
                <TextView android:text="B" android:layout_gravity="end"/>
            </LinearLayout>"#
        );
        let a = translate(&xml).unwrap();
        let b = translate(&xml).unwrap();
        let idents = |t: &Translation| {
            t.tree
                .walk()
                .into_iter()
                .map(|id| t.tree.node(id).ident.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(idents(&a), idents(&b));
        assert_eq!(a.tree.constraints(), b.tree.constraints());
        assert_eq!(a.outlets, b.outlets);
    }

    #[test]
    fn test_style_and_outlets() {
        let translation = translate(&format!(
            r#"<TextView {NS} android:id="@+id/caption_text" style="@style/Caption" android:text="x"/>"#
        ))
        .unwrap();
        let outlet = translation.outlet("captionText").unwrap();
        assert_eq!(outlet.type_name, "UILabel");
        let tree = &translation.tree;
        let color = tree.node(outlet.node.unwrap()).children[0];
        assert_eq!(tree.node(color).attribute("key"), Some("textColor"));
        assert_eq!(tree.node(color).attribute("name"), Some("ink"));
        assert!(translation.used_resources.contains("color/ink"));
    }

    #[test]
    fn test_forcing_attribute_wraps_element() {
        let translation = translate(&format!(
            r#"<TextView {NS} android:id="@+id/badge" android:padding="4dp" android:background="@color/paper" android:text="x"/>"#
        ))
        .unwrap();
        let tree = &translation.tree;
        let outer = tree.root().unwrap();
        assert_eq!(tree.node(outer).name, "view");
        assert_eq!(translation.wrapper_count, 1);

        let inner = translation.outlet("badge").unwrap().node.unwrap();
        assert_eq!(tree.node(inner).name, "label");
        assert_eq!(tree.node(inner).parent, Some(tree.content_of(outer)));
        assert_eq!(tree.node(inner).attribute("text"), Some("x"));

        let background = tree.node(outer).children.iter().copied().find(|c| tree.node(*c).name == "color");
        assert!(background.is_some());
        let pins: Vec<f64> = tree.constraints().iter().map(|c| c.constant).collect();
        assert_eq!(pins, vec![4.0, 4.0, 4.0, 4.0]);
    }

    #[test]
    fn test_state_emission_per_state() {
        let translation = translate(&format!(r#"<Button {NS} android:textColor="@color/button_text"/>"#)).unwrap();
        let tree = &translation.tree;
        let root = tree.root().unwrap();
        let states: Vec<&str> = tree
            .node(root)
            .children
            .iter()
            .filter_map(|c| tree.node(*c).attribute("key"))
            .collect();
        assert!(states.contains(&"normal"));
        assert!(states.contains(&"highlighted"));
    }

    #[test]
    fn test_runtime_attribute() {
        let translation = translate(&format!(r#"<Button {NS} android:contentDescription="Send"/>"#)).unwrap();
        let tree = &translation.tree;
        let holder = tree.node(tree.root().unwrap()).children[0];
        assert_eq!(tree.node(holder).name, RUNTIME_ATTRIBUTES_NODE);
        let entry = tree.node(holder).children[0];
        assert_eq!(tree.node(entry).attribute("keyPath"), Some("accessibilityLabel"));
        assert_eq!(tree.node(entry).attribute("type"), Some("string"));
        assert_eq!(tree.node(entry).attribute("value"), Some("Send"));
    }

    #[test]
    fn test_unknown_tag_and_missing_reference() {
        let err = translate(&format!(r#"<LinearLayout {NS}><CalendarView/></LinearLayout>"#)).unwrap_err();
        assert!(matches!(err, TranslateError::NoElementRule { ref tag, .. } if tag == "CalendarView"));

        let err = translate(&format!(r#"<TextView {NS} android:textColor="@color/missing"/>"#)).unwrap_err();
        assert!(matches!(err, TranslateError::Context { ref attribute, .. } if attribute.as_deref() == Some("android:textColor")));
    }

    #[test]
    fn test_wrap_content_priority_by_depth() {
        let translation = translate(&format!(
            r#"<LinearLayout {NS} android:layout_width="wrap_content" android:layout_height="wrap_content">
                <TextView android:id="@+id/label" android:layout_width="wrap_content" android:layout_height="wrap_content"/>
            </LinearLayout>"#
        ))
        .unwrap();
        let tree = &translation.tree;
        let root = tree.root().unwrap();
        let label = translation.outlet("label").unwrap().node.unwrap();
        assert_eq!(tree.node(root).attribute("horizontalHuggingPriority"), Some("998"));
        assert_eq!(tree.node(label).attribute("horizontalHuggingPriority"), Some("996"));
        assert_eq!(tree.node(label).attribute("verticalCompressionResistancePriority"), Some("996"));
    }

    #[test]
    fn test_wrapped_element_carries_wrap_priority_outside() {
        let translation = translate(&format!(
            r#"<LinearLayout {NS} android:layout_width="wrap_content" android:layout_height="wrap_content">
                <TextView android:id="@+id/badge" android:padding="4dp" android:layout_width="wrap_content" android:layout_height="wrap_content"/>
            </LinearLayout>"#
        ))
        .unwrap();
        let tree = &translation.tree;
        let root = tree.root().unwrap();
        let inner = translation.outlet("badge").unwrap().node.unwrap();
        let outer = tree.node(tree.node(inner).parent.unwrap()).parent.unwrap();
        assert_eq!(tree.node(outer).name, "view");
        assert_eq!(tree.node(outer).parent, Some(tree.content_of(root)));

        for node in [outer, inner] {
            assert_eq!(tree.node(node).attribute("horizontalHuggingPriority"), Some("996"));
            assert_eq!(tree.node(node).attribute("verticalCompressionResistancePriority"), Some("996"));
        }
    }
}
