//! Destination trees and anchor constraints
//!
//! The tree being generated is an arena of attributed nodes addressed by
//! [`NodeId`]. Constraints are recorded in a flat list while the tree is still
//! growing and are only assigned to a host node (the nearest common ancestor
//! of their participants) when the tree is serialized.

use crate::error::{Result, TranslateError};
use crate::rules::DestinationTemplate;
use crate::template::Template;
use crate::value::format_number;
use std::collections::BTreeMap;
use std::fmt;

pub const REQUIRED_PRIORITY: u16 = 1000;
/// Priority of an explicit size that a min-size attribute may override.
pub const YIELDING_PRIORITY: u16 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnchorAttribute {
    Top,
    Bottom,
    Leading,
    Trailing,
    Width,
    Height,
    CenterX,
    CenterY,
}

impl AnchorAttribute {
    pub fn as_str(self) -> &'static str {
        match self {
            AnchorAttribute::Top => "top",
            AnchorAttribute::Bottom => "bottom",
            AnchorAttribute::Leading => "leading",
            AnchorAttribute::Trailing => "trailing",
            AnchorAttribute::Width => "width",
            AnchorAttribute::Height => "height",
            AnchorAttribute::CenterX => "centerX",
            AnchorAttribute::CenterY => "centerY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub node: NodeId,
    pub attribute: AnchorAttribute,
}

impl Anchor {
    pub fn new(node: NodeId, attribute: AnchorAttribute) -> Self {
        Self { node, attribute }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equal,
    GreaterOrEqual,
    LessOrEqual,
}

impl Relation {
    /// IB spelling; `None` for the implicit equality.
    pub fn as_ib(self) -> Option<&'static str> {
        match self {
            Relation::Equal => None,
            Relation::GreaterOrEqual => Some("greaterThanOrEqual"),
            Relation::LessOrEqual => Some("lessThanOrEqual"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub first: Anchor,
    pub second: Option<Anchor>,
    pub relation: Relation,
    pub constant: f64,
    pub multiplier: f64,
    pub priority: u16,
    pub ident: String,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.first.node.0, self.first.attribute.as_str())?;
        match self.relation {
            Relation::Equal => f.write_str(" == ")?,
            Relation::GreaterOrEqual => f.write_str(" >= ")?,
            Relation::LessOrEqual => f.write_str(" <= ")?,
        }
        if let Some(second) = self.second {
            write!(f, "#{}.{}", second.node.0, second.attribute.as_str())?;
            if self.multiplier != 1.0 {
                write!(f, " * {}", format_number(self.multiplier))?;
            }
            if self.constant != 0.0 {
                write!(f, " + {}", format_number(self.constant))?;
            }
        } else {
            f.write_str(&format_number(self.constant))?;
        }
        if self.priority != REQUIRED_PRIORITY {
            write!(f, " @{}", self.priority)?;
        }
        Ok(())
    }
}

/// Stable object identifiers in Interface Builder's `xxx-xx-xxx` shape.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    counter: u64,
}

impl IdGenerator {
    pub fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            counter: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.counter += 1;
        let digest = md5::compute(format!("{}:{}", self.seed, self.counter));
        let hex = hex::encode(digest.0);
        format!("{}-{}-{}", &hex[0..3], &hex[3..5], &hex[5..8])
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestNode {
    pub name: String,
    pub ident: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub style: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Where children of this node go; itself when `None`.
    pub content: Option<NodeId>,
    /// True for structural wrappers such as IB's `<subviews>`.
    pub holder: bool,
}

impl DestNode {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn set_entry(entries: &mut Vec<(String, String)>, key: &str, value: &str) {
    match entries.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value.to_string(),
        None => entries.push((key.to_string(), value.to_string())),
    }
}

/// One step of an emission path: `name` or `name[key=value]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub name: String,
    pub key: Option<(String, String)>,
}

/// Split `a/b[key=c]/attr` into node steps and the final attribute name.
pub fn parse_path(path: &str) -> Result<(Vec<PathStep>, Option<String>)> {
    if path.is_empty() {
        return Ok((Vec::new(), None));
    }
    let mut segments: Vec<&str> = path.split('/').collect();
    let last = segments.pop().map(str::to_string);
    let steps = segments
        .into_iter()
        .map(|segment| parse_step(segment, path))
        .collect::<Result<Vec<_>>>()?;
    Ok((steps, last.filter(|name| !name.is_empty())))
}

/// Parse every segment of `path` as a node step.
pub fn parse_node_path(path: &str) -> Result<Vec<PathStep>> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| parse_step(segment, path))
        .collect()
}

fn parse_step(segment: &str, path: &str) -> Result<PathStep> {
    let malformed = || TranslateError::rule("emission path", format!("malformed path '{path}'"));
    match segment.split_once('[') {
        None if segment.contains(']') || segment.is_empty() => Err(malformed()),
        None => Ok(PathStep {
            name: segment.to_string(),
            key: None,
        }),
        Some((name, rest)) => {
            let selector = rest.strip_suffix(']').ok_or_else(malformed)?;
            let (key, value) = selector.split_once('=').ok_or_else(malformed)?;
            if name.is_empty() || key.is_empty() {
                return Err(malformed());
            }
            Ok(PathStep {
                name: name.to_string(),
                key: Some((key.to_string(), value.to_string())),
            })
        }
    }
}

/// The tree generated for one layout file.
#[derive(Debug, Clone)]
pub struct DestTree {
    nodes: Vec<DestNode>,
    root: Option<NodeId>,
    constraints: Vec<Constraint>,
    ids: IdGenerator,
}

impl DestTree {
    pub fn new(seed: &str) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            constraints: Vec::new(),
            ids: IdGenerator::new(seed),
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &DestNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut DestNode {
        &mut self.nodes[id.0]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn next_ident(&mut self) -> String {
        self.ids.next_id()
    }

    /// Append a node under `parent`'s content node, or as the root.
    pub fn add_node(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = parent.map(|p| self.content_of(p));
        self.nodes.push(DestNode {
            name: name.to_string(),
            parent,
            ..DestNode::default()
        });
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None if self.root.is_none() => self.root = Some(id),
            None => {}
        }
        id
    }

    /// Append a node exactly under `parent`, bypassing its content node.
    fn add_raw_child(&mut self, name: &str, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DestNode {
            name: name.to_string(),
            parent: Some(parent),
            ..DestNode::default()
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Build a node from a destination template, rendering its attribute
    /// and text templates with `render`.
    pub fn instantiate(
        &mut self,
        template: &DestinationTemplate,
        parent: Option<NodeId>,
        render: &dyn Fn(&Template) -> String,
    ) -> NodeId {
        let id = self.add_node(&template.name, parent);
        self.fill(id, template, render);
        let ident = self.next_ident();
        self.nodes[id.0].ident = Some(ident);
        id
    }

    fn fill(&mut self, id: NodeId, template: &DestinationTemplate, render: &dyn Fn(&Template) -> String) {
        for (key, value) in &template.attributes {
            let value = render(value);
            self.set_attribute(id, key, &value);
        }
        for (key, value) in &template.style {
            let value = render(value);
            self.set_style(id, key, &value);
        }
        if let Some(text) = &template.text {
            self.nodes[id.0].text = Some(render(text));
        }
        for child in &template.children {
            let child_id = self.add_raw_child(&child.name, id);
            self.fill(child_id, child, render);
        }
        if let Some(holder) = &template.holder {
            let holder_id = self.find_or_create_child(id, holder, None);
            self.nodes[holder_id.0].holder = true;
            self.nodes[id.0].content = Some(holder_id);
        }
    }

    /// The node children of `id` are appended to.
    pub fn content_of(&self, id: NodeId) -> NodeId {
        self.nodes[id.0].content.unwrap_or(id)
    }

    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: &str) {
        set_entry(&mut self.nodes[id.0].attributes, key, value);
    }

    pub fn set_style(&mut self, id: NodeId, key: &str, value: &str) {
        set_entry(&mut self.nodes[id.0].style, key, value);
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.nodes[id.0].text = Some(text.to_string());
    }

    /// Find a direct child named `name` (and carrying `key` when given),
    /// creating it at the end when absent.
    pub fn find_or_create_child(
        &mut self,
        parent: NodeId,
        name: &str,
        key: Option<(&str, &str)>,
    ) -> NodeId {
        let existing = self.nodes[parent.0].children.iter().copied().find(|child| {
            let node = &self.nodes[child.0];
            node.name == name
                && key.map_or(true, |(k, v)| node.attribute(k) == Some(v))
        });
        if let Some(existing) = existing {
            return existing;
        }
        let id = self.add_raw_child(name, parent);
        if let Some((k, v)) = key {
            self.set_attribute(id, k, v);
        }
        id
    }

    /// Walk `steps` from `start`, creating nodes as needed.
    pub fn walk_path(&mut self, start: NodeId, steps: &[PathStep]) -> NodeId {
        steps.iter().fold(start, |node, step| {
            let key = step.key.as_ref().map(|(k, v)| (k.as_str(), v.as_str()));
            self.find_or_create_child(node, &step.name, key)
        })
    }

    /// Move `child` under `new_parent`'s content node, at the end.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) {
        let target = self.content_of(new_parent);
        if let Some(old) = self.nodes[child.0].parent {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(target);
        self.nodes[target.0].children.push(child);
    }

    /// Replace the content children of `parent` with `children`, in order.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        let target = self.content_of(parent);
        for child in &children {
            if let Some(old) = self.nodes[child.0].parent {
                if old != target {
                    self.nodes[old.0].children.retain(|c| c != child);
                }
            }
            self.nodes[child.0].parent = Some(target);
        }
        self.nodes[target.0].children = children;
    }

    pub fn depth(&self, id: NodeId) -> usize {
        std::iter::successors(self.nodes[id.0].parent, |p| self.nodes[p.0].parent).count()
    }

    /// Nearest node that is an ancestor-or-self of both `a` and `b`.
    pub fn nearest_common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let (mut a, mut b) = (a, b);
        let (mut depth_a, mut depth_b) = (self.depth(a), self.depth(b));
        while depth_a > depth_b {
            a = self.nodes[a.0].parent?;
            depth_a -= 1;
        }
        while depth_b > depth_a {
            b = self.nodes[b.0].parent?;
            depth_b -= 1;
        }
        while a != b {
            a = self.nodes[a.0].parent?;
            b = self.nodes[b.0].parent?;
        }
        Some(a)
    }

    /// Record `first = second * multiplier + constant`.
    pub fn constraint(
        &mut self,
        first: Anchor,
        second: Anchor,
        relation: Relation,
        constant: f64,
        multiplier: f64,
    ) -> usize {
        let ident = self.next_ident();
        self.constraints.push(Constraint {
            first,
            second: Some(second),
            relation,
            constant,
            multiplier,
            priority: REQUIRED_PRIORITY,
            ident,
        });
        self.constraints.len() - 1
    }

    /// Shorthand for an equality with multiplier one.
    pub fn pin(&mut self, first: Anchor, second: Anchor, constant: f64) -> usize {
        self.constraint(first, second, Relation::Equal, constant, 1.0)
    }

    /// Record a unary `anchor = constant` constraint.
    pub fn set_to(&mut self, anchor: Anchor, constant: f64, priority: u16) -> usize {
        self.unary(anchor, Relation::Equal, constant, priority)
    }

    /// Record a unary `anchor >= constant` constraint.
    pub fn at_least(&mut self, anchor: Anchor, constant: f64) -> usize {
        self.unary(anchor, Relation::GreaterOrEqual, constant, REQUIRED_PRIORITY)
    }

    fn unary(&mut self, anchor: Anchor, relation: Relation, constant: f64, priority: u16) -> usize {
        let ident = self.next_ident();
        self.constraints.push(Constraint {
            first: anchor,
            second: None,
            relation,
            constant,
            multiplier: 1.0,
            priority,
            ident,
        });
        self.constraints.len() - 1
    }

    pub fn set_priority(&mut self, index: usize, priority: u16) {
        if let Some(constraint) = self.constraints.get_mut(index) {
            constraint.priority = priority;
        }
    }

    /// The node a constraint is serialized under.
    pub fn host_of(&self, constraint: &Constraint) -> Result<NodeId> {
        let Some(second) = constraint.second else {
            return Ok(constraint.first.node);
        };
        let ancestor = self
            .nearest_common_ancestor(constraint.first.node, second.node)
            .ok_or_else(|| {
                TranslateError::layout(
                    self.ids.seed.clone(),
                    format!("constraint {} joins nodes of different trees", constraint),
                )
            })?;
        Ok(match self.nodes[ancestor.0].holder {
            true => self.nodes[ancestor.0].parent.unwrap_or(ancestor),
            false => ancestor,
        })
    }

    /// Constraints grouped by host, in recording order.
    pub fn hosted_constraints(&self) -> Result<BTreeMap<NodeId, Vec<&Constraint>>> {
        let mut hosted: BTreeMap<NodeId, Vec<&Constraint>> = BTreeMap::new();
        for constraint in &self.constraints {
            let host = self.host_of(constraint)?;
            hosted.entry(host).or_default().push(constraint);
        }
        Ok(hosted)
    }

    /// Depth-first pre-order walk from the root.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut pending: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = pending.pop() {
            order.push(id);
            pending.extend(self.nodes[id.0].children.iter().rev());
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder_template(name: &str) -> DestinationTemplate {
        DestinationTemplate {
            name: name.to_string(),
            holder: Some("subviews".to_string()),
            ..DestinationTemplate::default()
        }
    }

    fn render(template: &Template) -> String {
        template.write(|_| None)
    }

    #[test]
    fn test_ids_are_stable_and_ib_shaped() {
        let mut a = IdGenerator::new("main.xml");
        let mut b = IdGenerator::new("main.xml");
        let first = a.next_id();
        assert_eq!(first, b.next_id());
        assert_eq!(first.len(), 10);
        assert_eq!(first.matches('-').count(), 2);
        assert_ne!(first, a.next_id());
    }

    #[test]
    fn test_children_go_into_holder() {
        let mut tree = DestTree::new("t");
        let root = tree.instantiate(&holder_template("view"), None, &render);
        let child = tree.instantiate(&holder_template("view"), Some(root), &render);

        let holder = tree.content_of(root);
        assert_ne!(holder, root);
        assert_eq!(tree.node(holder).name, "subviews");
        assert_eq!(tree.node(child).parent, Some(holder));
        assert_eq!(tree.depth(child), 2);
    }

    #[test]
    fn test_constraints_attach_to_nearest_common_ancestor() {
        let mut tree = DestTree::new("t");
        let root = tree.instantiate(&holder_template("view"), None, &render);
        let left = tree.instantiate(&holder_template("view"), Some(root), &render);
        let right = tree.instantiate(&holder_template("view"), Some(root), &render);
        let nested = tree.instantiate(&holder_template("view"), Some(left), &render);

        tree.pin(Anchor::new(nested, AnchorAttribute::Top), Anchor::new(right, AnchorAttribute::Top), 0.0);
        tree.pin(Anchor::new(nested, AnchorAttribute::Leading), Anchor::new(left, AnchorAttribute::Leading), 8.0);
        tree.pin(Anchor::new(root, AnchorAttribute::Top), Anchor::new(left, AnchorAttribute::Top), 0.0);
        tree.set_to(Anchor::new(right, AnchorAttribute::Width), 40.0, REQUIRED_PRIORITY);

        let hosts: Vec<NodeId> = tree
            .constraints()
            .iter()
            .map(|c| tree.host_of(c).unwrap())
            .collect();
        // Holder nodes redirect to their owner.
        assert_eq!(hosts, vec![root, left, root, right]);
        for (constraint, host) in tree.constraints().iter().zip(&hosts) {
            let second = constraint.second.map_or(constraint.first.node, |s| s.node);
            for participant in [constraint.first.node, second] {
                let ancestor = tree.nearest_common_ancestor(*host, participant);
                assert_eq!(ancestor, Some(*host));
            }
        }
    }

    #[test]
    fn test_detached_participants_are_a_layout_error() {
        let mut tree = DestTree::new("t");
        let root = tree.add_node("view", None);
        let stray = tree.add_node("view", None);
        tree.pin(Anchor::new(root, AnchorAttribute::Top), Anchor::new(stray, AnchorAttribute::Top), 0.0);
        assert!(matches!(tree.hosted_constraints(), Err(TranslateError::Layout { .. })));
    }

    #[test]
    fn test_paths() {
        let (steps, last) = parse_path("color[key=textColor]/red").unwrap();
        assert_eq!(steps[0].name, "color");
        assert_eq!(steps[0].key, Some(("key".to_string(), "textColor".to_string())));
        assert_eq!(last.as_deref(), Some("red"));
        assert!(parse_path("color[key/red").is_err());

        let mut tree = DestTree::new("t");
        let root = tree.add_node("label", None);
        let a = tree.walk_path(root, &steps);
        let b = tree.walk_path(root, &steps);
        assert_eq!(a, b);
        assert_eq!(tree.node(a).attribute("key"), Some("textColor"));
    }

    #[test]
    fn test_reparent_and_reorder() {
        let mut tree = DestTree::new("t");
        let root = tree.add_node("view", None);
        let a = tree.add_node("a", Some(root));
        let b = tree.add_node("b", Some(root));
        let wrapper = tree.add_node("wrapper", Some(root));
        tree.reparent(a, wrapper);
        assert_eq!(tree.node(root).children, vec![b, wrapper]);
        tree.set_children(root, vec![wrapper, b]);
        assert_eq!(tree.node(root).children, vec![wrapper, b]);
        assert_eq!(tree.walk(), vec![root, wrapper, a, b]);
    }
}
