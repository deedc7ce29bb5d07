//! Text templates with `~path~` substitutions
//!
//! A template is an alternating sequence of literal text and variable paths.
//! `~~` inside literal text stands for a single `~`. An unterminated variable
//! is kept as literal text, delimiter included, so parsing never fails.
//!
//! Paths are dotted (`parent.halfSize`, `normal.red`) and are walked one
//! segment at a time through values, element scopes and plain text. A path
//! that cannot be walked renders as the empty string.

use crate::resources::ResourceTable;
use crate::source::ElementScope;
use crate::value::{Field, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const DELIMITER: char = '~';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Literal(String),
    Variable(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Template {
    parts: Vec<Part>,
}

impl Template {
    pub fn parse(raw: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut variable: Option<String> = None;
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            if c != DELIMITER {
                match variable.as_mut() {
                    Some(path) => path.push(c),
                    None => literal.push(c),
                }
                continue;
            }
            match variable.take() {
                Some(path) => parts.push(Part::Variable(path)),
                None if chars.peek() == Some(&DELIMITER) => {
                    chars.next();
                    literal.push(DELIMITER);
                }
                None => {
                    if !literal.is_empty() {
                        parts.push(Part::Literal(std::mem::take(&mut literal)));
                    }
                    variable = Some(String::new());
                }
            }
        }

        if let Some(tail) = variable {
            literal.push(DELIMITER);
            literal.push_str(&tail);
        }
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Self { parts }
    }

    pub fn literal(text: &str) -> Self {
        Self::parse(&text.replace(DELIMITER, "~~"))
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn is_literal(&self) -> bool {
        self.parts.iter().all(|p| matches!(p, Part::Literal(_)))
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            Part::Variable(path) => Some(path.as_str()),
            Part::Literal(_) => None,
        })
    }

    /// True when any variable path walks through one of `segments`.
    pub fn refers_to(&self, segments: &[&str]) -> bool {
        self.variables()
            .any(|path| path.split('.').any(|segment| segments.contains(&segment)))
    }

    /// Concatenate literals and resolved variables.
    pub fn write(&self, mut resolve: impl FnMut(&str) -> Option<String>) -> String {
        let mut output = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => output.push_str(text),
                Part::Variable(path) => {
                    if let Some(text) = resolve(path) {
                        output.push_str(&text);
                    } else {
                        log::trace!("Template variable '{}' did not resolve", path);
                    }
                }
            }
        }
        output
    }
}

impl From<String> for Template {
    fn from(raw: String) -> Self {
        Template::parse(&raw)
    }
}

impl From<&str> for Template {
    fn from(raw: &str) -> Self {
        Template::parse(raw)
    }
}

impl From<Template> for String {
    fn from(template: Template) -> Self {
        template.to_string()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                Part::Literal(text) => f.write_str(&text.replace(DELIMITER, "~~"))?,
                Part::Variable(path) => write!(f, "{DELIMITER}{path}{DELIMITER}")?,
            }
        }
        Ok(())
    }
}

/// One step of a path walk.
#[derive(Debug, Clone)]
enum Node<'a> {
    Value(Value),
    Element(&'a ElementScope<'a>),
    Text(String),
}

impl<'a> From<Field> for Node<'a> {
    fn from(field: Field) -> Self {
        match field {
            Field::Value(value) => Node::Value(value),
            Field::Text(text) => Node::Text(text),
        }
    }
}

/// Where the first segment of a path is looked up.
#[derive(Debug, Clone, Copy)]
pub enum Root<'a> {
    /// Element templates: paths start at the element itself.
    Element(&'a ElementScope<'a>),
    /// Attribute templates: paths start at the attribute's value, with
    /// `element`, `parent` and the extra keys reachable by name.
    Value {
        value: &'a Value,
        element: &'a ElementScope<'a>,
        extras: &'a BTreeMap<String, String>,
    },
}

/// Everything a template may read while it is being written.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub resources: &'a ResourceTable,
    /// Project-wide values that win over any path walk, keyed by full path.
    pub overrides: &'a BTreeMap<String, String>,
    pub root: Root<'a>,
}

impl<'a> TemplateContext<'a> {
    pub fn new(
        resources: &'a ResourceTable,
        overrides: &'a BTreeMap<String, String>,
        root: Root<'a>,
    ) -> Self {
        Self {
            resources,
            overrides,
            root,
        }
    }

    pub fn render(&self, template: &Template) -> String {
        template.write(|path| self.resolve(path))
    }

    pub fn resolve(&self, path: &str) -> Option<String> {
        if let Some(text) = self.overrides.get(path) {
            return Some(text.clone());
        }

        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.first_step(first)?;
        for segment in segments {
            node = self.step(node, segment)?;
        }

        Some(match node {
            Node::Value(value) => value.to_string(),
            Node::Text(text) => text,
            Node::Element(scope) => scope.element.id().unwrap_or_default().to_string(),
        })
    }

    fn first_step(&self, segment: &str) -> Option<Node<'a>> {
        match self.root {
            Root::Element(scope) => self.step(Node::Element(scope), segment),
            Root::Value {
                value,
                element,
                extras,
            } => match segment {
                "element" => Some(Node::Element(element)),
                "parent" => element.parent.map(Node::Element),
                "self" => Some(Node::Value(value.clone())),
                _ => match extras.get(segment) {
                    Some(text) => Some(Node::Text(text.clone())),
                    None => value.get(segment).map(Node::from),
                },
            },
        }
    }

    fn step(&self, node: Node<'a>, segment: &str) -> Option<Node<'a>> {
        match node {
            Node::Value(value) => value.get(segment).map(Node::from),
            Node::Text(_) => None,
            Node::Element(scope) => match segment {
                "parent" => scope.parent.map(Node::Element),
                "halfSize" => half_size(self.resources, scope).map(|h| Node::Value(Value::Number(h))),
                "id" => scope.element.id().map(|id| Node::Text(id.to_string())),
                "tag" => Some(Node::Text(scope.element.tag.clone())),
                name => {
                    let raw = scope
                        .attribute(name)
                        .or_else(|| scope.attribute(&format!("android:{name}")))?;
                    match self.resources.read(raw) {
                        Ok(value) => Some(Node::Value(value)),
                        Err(e) => {
                            log::trace!("Template read of '{}' failed: {}", name, e);
                            None
                        }
                    }
                }
            },
        }
    }
}

/// Half of the smaller explicit box dimension of `scope` or, failing that,
/// of its nearest ancestor with one.
pub fn half_size<'a>(resources: &ResourceTable, scope: &'a ElementScope<'a>) -> Option<f64> {
    let explicit = |scope: &ElementScope<'_>, key: &str| {
        scope
            .attribute(key)
            .and_then(|raw| resources.dimension(raw).ok().flatten())
            .map(|d| d.magnitude)
    };
    std::iter::once(scope)
        .chain(scope.ancestors())
        .find_map(|candidate| {
            let width = explicit(candidate, "android:layout_width");
            let height = explicit(candidate, "android:layout_height");
            match (width, height) {
                (Some(w), Some(h)) => Some(w.min(h)),
                (Some(size), None) | (None, Some(size)) => Some(size),
                (None, None) => None,
            }
        })
        .map(|size| size / 2.0)
}
