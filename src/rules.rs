//! Element and attribute rules
//!
//! Rules are authored outside the translator, as TOML (or JSON) documents
//! with two record kinds:
//!
//! ```toml
//! [[element]]
//! id = "TextView"
//! parent = "View"
//! outlet-type = "UILabel"
//! template = { name = "label", attributes = { text = "~text~" } }
//!
//! [[attribute]]
//! id = "android:textColor"
//! element = "TextView"
//! type = "color"
//! emit = [{ path = "color[key=textColor]/red", template = "~red~" }]
//! ```
//!
//! Rules are never replaced. Every rule stays in the registry and the best
//! one is picked at lookup time: element rules by the number of attribute
//! predicates, attribute rules by how narrow their accepted value type is.

use crate::dest::{parse_node_path, parse_path};
use crate::error::{Result, TranslateError};
use crate::source::AttrMap;
use crate::template::Template;
use crate::value::ValueType;
use crate::Target;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Priority bonus of an attribute rule guarded by an exact raw value.
pub const EXACT_VALUE_BONUS: usize = 32;

/// Template segments that depend on the element being translated.
pub const ELEMENT_CONTEXT_SEGMENTS: &[&str] = &["element", "parent", "halfSize"];

/// One atomic attribute predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Any,
    Unset,
    Equals(String),
    Contains(String),
    Not(String),
    DoesNotContain(String),
    /// Never matches.
    Malformed(String),
}

impl Predicate {
    /// Parse `any&not:gone` style conjunctions.
    pub fn parse_all(raw: &str) -> Vec<Predicate> {
        raw.split('&').map(|part| Predicate::parse(part.trim())).collect()
    }

    pub fn parse(raw: &str) -> Predicate {
        let operand = |prefix: &str| -> Option<Predicate> {
            let operand = raw.strip_prefix(prefix)?;
            Some(if operand.is_empty() {
                Predicate::Malformed(raw.to_string())
            } else {
                match prefix {
                    "contains:" => Predicate::Contains(operand.to_string()),
                    "not:" => Predicate::Not(operand.to_string()),
                    _ => Predicate::DoesNotContain(operand.to_string()),
                }
            })
        };
        match raw {
            "" => Predicate::Malformed(String::new()),
            "any" => Predicate::Any,
            "unset" => Predicate::Unset,
            _ => operand("contains:")
                .or_else(|| operand("not:"))
                .or_else(|| operand("doesNotContain:"))
                .unwrap_or_else(|| Predicate::Equals(raw.to_string())),
        }
    }

    /// Evaluate against the attribute value, `None` when absent.
    pub fn holds(&self, value: Option<&str>) -> bool {
        let has_flag = |value: &str, flag: &str| value.split('|').any(|f| f.trim() == flag);
        match self {
            Predicate::Any => value.is_some(),
            Predicate::Unset => value.is_none(),
            Predicate::Equals(expected) => value == Some(expected.as_str()),
            Predicate::Contains(flag) => value.map_or(false, |v| has_flag(v, flag)),
            Predicate::Not(unexpected) => value != Some(unexpected.as_str()),
            Predicate::DoesNotContain(flag) => value.map_or(true, |v| !has_flag(v, flag)),
            Predicate::Malformed(_) => false,
        }
    }
}

/// How an element lays out its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerKind {
    Linear,
    Frame,
    ScrollVertical,
    ScrollHorizontal,
    None,
}

/// The destination element an element rule produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DestinationTemplate {
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Template>,
    #[serde(default)]
    pub style: BTreeMap<String, Template>,
    #[serde(default)]
    pub text: Option<Template>,
    /// Fixed sub-elements created with the element.
    #[serde(default)]
    pub children: Vec<DestinationTemplate>,
    /// Name of the sub-element translated children are placed in.
    #[serde(default)]
    pub holder: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ElementRule {
    /// Source tag this rule translates.
    pub id: String,
    /// Attribute name → predicate conjunction.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub template: Option<DestinationTemplate>,
    #[serde(default)]
    pub container: Option<ContainerKind>,
    #[serde(default)]
    pub auto_wrap_for: Vec<String>,
    #[serde(default)]
    pub outlet_type: Option<String>,
    #[serde(skip)]
    pub origin: String,
    #[serde(skip)]
    predicates: Vec<(String, Predicate)>,
}

impl ElementRule {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            attributes: BTreeMap::new(),
            parent: None,
            template: None,
            container: None,
            auto_wrap_for: Vec::new(),
            outlet_type: None,
            origin: String::new(),
            predicates: Vec::new(),
        }
    }

    pub fn priority(&self) -> usize {
        self.predicates.len()
    }

    fn compile(&mut self) {
        self.predicates = self
            .attributes
            .iter()
            .flat_map(|(name, raw)| {
                Predicate::parse_all(raw)
                    .into_iter()
                    .map(move |predicate| (name.clone(), predicate))
            })
            .collect();
    }

    pub fn matches(&self, attributes: &AttrMap) -> bool {
        self.predicates
            .iter()
            .all(|(name, predicate)| predicate.holds(attributes.get(name).map(String::as_str)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmitKind {
    /// Set the attribute named by the last path segment.
    #[default]
    Attribute,
    /// Set the text of the node at the path.
    Text,
    /// Set a style declaration named by the last path segment.
    Style,
    /// Add a typed runtime attribute whose key path is the last segment.
    Runtime,
    /// Emit once per declared interaction state, with `~state~` available.
    State,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Emission {
    #[serde(default)]
    pub path: Template,
    #[serde(default)]
    pub kind: EmitKind,
    pub template: Template,
    #[serde(default)]
    pub runtime_type: Option<String>,
}

impl Emission {
    /// Paths a stylesheet rule can carry: no selectors, no variables.
    fn has_simple_path(&self) -> bool {
        self.path.is_literal()
            && self
                .path
                .to_string()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '/' || c == '-')
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AttributeRule {
    /// Source attribute name.
    pub id: String,
    /// Element rule id this rule applies to.
    pub element: String,
    #[serde(rename = "type", default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub equals: Option<String>,
    #[serde(default)]
    pub emit: Vec<Emission>,
    #[serde(skip)]
    pub origin: String,
}

impl AttributeRule {
    pub fn new(id: &str, element: &str, value_type: ValueType) -> Self {
        Self {
            id: id.to_string(),
            element: element.to_string(),
            value_type,
            equals: None,
            emit: Vec::new(),
            origin: String::new(),
        }
    }

    pub fn priority(&self) -> usize {
        self.value_type.depth() + if self.equals.is_some() { EXACT_VALUE_BONUS } else { 0 }
    }

    fn is_stylesheet_eligible(&self) -> bool {
        self.emit.iter().all(|emission| {
            emission.kind == EmitKind::Style
                && emission.has_simple_path()
                && !emission.template.refers_to(ELEMENT_CONTEXT_SEGMENTS)
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleDocument {
    #[serde(default)]
    element: Vec<ElementRule>,
    #[serde(default)]
    attribute: Vec<AttributeRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Some(DocumentFormat::Toml),
            Some("json") => Some(DocumentFormat::Json),
            _ => None,
        }
    }
}

const IOS_RULES: &[(&str, &str)] = &[
    ("builtin:ios/views.toml", include_str!("../rules/ios/views.toml")),
    ("builtin:ios/attributes.toml", include_str!("../rules/ios/attributes.toml")),
];

const WEB_RULES: &[(&str, &str)] = &[
    ("builtin:web/views.toml", include_str!("../rules/web/views.toml")),
    ("builtin:web/attributes.toml", include_str!("../rules/web/attributes.toml")),
];

/// All loaded rules, ranked at lookup time.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    elements: BTreeMap<String, Vec<ElementRule>>,
    attributes: BTreeMap<String, Vec<AttributeRule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rule set shipped with the translator for `target`.
    pub fn builtin(target: Target) -> Result<Self> {
        let mut registry = Self::new();
        let documents = match target {
            Target::Ios => IOS_RULES,
            Target::Web => WEB_RULES,
        };
        for (origin, text) in documents {
            registry.load_str(text, origin, DocumentFormat::Toml)?;
        }
        Ok(registry)
    }

    pub fn element_count(&self) -> usize {
        self.elements.values().map(Vec::len).sum()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.values().map(Vec::len).sum()
    }

    /// Element rules, grouped by tag, best first within a tag.
    pub fn element_rules(&self) -> impl Iterator<Item = &ElementRule> {
        self.elements.values().flatten()
    }

    pub fn attribute_rules(&self) -> impl Iterator<Item = &AttributeRule> {
        self.attributes.values().flatten()
    }

    /// Tags with at least one element rule.
    pub fn element_ids(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    pub fn add_element(&mut self, mut rule: ElementRule) {
        rule.compile();
        let rules = self.elements.entry(rule.id.clone()).or_default();
        rules.push(rule);
        // Stable: equal priorities keep registration order.
        rules.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    pub fn add_attribute(&mut self, rule: AttributeRule) {
        let rules = self.attributes.entry(rule.id.clone()).or_default();
        rules.push(rule);
        rules.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Load one rule document. Returns the number of rules added.
    pub fn load_str(&mut self, text: &str, origin: &str, format: DocumentFormat) -> Result<usize> {
        let document: RuleDocument = match format {
            DocumentFormat::Toml => toml::from_str(text).map_err(|e| TranslateError::rule(origin, e.to_string()))?,
            DocumentFormat::Json => {
                serde_json::from_str(text).map_err(|e| TranslateError::rule(origin, e.to_string()))?
            }
        };

        for rule in &document.element {
            validate_element(rule, origin)?;
        }
        for rule in &document.attribute {
            validate_attribute(rule, origin)?;
        }

        let count = document.element.len() + document.attribute.len();
        for mut rule in document.element {
            rule.origin = origin.to_string();
            self.add_element(rule);
        }
        for mut rule in document.attribute {
            rule.origin = origin.to_string();
            self.add_attribute(rule);
        }
        log::debug!("Loaded {} rules from {}", count, origin);
        Ok(count)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let format = DocumentFormat::from_path(path).ok_or_else(|| TranslateError::InvalidFormat {
            message: format!("{} is neither a .toml nor a .json rule document", path.display()),
        })?;
        let text = fs::read_to_string(path)?;
        self.load_str(&text, &path.display().to_string(), format)
    }

    /// Load every `.toml` and `.json` document below `dir`, in path order.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Err(TranslateError::FileNotFound {
                path: dir.display().to_string(),
            });
        }
        let mut count = 0;
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| TranslateError::Io(e.into()))?;
            if entry.file_type().is_file() && DocumentFormat::from_path(entry.path()).is_some() {
                count += self.load_file(entry.path())?;
            }
        }
        Ok(count)
    }

    /// Best element rule for `tag` whose predicates all hold.
    pub fn match_element(&self, tag: &str, attributes: &AttrMap) -> Option<&ElementRule> {
        self.elements
            .get(tag)?
            .iter()
            .find(|rule| rule.matches(attributes))
    }

    /// `rule` followed by its parents, each resolved by best match against
    /// the same attributes. Stops at a missing parent or a repeated id.
    pub fn rule_chain<'r>(&'r self, rule: &'r ElementRule, attributes: &AttrMap) -> Vec<&'r ElementRule> {
        let mut chain = vec![rule];
        let mut seen = BTreeSet::new();
        seen.insert(rule.id.as_str());

        let mut current = rule;
        while let Some(parent) = current.parent.as_deref() {
            if !seen.insert(parent) {
                log::warn!("{}: rule chain of '{}' revisits '{}'", rule.origin, rule.id, parent);
                break;
            }
            match self.match_element(parent, attributes) {
                Some(next) => {
                    chain.push(next);
                    current = next;
                }
                None => {
                    log::trace!("Rule '{}' names parent '{}' which does not match", current.id, parent);
                    break;
                }
            }
        }
        chain
    }

    /// True when any attribute rule is registered for `name`.
    pub fn knows_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Best attribute rule for `name` on element kind `kind`.
    pub fn match_attribute(
        &self,
        kind: &str,
        name: &str,
        value_type: ValueType,
        raw: &str,
    ) -> Option<&AttributeRule> {
        self.attributes.get(name)?.iter().find(|rule| {
            rule.element == kind
                && value_type.is_a(rule.value_type)
                && rule.equals.as_deref().map_or(true, |expected| expected == raw)
        })
    }

    /// True when `name` on `kind` only ever produces plain style
    /// declarations that do not depend on the element.
    pub fn can_be_in_stylesheet(&self, kind: &str, name: &str) -> bool {
        let Some(rules) = self.attributes.get(name) else {
            return false;
        };
        let mut matching = rules.iter().filter(|rule| rule.element == kind).peekable();
        matching.peek().is_some() && matching.all(AttributeRule::is_stylesheet_eligible)
    }
}

fn validate_template(template: &DestinationTemplate, origin: &str, id: &str) -> Result<()> {
    if template.name.is_empty() {
        return Err(TranslateError::rule(origin, format!("element rule '{id}' has a template without a name")));
    }
    template
        .children
        .iter()
        .try_for_each(|child| validate_template(child, origin, id))
}

fn validate_element(rule: &ElementRule, origin: &str) -> Result<()> {
    if rule.id.is_empty() {
        return Err(TranslateError::rule(origin, "element rule without an id"));
    }
    if let Some(template) = &rule.template {
        validate_template(template, origin, &rule.id)?;
    }
    for (name, raw) in &rule.attributes {
        if Predicate::parse_all(raw)
            .iter()
            .any(|p| matches!(p, Predicate::Malformed(_)))
        {
            log::warn!(
                "{}: element rule '{}' has a malformed predicate for {} and will never match",
                origin,
                rule.id,
                name
            );
        }
    }
    Ok(())
}

fn validate_attribute(rule: &AttributeRule, origin: &str) -> Result<()> {
    if rule.id.is_empty() || rule.element.is_empty() {
        return Err(TranslateError::rule(origin, "attribute rule needs both an id and an element"));
    }
    for emission in &rule.emit {
        if !emission.path.is_literal() {
            continue;
        }
        let path = emission.path.write(|_| None);
        let parsed = match emission.kind {
            EmitKind::Text => parse_node_path(&path).map(|_| ()),
            _ => parse_path(&path).map(|_| ()),
        };
        parsed.map_err(|e| TranslateError::rule(origin, format!("attribute rule '{}': {}", rule.id, e)))?;
    }
    Ok(())
}
