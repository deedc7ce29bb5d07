//! Project stylesheet
//!
//! Every project style becomes one `.style-<Name>` class. Only attributes
//! whose rules emit nothing but element-independent style declarations are
//! carried over; everything else stays with the elements that use the style.

use crate::dest::parse_path;
use crate::resources::ResourceTable;
use crate::rules::{EmitKind, RuleRegistry};
use crate::source::{AttrMap, ElementScope, SourceElement};
use crate::template::{Root, TemplateContext};
use std::collections::BTreeMap;

pub const CLASS_PREFIX: &str = "style-";

/// `Theme.Caption` → `style-Theme-Caption`.
pub fn class_name(style: &str) -> String {
    format!("{CLASS_PREFIX}{}", style.replace('.', "-"))
}

pub fn write(registry: &RuleRegistry, resources: &ResourceTable, overrides: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    let mut classes = 0;
    for style in resources.styles.iter() {
        let chain = match resources.styles.chain(&style.name) {
            Ok(chain) => chain,
            Err(e) => {
                log::warn!("Style '{}' left out of the stylesheet: {}", style.name, e);
                continue;
            }
        };

        let declarations: Vec<(String, String)> = chain
            .flatten()
            .iter()
            .flat_map(|(name, raw)| declarations(registry, resources, overrides, name, raw))
            .collect();
        if declarations.is_empty() {
            continue;
        }

        out.push_str(&format!(".{} {{\n", class_name(&style.name)));
        for (property, value) in declarations {
            out.push_str(&format!("  {property}: {value};\n"));
        }
        out.push_str("}\n\n");
        classes += 1;
    }
    log::debug!("Stylesheet has {} classes for {} styles", classes, resources.styles.len());
    out
}

/// The declarations `name="raw"` contributes, using the first element kind
/// on which the attribute is stylesheet-eligible.
fn declarations(
    registry: &RuleRegistry,
    resources: &ResourceTable,
    overrides: &BTreeMap<String, String>,
    name: &str,
    raw: &str,
) -> Vec<(String, String)> {
    let Some(kind) = registry
        .element_ids()
        .find(|kind| registry.can_be_in_stylesheet(kind, name))
    else {
        return Vec::new();
    };
    let value = match resources.read(raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Stylesheet skips {}={}: {}", name, raw, e);
            return Vec::new();
        }
    };
    let Some(rule) = registry.match_attribute(kind, name, value.value_type(), raw) else {
        return Vec::new();
    };

    let element = SourceElement::new(kind);
    let scope = ElementScope::new(&element, AttrMap::new(), None);
    let extras = BTreeMap::new();
    let context = TemplateContext::new(
        resources,
        overrides,
        Root::Value {
            value: &value,
            element: &scope,
            extras: &extras,
        },
    );

    rule.emit
        .iter()
        .filter(|emission| emission.kind == EmitKind::Style)
        .filter_map(|emission| {
            let path = context.render(&emission.path);
            let (_, property) = parse_path(&path).ok()?;
            Some((property?, context.render(&emission.template)))
        })
        .collect()
}
