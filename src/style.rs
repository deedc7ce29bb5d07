//! Style inheritance and cascading attribute lookup
//!
//! A style is a flat map of attribute entries plus an optional parent. Looking
//! an entry up walks the chain front to back: the style itself, then its
//! parent, then the parent's parent. Element attributes are layered on top of
//! that chain so an explicit attribute always shadows a styled one.

use crate::error::{Result, TranslateError};
use crate::source::AttrMap;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDef {
    pub name: String,
    pub parent: Option<String>,
    pub items: AttrMap,
}

impl StyleDef {
    pub fn new(name: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_string),
            items: AttrMap::new(),
        }
    }

    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }
}

/// Strip the `@style/` / `@android:style/` prefix of a parent reference.
pub fn style_name(reference: &str) -> &str {
    reference
        .strip_prefix("@style/")
        .or_else(|| reference.strip_prefix("@android:style/"))
        .or_else(|| reference.strip_prefix("android:"))
        .unwrap_or(reference)
}

/// All styles of a project, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: BTreeMap<String, StyleDef>,
}

/// Read-through view over a style and its ancestors.
#[derive(Debug, Clone)]
pub struct ChainedStyle<'a> {
    layers: Vec<&'a StyleDef>,
}

impl<'a> ChainedStyle<'a> {
    /// First hit scanning the chain front to back.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.layers
            .iter()
            .find_map(|layer| layer.items.get(key))
            .map(String::as_str)
    }

    /// Names of the styles in the chain, most specific first.
    pub fn names(&self) -> Vec<&'a str> {
        self.layers.iter().map(|layer| layer.name.as_str()).collect()
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Every key set anywhere in the chain with its winning value.
    pub fn flatten(&self) -> AttrMap {
        let mut merged = AttrMap::new();
        for layer in self.layers.iter().rev() {
            for (key, value) in &layer.items {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, style: StyleDef) {
        if self.styles.contains_key(&style.name) {
            log::warn!("Style '{}' redefined; the later definition wins", style.name);
        }
        self.styles.insert(style.name.clone(), style);
    }

    pub fn get(&self, name: &str) -> Option<&StyleDef> {
        self.styles.get(style_name(name))
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleDef> {
        self.styles.values()
    }

    /// Build the lookup chain for `name`.
    ///
    /// A missing style is an unresolved reference. A missing parent ends the
    /// chain quietly, since parents frequently live in platform or library
    /// themes that are not part of the project. A parent cycle is an error.
    pub fn chain(&self, name: &str) -> Result<ChainedStyle<'_>> {
        let first = self.get(name).ok_or_else(|| {
            TranslateError::unresolved(format!("@style/{}", style_name(name)), "no such style")
        })?;

        let mut layers = vec![first];
        let mut visited = BTreeSet::new();
        visited.insert(first.name.as_str());

        let mut current = first;
        while let Some(parent_name) = current.parent.as_deref() {
            let parent_name = style_name(parent_name);
            if visited.contains(parent_name) {
                return Err(TranslateError::style(format!(
                    "Circular style inheritance: {} -> {}",
                    layers
                        .iter()
                        .map(|l| l.name.as_str())
                        .collect::<Vec<_>>()
                        .join(" -> "),
                    parent_name
                )));
            }
            match self.styles.get(parent_name) {
                Some(parent) => {
                    visited.insert(parent.name.as_str());
                    layers.push(parent);
                    current = parent;
                }
                None => {
                    log::debug!(
                        "Style '{}' extends '{}' which is not part of the project",
                        current.name,
                        parent_name
                    );
                    break;
                }
            }
        }

        Ok(ChainedStyle { layers })
    }

    /// Own attributes layered over the chain of the referenced style.
    ///
    /// The `style` attribute itself is kept so rules can still see it.
    pub fn merge_attributes(&self, own: &AttrMap) -> Result<AttrMap> {
        let Some(reference) = own.get(crate::source::STYLE_ATTRIBUTE) else {
            return Ok(own.clone());
        };
        let chain = self.chain(reference)?;
        let mut merged = chain.flatten();
        for (key, value) in own {
            merged.insert(key.clone(), value.clone());
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> StyleSheet {
        let mut sheet = StyleSheet::new();
        sheet.insert(
            StyleDef::new("Base", Some("Theme.MaterialComponents"))
                .with_item("android:textColor", "#000000")
                .with_item("android:textSize", "14sp")
                .with_item("android:padding", "4dp"),
        );
        sheet.insert(
            StyleDef::new("Title", Some("@style/Base"))
                .with_item("android:textSize", "20sp"),
        );
        sheet.insert(StyleDef::new("Title.Large", Some("Title")).with_item("android:textSize", "28sp"));
        sheet
    }

    #[test]
    fn test_chained_lookup_front_to_back() {
        let sheet = sheet();
        let chain = sheet.chain("@style/Title.Large").unwrap();

        assert_eq!(chain.names(), vec!["Title.Large", "Title", "Base"]);
        assert_eq!(chain.get("android:textSize"), Some("28sp"));
        assert_eq!(chain.get("android:textColor"), Some("#000000"));
        assert_eq!(chain.get("android:background"), None);
    }

    #[test]
    fn test_explicit_attributes_shadow_style_at_any_depth() {
        let sheet = sheet();
        let mut own = AttrMap::new();
        own.insert("style".to_string(), "@style/Title.Large".to_string());
        own.insert("android:textColor".to_string(), "#FF0000".to_string());
        own.insert("android:textSize".to_string(), "9sp".to_string());

        let merged = sheet.merge_attributes(&own).unwrap();
        assert_eq!(merged["android:textColor"], "#FF0000");
        assert_eq!(merged["android:textSize"], "9sp");
        assert_eq!(merged["android:padding"], "4dp");
    }

    #[test]
    fn test_missing_style_is_unresolved() {
        let sheet = sheet();
        let err = sheet.chain("@style/Nope").unwrap_err();
        assert!(matches!(err, TranslateError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_circular_inheritance_detection() {
        let mut sheet = StyleSheet::new();
        sheet.insert(StyleDef::new("a", Some("b")));
        sheet.insert(StyleDef::new("b", Some("c")));
        sheet.insert(StyleDef::new("c", Some("a")));

        let result = sheet.chain("a");
        assert!(matches!(result, Err(TranslateError::Style { .. })));
    }
}
