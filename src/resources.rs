//! Resource collection and resolution
//!
//! Resources are gathered raw (strings exactly as they appear in the `res/`
//! tree) into [`RawResources`], then resolved in one pass into an immutable
//! [`ResourceTable`]. Forward references between resources are allowed; cycles
//! are reported with the full reference path.
//!
//! Attribute values are classified by [`ResourceTable::read`] in a fixed order:
//!
//! 1. theme attribute (`?attr/name`, `?android:attr/name`, `?name`)
//! 2. `#` color literal
//! 3. `@style/`, `@layout/`, `@font/`, `@mipmap/` and `@drawable/`
//! 4. `@android:color/`, `@color/`, `@string/`, `@dimen/`
//! 5. unit-suffixed number, bare number
//! 6. anything else is a plain string, unescaped

use crate::error::{Result, TranslateError};
use crate::style::{StyleDef, StyleSheet};
use crate::value::{
    Dimension, Drawable, Font, Gradient, InteractionState, Rgba, Shape, ShapeKind,
    StateSelector, Unit, Value,
};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_THEME: &str = "AppTheme";

/// Theme attribute indirections followed before giving up.
const MAX_THEME_INDIRECTION: usize = 16;

/// One `<item>` of a `<selector>`, with its state already classified.
#[derive(Debug, Clone, PartialEq)]
pub struct RawStateItem {
    pub state: InteractionState,
    pub value: String,
}

impl RawStateItem {
    pub fn new(state: InteractionState, value: &str) -> Self {
        Self {
            state,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawShape {
    pub kind: ShapeKind,
    pub solid: Option<String>,
    pub stroke_width: Option<String>,
    pub stroke_color: Option<String>,
    pub corner_radius: Option<String>,
    pub gradient: Option<(String, String, f64)>,
}

impl Default for RawShape {
    fn default() -> Self {
        Self {
            kind: ShapeKind::Rectangle,
            solid: None,
            stroke_width: None,
            stroke_color: None,
            corner_radius: None,
            gradient: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawDrawable {
    Image { file: String },
    Vector { file: String },
    Shape(RawShape),
    LayerList(Vec<String>),
    Selector(Vec<RawStateItem>),
    /// `<bitmap android:src=...>` and `<item type="drawable">` aliases.
    Alias(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawFontEntry {
    pub font: String,
    pub weight: u16,
    pub italic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawFont {
    File(String),
    Family(Vec<RawFontEntry>),
}

/// Everything read from a resource directory, unresolved.
#[derive(Debug, Clone, Default)]
pub struct RawResources {
    pub colors: BTreeMap<String, String>,
    pub color_states: BTreeMap<String, Vec<RawStateItem>>,
    pub dimens: BTreeMap<String, String>,
    pub strings: BTreeMap<String, String>,
    pub styles: StyleSheet,
    pub drawables: BTreeMap<String, RawDrawable>,
    pub fonts: BTreeMap<String, RawFont>,
    pub layouts: BTreeSet<String>,
    pub theme: Option<String>,
}

impl RawResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, name: &str, raw: &str) -> Self {
        self.colors.insert(name.to_string(), raw.to_string());
        self
    }

    pub fn with_dimen(mut self, name: &str, raw: &str) -> Self {
        self.dimens.insert(name.to_string(), raw.to_string());
        self
    }

    pub fn with_string(mut self, name: &str, raw: &str) -> Self {
        self.strings.insert(name.to_string(), raw.to_string());
        self
    }

    pub fn with_style(mut self, style: StyleDef) -> Self {
        self.styles.insert(style);
        self
    }

    pub fn with_drawable(mut self, name: &str, drawable: RawDrawable) -> Self {
        self.drawables.insert(name.to_string(), drawable);
        self
    }

    pub fn with_layout(mut self, name: &str) -> Self {
        self.layouts.insert(name.to_string());
        self
    }

    /// Resolve every resource, failing on the first dangling or circular
    /// reference.
    pub fn resolve(self) -> Result<ResourceTable> {
        let theme = self.theme.clone().unwrap_or_else(|| DEFAULT_THEME.to_string());
        let mut resolver = Resolver {
            raw: &self,
            table: ResourceTable {
                theme,
                layouts: self.layouts.clone(),
                ..ResourceTable::default()
            },
            visiting: Vec::new(),
        };

        // Phase 1: scalar values
        for name in self.colors.keys() {
            resolver.color(name)?;
        }
        for name in self.color_states.keys() {
            resolver.color_state(name)?;
        }
        for name in self.dimens.keys() {
            resolver.dimen(name)?;
        }
        for name in self.strings.keys() {
            resolver.string(name)?;
        }

        // Phase 2: composite values referencing the scalars
        for name in self.drawables.keys() {
            resolver.drawable(name)?;
        }
        for name in self.fonts.keys() {
            resolver.font(name)?;
        }

        let mut table = resolver.table;
        table.styles = self.styles;
        log::debug!(
            "Resolved {} colors, {} color states, {} dimens, {} strings, {} drawables, {} fonts, {} styles",
            table.colors.len(),
            table.color_states.len(),
            table.dimens.len(),
            table.strings.len(),
            table.drawables.len(),
            table.fonts.len(),
            table.styles.len()
        );
        Ok(table)
    }
}

struct Resolver<'a> {
    raw: &'a RawResources,
    table: ResourceTable,
    visiting: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn enter(&mut self, key: String) -> Result<()> {
        if self.visiting.contains(&key) {
            return Err(TranslateError::unresolved(
                format!("@{key}"),
                format!(
                    "circular reference: {} -> {}",
                    self.visiting
                        .iter()
                        .map(|k| format!("@{k}"))
                        .collect::<Vec<_>>()
                        .join(" -> "),
                    format!("@{key}")
                ),
            ));
        }
        self.visiting.push(key);
        Ok(())
    }

    fn leave(&mut self) {
        self.visiting.pop();
    }

    fn missing(kind: &str, name: &str) -> TranslateError {
        TranslateError::unresolved(format!("@{kind}/{name}"), format!("no such {kind}"))
    }

    /// Follow one `?attr` hop and resolve its target with `resolve`. Theme
    /// attributes take part in cycle detection like any other reference.
    fn through_theme<T>(&mut self, raw: &str, resolve: fn(&mut Self, &str) -> Result<T>) -> Result<T> {
        let target = theme_attribute(&self.raw.styles, self.table.theme.as_str(), raw)?;
        self.enter(raw.trim_start_matches('?').to_string())?;
        let resolved = resolve(self, &target);
        self.leave();
        resolved
    }

    fn color(&mut self, name: &str) -> Result<Rgba> {
        if let Some(color) = self.table.colors.get(name) {
            return Ok(*color);
        }
        if self.raw.color_states.contains_key(name) {
            return Ok(self.color_state(name)?.normal);
        }
        let raw = self
            .raw
            .colors
            .get(name)
            .ok_or_else(|| Self::missing("color", name))?;
        self.enter(format!("color/{name}"))?;
        let color = self.color_ref(raw);
        self.leave();
        let color = color?;
        self.table.colors.insert(name.to_string(), color);
        Ok(color)
    }

    fn color_state(&mut self, name: &str) -> Result<StateSelector<Rgba>> {
        if let Some(states) = self.table.color_states.get(name) {
            return Ok(states.clone());
        }
        let items = self
            .raw
            .color_states
            .get(name)
            .ok_or_else(|| Self::missing("color", name))?;
        self.enter(format!("color/{name}"))?;
        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            match self.color_ref(&item.value) {
                Ok(color) => resolved.push((item.state, color)),
                Err(e) => {
                    self.leave();
                    return Err(e);
                }
            }
        }
        self.leave();
        let states = build_selector(resolved).ok_or_else(|| {
            TranslateError::unresolved(format!("@color/{name}"), "selector has no items")
        })?;
        self.table.color_states.insert(name.to_string(), states.clone());
        Ok(states)
    }

    fn color_ref(&mut self, raw: &str) -> Result<Rgba> {
        let raw = raw.trim();
        if raw.starts_with('?') {
            return self.through_theme(raw, Self::color_ref);
        }
        if raw.starts_with('#') {
            return Rgba::parse_hex(raw)
                .ok_or_else(|| TranslateError::unresolved(raw, "invalid color literal"));
        }
        if let Some(name) = raw.strip_prefix("@android:color/") {
            return system_color(name)
                .ok_or_else(|| TranslateError::unresolved(raw, "unknown system color"));
        }
        if let Some(name) = raw.strip_prefix("@color/") {
            return self.color(name);
        }
        Err(TranslateError::unresolved(raw, "not a color"))
    }

    fn dimen(&mut self, name: &str) -> Result<Dimension> {
        if let Some(dimension) = self.table.dimens.get(name) {
            return Ok(*dimension);
        }
        let raw = self
            .raw
            .dimens
            .get(name)
            .ok_or_else(|| Self::missing("dimen", name))?;
        self.enter(format!("dimen/{name}"))?;
        let dimension = self.dimen_ref(raw);
        self.leave();
        let dimension = dimension?;
        self.table.dimens.insert(name.to_string(), dimension);
        Ok(dimension)
    }

    fn dimen_ref(&mut self, raw: &str) -> Result<Dimension> {
        let raw = raw.trim();
        if let Some(name) = raw.strip_prefix("@dimen/") {
            return self.dimen(name);
        }
        if raw.starts_with('?') {
            return self.through_theme(raw, Self::dimen_ref);
        }
        Dimension::parse(raw)
            .or_else(|| parse_number(raw).map(|n| Dimension::new(n, Unit::Dp)))
            .ok_or_else(|| TranslateError::unresolved(raw, "not a dimension"))
    }

    fn string(&mut self, name: &str) -> Result<String> {
        if let Some(text) = self.table.strings.get(name) {
            return Ok(text.clone());
        }
        let raw = self
            .raw
            .strings
            .get(name)
            .ok_or_else(|| Self::missing("string", name))?;
        self.enter(format!("string/{name}"))?;
        let text = match raw.strip_prefix("@string/") {
            Some(target) => self.string(target),
            None => Ok(unescape(raw)),
        };
        self.leave();
        let text = text?;
        self.table.strings.insert(name.to_string(), text.clone());
        Ok(text)
    }

    fn drawable(&mut self, name: &str) -> Result<Drawable> {
        if let Some(drawable) = self.table.drawables.get(name) {
            return Ok(drawable.clone());
        }
        let raw = self
            .raw
            .drawables
            .get(name)
            .ok_or_else(|| Self::missing("drawable", name))?;
        self.enter(format!("drawable/{name}"))?;
        let drawable = self.build_drawable(name, raw);
        self.leave();
        let drawable = drawable?;
        self.table.drawables.insert(name.to_string(), drawable.clone());
        Ok(drawable)
    }

    fn build_drawable(&mut self, name: &str, raw: &RawDrawable) -> Result<Drawable> {
        let name = name.to_string();
        Ok(match raw {
            RawDrawable::Image { file } => Drawable::Bitmap {
                name,
                file: file.clone(),
            },
            RawDrawable::Vector { file } => Drawable::Vector {
                name,
                file: file.clone(),
            },
            RawDrawable::Shape(shape) => {
                let solid = shape.solid.as_deref().map(|s| self.drawable_ref(s)).transpose()?;
                let stroke_color = shape
                    .stroke_color
                    .as_deref()
                    .map(|s| self.drawable_ref(s))
                    .transpose()?;
                let stroke_width = shape
                    .stroke_width
                    .as_deref()
                    .map(|s| self.dimen_ref(s).map(|d| d.magnitude))
                    .transpose()?;
                let corner_radius = shape
                    .corner_radius
                    .as_deref()
                    .map(|s| self.dimen_ref(s).map(|d| d.magnitude))
                    .transpose()?;
                let gradient = match &shape.gradient {
                    Some((start, end, angle)) => Some(Gradient {
                        start: self.drawable_ref(start)?,
                        end: self.drawable_ref(end)?,
                        angle: *angle,
                    }),
                    None => None,
                };
                Drawable::Shape(Box::new(Shape {
                    name,
                    kind: shape.kind,
                    solid,
                    stroke_width,
                    stroke_color,
                    corner_radius,
                    gradient,
                }))
            }
            RawDrawable::LayerList(items) => {
                let mut layers = Vec::with_capacity(items.len());
                for item in items {
                    layers.push(self.drawable_ref(item)?);
                }
                Drawable::LayerList { name, layers }
            }
            RawDrawable::Selector(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for item in items {
                    resolved.push((item.state, self.drawable_ref(&item.value)?));
                }
                let states = build_selector(resolved).ok_or_else(|| {
                    TranslateError::unresolved(format!("@drawable/{name}"), "selector has no items")
                })?;
                Drawable::StateList {
                    name,
                    states: Box::new(states),
                }
            }
            RawDrawable::Alias(target) => Drawable::Reference {
                name,
                target: Box::new(self.drawable_ref(target)?),
            },
        })
    }

    /// A value usable inside a drawable: a color or another drawable.
    fn drawable_ref(&mut self, raw: &str) -> Result<Value> {
        let raw = raw.trim();
        if raw.starts_with('?') {
            return self.through_theme(raw, Self::drawable_ref);
        }
        if let Some(name) = raw
            .strip_prefix("@drawable/")
            .or_else(|| raw.strip_prefix("@mipmap/"))
        {
            return Ok(Value::Drawable(self.drawable(name)?));
        }
        if let Some(name) = raw.strip_prefix("@color/") {
            if self.raw.color_states.contains_key(name) {
                return Ok(Value::ColorStateResource {
                    name: name.to_string(),
                    states: self.color_state(name)?,
                });
            }
            return Ok(Value::ColorResource {
                name: name.to_string(),
                color: self.color(name)?,
            });
        }
        Ok(Value::ColorLiteral(self.color_ref(raw)?))
    }

    fn font(&mut self, name: &str) -> Result<Value> {
        if let Some(font) = self.table.fonts.get(name) {
            return Ok(font.clone());
        }
        let raw = self
            .raw
            .fonts
            .get(name)
            .ok_or_else(|| Self::missing("font", name))?;
        self.enter(format!("font/{name}"))?;
        let font = self.build_font(name, raw);
        self.leave();
        let font = font?;
        self.table.fonts.insert(name.to_string(), font.clone());
        Ok(font)
    }

    fn build_font(&mut self, name: &str, raw: &RawFont) -> Result<Value> {
        match raw {
            RawFont::File(file) => Ok(Value::FontLiteral(Font {
                name: name.to_string(),
                file: Some(file.clone()),
                weight: 400,
                italic: false,
            })),
            RawFont::Family(entries) => {
                let mut fonts = Vec::with_capacity(entries.len());
                for entry in entries {
                    let member = entry.font.strip_prefix("@font/").unwrap_or(&entry.font);
                    let file = match self.font(member)? {
                        Value::FontLiteral(font) => font.file,
                        _ => {
                            return Err(TranslateError::unresolved(
                                entry.font.clone(),
                                "font families cannot nest",
                            ))
                        }
                    };
                    fonts.push(Font {
                        name: member.to_string(),
                        file,
                        weight: entry.weight,
                        italic: entry.italic,
                    });
                }
                Ok(Value::FontSet {
                    name: name.to_string(),
                    fonts,
                })
            }
        }
    }
}

/// Build a selector with first-match semantics: the first stateless item is
/// `normal`, and each state keeps the first item declared for it.
fn build_selector<T: Clone>(items: Vec<(InteractionState, T)>) -> Option<StateSelector<T>> {
    let normal = items
        .iter()
        .find(|(state, _)| *state == InteractionState::Normal)
        .or_else(|| items.last())
        .map(|(_, value)| value.clone())?;
    let mut selector = StateSelector::new(normal);
    for (state, value) in items {
        if state != InteractionState::Normal && selector.explicit(state).is_none() {
            selector.set(state, value);
        }
    }
    Some(selector)
}

/// The small set of `@android:color/` names layouts commonly use.
pub fn system_color(name: &str) -> Option<Rgba> {
    let hex = match name {
        "black" => "#000000",
        "white" => "#FFFFFF",
        "transparent" => "#00000000",
        "darker_gray" => "#AAAAAA",
        "background_dark" => "#000000",
        "background_light" => "#FFFFFF",
        "holo_blue_light" => "#33B5E5",
        "holo_blue_dark" => "#0099CC",
        "holo_green_light" => "#99CC00",
        "holo_red_light" => "#FF4444",
        "holo_orange_light" => "#FFBB33",
        _ => return None,
    };
    Rgba::parse_hex(hex)
}

/// Look a `?attr/...` reference up in the theme's style chain and return the
/// raw value found there.
pub fn theme_attribute(styles: &StyleSheet, theme: &str, raw: &str) -> Result<String> {
    let reference = raw.trim_start_matches('?');
    let key = if let Some(name) = reference.strip_prefix("android:attr/") {
        format!("android:{name}")
    } else if let Some(name) = reference.strip_prefix("attr/") {
        name.to_string()
    } else {
        reference.to_string()
    };

    let chain = styles
        .chain(theme)
        .map_err(|_| TranslateError::unresolved(raw, format!("theme '{theme}' is not defined")))?;
    chain
        .get(&key)
        .or_else(|| {
            // `android:colorAccent` and `colorAccent` name the same thing in
            // AppCompat themes.
            match key.strip_prefix("android:") {
                Some(bare) => chain.get(bare),
                None => chain.get(&format!("android:{key}")),
            }
        })
        .map(str::to_string)
        .ok_or_else(|| TranslateError::unresolved(raw, format!("theme '{theme}' does not set '{key}'")))
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let plausible = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && text.chars().any(|c| c.is_ascii_digit());
    if plausible {
        text.parse::<f64>().ok()
    } else {
        None
    }
}

/// Undo Android string escaping: `\n`, `\t`, `\"`, `\'` and a backslash in
/// front of any other character (`\@`, `\?`).
pub fn unescape(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('t') => text.push('\t'),
            Some(other) => text.push(other),
            None => text.push('\\'),
        }
    }
    text
}

/// The resolved, read-only resource set of one project.
#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    pub colors: BTreeMap<String, Rgba>,
    pub color_states: BTreeMap<String, StateSelector<Rgba>>,
    pub dimens: BTreeMap<String, Dimension>,
    pub strings: BTreeMap<String, String>,
    pub styles: StyleSheet,
    pub drawables: BTreeMap<String, Drawable>,
    pub fonts: BTreeMap<String, Value>,
    pub layouts: BTreeSet<String>,
    pub theme: String,
}

impl ResourceTable {
    /// Classify and resolve one raw attribute string.
    pub fn read(&self, raw: &str) -> Result<Value> {
        self.read_at(raw, 0)
    }

    fn read_at(&self, raw: &str, indirection: usize) -> Result<Value> {
        let text = raw.trim();

        if text.starts_with('?') {
            if indirection >= MAX_THEME_INDIRECTION {
                return Err(TranslateError::unresolved(text, "theme attributes refer to each other in a loop"));
            }
            let target = theme_attribute(&self.styles, &self.theme, text)?;
            return self.read_at(&target, indirection + 1);
        }

        if text.starts_with('#') {
            if let Some(color) = Rgba::parse_hex(text) {
                return Ok(Value::ColorLiteral(color));
            }
        }

        if let Some(name) = text.strip_prefix("@style/") {
            let chain = self.styles.chain(name)?;
            return Ok(Value::Style {
                name: name.to_string(),
                attributes: chain.flatten(),
            });
        }

        if let Some(name) = text.strip_prefix("@layout/") {
            return if self.layouts.contains(name) {
                Ok(Value::LayoutReference {
                    name: name.to_string(),
                })
            } else {
                Err(Resolver::missing("layout", name))
            };
        }

        if let Some(name) = text.strip_prefix("@font/") {
            return self
                .fonts
                .get(name)
                .cloned()
                .ok_or_else(|| Resolver::missing("font", name));
        }

        if let Some(name) = text
            .strip_prefix("@mipmap/")
            .or_else(|| text.strip_prefix("@drawable/"))
        {
            return self
                .drawables
                .get(name)
                .cloned()
                .map(Value::Drawable)
                .ok_or_else(|| Resolver::missing("drawable", name));
        }

        if let Some(name) = text.strip_prefix("@android:color/") {
            return system_color(name)
                .map(Value::ColorLiteral)
                .ok_or_else(|| TranslateError::unresolved(text, "unknown system color"));
        }

        if let Some(name) = text.strip_prefix("@color/") {
            if let Some(states) = self.color_states.get(name) {
                return Ok(Value::ColorStateResource {
                    name: name.to_string(),
                    states: states.clone(),
                });
            }
            return self
                .colors
                .get(name)
                .map(|color| Value::ColorResource {
                    name: name.to_string(),
                    color: *color,
                })
                .ok_or_else(|| Resolver::missing("color", name));
        }

        if let Some(name) = text.strip_prefix("@string/") {
            return self
                .strings
                .get(name)
                .map(|value| Value::StringResource {
                    name: name.to_string(),
                    value: value.clone(),
                })
                .ok_or_else(|| Resolver::missing("string", name));
        }

        if let Some(name) = text.strip_prefix("@dimen/") {
            return self
                .dimens
                .get(name)
                .map(|dimension| Value::DimensionResource {
                    name: name.to_string(),
                    dimension: *dimension,
                })
                .ok_or_else(|| Resolver::missing("dimen", name));
        }

        if let Some(dimension) = Dimension::parse(text) {
            return Ok(Value::DimensionLiteral(dimension));
        }

        if let Some(number) = parse_number(text) {
            return Ok(Value::Number(number));
        }

        Ok(Value::StringLiteral(unescape(raw)))
    }

    /// Read a raw string as a dimension, for the layout synthesizer.
    pub fn dimension(&self, raw: &str) -> Result<Option<Dimension>> {
        Ok(match self.read(raw)? {
            Value::DimensionLiteral(d) | Value::DimensionResource { dimension: d, .. } => Some(d),
            Value::Number(n) => Some(Dimension::new(n, Unit::Dp)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    fn table() -> ResourceTable {
        let mut raw = RawResources::new()
            .with_color("primary", "#FF6200EE")
            .with_color("accent", "@color/primary")
            .with_dimen("gutter", "16dp")
            .with_dimen("wide_gutter", "@dimen/gutter")
            .with_string("app_name", "Droid\\'s \\\"App\\\"")
            .with_string("title", "@string/app_name")
            .with_layout("row_item")
            .with_style(
                StyleDef::new("AppTheme", None)
                    .with_item("colorPrimary", "@color/primary")
                    .with_item("android:textColorPrimary", "#222222"),
            )
            .with_drawable("icon", RawDrawable::Image { file: "icon.png".to_string() })
            .with_drawable(
                "button_bg",
                RawDrawable::Selector(vec![
                    RawStateItem::new(InteractionState::Highlighted, "@color/accent"),
                    RawStateItem::new(InteractionState::Normal, "@drawable/icon"),
                ]),
            );
        raw.color_states.insert(
            "button_text".to_string(),
            vec![
                RawStateItem::new(InteractionState::Disabled, "#888888"),
                RawStateItem::new(InteractionState::Normal, "@color/primary"),
            ],
        );
        raw.resolve().unwrap()
    }

    #[test]
    fn test_dimension_literal_reads_as_dp() {
        let value = table().read("16dp").unwrap();
        assert_eq!(value, Value::DimensionLiteral(Dimension::new(16.0, Unit::Dp)));
        assert_eq!(value.get("number").unwrap().render(), "16");
    }

    #[test]
    fn test_classification_order() {
        let table = table();
        let kind = |raw: &str| table.read(raw).unwrap().value_type();

        assert_eq!(kind("#FFF"), ValueType::ColorLiteral);
        assert_eq!(kind("@color/accent"), ValueType::ColorResource);
        assert_eq!(kind("@color/button_text"), ValueType::ColorStateResource);
        assert_eq!(kind("@android:color/white"), ValueType::ColorLiteral);
        assert_eq!(kind("@dimen/wide_gutter"), ValueType::DimensionResource);
        assert_eq!(kind("@string/title"), ValueType::StringResource);
        assert_eq!(kind("@drawable/icon"), ValueType::BitmapDrawable);
        assert_eq!(kind("@mipmap/icon"), ValueType::BitmapDrawable);
        assert_eq!(kind("@drawable/button_bg"), ValueType::StateListDrawable);
        assert_eq!(kind("@layout/row_item"), ValueType::Layout);
        assert_eq!(kind("@style/AppTheme"), ValueType::Style);
        assert_eq!(kind("?attr/colorPrimary"), ValueType::ColorResource);
        assert_eq!(kind("12sp"), ValueType::DimensionLiteral);
        assert_eq!(kind("0.5"), ValueType::Number);
        assert_eq!(kind("wrap_content"), ValueType::StringLiteral);
        assert_eq!(kind("@+id/title"), ValueType::StringLiteral);
    }

    #[test]
    fn test_forward_references_resolve() {
        let table = table();
        assert_eq!(table.colors["accent"], Rgba::new(0x62, 0x00, 0xEE, 0xFF));
        assert_eq!(table.dimens["wide_gutter"].magnitude, 16.0);
        assert_eq!(table.strings["title"], "Droid's \"App\"");
        assert_eq!(
            table.color_states["button_text"].get(InteractionState::Disabled),
            &Rgba::new(0x88, 0x88, 0x88, 0xFF)
        );
    }

    #[test]
    fn test_theme_attribute_with_android_prefix() {
        let table = table();
        let value = table.read("?android:attr/textColorPrimary").unwrap();
        assert_eq!(value, Value::ColorLiteral(Rgba::new(0x22, 0x22, 0x22, 0xFF)));
        assert!(table.read("?attr/colorSecondary").is_err());
    }

    #[test]
    fn test_invalid_hex_is_plain_text() {
        let value = table().read("#hashtag").unwrap();
        assert_eq!(value, Value::StringLiteral("#hashtag".to_string()));
    }

    #[test]
    fn test_unresolved_references_fail() {
        let table = table();
        for raw in ["@color/nope", "@string/nope", "@dimen/nope", "@drawable/nope", "@layout/nope", "@style/Nope"] {
            let err = table.read(raw).unwrap_err();
            assert!(
                matches!(err, TranslateError::UnresolvedReference { .. }),
                "{raw} should be unresolved"
            );
        }
    }

    #[test]
    fn test_circular_color_reference_detection() {
        let raw = RawResources::new()
            .with_color("a", "@color/b")
            .with_color("b", "@color/a");
        let err = raw.resolve().unwrap_err();
        assert!(err.to_string().contains("circular reference"));
    }

    #[test]
    fn test_circular_theme_attribute_detection() {
        let raw = RawResources::new()
            .with_style(
                StyleDef::new("AppTheme", None)
                    .with_item("colorA", "?attr/colorB")
                    .with_item("colorB", "?attr/colorA"),
            )
            .with_color("x", "?attr/colorA");
        let err = raw.resolve().unwrap_err();
        assert!(matches!(err, TranslateError::UnresolvedReference { .. }));
        assert!(err.to_string().contains("circular reference"));

        let raw = RawResources::new()
            .with_style(
                StyleDef::new("AppTheme", None)
                    .with_item("spacing", "?attr/spacingLarge")
                    .with_item("spacingLarge", "12dp"),
            )
            .with_dimen("gap", "?attr/spacing");
        assert_eq!(raw.resolve().unwrap().dimens["gap"], Dimension::new(12.0, Unit::Dp));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("line\\nbreak"), "line\nbreak");
        assert_eq!(unescape("\\@not_a_ref"), "@not_a_ref");
        assert_eq!(unescape("tab\\there"), "tab\there");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }
}
