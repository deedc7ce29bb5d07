//! Typed resource values
//!
//! Every attribute value read from a layout is classified into exactly one
//! [`Value`] variant. Variants are ranked through a small, hand-maintained
//! supertype lattice ([`ValueType`]) so that attribute rules declared for a
//! narrow type (say `color-resource`) outrank rules declared for a broad one
//! (`color`, `drawable`, `value`).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use crate::source::AttrMap;

/// Node of the value type lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    Value,
    Number,
    Dimension,
    DimensionLiteral,
    DimensionResource,
    Text,
    StringLiteral,
    StringResource,
    Drawable,
    Color,
    ColorLiteral,
    ColorResource,
    ColorStateResource,
    StateList,
    BitmapDrawable,
    VectorDrawable,
    ShapeDrawable,
    LayerListDrawable,
    StateListDrawable,
    DrawableReference,
    Font,
    FontLiteral,
    FontSet,
    Style,
    Layout,
}

impl ValueType {
    /// Direct supertypes. `Value` is the only root.
    pub fn supertypes(self) -> &'static [ValueType] {
        use ValueType::*;
        match self {
            Value => &[],
            Number | Text | Drawable | StateList | Font | Style | Layout => &[Value],
            Dimension => &[Number],
            DimensionLiteral | DimensionResource => &[Dimension],
            StringLiteral | StringResource => &[Text],
            Color => &[Drawable],
            ColorLiteral | ColorResource => &[Color],
            ColorStateResource => &[Color, StateList],
            BitmapDrawable | VectorDrawable | ShapeDrawable | LayerListDrawable
            | DrawableReference => &[Drawable],
            StateListDrawable => &[Drawable, StateList],
            FontLiteral | FontSet => &[Font],
        }
    }

    /// All types this type transitively satisfies, excluding itself.
    pub fn ancestors(self) -> BTreeSet<ValueType> {
        let mut found = BTreeSet::new();
        let mut pending: Vec<ValueType> = self.supertypes().to_vec();
        while let Some(next) = pending.pop() {
            if found.insert(next) {
                pending.extend_from_slice(next.supertypes());
            }
        }
        found
    }

    /// Specificity score: how many declared supertypes this type satisfies.
    pub fn depth(self) -> usize {
        self.ancestors().len()
    }

    /// The "in" relation of the lattice (reflexive).
    pub fn is_a(self, other: ValueType) -> bool {
        self == other || self.ancestors().contains(&other)
    }

    pub fn name(self) -> &'static str {
        use ValueType::*;
        match self {
            Value => "value",
            Number => "number",
            Dimension => "dimension",
            DimensionLiteral => "dimension-literal",
            DimensionResource => "dimension-resource",
            Text => "text",
            StringLiteral => "string-literal",
            StringResource => "string-resource",
            Drawable => "drawable",
            Color => "color",
            ColorLiteral => "color-literal",
            ColorResource => "color-resource",
            ColorStateResource => "color-state-resource",
            StateList => "state-list",
            BitmapDrawable => "bitmap-drawable",
            VectorDrawable => "vector-drawable",
            ShapeDrawable => "shape-drawable",
            LayerListDrawable => "layer-list-drawable",
            StateListDrawable => "state-list-drawable",
            DrawableReference => "drawable-reference",
            Font => "font",
            FontLiteral => "font-literal",
            FontSet => "font-set",
            Style => "style",
            Layout => "layout",
        }
    }
}

impl Default for ValueType {
    fn default() -> Self {
        ValueType::Value
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Render a magnitude without a trailing `.0` and without float noise.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let text = format!("{:.6}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Rgba {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self { red, green, blue, alpha }
    }

    /// Parse the Android color notations `#RGB`, `#ARGB`, `#RRGGBB` and
    /// `#AARRGGBB` (alpha first, unlike CSS).
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).ok().map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        match digits.len() {
            3 => Some(Self::new(nibble(0)?, nibble(1)?, nibble(2)?, 255)),
            4 => Some(Self::new(nibble(1)?, nibble(2)?, nibble(3)?, nibble(0)?)),
            6 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Some(Self::new(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
            _ => None,
        }
    }

    /// `#RRGGBB` when opaque, `#RRGGBBAA` otherwise.
    pub fn hex(&self) -> String {
        if self.alpha == 255 {
            format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
        } else {
            format!(
                "#{:02X}{:02X}{:02X}{:02X}",
                self.red, self.green, self.blue, self.alpha
            )
        }
    }

    /// CSS notation.
    pub fn css(&self) -> String {
        if self.alpha == 255 {
            self.hex()
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.red,
                self.green,
                self.blue,
                format_number(self.alpha as f64 / 255.0)
            )
        }
    }

    fn component(channel: u8) -> String {
        format_number(channel as f64 / 255.0)
    }

    pub fn get(&self, key: &str) -> Option<Field> {
        let text = match key {
            "red" => Self::component(self.red),
            "green" => Self::component(self.green),
            "blue" => Self::component(self.blue),
            "alpha" => Self::component(self.alpha),
            "hex" => self.hex(),
            "css" | "web" => self.css(),
            _ => return None,
        };
        Some(Field::Text(text))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Dp,
    Sp,
    Px,
}

impl Unit {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "dp" | "dip" => Some(Unit::Dp),
            "sp" | "sip" => Some(Unit::Sp),
            "px" => Some(Unit::Px),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Dp => "dp",
            Unit::Sp => "sp",
            Unit::Px => "px",
        }
    }
}

/// A measurement in device-independent (or scaled, or raw) units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension {
    pub magnitude: f64,
    pub unit: Unit,
}

impl Dimension {
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    /// Parse `16dp`, `14sp`, `1px` and the `dip`/`sip` spellings.
    pub fn parse(text: &str) -> Option<Self> {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        let pattern = PATTERN
            .get_or_init(|| Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+))\s*(dip|sip|dp|sp|px)\s*$").ok())
            .as_ref()?;
        let captures = pattern.captures(text)?;
        let magnitude = captures[1].parse::<f64>().ok()?;
        Unit::from_suffix(&captures[2]).map(|unit| Self::new(magnitude, unit))
    }

    pub fn get(&self, key: &str) -> Option<Field> {
        let text = match key {
            "number" | "value" | "points" => format_number(self.magnitude),
            "unit" => self.unit.as_str().to_string(),
            "css" => format!("{}px", format_number(self.magnitude)),
            _ => return None,
        };
        Some(Field::Text(text))
    }
}

/// The interaction states a selector can distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InteractionState {
    Normal,
    Selected,
    Highlighted,
    Disabled,
    Focused,
}

impl InteractionState {
    pub const ALL: [InteractionState; 5] = [
        InteractionState::Normal,
        InteractionState::Selected,
        InteractionState::Highlighted,
        InteractionState::Disabled,
        InteractionState::Focused,
    ];

    pub fn key(self) -> &'static str {
        match self {
            InteractionState::Normal => "normal",
            InteractionState::Selected => "selected",
            InteractionState::Highlighted => "highlighted",
            InteractionState::Disabled => "disabled",
            InteractionState::Focused => "focused",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.key() == key)
    }
}

/// Five-slot state record. `normal` is mandatory; other slots fall back to it.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSelector<T> {
    pub normal: T,
    pub selected: Option<T>,
    pub highlighted: Option<T>,
    pub disabled: Option<T>,
    pub focused: Option<T>,
}

impl<T> StateSelector<T> {
    pub fn new(normal: T) -> Self {
        Self {
            normal,
            selected: None,
            highlighted: None,
            disabled: None,
            focused: None,
        }
    }

    /// The value explicitly declared for `state`, if any.
    pub fn explicit(&self, state: InteractionState) -> Option<&T> {
        match state {
            InteractionState::Normal => Some(&self.normal),
            InteractionState::Selected => self.selected.as_ref(),
            InteractionState::Highlighted => self.highlighted.as_ref(),
            InteractionState::Disabled => self.disabled.as_ref(),
            InteractionState::Focused => self.focused.as_ref(),
        }
    }

    /// The value for `state`, falling back to `normal`.
    pub fn get(&self, state: InteractionState) -> &T {
        self.explicit(state).unwrap_or(&self.normal)
    }

    pub fn set(&mut self, state: InteractionState, value: T) {
        match state {
            InteractionState::Normal => self.normal = value,
            InteractionState::Selected => self.selected = Some(value),
            InteractionState::Highlighted => self.highlighted = Some(value),
            InteractionState::Disabled => self.disabled = Some(value),
            InteractionState::Focused => self.focused = Some(value),
        }
    }

    /// Explicitly declared states, `normal` first.
    pub fn states(&self) -> impl Iterator<Item = (InteractionState, &T)> + '_ {
        InteractionState::ALL
            .into_iter()
            .filter_map(move |state| self.explicit(state).map(|value| (state, value)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> StateSelector<U> {
        StateSelector {
            normal: f(&self.normal),
            selected: self.selected.as_ref().map(&mut f),
            highlighted: self.highlighted.as_ref().map(&mut f),
            disabled: self.disabled.as_ref().map(&mut f),
            focused: self.focused.as_ref().map(&mut f),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub name: String,
    pub file: Option<String>,
    pub weight: u16,
    pub italic: bool,
}

impl Font {
    fn get(&self, key: &str) -> Option<Field> {
        let text = match key {
            "name" | "family" => self.name.clone(),
            "file" => self.file.clone().unwrap_or_default(),
            "weight" => self.weight.to_string(),
            "italic" => self.italic.to_string(),
            _ => return None,
        };
        Some(Field::Text(text))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Oval,
    Line,
    Ring,
}

impl ShapeKind {
    pub fn parse(text: &str) -> Self {
        match text {
            "oval" => ShapeKind::Oval,
            "line" => ShapeKind::Line,
            "ring" => ShapeKind::Ring,
            _ => ShapeKind::Rectangle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Oval => "oval",
            ShapeKind::Line => "line",
            ShapeKind::Ring => "ring",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub start: Value,
    pub end: Value,
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub name: String,
    pub kind: ShapeKind,
    pub solid: Option<Value>,
    pub stroke_width: Option<f64>,
    pub stroke_color: Option<Value>,
    pub corner_radius: Option<f64>,
    pub gradient: Option<Gradient>,
}

/// The drawable family.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    Bitmap { name: String, file: String },
    Vector { name: String, file: String },
    Shape(Box<Shape>),
    LayerList { name: String, layers: Vec<Value> },
    StateList { name: String, states: Box<StateSelector<Value>> },
    Reference { name: String, target: Box<Value> },
}

impl Drawable {
    pub fn name(&self) -> &str {
        match self {
            Drawable::Bitmap { name, .. }
            | Drawable::Vector { name, .. }
            | Drawable::LayerList { name, .. }
            | Drawable::StateList { name, .. }
            | Drawable::Reference { name, .. } => name,
            Drawable::Shape(shape) => &shape.name,
        }
    }

    fn value_type(&self) -> ValueType {
        match self {
            Drawable::Bitmap { .. } => ValueType::BitmapDrawable,
            Drawable::Vector { .. } => ValueType::VectorDrawable,
            Drawable::Shape(_) => ValueType::ShapeDrawable,
            Drawable::LayerList { .. } => ValueType::LayerListDrawable,
            Drawable::StateList { .. } => ValueType::StateListDrawable,
            Drawable::Reference { .. } => ValueType::DrawableReference,
        }
    }

    fn get(&self, key: &str) -> Option<Field> {
        if key == "name" {
            return Some(Field::Text(self.name().to_string()));
        }
        match self {
            Drawable::Bitmap { file, .. } | Drawable::Vector { file, .. } => match key {
                "file" => Some(Field::Text(file.clone())),
                _ => None,
            },
            Drawable::Shape(shape) => match key {
                "kind" => Some(Field::Text(shape.kind.as_str().to_string())),
                "solid" => shape.solid.clone().map(Field::Value),
                "strokeColor" => shape.stroke_color.clone().map(Field::Value),
                "strokeWidth" => shape.stroke_width.map(|w| Field::Text(format_number(w))),
                "cornerRadius" => shape.corner_radius.map(|r| Field::Text(format_number(r))),
                "gradientStart" => shape.gradient.as_ref().map(|g| Field::Value(g.start.clone())),
                "gradientEnd" => shape.gradient.as_ref().map(|g| Field::Value(g.end.clone())),
                "gradientAngle" => shape.gradient.as_ref().map(|g| Field::Text(format_number(g.angle))),
                _ => None,
            },
            Drawable::LayerList { layers, .. } => match key {
                "count" => Some(Field::Text(layers.len().to_string())),
                "first" => layers.first().cloned().map(Field::Value),
                "last" => layers.last().cloned().map(Field::Value),
                _ => None,
            },
            Drawable::StateList { states, .. } => InteractionState::from_key(key)
                .map(|state| Field::Value(states.get(state).clone())),
            Drawable::Reference { target, .. } => match key {
                "value" | "target" => Some(Field::Value((**target).clone())),
                _ => target.get(key),
            },
        }
    }
}

/// A fully resolved attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    ColorLiteral(Rgba),
    ColorResource { name: String, color: Rgba },
    ColorStateResource { name: String, states: StateSelector<Rgba> },
    DimensionLiteral(Dimension),
    DimensionResource { name: String, dimension: Dimension },
    Number(f64),
    StringLiteral(String),
    StringResource { name: String, value: String },
    FontLiteral(Font),
    FontSet { name: String, fonts: Vec<Font> },
    /// A style with its parent chain already flattened (own entries win).
    Style { name: String, attributes: AttrMap },
    LayoutReference { name: String },
    Drawable(Drawable),
}

/// Result of one key lookup on a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Value(Value),
    Text(String),
}

impl Field {
    pub fn render(&self) -> String {
        match self {
            Field::Value(value) => value.to_string(),
            Field::Text(text) => text.clone(),
        }
    }
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::ColorLiteral(_) => ValueType::ColorLiteral,
            Value::ColorResource { .. } => ValueType::ColorResource,
            Value::ColorStateResource { .. } => ValueType::ColorStateResource,
            Value::DimensionLiteral(_) => ValueType::DimensionLiteral,
            Value::DimensionResource { .. } => ValueType::DimensionResource,
            Value::Number(_) => ValueType::Number,
            Value::StringLiteral(_) => ValueType::StringLiteral,
            Value::StringResource { .. } => ValueType::StringResource,
            Value::FontLiteral(_) => ValueType::FontLiteral,
            Value::FontSet { .. } => ValueType::FontSet,
            Value::Style { .. } => ValueType::Style,
            Value::LayoutReference { .. } => ValueType::Layout,
            Value::Drawable(drawable) => drawable.value_type(),
        }
    }

    /// Numeric magnitude of numbers and dimensions.
    pub fn number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::DimensionLiteral(d) | Value::DimensionResource { dimension: d, .. } => {
                Some(d.magnitude)
            }
            _ => None,
        }
    }

    /// The normal-state color of color values.
    pub fn color(&self) -> Option<Rgba> {
        match self {
            Value::ColorLiteral(c) | Value::ColorResource { color: c, .. } => Some(*c),
            Value::ColorStateResource { states, .. } => Some(states.normal),
            _ => None,
        }
    }

    /// Key under which the value is reported in the used-resources set.
    pub fn resource_key(&self) -> Option<String> {
        match self {
            Value::ColorResource { name, .. } | Value::ColorStateResource { name, .. } => {
                Some(format!("color/{name}"))
            }
            Value::FontLiteral(font) => Some(format!("font/{}", font.name)),
            Value::FontSet { name, .. } => Some(format!("font/{name}")),
            Value::Drawable(drawable) => Some(format!("drawable/{}", drawable.name())),
            _ => None,
        }
    }

    /// Values this value references (drawable layers, selector states, shape colors).
    pub fn nested(&self) -> Vec<&Value> {
        match self {
            Value::Drawable(Drawable::LayerList { layers, .. }) => layers.iter().collect(),
            Value::Drawable(Drawable::StateList { states, .. }) => {
                states.states().map(|(_, v)| v).collect()
            }
            Value::Drawable(Drawable::Reference { target, .. }) => vec![target.as_ref()],
            Value::Drawable(Drawable::Shape(shape)) => shape
                .solid
                .iter()
                .chain(shape.stroke_color.iter())
                .chain(shape.gradient.iter().flat_map(|g| [&g.start, &g.end]))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Per-state values for state lists; a single `normal` entry otherwise.
    pub fn state_values(&self) -> Vec<(InteractionState, Value)> {
        match self {
            Value::ColorStateResource { states, .. } => states
                .states()
                .map(|(state, color)| (state, Value::ColorLiteral(*color)))
                .collect(),
            Value::Drawable(Drawable::StateList { states, .. }) => states
                .states()
                .map(|(state, value)| (state, value.clone()))
                .collect(),
            other => vec![(InteractionState::Normal, other.clone())],
        }
    }

    /// Key lookup used by template path resolution.
    pub fn get(&self, key: &str) -> Option<Field> {
        match self {
            Value::ColorLiteral(color) => match key {
                "value" => Some(Field::Value(self.clone())),
                _ => color.get(key),
            },
            Value::ColorResource { name, color } => match key {
                "name" => Some(Field::Text(name.clone())),
                "value" => Some(Field::Value(Value::ColorLiteral(*color))),
                _ => color.get(key),
            },
            Value::ColorStateResource { name, states } => match key {
                "name" => Some(Field::Text(name.clone())),
                "value" => Some(Field::Value(Value::ColorLiteral(states.normal))),
                _ => match InteractionState::from_key(key) {
                    Some(state) => Some(Field::Value(Value::ColorLiteral(*states.get(state)))),
                    None => states.normal.get(key),
                },
            },
            Value::DimensionLiteral(dimension) => dimension.get(key),
            Value::DimensionResource { name, dimension } => match key {
                "name" => Some(Field::Text(name.clone())),
                _ => dimension.get(key),
            },
            Value::Number(n) => match key {
                "number" | "value" => Some(Field::Text(format_number(*n))),
                _ => None,
            },
            Value::StringLiteral(text) => match key {
                "value" => Some(Field::Text(text.clone())),
                _ => None,
            },
            Value::StringResource { name, value } => match key {
                "name" => Some(Field::Text(name.clone())),
                "value" => Some(Field::Text(value.clone())),
                _ => None,
            },
            Value::FontLiteral(font) => font.get(key),
            Value::FontSet { name, fonts } => match key {
                "name" => Some(Field::Text(name.clone())),
                "count" => Some(Field::Text(fonts.len().to_string())),
                "normal" => regular_font(fonts).map(|f| Field::Value(Value::FontLiteral(f.clone()))),
                _ => regular_font(fonts).and_then(|f| f.get(key)),
            },
            Value::Style { name, attributes } => match key {
                "name" => Some(Field::Text(name.clone())),
                _ => attributes.get(key).map(|raw| Field::Text(raw.clone())),
            },
            Value::LayoutReference { name } => match key {
                "name" => Some(Field::Text(name.clone())),
                "className" => Some(Field::Text(format!("{}Binding", pascal_case(name)))),
                _ => None,
            },
            Value::Drawable(drawable) => drawable.get(key),
        }
    }
}

fn regular_font(fonts: &[Font]) -> Option<&Font> {
    fonts
        .iter()
        .filter(|f| !f.italic)
        .min_by_key(|f| (f.weight as i32 - 400).abs())
        .or_else(|| fonts.first())
}

/// `activity_main` → `ActivityMain`.
pub fn pascal_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c == '.')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// `activity_main` → `activityMain`.
pub fn camel_case(name: &str) -> String {
    let pascal = pascal_case(name);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::ColorLiteral(color) => f.write_str(&color.hex()),
            Value::ColorResource { name, .. } | Value::ColorStateResource { name, .. } => {
                f.write_str(name)
            }
            Value::DimensionLiteral(d) | Value::DimensionResource { dimension: d, .. } => {
                f.write_str(&format_number(d.magnitude))
            }
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::StringLiteral(text) => f.write_str(text),
            Value::StringResource { value, .. } => f.write_str(value),
            Value::FontLiteral(font) => f.write_str(&font.name),
            Value::FontSet { name, .. }
            | Value::Style { name, .. }
            | Value::LayoutReference { name } => f.write_str(name),
            Value::Drawable(drawable) => f.write_str(drawable.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_relations() {
        assert!(ValueType::ColorResource.is_a(ValueType::Color));
        assert!(ValueType::ColorResource.is_a(ValueType::Drawable));
        assert!(ValueType::ColorResource.is_a(ValueType::Value));
        assert!(!ValueType::Color.is_a(ValueType::ColorResource));
        assert!(ValueType::ColorStateResource.is_a(ValueType::StateList));
        assert!(ValueType::DimensionLiteral.is_a(ValueType::Number));
        assert!(!ValueType::StringLiteral.is_a(ValueType::Number));
    }

    #[test]
    fn test_lattice_depth_orders_specificity() {
        assert_eq!(ValueType::Value.depth(), 0);
        assert_eq!(ValueType::Drawable.depth(), 1);
        assert_eq!(ValueType::Color.depth(), 2);
        assert_eq!(ValueType::ColorResource.depth(), 3);
        // color-state-resource also satisfies state-list
        assert_eq!(ValueType::ColorStateResource.depth(), 4);
    }

    #[test]
    fn test_android_color_notation() {
        assert_eq!(Rgba::parse_hex("#FF0000"), Some(Rgba::new(255, 0, 0, 255)));
        assert_eq!(Rgba::parse_hex("#80FF0000"), Some(Rgba::new(255, 0, 0, 128)));
        assert_eq!(Rgba::parse_hex("#f00"), Some(Rgba::new(255, 0, 0, 255)));
        assert_eq!(Rgba::parse_hex("#8f00"), Some(Rgba::new(255, 0, 0, 136)));
        assert_eq!(Rgba::parse_hex("#12345"), None);
        assert_eq!(Rgba::parse_hex("#GGGGGG"), None);
    }

    #[test]
    fn test_dimension_fields() {
        let value = Value::DimensionLiteral(Dimension::parse("16dp").unwrap());
        assert_eq!(value.get("number"), Some(Field::Text("16".to_string())));
        assert_eq!(value.get("unit"), Some(Field::Text("dp".to_string())));
        assert_eq!(Dimension::parse("1.5dip").unwrap().magnitude, 1.5);
        assert_eq!(Dimension::parse("12sip").unwrap().unit, Unit::Sp);
        assert!(Dimension::parse("wrap_content").is_none());
    }

    #[test]
    fn test_state_selector_falls_back_to_normal() {
        let mut selector = StateSelector::new(Rgba::new(0, 0, 0, 255));
        selector.set(InteractionState::Highlighted, Rgba::new(255, 255, 255, 255));

        assert_eq!(selector.get(InteractionState::Disabled), &Rgba::new(0, 0, 0, 255));
        assert_eq!(selector.get(InteractionState::Highlighted), &Rgba::new(255, 255, 255, 255));
        let declared: Vec<_> = selector.states().map(|(s, _)| s).collect();
        assert_eq!(declared, vec![InteractionState::Normal, InteractionState::Highlighted]);
    }

    #[test]
    fn test_color_resource_delegates_components() {
        let value = Value::ColorResource {
            name: "accent".to_string(),
            color: Rgba::new(255, 0, 0, 255),
        };
        assert_eq!(value.get("name").unwrap().render(), "accent");
        assert_eq!(value.get("red").unwrap().render(), "1");
        assert_eq!(value.get("green").unwrap().render(), "0");
        assert_eq!(value.resource_key().as_deref(), Some("color/accent"));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(16.0), "16");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-2.25), "-2.25");
        assert_eq!(format_number(1.0 / 3.0), "0.333333");
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(pascal_case("activity_main"), "ActivityMain");
        assert_eq!(camel_case("login_button"), "loginButton");
    }
}
