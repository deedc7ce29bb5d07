//! Box-model parameters read from merged element attributes

use crate::dest::AnchorAttribute;
use crate::error::Result;
use crate::resources::ResourceTable;
use crate::source::AttrMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    pub fn start(self) -> AnchorAttribute {
        match self {
            Axis::Horizontal => AnchorAttribute::Leading,
            Axis::Vertical => AnchorAttribute::Top,
        }
    }

    pub fn end(self) -> AnchorAttribute {
        match self {
            Axis::Horizontal => AnchorAttribute::Trailing,
            Axis::Vertical => AnchorAttribute::Bottom,
        }
    }

    pub fn center(self) -> AnchorAttribute {
        match self {
            Axis::Horizontal => AnchorAttribute::CenterX,
            Axis::Vertical => AnchorAttribute::CenterY,
        }
    }

    pub fn dimension(self) -> AnchorAttribute {
        match self {
            Axis::Horizontal => AnchorAttribute::Width,
            Axis::Vertical => AnchorAttribute::Height,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Size {
    Unset,
    MatchParent,
    WrapContent,
    Exact(f64),
}

impl Size {
    fn read(attributes: &AttrMap, key: &str, resources: &ResourceTable) -> Result<Size> {
        let Some(raw) = attributes.get(key) else {
            return Ok(Size::Unset);
        };
        Ok(match raw.as_str() {
            "match_parent" | "fill_parent" => Size::MatchParent,
            "wrap_content" => Size::WrapContent,
            _ => match resources.dimension(raw)? {
                Some(dimension) => Size::Exact(dimension.magnitude),
                None => Size::Unset,
            },
        })
    }

    pub fn exact(self) -> Option<f64> {
        match self {
            Size::Exact(size) => Some(size),
            _ => None,
        }
    }
}

/// Alignment of a box along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Align {
    Start,
    Center,
    End,
    Fill,
}

/// Gravity flags split per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gravity {
    pub horizontal: Option<Align>,
    pub vertical: Option<Align>,
}

impl Gravity {
    /// Parse `center_vertical|end` style flag lists. Unknown flags are ignored.
    pub fn parse(raw: &str) -> Self {
        let mut gravity = Gravity::default();
        for flag in raw.split('|').map(str::trim) {
            match flag {
                "left" | "start" => gravity.horizontal = Some(Align::Start),
                "right" | "end" => gravity.horizontal = Some(Align::End),
                "center_horizontal" => gravity.horizontal = Some(Align::Center),
                "fill_horizontal" => gravity.horizontal = Some(Align::Fill),
                "top" => gravity.vertical = Some(Align::Start),
                "bottom" => gravity.vertical = Some(Align::End),
                "center_vertical" => gravity.vertical = Some(Align::Center),
                "fill_vertical" => gravity.vertical = Some(Align::Fill),
                "center" => {
                    gravity.horizontal = Some(Align::Center);
                    gravity.vertical = Some(Align::Center);
                }
                "fill" => {
                    gravity.horizontal = Some(Align::Fill);
                    gravity.vertical = Some(Align::Fill);
                }
                _ => {}
            }
        }
        gravity
    }

    pub fn on(&self, axis: Axis) -> Option<Align> {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    pub top: f64,
    pub bottom: f64,
    pub leading: f64,
    pub trailing: f64,
}

impl Insets {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            bottom: value,
            leading: value,
            trailing: value,
        }
    }

    pub fn start(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.leading,
            Axis::Vertical => self.top,
        }
    }

    pub fn end(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.trailing,
            Axis::Vertical => self.bottom,
        }
    }

    pub fn set_start(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::Horizontal => self.leading = value,
            Axis::Vertical => self.top = value,
        }
    }

    pub fn set_end(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::Horizontal => self.trailing = value,
            Axis::Vertical => self.bottom = value,
        }
    }

    pub fn is_zero(&self) -> bool {
        [self.top, self.bottom, self.leading, self.trailing]
            .iter()
            .all(|v| *v == 0.0)
    }

    pub fn plus(&self, other: &Insets) -> Insets {
        Insets {
            top: self.top + other.top,
            bottom: self.bottom + other.bottom,
            leading: self.leading + other.leading,
            trailing: self.trailing + other.trailing,
        }
    }

    /// Read `prefix`, `prefixHorizontal`/`prefixVertical` and the per-side
    /// attributes, most specific last.
    fn read(attributes: &AttrMap, prefix: &str, resources: &ResourceTable) -> Result<Insets> {
        let read = |suffix: &str| -> Result<Option<f64>> {
            match attributes.get(&format!("{prefix}{suffix}")) {
                Some(raw) => Ok(resources.dimension(raw)?.map(|d| d.magnitude)),
                None => Ok(None),
            }
        };

        let mut insets = Insets::uniform(read("")?.unwrap_or(0.0));
        if let Some(value) = read("Horizontal")? {
            insets.leading = value;
            insets.trailing = value;
        }
        if let Some(value) = read("Vertical")? {
            insets.top = value;
            insets.bottom = value;
        }
        for (suffix, side) in [
            ("Left", 0),
            ("Start", 0),
            ("Right", 1),
            ("End", 1),
            ("Top", 2),
            ("Bottom", 3),
        ] {
            if let Some(value) = read(suffix)? {
                match side {
                    0 => insets.leading = value,
                    1 => insets.trailing = value,
                    2 => insets.top = value,
                    _ => insets.bottom = value,
                }
            }
        }
        Ok(insets)
    }
}

/// Layout attributes of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    pub width: Size,
    pub height: Size,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
    pub margin: Insets,
    pub padding: Insets,
    /// `android:gravity`: how the element places its own content.
    pub gravity: Gravity,
    /// `android:layout_gravity`: how the element wants to be placed.
    pub layout_gravity: Gravity,
    pub weight: f64,
    pub orientation: Axis,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            width: Size::Unset,
            height: Size::Unset,
            min_width: None,
            min_height: None,
            margin: Insets::default(),
            padding: Insets::default(),
            gravity: Gravity::default(),
            layout_gravity: Gravity::default(),
            weight: 0.0,
            orientation: Axis::Horizontal,
        }
    }
}

impl LayoutParams {
    pub fn read(attributes: &AttrMap, resources: &ResourceTable) -> Result<Self> {
        let min = |key: &str| -> Result<Option<f64>> {
            match attributes.get(key) {
                Some(raw) => Ok(resources.dimension(raw)?.map(|d| d.magnitude)),
                None => Ok(None),
            }
        };
        let gravity = |key: &str| attributes.get(key).map(|g| Gravity::parse(g)).unwrap_or_default();

        Ok(Self {
            width: Size::read(attributes, "android:layout_width", resources)?,
            height: Size::read(attributes, "android:layout_height", resources)?,
            min_width: min("android:minWidth")?,
            min_height: min("android:minHeight")?,
            margin: Insets::read(attributes, "android:layout_margin", resources)?,
            padding: Insets::read(attributes, "android:padding", resources)?,
            gravity: gravity("android:gravity"),
            layout_gravity: gravity("android:layout_gravity"),
            weight: attributes
                .get("android:layout_weight")
                .and_then(|w| w.trim().parse::<f64>().ok())
                .filter(|w| *w > 0.0)
                .unwrap_or(0.0),
            orientation: match attributes.get("android:orientation").map(String::as_str) {
                Some("vertical") => Axis::Vertical,
                _ => Axis::Horizontal,
            },
        })
    }

    pub fn size(&self, axis: Axis) -> Size {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    pub fn min_size(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Horizontal => self.min_width,
            Axis::Vertical => self.min_height,
        }
    }
}
