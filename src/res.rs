//! Android `res/` directory reader
//!
//! Collects everything the translator needs from a resource tree into
//! [`RawResources`]. Only the default configuration is read: qualified
//! `values-*` directories are skipped, and among `drawable-*`/`mipmap-*`
//! densities the first file found for a name wins. Layout variants
//! (`layout-land`, `layout-sw600dp`, ...) are all kept.

use crate::error::{Result, TranslateError};
use crate::resources::{RawDrawable, RawFont, RawFontEntry, RawResources, RawShape, RawStateItem};
use crate::source::{parse_document, SourceElement};
use crate::style::StyleDef;
use crate::value::{InteractionState, ShapeKind};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];
const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// A resource directory: resolved-later resources plus the layout files.
#[derive(Debug, Default)]
pub struct ResourceDirectory {
    pub raw: RawResources,
    /// Layout name → variant files, default configuration first.
    pub layouts: BTreeMap<String, Vec<PathBuf>>,
}

impl ResourceDirectory {
    pub fn layout_count(&self) -> usize {
        self.layouts.values().map(Vec::len).sum()
    }
}

/// Read a `res/` directory.
pub fn read_res_dir(root: &Path) -> Result<ResourceDirectory> {
    if !root.is_dir() {
        return Err(TranslateError::FileNotFound {
            path: root.display().to_string(),
        });
    }

    let mut directory = ResourceDirectory::default();

    for entry in WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| TranslateError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let folder = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        if folder == "values" {
            read_values_file(path, &mut directory.raw)?;
        } else if folder.starts_with("values-") {
            log::debug!("Skipping qualified values file {}", path.display());
        } else if folder == "color" {
            read_color_file(path, &mut directory.raw)?;
        } else if folder.starts_with("drawable") || folder.starts_with("mipmap") {
            read_drawable_file(path, &mut directory.raw)?;
        } else if folder == "font" {
            read_font_file(path, &mut directory.raw)?;
        } else if folder == "layout" || folder.starts_with("layout-") {
            if path.extension().and_then(|e| e.to_str()) == Some("xml") {
                let name = resource_name(path);
                directory.raw.layouts.insert(name.clone());
                let variants = directory.layouts.entry(name).or_default();
                if folder == "layout" {
                    variants.insert(0, path.to_path_buf());
                } else {
                    variants.push(path.to_path_buf());
                }
            }
        } else {
            log::trace!("Ignoring {}", path.display());
        }
    }

    log::debug!(
        "Read {} layouts ({} files) from {}",
        directory.layouts.len(),
        directory.layout_count(),
        root.display()
    );
    Ok(directory)
}

/// File name without its extension(s): `button_bg.9.png` → `button_bg`.
fn resource_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    file_name
        .split('.')
        .next()
        .unwrap_or(file_name)
        .to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

fn read_xml(path: &Path) -> Result<SourceElement> {
    let xml = fs::read_to_string(path)?;
    parse_document(&xml, &path.display().to_string())
}

fn read_values_file(path: &Path, raw: &mut RawResources) -> Result<()> {
    let document = read_xml(path)?;
    let file = path.display().to_string();

    for element in &document.children {
        let Some(name) = element.attribute("name") else {
            log::warn!("{}: <{}> without a name", file, element.tag);
            continue;
        };
        let name = name.to_string();
        let kind = match element.tag.as_str() {
            "item" => element.attribute("type").unwrap_or_default(),
            tag => tag,
        };
        match kind {
            "color" => {
                raw.colors.insert(name, element.text_content().trim().to_string());
            }
            "dimen" => {
                raw.dimens.insert(name, element.text_content().trim().to_string());
            }
            "string" => {
                raw.strings.insert(name, element.text_content());
            }
            "drawable" => {
                let target = element.text_content().trim().to_string();
                raw.drawables.insert(name, RawDrawable::Alias(target));
            }
            "style" => {
                raw.styles.insert(read_style(&name, element));
            }
            other => {
                log::trace!("{}: ignoring <{}> resource '{}'", file, other, name);
            }
        }
    }
    Ok(())
}

fn read_style(name: &str, element: &SourceElement) -> StyleDef {
    // An explicit empty parent opts out of the dotted-name convention.
    let parent = match element.attribute("parent") {
        Some("") => None,
        Some(parent) => Some(parent.to_string()),
        None => name.rsplit_once('.').map(|(prefix, _)| prefix.to_string()),
    };
    let mut style = StyleDef::new(name, parent.as_deref());
    for item in element.children.iter().filter(|c| c.tag == "item") {
        if let Some(key) = item.attribute("name") {
            style
                .items
                .insert(key.to_string(), item.text_content().trim().to_string());
        }
    }
    style
}

fn is_true(element: &SourceElement, attribute: &str) -> Option<bool> {
    element.attribute(attribute).map(|v| v == "true")
}

/// Map selector state attributes onto the five interaction slots.
fn item_state(item: &SourceElement) -> InteractionState {
    if is_true(item, "android:state_pressed") == Some(true) {
        InteractionState::Highlighted
    } else if is_true(item, "android:state_enabled") == Some(false) {
        InteractionState::Disabled
    } else if is_true(item, "android:state_selected") == Some(true)
        || is_true(item, "android:state_checked") == Some(true)
        || is_true(item, "android:state_activated") == Some(true)
    {
        InteractionState::Selected
    } else if is_true(item, "android:state_focused") == Some(true) {
        InteractionState::Focused
    } else {
        InteractionState::Normal
    }
}

fn selector_items(root: &SourceElement, value_attribute: &str) -> Vec<RawStateItem> {
    root.children
        .iter()
        .filter(|c| c.tag == "item")
        .filter_map(|item| {
            item.attribute(value_attribute)
                .or_else(|| item.attribute("android:color"))
                .map(|value| RawStateItem::new(item_state(item), value))
        })
        .collect()
}

fn read_color_file(path: &Path, raw: &mut RawResources) -> Result<()> {
    let document = read_xml(path)?;
    if document.tag != "selector" {
        log::warn!("{}: expected <selector>, found <{}>", path.display(), document.tag);
        return Ok(());
    }
    raw.color_states
        .insert(resource_name(path), selector_items(&document, "android:color"));
    Ok(())
}

fn read_drawable_file(path: &Path, raw: &mut RawResources) -> Result<()> {
    let name = resource_name(path);
    if raw.drawables.contains_key(&name) {
        log::trace!("{}: '{}' already read from another density", path.display(), name);
        return Ok(());
    }
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        raw.drawables.insert(name, RawDrawable::Image { file: file_name(path) });
        return Ok(());
    }
    if extension != "xml" {
        log::trace!("Ignoring {}", path.display());
        return Ok(());
    }

    let document = read_xml(path)?;
    let drawable = match document.tag.as_str() {
        "selector" => RawDrawable::Selector(selector_items(&document, "android:drawable")),
        "shape" => RawDrawable::Shape(read_shape(&document)),
        "layer-list" => RawDrawable::LayerList(
            document
                .children
                .iter()
                .filter(|c| c.tag == "item")
                .filter_map(|item| item.attribute("android:drawable").map(str::to_string))
                .collect(),
        ),
        "vector" => RawDrawable::Vector { file: file_name(path) },
        "bitmap" | "nine-patch" => match document.attribute("android:src") {
            Some(src) => RawDrawable::Alias(src.to_string()),
            None => {
                log::warn!("{}: <{}> without android:src", path.display(), document.tag);
                return Ok(());
            }
        },
        other => {
            log::warn!("{}: unsupported drawable <{}>", path.display(), other);
            return Ok(());
        }
    };
    raw.drawables.insert(name, drawable);
    Ok(())
}

fn read_shape(document: &SourceElement) -> RawShape {
    let mut shape = RawShape {
        kind: ShapeKind::parse(document.attribute("android:shape").unwrap_or("rectangle")),
        ..RawShape::default()
    };
    for child in &document.children {
        let attr = |name: &str| child.attribute(name).map(str::to_string);
        match child.tag.as_str() {
            "solid" => shape.solid = attr("android:color"),
            "stroke" => {
                shape.stroke_width = attr("android:width");
                shape.stroke_color = attr("android:color");
            }
            "corners" => shape.corner_radius = attr("android:radius"),
            "gradient" => {
                if let (Some(start), Some(end)) = (attr("android:startColor"), attr("android:endColor")) {
                    let angle = child
                        .attribute("android:angle")
                        .and_then(|a| a.parse::<f64>().ok())
                        .unwrap_or(0.0);
                    shape.gradient = Some((start, end, angle));
                }
            }
            _ => {}
        }
    }
    shape
}

fn read_font_file(path: &Path, raw: &mut RawResources) -> Result<()> {
    let name = resource_name(path);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if FONT_EXTENSIONS.contains(&extension.as_str()) {
        raw.fonts.insert(name, RawFont::File(file_name(path)));
        return Ok(());
    }
    if extension != "xml" {
        return Ok(());
    }

    let document = read_xml(path)?;
    if document.tag != "font-family" {
        log::warn!("{}: expected <font-family>, found <{}>", path.display(), document.tag);
        return Ok(());
    }
    let entries = document
        .children
        .iter()
        .filter(|c| c.tag == "font")
        .filter_map(|font| {
            let get = |key: &str| {
                font.attribute(&format!("android:{key}"))
                    .or_else(|| font.attribute(&format!("app:{key}")))
            };
            get("font").map(|reference| RawFontEntry {
                font: reference.to_string(),
                weight: get("fontWeight").and_then(|w| w.parse().ok()).unwrap_or(400),
                italic: get("fontStyle") == Some("italic"),
            })
        })
        .collect();
    raw.fonts.insert(name, RawFont::Family(entries));
    Ok(())
}
