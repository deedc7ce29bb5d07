//! Constraint synthesis for container elements
//!
//! Each container kind turns the Android box model of its children (size,
//! gravity, margins, weights) into anchor constraints on the destination
//! tree, adding spacer and wrapper views where a stack cannot express a
//! child's placement on its own.

pub mod frame;
pub mod linear;
pub mod params;
pub mod scroll;

pub use params::{Align, Axis, Gravity, Insets, LayoutParams, Size};

use crate::dest::{Anchor, DestTree, NodeId, REQUIRED_PRIORITY, YIELDING_PRIORITY};
use crate::error::Result;
use crate::rules::{ContainerKind, DestinationTemplate};
use crate::template::Template;

/// Tie-break in favour of stretching when alignments are equally common.
pub const STRETCH_BONUS: f64 = 0.1;

/// Hugging/compression priority of a wrap_content element with no
/// wrap_content ancestors on the same axis.
pub const WRAP_POWER_BASE: u16 = 998;
/// Priority given up per wrap_content ancestor.
pub const WRAP_POWER_STEP: u16 = 2;

/// Hugging priority of filler spacers.
pub const SPACER_HUGGING: u16 = 1;

/// A translated child handed to its container's synthesizer.
#[derive(Debug, Clone)]
pub struct LayoutChild {
    /// The node the parent places: the outer node of a wrapped element.
    pub node: NodeId,
    pub params: LayoutParams,
}

/// Lay out `children` of `container` according to `kind`.
///
/// Returns the number of synthetic views (spacers and wrappers) added.
pub fn arrange(
    kind: ContainerKind,
    tree: &mut DestTree,
    base: &DestinationTemplate,
    container: NodeId,
    params: &LayoutParams,
    children: &[LayoutChild],
) -> Result<usize> {
    match kind {
        ContainerKind::Linear => linear::arrange(tree, base, container, params, children),
        ContainerKind::Frame => {
            frame::arrange(tree, container, params, children);
            Ok(0)
        }
        ContainerKind::ScrollVertical => {
            scroll::arrange(tree, container, params, children, Axis::Vertical);
            Ok(0)
        }
        ContainerKind::ScrollHorizontal => {
            scroll::arrange(tree, container, params, children, Axis::Horizontal);
            Ok(0)
        }
        ContainerKind::None => Ok(0),
    }
}

/// A plain view built from the base template, appended under `parent`.
pub fn synthetic_node(tree: &mut DestTree, base: &DestinationTemplate, parent: NodeId) -> NodeId {
    tree.instantiate(base, Some(parent), &|template: &Template| template.write(|_| None))
}

pub fn hugging_key(axis: Axis) -> &'static str {
    match axis {
        Axis::Horizontal => "horizontalHuggingPriority",
        Axis::Vertical => "verticalHuggingPriority",
    }
}

pub fn compression_key(axis: Axis) -> &'static str {
    match axis {
        Axis::Horizontal => "horizontalCompressionResistancePriority",
        Axis::Vertical => "verticalCompressionResistancePriority",
    }
}

/// `998 − 2 × depth`, where depth counts wrap_content ancestors on the axis.
pub fn wrap_power(depth: usize) -> u16 {
    let step = u16::try_from(depth)
        .unwrap_or(u16::MAX)
        .saturating_mul(WRAP_POWER_STEP);
    WRAP_POWER_BASE.saturating_sub(step).max(1)
}

pub fn apply_wrap_power(tree: &mut DestTree, node: NodeId, axis: Axis, depth: usize) {
    let power = wrap_power(depth).to_string();
    tree.set_attribute(node, hugging_key(axis), &power);
    tree.set_attribute(node, compression_key(axis), &power);
}

/// Explicit and minimum size constraints of `node` on `axis`.
///
/// An explicit size yields to a declared minimum.
pub fn size_constraints(tree: &mut DestTree, node: NodeId, params: &LayoutParams, axis: Axis) {
    let anchor = Anchor::new(node, axis.dimension());
    let min = params.min_size(axis);
    if let Some(size) = params.size(axis).exact() {
        let priority = if min.is_some() {
            YIELDING_PRIORITY
        } else {
            REQUIRED_PRIORITY
        };
        tree.set_to(anchor, size, priority);
    }
    if let Some(min) = min {
        tree.at_least(anchor, min);
    }
}

/// `child.start = container.start + start` and `container.end = child.end + end`.
pub fn pin_edges(tree: &mut DestTree, child: NodeId, container: NodeId, axis: Axis, start: f64, end: f64) {
    pin_start(tree, child, container, axis, start);
    pin_end(tree, child, container, axis, end);
}

pub fn pin_start(tree: &mut DestTree, child: NodeId, container: NodeId, axis: Axis, inset: f64) {
    tree.pin(
        Anchor::new(child, axis.start()),
        Anchor::new(container, axis.start()),
        inset,
    );
}

pub fn pin_end(tree: &mut DestTree, child: NodeId, container: NodeId, axis: Axis, inset: f64) {
    tree.pin(
        Anchor::new(container, axis.end()),
        Anchor::new(child, axis.end()),
        inset,
    );
}

/// Center `child` in `container`, shifted by the difference of the insets.
pub fn pin_center(tree: &mut DestTree, child: NodeId, container: NodeId, axis: Axis, start: f64, end: f64) {
    tree.pin(
        Anchor::new(child, axis.center()),
        Anchor::new(container, axis.center()),
        (start - end) / 2.0,
    );
}

/// Place `child` on `axis` of `container` according to `align`.
pub fn place(tree: &mut DestTree, child: NodeId, container: NodeId, axis: Axis, align: Align, start: f64, end: f64) {
    match align {
        Align::Fill => pin_edges(tree, child, container, axis, start, end),
        Align::Start => pin_start(tree, child, container, axis, start),
        Align::End => pin_end(tree, child, container, axis, end),
        Align::Center => pin_center(tree, child, container, axis, start, end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dest::AnchorAttribute;

    #[test]
    fn test_wrap_power_decreases_with_depth() {
        assert_eq!(wrap_power(0), 998);
        assert_eq!(wrap_power(1), 996);
        assert_eq!(wrap_power(3), 992);
        assert!(wrap_power(2) < wrap_power(1));
        assert_eq!(wrap_power(10_000), 1);
    }

    #[test]
    fn test_size_yields_to_minimum() {
        let mut tree = DestTree::new("t");
        let node = tree.add_node("view", None);
        let params = LayoutParams {
            width: Size::Exact(40.0),
            min_width: Some(48.0),
            height: Size::Exact(20.0),
            ..LayoutParams::default()
        };
        size_constraints(&mut tree, node, &params, Axis::Horizontal);
        size_constraints(&mut tree, node, &params, Axis::Vertical);

        let constraints = tree.constraints();
        assert_eq!(constraints.len(), 3);
        assert_eq!(constraints[0].first.attribute, AnchorAttribute::Width);
        assert_eq!(constraints[0].priority, YIELDING_PRIORITY);
        assert_eq!(constraints[1].constant, 48.0);
        assert_eq!(constraints[2].priority, REQUIRED_PRIORITY);
    }
}
