//! Scroll containers: the content scrolls along one axis and fills the other.

use super::{pin_edges, Axis, LayoutChild, LayoutParams};
use crate::dest::{Anchor, DestTree, NodeId, Relation};

pub fn arrange(
    tree: &mut DestTree,
    container: NodeId,
    params: &LayoutParams,
    children: &[LayoutChild],
    scroll_axis: Axis,
) {
    if children.len() > 1 {
        log::warn!(
            "Scroll container has {} children; only one is expected",
            children.len()
        );
    }
    let cross = scroll_axis.cross();
    for child in children {
        let insets = params.padding.plus(&child.params.margin);
        for axis in [Axis::Horizontal, Axis::Vertical] {
            pin_edges(tree, child.node, container, axis, insets.start(axis), insets.end(axis));
        }
        tree.constraint(
            Anchor::new(child.node, cross.dimension()),
            Anchor::new(container, cross.dimension()),
            Relation::Equal,
            -(insets.start(cross) + insets.end(cross)),
            1.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dest::AnchorAttribute;
    use crate::layout::Insets;

    #[test]
    fn test_vertical_scroll_pins_width() {
        let mut tree = DestTree::new("scroll");
        let container = tree.add_node("scrollView", None);
        let child = tree.add_node("view", Some(container));
        let params = LayoutParams {
            padding: Insets::uniform(8.0),
            ..LayoutParams::default()
        };
        let child_params = LayoutParams {
            margin: Insets {
                leading: 4.0,
                ..Insets::default()
            },
            ..LayoutParams::default()
        };
        arrange(
            &mut tree,
            container,
            &params,
            &[LayoutChild {
                node: child,
                params: child_params,
            }],
            Axis::Vertical,
        );

        let constraints = tree.constraints();
        assert_eq!(constraints.len(), 5);
        let width = &constraints[4];
        assert_eq!(width.first, Anchor::new(child, AnchorAttribute::Width));
        assert_eq!(width.second, Some(Anchor::new(container, AnchorAttribute::Width)));
        assert_eq!(width.constant, -20.0);
    }
}
