//! Overlay containers: every child is positioned against the container
//! independently on each axis.

use super::{place, size_constraints, Align, Axis, LayoutChild, LayoutParams, Size};
use crate::dest::{DestTree, NodeId};

/// How a frame child is placed on `axis`.
pub fn child_alignment(child: &LayoutParams, axis: Axis) -> Align {
    if child.size(axis) == Size::MatchParent {
        return Align::Fill;
    }
    child.layout_gravity.on(axis).unwrap_or(Align::Start)
}

pub fn arrange(tree: &mut DestTree, container: NodeId, params: &LayoutParams, children: &[LayoutChild]) {
    for child in children {
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let start = params.padding.start(axis) + child.params.margin.start(axis);
            let end = params.padding.end(axis) + child.params.margin.end(axis);
            let align = child_alignment(&child.params, axis);
            place(tree, child.node, container, axis, align, start, end);
            if align != Align::Fill {
                size_constraints(tree, child.node, &child.params, axis);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dest::{AnchorAttribute, Constraint};
    use crate::layout::{Gravity, Insets};

    #[test]
    fn test_match_parent_height_with_end_gravity() {
        let mut tree = DestTree::new("frame");
        let container = tree.add_node("view", None);
        let child = tree.add_node("view", Some(container));
        let params = LayoutParams {
            padding: Insets::uniform(4.0),
            ..LayoutParams::default()
        };
        let child_params = LayoutParams {
            width: Size::Exact(100.0),
            height: Size::MatchParent,
            layout_gravity: Gravity::parse("end"),
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
        );

        let involves = |c: &Constraint, attribute: AnchorAttribute| {
            c.first.attribute == attribute || c.second.map(|s| s.attribute) == Some(attribute)
        };
        let constraints = tree.constraints();
        assert!(constraints.iter().any(|c| involves(c, AnchorAttribute::Top)));
        assert!(constraints.iter().any(|c| involves(c, AnchorAttribute::Bottom)));
        assert!(constraints
            .iter()
            .any(|c| c.first.node == container && c.first.attribute == AnchorAttribute::Trailing && c.constant == 4.0));
        assert!(!constraints.iter().any(|c| involves(c, AnchorAttribute::Leading)));
        assert!(constraints
            .iter()
            .any(|c| c.second.is_none() && c.first.attribute == AnchorAttribute::Width && c.constant == 100.0));
        assert!(!constraints.iter().any(|c| c.second.is_none() && c.first.attribute == AnchorAttribute::Height));
        assert_eq!(constraints.len(), 4);
    }

    #[test]
    fn test_center_gravity_uses_center_anchors() {
        let mut tree = DestTree::new("frame");
        let container = tree.add_node("view", None);
        let child = tree.add_node("view", Some(container));
        let child_params = LayoutParams {
            layout_gravity: Gravity::parse("center"),
            ..LayoutParams::default()
        };
        arrange(
            &mut tree,
            container,
            &LayoutParams::default(),
            &[LayoutChild {
                node: child,
                params: child_params,
            }],
        );
        let attributes: Vec<AnchorAttribute> = tree.constraints().iter().map(|c| c.first.attribute).collect();
        assert_eq!(attributes, vec![AnchorAttribute::CenterX, AnchorAttribute::CenterY]);
    }
}
