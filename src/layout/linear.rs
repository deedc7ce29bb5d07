//! Linear containers become stack views
//!
//! Planning is separated from tree edits so the placement decisions can be
//! inspected on their own. Margins shared by every child are hoisted into the
//! stack's spacing and layout margins; whatever a child needs beyond that is
//! expressed with a wrapper view that insets the child. Stack spacing applies
//! between every pair of members, so extra margins never become members.

use super::{
    pin_edges, place, size_constraints, synthetic_node, hugging_key, Align, Axis, Insets, LayoutChild,
    LayoutParams, Size, SPACER_HUGGING, STRETCH_BONUS,
};
use crate::dest::{Anchor, DestTree, NodeId, Relation};
use crate::error::Result;
use crate::rules::DestinationTemplate;
use crate::value::format_number;

pub const AXIS_KEY: &str = "axis";
pub const ALIGNMENT_KEY: &str = "alignment";
pub const SPACING_KEY: &str = "spacing";
pub const MARGINS_NODE: &str = "directionalEdgeInsets";
pub const MARGINS_KEY: &str = "directionalLayoutMargins";
pub const RELATIVE_MARGINS_KEY: &str = "layoutMarginsRelativeArrangement";

const EPSILON: f64 = 1e-6;

/// How one child is put into the stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Direct,
    /// The child sits in a wrapper that the stack aligns, inset by its
    /// excess margins along the axis.
    Padded { before: f64, after: f64 },
    /// The child sits in its own wrapper view with the given excess margins.
    Wrapped {
        align: Align,
        along: (f64, f64),
        cross: (f64, f64),
    },
}

/// Where flexible spacers absorb leftover room along the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filler {
    None,
    Before,
    After,
    Around,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearPlan {
    pub axis: Axis,
    pub consensus: Align,
    /// Margin shared by every child along the axis.
    pub hoisted: f64,
    /// Margin shared by every child across the axis.
    pub hoisted_cross: f64,
    /// Container padding plus the hoisted margins.
    pub insets: Insets,
    pub placements: Vec<Placement>,
    /// Indices of children with a positive weight.
    pub weighted: Vec<usize>,
    pub filler: Filler,
}

/// Cross-axis alignment a child asks for.
pub fn alignment(container: &LayoutParams, child: &LayoutParams, cross: Axis) -> Align {
    if child.size(cross) == Size::MatchParent {
        return Align::Fill;
    }
    child
        .layout_gravity
        .on(cross)
        .or_else(|| container.gravity.on(cross))
        .unwrap_or(Align::Start)
}

/// The most common alignment, stretching favoured on ties and otherwise the
/// earliest of start, center, end.
pub fn consensus(alignments: &[Align]) -> Align {
    if alignments.is_empty() {
        return Align::Fill;
    }
    let score = |align: Align| {
        let count = alignments.iter().filter(|a| **a == align).count() as f64;
        match align {
            Align::Fill => count + STRETCH_BONUS,
            _ => count,
        }
    };
    let mut best = (Align::Start, score(Align::Start));
    for align in [Align::Center, Align::End, Align::Fill] {
        let candidate = score(align);
        if candidate > best.1 {
            best = (align, candidate);
        }
    }
    best.0
}

fn shared_margin(children: &[LayoutParams], axis: Axis) -> f64 {
    let shared = children
        .iter()
        .flat_map(|child| [child.margin.start(axis), child.margin.end(axis)])
        .fold(f64::INFINITY, f64::min);
    if shared.is_finite() {
        shared.max(0.0)
    } else {
        0.0
    }
}

pub fn plan(container: &LayoutParams, children: &[LayoutParams]) -> LinearPlan {
    let axis = container.orientation;
    let cross = axis.cross();

    let alignments: Vec<Align> = children
        .iter()
        .map(|child| alignment(container, child, cross))
        .collect();
    let consensus = consensus(&alignments);

    let hoisted = shared_margin(children, axis);
    let hoisted_cross = shared_margin(children, cross);
    let mut insets = container.padding;
    insets.set_start(axis, insets.start(axis) + hoisted);
    insets.set_end(axis, insets.end(axis) + hoisted);
    insets.set_start(cross, insets.start(cross) + hoisted_cross);
    insets.set_end(cross, insets.end(cross) + hoisted_cross);

    let placements = children
        .iter()
        .zip(&alignments)
        .map(|(child, align)| {
            let along = (
                child.margin.start(axis) - hoisted,
                child.margin.end(axis) - hoisted,
            );
            let across = (
                child.margin.start(cross) - hoisted_cross,
                child.margin.end(cross) - hoisted_cross,
            );
            let fits_across = across.0 <= EPSILON && across.1 <= EPSILON;
            if *align == consensus && fits_across {
                if along.0 <= EPSILON && along.1 <= EPSILON {
                    Placement::Direct
                } else {
                    Placement::Padded {
                        before: along.0,
                        after: along.1,
                    }
                }
            } else {
                Placement::Wrapped {
                    align: *align,
                    along,
                    cross: across,
                }
            }
        })
        .collect();

    let weighted: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, child)| child.weight > 0.0)
        .map(|(index, _)| index)
        .collect();

    let stretches = children.iter().any(|child| child.size(axis) == Size::MatchParent);
    let filler = if !weighted.is_empty() || stretches || container.size(axis) == Size::WrapContent {
        Filler::None
    } else {
        match container.gravity.on(axis).unwrap_or(Align::Start) {
            Align::Start | Align::Fill => Filler::After,
            Align::Center => Filler::Around,
            Align::End => Filler::Before,
        }
    };

    LinearPlan {
        axis,
        consensus,
        hoisted,
        hoisted_cross,
        insets,
        placements,
        weighted,
        filler,
    }
}

fn alignment_name(cross: Axis, align: Align) -> Option<&'static str> {
    match (cross, align) {
        (_, Align::Fill) => None,
        (_, Align::Center) => Some("center"),
        (Axis::Horizontal, Align::Start) => Some("leading"),
        (Axis::Horizontal, Align::End) => Some("trailing"),
        (Axis::Vertical, Align::Start) => Some("top"),
        (Axis::Vertical, Align::End) => Some("bottom"),
    }
}

fn flexible_spacer(tree: &mut DestTree, base: &DestinationTemplate, container: NodeId, axis: Axis) -> NodeId {
    let spacer = synthetic_node(tree, base, container);
    tree.set_attribute(spacer, hugging_key(axis), &SPACER_HUGGING.to_string());
    spacer
}

/// Turn `container` into a stack of `children`. Returns the number of
/// spacers and wrappers added.
pub fn arrange(
    tree: &mut DestTree,
    base: &DestinationTemplate,
    container: NodeId,
    params: &LayoutParams,
    children: &[LayoutChild],
) -> Result<usize> {
    let child_params: Vec<LayoutParams> = children.iter().map(|c| c.params.clone()).collect();
    let plan = plan(params, &child_params);
    let axis = plan.axis;
    let cross = axis.cross();
    log::debug!(
        "Stack on {} axis: {} children, consensus {:?}, spacing {}",
        axis.name(),
        children.len(),
        plan.consensus,
        plan.hoisted * 2.0
    );

    let mut synthetic = 0;
    let mut members = Vec::with_capacity(children.len() + 2);
    let mut member_of = Vec::with_capacity(children.len());

    let leading_filler = match plan.filler {
        Filler::Before | Filler::Around => {
            let spacer = flexible_spacer(tree, base, container, axis);
            synthetic += 1;
            members.push(spacer);
            Some(spacer)
        }
        _ => None,
    };

    for (child, placement) in children.iter().zip(&plan.placements) {
        let weighted = child.params.weight > 0.0;
        for side in [axis, cross] {
            if !(weighted && side == axis) {
                size_constraints(tree, child.node, &child.params, side);
            }
        }

        match *placement {
            Placement::Direct => {
                members.push(child.node);
                member_of.push(child.node);
            }
            Placement::Padded { before, after } => {
                let wrapper = synthetic_node(tree, base, container);
                synthetic += 1;
                tree.reparent(child.node, wrapper);
                pin_edges(tree, child.node, wrapper, axis, before, after);
                pin_edges(tree, child.node, wrapper, cross, 0.0, 0.0);
                members.push(wrapper);
                member_of.push(wrapper);
            }
            Placement::Wrapped {
                align,
                along,
                cross: excess,
            } => {
                let wrapper = synthetic_node(tree, base, container);
                synthetic += 1;
                tree.reparent(child.node, wrapper);
                pin_edges(tree, child.node, wrapper, axis, along.0, along.1);
                place(tree, child.node, wrapper, cross, align, excess.0, excess.1);
                match align {
                    Align::Start => {
                        tree.constraint(
                            Anchor::new(wrapper, cross.end()),
                            Anchor::new(child.node, cross.end()),
                            Relation::GreaterOrEqual,
                            excess.1,
                            1.0,
                        );
                    }
                    Align::Center | Align::End => {
                        tree.constraint(
                            Anchor::new(child.node, cross.start()),
                            Anchor::new(wrapper, cross.start()),
                            Relation::GreaterOrEqual,
                            excess.0,
                            1.0,
                        );
                    }
                    Align::Fill => {}
                }
                if plan.consensus != Align::Fill {
                    tree.constraint(
                        Anchor::new(wrapper, cross.dimension()),
                        Anchor::new(container, cross.dimension()),
                        Relation::Equal,
                        -(plan.insets.start(cross) + plan.insets.end(cross)),
                        1.0,
                    );
                }
                members.push(wrapper);
                member_of.push(wrapper);
            }
        }
    }

    if matches!(plan.filler, Filler::After | Filler::Around) {
        let spacer = flexible_spacer(tree, base, container, axis);
        synthetic += 1;
        members.push(spacer);
        if let Some(leading) = leading_filler {
            tree.pin(
                Anchor::new(leading, axis.dimension()),
                Anchor::new(spacer, axis.dimension()),
                0.0,
            );
        }
    }

    if let Some((&reference, rest)) = plan.weighted.split_first() {
        let reference_weight = children[reference].params.weight;
        for &index in rest {
            tree.constraint(
                Anchor::new(member_of[reference], axis.dimension()),
                Anchor::new(member_of[index], axis.dimension()),
                Relation::Equal,
                0.0,
                reference_weight / children[index].params.weight,
            );
        }
    }

    // Fixed children of the content node stay in front of the arranged ones.
    let content = tree.content_of(container);
    let mut ordered: Vec<NodeId> = tree
        .node(content)
        .children
        .iter()
        .copied()
        .filter(|c| !members.contains(c))
        .collect();
    ordered.extend(members);
    tree.set_children(container, ordered);

    tree.set_attribute(container, AXIS_KEY, axis.name());
    if let Some(name) = alignment_name(cross, plan.consensus) {
        tree.set_attribute(container, ALIGNMENT_KEY, name);
    }
    if plan.hoisted > EPSILON {
        tree.set_attribute(container, SPACING_KEY, &format_number(plan.hoisted * 2.0));
    }
    if !plan.insets.is_zero() {
        let margins = tree.find_or_create_child(container, MARGINS_NODE, Some(("key", MARGINS_KEY)));
        let insets = plan.insets;
        tree.set_attribute(margins, "top", &format_number(insets.top));
        tree.set_attribute(margins, "leading", &format_number(insets.leading));
        tree.set_attribute(margins, "bottom", &format_number(insets.bottom));
        tree.set_attribute(margins, "trailing", &format_number(insets.trailing));
        tree.set_attribute(container, RELATIVE_MARGINS_KEY, "YES");
    }

    Ok(synthetic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dest::AnchorAttribute;
    use crate::layout::Gravity;
    use crate::template::Template;

    fn base() -> DestinationTemplate {
        DestinationTemplate {
            name: "view".to_string(),
            holder: Some("subviews".to_string()),
            ..DestinationTemplate::default()
        }
    }

    fn vertical() -> LayoutParams {
        LayoutParams {
            orientation: Axis::Vertical,
            ..LayoutParams::default()
        }
    }

    fn with_margins(top: f64, bottom: f64) -> LayoutParams {
        LayoutParams {
            margin: Insets {
                top,
                bottom,
                ..Insets::default()
            },
            ..LayoutParams::default()
        }
    }

    fn build(container: &LayoutParams, children: Vec<LayoutParams>) -> (DestTree, NodeId, Vec<NodeId>, usize) {
        let base = base();
        let mut tree = DestTree::new("stack");
        let root = tree.instantiate(&base, None, &|t: &Template| t.write(|_| None));
        let layout: Vec<LayoutChild> = children
            .into_iter()
            .map(|params| LayoutChild {
                node: synthetic_node(&mut tree, &base, root),
                params,
            })
            .collect();
        let nodes = layout.iter().map(|c| c.node).collect();
        let synthetic = arrange(&mut tree, &base, root, container, &layout).unwrap();
        (tree, root, nodes, synthetic)
    }

    #[test]
    fn test_consensus_ties() {
        assert_eq!(consensus(&[]), Align::Fill);
        assert_eq!(consensus(&[Align::Start, Align::Fill]), Align::Fill);
        assert_eq!(consensus(&[Align::End, Align::Center]), Align::Center);
        assert_eq!(consensus(&[Align::End, Align::Start]), Align::Start);
        assert_eq!(consensus(&[Align::End, Align::End, Align::Fill]), Align::End);
    }

    #[test]
    fn test_shared_margins_are_hoisted() {
        let children = vec![with_margins(8.0, 8.0), with_margins(12.0, 8.0), with_margins(8.0, 20.0)];
        let plan = plan(&vertical(), &children);

        assert_eq!(plan.hoisted, 8.0);
        assert_eq!(plan.insets.top, 8.0);
        assert_eq!(plan.insets.bottom, 8.0);
        assert_eq!(
            plan.placements,
            vec![
                Placement::Direct,
                Placement::Padded { before: 4.0, after: 0.0 },
                Placement::Padded { before: 0.0, after: 12.0 },
            ]
        );
        for (child, placement) in children.iter().zip(&plan.placements) {
            let (before, after) = match placement {
                Placement::Padded { before, after } => (*before, *after),
                _ => (0.0, 0.0),
            };
            assert_eq!(plan.hoisted + before, child.margin.top);
            assert_eq!(plan.hoisted + after, child.margin.bottom);
        }
    }

    #[test]
    fn test_excess_margins_keep_android_gaps() {
        let container = LayoutParams {
            height: Size::WrapContent,
            ..vertical()
        };
        let children = vec![with_margins(8.0, 8.0), with_margins(12.0, 8.0), with_margins(8.0, 20.0)];
        let (tree, root, nodes, synthetic) = build(&container, children.clone());

        // Every member is a child or its wrapper; excess margins never add members.
        let members = tree.node(tree.content_of(root)).children.clone();
        assert_eq!(synthetic, 2);
        assert_eq!(members.len(), 3);
        assert_eq!(members[0], nodes[0]);
        for index in [1, 2] {
            assert_eq!(tree.node(nodes[index]).parent, Some(tree.content_of(members[index])));
        }
        assert!(!tree
            .constraints()
            .iter()
            .any(|c| c.second.is_none() && members.contains(&c.first.node)));

        let spacing: f64 = tree.node(root).attribute(SPACING_KEY).unwrap().parse().unwrap();
        assert_eq!(spacing, 16.0);
        let margins = tree.node(root).children.iter().copied().find(|c| tree.node(*c).name == MARGINS_NODE).unwrap();
        let inset = |key: &str| tree.node(margins).attribute(key).unwrap().parse::<f64>().unwrap();

        // Offset of a child's edge inside whatever the stack arranges.
        let offset = |child: NodeId, attribute: AnchorAttribute| -> f64 {
            tree.constraints()
                .iter()
                .find(|c| {
                    c.first.attribute == attribute
                        && c.second.map(|s| s.attribute) == Some(attribute)
                        && (c.first.node == child || c.second.map(|s| s.node) == Some(child))
                })
                .map_or(0.0, |c| c.constant)
        };
        assert_eq!(inset("top") + offset(nodes[0], AnchorAttribute::Top), 8.0);
        for pair in [0, 1] {
            let gap = offset(nodes[pair], AnchorAttribute::Bottom) + spacing + offset(nodes[pair + 1], AnchorAttribute::Top);
            assert_eq!(gap, children[pair].margin.bottom + children[pair + 1].margin.top);
        }
        assert_eq!(inset("bottom") + offset(nodes[2], AnchorAttribute::Bottom), 20.0);
    }

    #[test]
    fn test_wrapped_child_constraints_hosted_at_common_ancestor() {
        let container = LayoutParams {
            height: Size::WrapContent,
            ..vertical()
        };
        let centered = LayoutParams {
            layout_gravity: Gravity::parse("center_horizontal"),
            ..LayoutParams::default()
        };
        let (tree, root, nodes, _) = build(&container, vec![centered, LayoutParams::default(), LayoutParams::default()]);
        let wrapper = tree.node(tree.content_of(root)).children[0];
        assert_ne!(wrapper, nodes[0]);

        let hosted = tree.hosted_constraints().unwrap();
        let centering = hosted[&wrapper]
            .iter()
            .find(|c| c.first.node == nodes[0] && c.first.attribute == AnchorAttribute::CenterX)
            .unwrap();
        assert_eq!(centering.second.map(|s| s.node), Some(wrapper));
        assert!(hosted[&root].iter().any(|c| {
            c.first == Anchor::new(wrapper, AnchorAttribute::Width)
                && c.second == Some(Anchor::new(root, AnchorAttribute::Width))
        }));
        assert!(!hosted.contains_key(&tree.content_of(root)));
    }

    #[test]
    fn test_row_aligned_to_bottom() {
        let container = LayoutParams {
            width: Size::WrapContent,
            ..LayoutParams::default()
        };
        let child = LayoutParams {
            layout_gravity: Gravity::parse("bottom"),
            ..LayoutParams::default()
        };
        let (tree, root, nodes, synthetic) = build(&container, vec![child.clone(), child]);

        assert_eq!(synthetic, 0);
        assert_eq!(tree.node(root).attribute(ALIGNMENT_KEY), Some("bottom"));
        assert_eq!(tree.node(root).attribute(AXIS_KEY), Some("horizontal"));
        assert_eq!(tree.node(root).attribute(SPACING_KEY), None);
        assert_eq!(tree.node(tree.content_of(root)).children, nodes);
    }

    #[test]
    fn test_weights_become_ratios() {
        let container = LayoutParams {
            height: Size::MatchParent,
            ..vertical()
        };
        let weighted = |weight| LayoutParams {
            height: Size::Exact(0.0),
            width: Size::MatchParent,
            weight,
            ..LayoutParams::default()
        };
        let (tree, _, nodes, synthetic) = build(&container, vec![weighted(1.0), weighted(1.0), weighted(2.0)]);

        assert_eq!(synthetic, 0);
        let ratios: Vec<(NodeId, NodeId, f64)> = tree
            .constraints()
            .iter()
            .filter_map(|c| c.second.map(|s| (c.first.node, s.node, c.multiplier)))
            .collect();
        assert_eq!(ratios, vec![(nodes[0], nodes[1], 1.0), (nodes[0], nodes[2], 0.5)]);
        assert!(!tree
            .constraints()
            .iter()
            .any(|c| c.second.is_none() && c.first.attribute == AnchorAttribute::Height));
    }

    #[test]
    fn test_odd_alignment_is_wrapped() {
        let container = LayoutParams {
            height: Size::WrapContent,
            ..vertical()
        };
        let centered = LayoutParams {
            layout_gravity: Gravity::parse("center_horizontal"),
            ..LayoutParams::default()
        };
        let (tree, root, nodes, synthetic) =
            build(&container, vec![centered, LayoutParams::default(), LayoutParams::default()]);

        assert_eq!(synthetic, 1);
        assert_eq!(tree.node(root).attribute(ALIGNMENT_KEY), Some("leading"));
        let content = tree.content_of(root);
        assert_ne!(tree.node(nodes[0]).parent, Some(content));
        assert_eq!(tree.node(content).children.len(), 3);
        assert!(tree
            .constraints()
            .iter()
            .any(|c| c.first.node == nodes[0] && c.first.attribute == AnchorAttribute::CenterX));
    }

    #[test]
    fn test_trailing_filler_follows_gravity() {
        let container = LayoutParams {
            height: Size::MatchParent,
            gravity: Gravity::parse("center_vertical"),
            ..vertical()
        };
        let (tree, root, nodes, synthetic) = build(&container, vec![LayoutParams::default()]);

        assert_eq!(synthetic, 2);
        let members = &tree.node(tree.content_of(root)).children;
        assert_eq!(members.len(), 3);
        assert_eq!(members[1], nodes[0]);
        assert_eq!(tree.node(members[0]).attribute("verticalHuggingPriority"), Some("1"));
    }
}
