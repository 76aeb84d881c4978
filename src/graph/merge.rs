//! Group merge utility
//!
//! [`merge_group`] is the single place the "at most one parent" invariant is
//! enforced. Every producer that wants to add a group (the base builder for
//! application groups, depicters for their own groupings, the operator
//! reconciler for synthetic groups) routes through it. The utility has no
//! knowledge of why a group exists.

use crate::graph::TopologyNode;
use tracing::debug;

/// Merge a newly discovered group into the node list.
///
/// Rules, in order:
/// 1. Any child id already claimed by a *different* existing group is
///    stripped from the incoming group: the earliest group to claim a
///    child wins when two producers disagree about grouping in one pass.
/// 2. If no node with the incoming group's id exists, it is appended.
/// 3. Otherwise the existing group absorbs the incoming one: child ids not
///    already present are appended in order, and `group_resources` are
///    unioned without duplication (uid equality).
pub fn merge_group(mut new_group: TopologyNode, nodes: &mut Vec<TopologyNode>) {
    debug_assert!(new_group.group, "merge_group called with a non-group node");

    new_group.children.retain(|child| {
        let claimed_elsewhere = nodes
            .iter()
            .any(|n| n.id != new_group.id && n.children.iter().any(|c| c == child));
        if claimed_elsewhere {
            debug!(group = %new_group.id, child = %child, "child already owned by another group, stripped");
        }
        !claimed_elsewhere
    });

    let Some(existing) = nodes.iter_mut().find(|n| n.id == new_group.id) else {
        nodes.push(new_group);
        return;
    };

    for child in new_group.children {
        if !existing.children.contains(&child) {
            existing.children.push(child);
        }
    }

    if let Some(incoming) = group_resources_owned(new_group.data)
        && let Some(data) = existing.group_data_mut()
    {
        for resource in incoming {
            let duplicate = data.group_resources.iter().any(|r| {
                !r.metadata.uid.is_empty() && r.metadata.uid == resource.metadata.uid
            });
            if !duplicate {
                data.group_resources.push(resource);
            }
        }
    }
}

fn group_resources_owned(data: crate::graph::NodeData) -> Option<Vec<crate::resource::Resource>> {
    match data {
        crate::graph::NodeData::Group(group) => Some(group.group_resources),
        _ => None,
    }
}
