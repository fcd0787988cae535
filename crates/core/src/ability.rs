// crates/core/src/ability.rs
//! Ability roll-up over the content hierarchy.
//!
//! Scoring produces per-item ability fractions at the leaves of the content
//! tree; dashboards and the IRT training job want an estimate at every
//! ancestor. The roll-up fans out level by level from the bottom of the
//! fixed hierarchy: each parent carries the mean of its scored children, and
//! a node with scored children ignores any direct score it was given.

use std::collections::HashMap;

use crate::content::MAX_TREE_DEPTH;

/// Minimal tree shape the roll-up needs; callers build this from stored
/// learning objects or any other (id, parent, level) source.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: String,
    pub parent_id: Option<String>,
    pub level: i64,
}

/// Roll leaf scores up the hierarchy.
///
/// Returns a score for every node that has one directly or through scored
/// descendants. Unscored branches are simply absent from the result; they do
/// not drag ancestors toward zero.
pub fn roll_up_scores(
    nodes: &[TreeNode],
    leaf_scores: &HashMap<String, f64>,
) -> HashMap<String, f64> {
    let mut scores: HashMap<String, f64> = nodes
        .iter()
        .filter_map(|n| leaf_scores.get(&n.id).map(|s| (n.id.clone(), *s)))
        .collect();

    // Bottom-up over the fixed hierarchy. Level 1 nodes are roots.
    for level in (2..=MAX_TREE_DEPTH).rev() {
        let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
        for node in nodes.iter().filter(|n| n.level == level) {
            let (Some(parent), Some(score)) = (node.parent_id.as_deref(), scores.get(&node.id))
            else {
                continue;
            };
            let entry = sums.entry(parent).or_insert((0.0, 0));
            entry.0 += *score;
            entry.1 += 1;
        }
        for (parent, (sum, count)) in sums {
            scores.insert(parent.to_string(), sum / count as f64);
        }
    }

    scores
}
