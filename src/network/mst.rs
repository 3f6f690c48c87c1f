//! Minimum spanning tree of a distance matrix using
//! [Kruskal's algorithm](https://en.wikipedia.org/wiki/Kruskal's_algorithm).

use crate::network::union_find::UnionFind;
use crate::structs::{DistanceMatrix, NetError, Result, SpanningTree, TreeEdge};
use tracing::debug;

/// Upper-triangle pairs with a finite distance, sorted by distance then `(i, j)`
fn sorted_candidates(distance: &DistanceMatrix) -> Vec<(f64, usize, usize)> {
    let n = distance.size();
    let mut candidates = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = distance.matrix[[i, j]];
            if d.is_finite() {
                candidates.push((d, i, j));
            }
        }
    }
    candidates.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });
    candidates
}

/// Build the minimum spanning tree over the complete graph implied by `distance`
///
/// Equal distances are resolved in `(i, j)` index order, so the result is
/// reproducible. Non-finite entries count as missing pairs. `labels`, when
/// given, must name every vertex and are only carried along for display.
///
/// # Errors
/// Returns `DisconnectedInput` if fewer than `n - 1` edges can be accepted,
/// and `Data` if the label count does not match the matrix size
pub fn build_mst(distance: &DistanceMatrix, labels: Option<&[String]>) -> Result<SpanningTree> {
    let n = distance.size();
    if let Some(labels) = labels {
        if labels.len() != n {
            return Err(NetError::Data(format!(
                "{} labels given for {n} vertices",
                labels.len()
            )));
        }
    }

    let required = n.saturating_sub(1);
    let mut components = UnionFind::new(n);
    let mut edges = Vec::with_capacity(required);

    for (d, i, j) in sorted_candidates(distance) {
        if edges.len() == required {
            break;
        }
        if components.union(i, j) {
            edges.push(TreeEdge {
                source: i,
                target: j,
                distance: d,
            });
        }
    }

    if edges.len() < required {
        return Err(NetError::DisconnectedInput {
            accepted: edges.len(),
            required,
        });
    }

    debug!(vertices = n, edges = edges.len(), "built spanning tree");
    Ok(SpanningTree::new(n, edges, labels.map(<[String]>::to_vec)))
}
