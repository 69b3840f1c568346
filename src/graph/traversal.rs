//! Path finding and cycle detection over the adjacency index

use super::aggregate::Graph;
use super::node::NodeId;
use std::collections::{HashSet, VecDeque};
use tracing::trace;

impl Graph {
    /// Shortest path by hop count from `start` to `end`, both inclusive
    ///
    /// Breadth-first over outgoing adjacency; edge weights are ignored.
    /// Nodes are marked visited when dequeued, so the same node may sit in
    /// the queue more than once; the first dequeue of `end` wins. Returns
    /// `None` if either endpoint is not a stored node or `end` is
    /// unreachable.
    pub fn find_path(&self, start: &NodeId, end: &NodeId) -> Option<Vec<NodeId>> {
        if !self.nodes.contains_key(start) || !self.nodes.contains_key(end) {
            return None;
        }

        // Every enqueued hop, with the index of the hop it came from
        let mut trail: Vec<(&NodeId, Option<usize>)> = vec![(start, None)];
        let mut queue: VecDeque<usize> = VecDeque::from([0]);
        let mut visited: HashSet<&NodeId> = HashSet::new();

        while let Some(index) = queue.pop_front() {
            let current = trail[index].0;
            if current == end {
                let path = unwind(&trail, index);
                trace!(length = path.len(), enqueued = trail.len(), "path found");
                return Some(path);
            }
            if !visited.insert(current) {
                continue;
            }

            if let Some(outgoing) = self.adjacency.get(current) {
                for neighbor in outgoing {
                    if !visited.contains(neighbor) {
                        trail.push((neighbor, Some(index)));
                        queue.push_back(trail.len() - 1);
                    }
                }
            }
        }

        None
    }

    /// Every cycle met by a depth-first walk of the adjacency index
    ///
    /// Roots are tried in node insertion order. Each back edge to a node on
    /// the current path records the path suffix starting at that node. The
    /// same cycle may be reported more than once, and rotations are not
    /// merged.
    pub fn detect_cycles(&self) -> Vec<Vec<NodeId>> {
        let mut cycles = Vec::new();
        let mut visited: HashSet<&NodeId> = HashSet::new();

        for root in self.nodes.keys() {
            if !visited.contains(root) {
                self.walk_for_cycles(root, &mut visited, &mut cycles);
            }
        }

        trace!(count = cycles.len(), "cycle detection finished");
        cycles
    }

    /// Iterative DFS from `root`
    ///
    /// `path` is the recursion stack; `cursors[i]` is the index of the next
    /// neighbor of `path[i]` to examine.
    fn walk_for_cycles<'a>(
        &'a self,
        root: &'a NodeId,
        visited: &mut HashSet<&'a NodeId>,
        cycles: &mut Vec<Vec<NodeId>>,
    ) {
        let mut path: Vec<&'a NodeId> = vec![root];
        let mut cursors: Vec<usize> = vec![0];
        let mut on_path: HashSet<&'a NodeId> = HashSet::from([root]);
        visited.insert(root);

        while let Some(&current) = path.last() {
            let depth = path.len() - 1;
            let next = self
                .adjacency
                .get(current)
                .and_then(|outgoing| outgoing.get_index(cursors[depth]));

            let Some(neighbor) = next else {
                path.pop();
                cursors.pop();
                on_path.remove(current);
                continue;
            };
            cursors[depth] += 1;

            if !visited.contains(neighbor) {
                visited.insert(neighbor);
                on_path.insert(neighbor);
                path.push(neighbor);
                cursors.push(0);
            } else if on_path.contains(neighbor) {
                if let Some(start) = path.iter().position(|id| *id == neighbor) {
                    cycles.push(path[start..].iter().map(|id| (*id).clone()).collect());
                }
            }
        }
    }
}

fn unwind(trail: &[(&NodeId, Option<usize>)], mut index: usize) -> Vec<NodeId> {
    let mut path = vec![trail[index].0.clone()];
    while let Some(parent) = trail[index].1 {
        path.push(trail[parent].0.clone());
        index = parent;
    }
    path.reverse();
    path
}
