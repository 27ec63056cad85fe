//! Progression graph over placed areas
//!
//! A directed tree rooted at the region's start area; downstream systems
//! derive reachability and depth from it. Nodes live in an index arena so
//! links can be added and removed freely while the sequence search
//! backtracks.

use super::AreaId;

#[derive(Clone, Debug)]
struct ProgressionNode {
    area: AreaId,
    parent: Option<usize>,
    children: Vec<usize>,
    live: bool,
}

/// Directed reachability graph with a single root.
#[derive(Clone, Debug, Default)]
pub struct ProgressionGraph {
    nodes: Vec<ProgressionNode>,
    root: Option<usize>,
}

impl ProgressionGraph {
    pub fn new() -> ProgressionGraph {
        ProgressionGraph::default()
    }

    /// Makes `area` the root, destroying any existing graph.
    pub fn set_root(&mut self, area: AreaId) {
        self.nodes.clear();
        self.nodes.push(ProgressionNode {
            area,
            parent: None,
            children: Vec::new(),
            live: true,
        });
        self.root = Some(0);
    }

    pub fn root(&self) -> Option<AreaId> {
        self.root.map(|index| self.nodes[index].area)
    }

    /// Adds a parent -> child edge. Fails when the parent is not in the
    /// graph or the child already is.
    pub fn add_link(&mut self, parent: AreaId, child: AreaId) -> bool {
        let Some(parent_index) = self.find(parent) else {
            return false;
        };
        if self.find(child).is_some() {
            return false;
        }
        let child_index = self.nodes.len();
        self.nodes.push(ProgressionNode {
            area: child,
            parent: Some(parent_index),
            children: Vec::new(),
            live: true,
        });
        self.nodes[parent_index].children.push(child_index);
        true
    }

    /// Removes the parent -> child edge and the child node.
    pub fn remove_link(&mut self, parent: AreaId, child: AreaId) {
        let Some(parent_index) = self.find(parent) else {
            return;
        };
        let Some(child_index) = self.find(child) else {
            return;
        };
        if self.nodes[child_index].parent != Some(parent_index) {
            return;
        }
        self.nodes[parent_index]
            .children
            .retain(|&c| c != child_index);
        self.nodes[child_index].live = false;
    }

    /// The parent area of `area`, if any.
    pub fn previous_area(&self, area: AreaId) -> Option<AreaId> {
        let index = self.find(area)?;
        let parent = self.nodes[index].parent?;
        Some(self.nodes[parent].area)
    }

    pub fn contains(&self, area: AreaId) -> bool {
        self.find(area).is_some()
    }

    /// All (parent, child) edges, in insertion order.
    pub fn edges(&self) -> Vec<(AreaId, AreaId)> {
        self.nodes
            .iter()
            .filter(|node| node.live)
            .filter_map(|node| {
                let parent = node.parent?;
                Some((self.nodes[parent].area, node.area))
            })
            .collect()
    }

    /// Number of areas in the graph.
    pub fn area_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.live).count()
    }

    fn find(&self, area: AreaId) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.live && node.area == area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_and_links() {
        let mut graph = ProgressionGraph::new();
        assert_eq!(graph.root(), None);

        graph.set_root(AreaId(1));
        assert_eq!(graph.root(), Some(AreaId(1)));

        assert!(graph.add_link(AreaId(1), AreaId(2)));
        assert!(graph.add_link(AreaId(2), AreaId(3)));
        assert_eq!(graph.area_count(), 3);
        assert_eq!(graph.previous_area(AreaId(3)), Some(AreaId(2)));
        assert_eq!(graph.previous_area(AreaId(1)), None);
        assert_eq!(
            graph.edges(),
            vec![(AreaId(1), AreaId(2)), (AreaId(2), AreaId(3))]
        );
    }

    #[test]
    fn test_add_link_rejects_bad_endpoints() {
        let mut graph = ProgressionGraph::new();
        graph.set_root(AreaId(1));
        // Unknown parent.
        assert!(!graph.add_link(AreaId(9), AreaId(2)));
        // Child already linked.
        assert!(graph.add_link(AreaId(1), AreaId(2)));
        assert!(!graph.add_link(AreaId(1), AreaId(2)));
    }

    #[test]
    fn test_remove_link() {
        let mut graph = ProgressionGraph::new();
        graph.set_root(AreaId(1));
        graph.add_link(AreaId(1), AreaId(2));
        graph.remove_link(AreaId(1), AreaId(2));
        assert!(!graph.contains(AreaId(2)));
        assert_eq!(graph.area_count(), 1);
        // Removing again is a no-op.
        graph.remove_link(AreaId(1), AreaId(2));
        assert_eq!(graph.area_count(), 1);
    }

    #[test]
    fn test_set_root_clears_graph() {
        let mut graph = ProgressionGraph::new();
        graph.set_root(AreaId(1));
        graph.add_link(AreaId(1), AreaId(2));
        graph.set_root(AreaId(5));
        assert_eq!(graph.root(), Some(AreaId(5)));
        assert!(!graph.contains(AreaId(2)));
        assert_eq!(graph.area_count(), 1);
    }
}
