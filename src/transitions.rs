//! Inter-region transition requirements
//!
//! A one-time, catalog-wide scan of the authored connection nodes. For each
//! (region template, area template) endpoint it records the boundary cells
//! that must stay reachable so teleports in and out of the region keep
//! working. The per-area content generator consumes this; the layout search
//! never reads it directly.

use std::collections::HashMap;

use crate::catalog::{Catalog, CellId, ConnectionTarget, EntityId, RegionTemplateId, TemplateId};

/// A boundary cell an area must keep reachable, with the direction of
/// travel it serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionSpec {
    pub cell: CellId,
    pub entity: EntityId,
    /// True when travellers arrive here from another region, false when
    /// they depart.
    pub entry: bool,
}

/// A resolved connection edge out of one region, for downstream consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionEdge {
    pub area: TemplateId,
    pub cell: Option<CellId>,
    pub entity: EntityId,
    pub target_region: RegionTemplateId,
    pub target_entity: EntityId,
}

/// Index over the catalog's inter-region connection definitions.
#[derive(Clone, Debug, Default)]
pub struct RegionTransitionCatalog {
    specs: HashMap<(RegionTemplateId, TemplateId), Vec<TransitionSpec>>,
    edges: HashMap<RegionTemplateId, Vec<ConnectionEdge>>,
}

impl RegionTransitionCatalog {
    /// Scans every authored connection node once. Bidirectional nodes index
    /// both endpoints.
    pub fn build(catalog: &Catalog) -> RegionTransitionCatalog {
        let mut built = RegionTransitionCatalog::default();
        for node in &catalog.connection_nodes {
            built.add_spec(&node.origin, false);
            built.add_edge(&node.origin, &node.target);
            if node.bidirectional {
                built.add_spec(&node.target, true);
                built.add_edge(&node.target, &node.origin);
            }
        }
        built
    }

    /// The boundary cells a generated (region, area) pair must keep
    /// reachable. Empty when nothing is authored for it.
    pub fn required_transitions(
        &self,
        region: RegionTemplateId,
        area: TemplateId,
    ) -> &[TransitionSpec] {
        self.specs
            .get(&(region, area))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every connection edge leaving `region`.
    pub fn connection_edges(&self, region: RegionTemplateId) -> &[ConnectionEdge] {
        self.edges.get(&region).map(Vec::as_slice).unwrap_or(&[])
    }

    fn add_spec(&mut self, endpoint: &ConnectionTarget, entry: bool) {
        // Endpoints without a cell cannot pin anything down.
        let Some(cell) = endpoint.cell else {
            return;
        };
        let spec = TransitionSpec {
            cell,
            entity: endpoint.entity,
            entry,
        };
        let bucket = self
            .specs
            .entry((endpoint.region, endpoint.area))
            .or_default();
        // Cells are deduplicated; the first authored node wins.
        if !bucket.iter().any(|existing| existing.cell == spec.cell) {
            bucket.push(spec);
        }
    }

    fn add_edge(&mut self, origin: &ConnectionTarget, target: &ConnectionTarget) {
        self.edges.entry(origin.region).or_default().push(ConnectionEdge {
            area: origin.area,
            cell: origin.cell,
            entity: origin.entity,
            target_region: target.region,
            target_entity: target.entity,
        });
    }
}
