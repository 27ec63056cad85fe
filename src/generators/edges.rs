//! Shared-edge discovery between placed areas
//!
//! Builds per-side edge reports for two areas and enumerates the connector
//! point pairs that could anchor a placement: the candidate's allowed sides
//! against the opposite sides of the area it attaches to.

use crate::catalog::SideRestriction;
use crate::geom::{Aabb, Segment, Side, Vec3};
use crate::region::Area;

/// One usable edge of an area: its boundary segment and the connectors on it.
#[derive(Clone, Debug)]
pub struct AreaEdge {
    pub side: Side,
    pub segment: Segment,
    pub connections: Vec<Vec3>,
}

/// The usable edges of one area, restricted to the authored sides.
#[derive(Clone, Debug)]
pub struct EdgeReport {
    pub edges: Vec<AreaEdge>,
}

impl EdgeReport {
    pub fn new(area: &Area, restriction: SideRestriction) -> EdgeReport {
        let mut edges = Vec::new();
        for side in Side::all() {
            if !restriction.allows(*side) {
                continue;
            }
            let segment = side_segment(&area.region_bounds, *side);
            let connections = area.possible_connections(&segment);
            if segment.length() > 0.0 && !connections.is_empty() {
                edges.push(AreaEdge {
                    side: *side,
                    segment,
                    connections,
                });
            }
        }
        EdgeReport { edges }
    }

    pub fn edge(&self, side: Side) -> Option<&AreaEdge> {
        self.edges.iter().find(|edge| edge.side == side)
    }

    pub fn has_edge(&self, side: Side) -> bool {
        self.edge(side).is_some()
    }
}

/// Boundary segment of `bounds` on `side`, ordered along the varying axis.
pub fn side_segment(bounds: &Aabb, side: Side) -> Segment {
    let (min, max) = (bounds.min, bounds.max);
    match side {
        Side::North => Segment::new(
            Vec3::new(min.x, max.y, 0.0),
            Vec3::new(max.x, max.y, 0.0),
        ),
        Side::South => Segment::new(
            Vec3::new(min.x, min.y, 0.0),
            Vec3::new(max.x, min.y, 0.0),
        ),
        Side::East => Segment::new(
            Vec3::new(max.x, min.y, 0.0),
            Vec3::new(max.x, max.y, 0.0),
        ),
        Side::West => Segment::new(
            Vec3::new(min.x, min.y, 0.0),
            Vec3::new(min.x, max.y, 0.0),
        ),
    }
}

/// Two connector points whose coincidence anchors a placement: `prev` on the
/// already-placed area, `next` on the candidate (still in local space).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectionPair {
    pub prev: Vec3,
    pub next: Vec3,
}

impl ConnectionPair {
    /// The translation that moves the candidate so the pair coincides.
    pub fn translation(&self) -> Vec3 {
        self.prev - self.next
    }
}

/// Every connector pairing between the placed area's edges and the opposite
/// edges of the candidate, in a fixed enumeration order. With `aligned`,
/// pairs whose translated edges do not fully contain one another are
/// dropped.
pub fn possible_connection_pairs(
    prev: &EdgeReport,
    next: &EdgeReport,
    aligned: bool,
) -> Vec<ConnectionPair> {
    let mut pairs = Vec::new();
    for side in Side::all() {
        let Some(prev_edge) = prev.edge(*side) else {
            continue;
        };
        let Some(next_edge) = next.edge(side.opposite()) else {
            continue;
        };
        for prev_point in &prev_edge.connections {
            for next_point in &next_edge.connections {
                let pair = ConnectionPair {
                    prev: *prev_point,
                    next: *next_point,
                };
                if !aligned || check_alignment(prev_edge, next_edge, &pair) {
                    pairs.push(pair);
                }
            }
        }
    }
    pairs
}

/// After moving the candidate by the pair's translation, one edge must
/// contain the other along the edge's varying axis.
fn check_alignment(prev_edge: &AreaEdge, next_edge: &AreaEdge, pair: &ConnectionPair) -> bool {
    if prev_edge.side.is_vertical_edge() != next_edge.side.is_vertical_edge() {
        return false;
    }
    let translation = pair.translation();
    let moved = Segment::new(
        next_edge.segment.start + translation,
        next_edge.segment.end + translation,
    );
    let fixed = &prev_edge.segment;
    if prev_edge.side.is_vertical_edge() {
        let fixed_in_moved = moved.start.y <= fixed.start.y && moved.end.y >= fixed.end.y;
        let moved_in_fixed = fixed.start.y <= moved.start.y && fixed.end.y >= moved.end.y;
        fixed_in_moved || moved_in_fixed
    } else {
        let fixed_in_moved = moved.start.x <= fixed.start.x && moved.end.x >= fixed.end.x;
        let moved_in_fixed = fixed.start.x <= moved.start.x && fixed.end.x >= moved.end.x;
        fixed_in_moved || moved_in_fixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AreaTemplate, Catalog, TemplateId};
    use crate::region::Region;

    fn catalog_with(templates: Vec<AreaTemplate>) -> Catalog {
        Catalog {
            area_templates: templates,
            region_templates: Vec::new(),
            connection_nodes: Vec::new(),
        }
    }

    fn square_template(id: u64, size: f32, connectors: Vec<Vec3>) -> AreaTemplate {
        AreaTemplate {
            id: TemplateId(id),
            name: format!("square_{}", id),
            bounds: Aabb::new(Vec3::ZERO, Vec3::new(size, size, 0.0)),
            connectors,
            unique: false,
        }
    }

    #[test]
    fn test_edge_report_respects_restriction() {
        let catalog = catalog_with(vec![square_template(
            1,
            512.0,
            vec![
                Vec3::new(512.0, 256.0, 0.0),
                Vec3::new(0.0, 256.0, 0.0),
                Vec3::new(256.0, 512.0, 0.0),
            ],
        )]);
        let mut region = Region::new(&catalog, false);
        let id = region.create_area(TemplateId(1), Vec3::ZERO).unwrap();
        let area = region.area(id).unwrap();

        let unrestricted = EdgeReport::new(area, SideRestriction::NoRestriction);
        assert!(unrestricted.has_edge(Side::East));
        assert!(unrestricted.has_edge(Side::West));
        assert!(unrestricted.has_edge(Side::North));
        // No connector on the south side.
        assert!(!unrestricted.has_edge(Side::South));

        let west_only = EdgeReport::new(area, SideRestriction::West);
        assert_eq!(west_only.edges.len(), 1);
        assert!(west_only.has_edge(Side::West));
    }

    #[test]
    fn test_pairs_use_opposite_sides_only() {
        let catalog = catalog_with(vec![
            square_template(1, 512.0, vec![Vec3::new(512.0, 256.0, 0.0)]),
            square_template(2, 512.0, vec![Vec3::new(0.0, 256.0, 0.0)]),
        ]);
        let mut region = Region::new(&catalog, false);
        let placed = region.create_area(TemplateId(1), Vec3::ZERO).unwrap();
        let candidate = region.create_area(TemplateId(2), Vec3::ZERO).unwrap();

        let prev = EdgeReport::new(region.area(placed).unwrap(), SideRestriction::NoRestriction);
        let next = EdgeReport::new(
            region.area(candidate).unwrap(),
            SideRestriction::NoRestriction,
        );
        let pairs = possible_connection_pairs(&prev, &next, false);

        // Placed east connector against candidate west connector.
        assert_eq!(
            pairs,
            vec![ConnectionPair {
                prev: Vec3::new(512.0, 256.0, 0.0),
                next: Vec3::new(0.0, 256.0, 0.0),
            }]
        );
        assert_eq!(pairs[0].translation(), Vec3::new(512.0, 0.0, 0.0));
    }

    #[test]
    fn test_alignment_filters_staggered_pairs() {
        // Alignment passes when one translated edge contains the other, and
        // rejects staggered same-size edges where neither does.
        let catalog = catalog_with(vec![
            square_template(1, 512.0, vec![Vec3::new(512.0, 128.0, 0.0)]),
            square_template(2, 512.0, vec![Vec3::new(0.0, 128.0, 0.0)]),
            square_template(3, 512.0, vec![Vec3::new(0.0, 384.0, 0.0)]),
        ]);
        let mut region = Region::new(&catalog, false);
        let placed = region.create_area(TemplateId(1), Vec3::ZERO).unwrap();
        let flush = region.create_area(TemplateId(2), Vec3::ZERO).unwrap();
        let staggered = region.create_area(TemplateId(3), Vec3::ZERO).unwrap();

        let prev = EdgeReport::new(region.area(placed).unwrap(), SideRestriction::NoRestriction);

        let next_flush = EdgeReport::new(region.area(flush).unwrap(), SideRestriction::West);
        // Translation is zero along Y; the edges coincide.
        assert_eq!(possible_connection_pairs(&prev, &next_flush, true).len(), 1);

        let next_staggered =
            EdgeReport::new(region.area(staggered).unwrap(), SideRestriction::West);
        // Translated west edge spans y in [-256, 256]; neither edge contains
        // the other.
        assert!(possible_connection_pairs(&prev, &next_staggered, true).is_empty());
        // Without the alignment flag the pair survives.
        assert_eq!(
            possible_connection_pairs(&prev, &next_staggered, false).len(),
            1
        );
    }
}
