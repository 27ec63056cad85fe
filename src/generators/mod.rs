//! Region generators
//!
//! Top-level strategies that assemble a region's area layout. Each region
//! template selects one generator; the caller links it, supplies a seeded
//! PRNG and the region to populate, and gets back a success flag. On failure
//! the region is discarded by the caller — nothing here retries across
//! generation calls.

pub mod edges;
pub mod sequence;
pub mod single_cell;
pub mod static_gen;

use rand_chacha::ChaCha8Rng;

use crate::catalog::{GeneratorConfig, RegionTemplate, TemplateId};
use crate::geom::{epsilon_test, Segment, Vec3};
use crate::region::{Area, AreaId, ConnectPosition, Region, CONNECTOR_TOLERANCE};

use sequence::SequenceRegionGenerator;
use single_cell::SingleCellRegionGenerator;
use static_gen::StaticRegionGenerator;

/// Two bounding boxes abut when their facing edges are within this many
/// units.
pub const EDGE_TOLERANCE: f32 = 10.0;

/// Placed areas may overlap in the horizontal plane by up to this many units.
pub const OVERLAP_TOLERANCE: f32 = 128.0;

/// Fills one committed area with its internal content (rooms, corridors).
/// Out of scope for the layout engine; a failure makes the search treat the
/// placement as failed.
pub trait ContentGenerator {
    /// `template_path` is the chain of templates from the sequence root down
    /// to this area.
    fn generate_area(
        &mut self,
        region: &mut Region,
        area: AreaId,
        template_path: &[TemplateId],
    ) -> bool;
}

/// Content generator that accepts every area; used for dry layout runs and
/// tests.
pub struct NoopContentGenerator;

impl ContentGenerator for NoopContentGenerator {
    fn generate_area(&mut self, _: &mut Region, _: AreaId, _: &[TemplateId]) -> bool {
        true
    }
}

/// One region-generation strategy.
pub trait RegionGenerator {
    /// Runs the full generation pass; the region's area table and
    /// progression graph are final only when this returns true.
    fn generate_region(
        &mut self,
        rng: &mut ChaCha8Rng,
        region: &mut Region,
        content: &mut dyn ContentGenerator,
    ) -> bool;

    /// The area downstream systems treat as the region's start.
    fn start_area(&self) -> Option<AreaId>;
}

/// Links the generator a region template asks for.
pub fn link_region_generator<'a>(
    template: &'a RegionTemplate,
    log: bool,
) -> Box<dyn RegionGenerator + 'a> {
    match &template.generator {
        GeneratorConfig::Sequence(config) => Box::new(SequenceRegionGenerator::new(config, log)),
        GeneratorConfig::Static(config) => Box::new(StaticRegionGenerator::new(config, log)),
        GeneratorConfig::SingleCell(config) => {
            Box::new(SingleCellRegionGenerator::new(config, log))
        }
    }
}

/// Recenters every placed area around the region bound's center.
pub fn center_region(region: &mut Region) {
    if region.area_count() == 0 {
        return;
    }
    let center = region.calculate_bound().center();
    let ids: Vec<AreaId> = region.iter_areas().map(|area| area.id).collect();
    for id in ids {
        let origin = region.area(id).map(|area| area.origin);
        if let Some(origin) = origin {
            region.set_area_origin(id, origin - center);
        }
    }
}

/// The single axis-aligned segment where two areas' bounds touch, if they
/// abut on exactly one of the four sides.
pub fn shared_edge_segment(area_a: &Area, area_b: &Area) -> Option<Segment> {
    let a = &area_a.region_bounds;
    let b = &area_b.region_bounds;

    if epsilon_test(a.max.x, b.min.x, EDGE_TOLERANCE) {
        let x = a.max.x;
        let min_y = a.min.y.max(b.min.y);
        let max_y = a.max.y.min(b.max.y);
        Some(Segment::new(
            Vec3::new(x, min_y, 0.0),
            Vec3::new(x, max_y, 0.0),
        ))
    } else if epsilon_test(a.min.x, b.max.x, EDGE_TOLERANCE) {
        let x = a.min.x;
        let min_y = a.min.y.max(b.min.y);
        let max_y = a.max.y.min(b.max.y);
        Some(Segment::new(
            Vec3::new(x, min_y, 0.0),
            Vec3::new(x, max_y, 0.0),
        ))
    } else if epsilon_test(a.max.y, b.min.y, EDGE_TOLERANCE) {
        let y = a.max.y;
        let min_x = a.min.x.max(b.min.x);
        let max_x = a.max.x.min(b.max.x);
        Some(Segment::new(
            Vec3::new(min_x, y, 0.0),
            Vec3::new(max_x, y, 0.0),
        ))
    } else if epsilon_test(a.min.y, b.max.y, EDGE_TOLERANCE) {
        let y = a.min.y;
        let min_x = a.min.x.max(b.min.x);
        let max_x = a.max.x.min(b.max.x);
        Some(Segment::new(
            Vec3::new(min_x, y, 0.0),
            Vec3::new(max_x, y, 0.0),
        ))
    } else {
        None
    }
}

/// Connector points both areas agree on along their shared edge. Empty means
/// the authored data is inconsistent; that is logged, not fatal.
pub fn shared_connections(area_a: &Area, area_b: &Area, log: bool) -> Vec<Vec3> {
    let Some(edge) = shared_edge_segment(area_a, area_b) else {
        if log {
            eprintln!(
                "{} and {} do not share a common edge",
                area_a.id, area_b.id
            );
        }
        return Vec::new();
    };

    let connections_a = area_a.possible_connections(&edge);
    let connections_b = area_b.possible_connections(&edge);

    let mut shared = Vec::new();
    for point_a in &connections_a {
        for point_b in &connections_b {
            if point_a.distance_2d(*point_b) <= CONNECTOR_TOLERANCE {
                shared.push(*point_a);
                break;
            }
        }
    }

    if shared.is_empty() && log {
        eprintln!(
            "no connection found between {} ({}) and {} ({})",
            area_a.id, area_a.template, area_b.id, area_b.template
        );
    }
    shared
}

/// Realizes shared connection points between two areas: a single point gets
/// the One position, several get Begin/Inside/End along the edge.
pub fn apply_shared_connections(
    region: &mut Region,
    points: &[Vec3],
    area_a: AreaId,
    area_b: AreaId,
) {
    if points.len() == 1 {
        region.create_connection(area_a, area_b, points[0], ConnectPosition::One);
        return;
    }
    let mut ordered: Vec<Vec3> = points.to_vec();
    ordered.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    let last = ordered.len() - 1;
    for (index, point) in ordered.into_iter().enumerate() {
        let connect_position = if index == 0 {
            ConnectPosition::Begin
        } else if index == last {
            ConnectPosition::End
        } else {
            ConnectPosition::Inside
        };
        region.create_connection(area_a, area_b, point, connect_position);
    }
}
