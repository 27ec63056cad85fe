//! Region state under construction
//!
//! A `Region` owns the placed areas and the progression graph for one
//! generation run. It is exclusively held by that run: areas come and go as
//! the search backtracks, and only on overall success does the caller get to
//! look inside.

pub mod progression;

use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::{Catalog, TemplateId};
use crate::geom::{Aabb, Segment, Vec3};

pub use progression::ProgressionGraph;

/// Connector points closer than this are the same connector.
pub const CONNECTOR_TOLERANCE: f32 = 10.0;

/// Identifies a placed area within one region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AreaId(pub u32);

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Area#{}", self.0)
    }
}

/// Where a connection point sits along its shared edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectPosition {
    /// The only connection on the edge.
    One,
    Begin,
    Inside,
    End,
}

/// A realized connection point between two placed areas.
#[derive(Clone, Copy, Debug)]
pub struct AreaConnection {
    pub position: Vec3,
    pub connected: AreaId,
    pub connect_position: ConnectPosition,
}

/// One placed area: a template instance at a region-space origin.
#[derive(Clone, Debug)]
pub struct Area {
    pub id: AreaId,
    pub template: TemplateId,
    pub origin: Vec3,
    pub local_bounds: Aabb,
    pub region_bounds: Aabb,
    pub connections: Vec<AreaConnection>,
    /// Areas created on this area's behalf by the content generator; they
    /// are destroyed with it.
    pub sub_areas: Vec<AreaId>,
    pub unique: bool,
    connectors: Vec<Vec3>,
}

impl Area {
    fn new(
        id: AreaId,
        template: TemplateId,
        bounds: Aabb,
        connectors: Vec<Vec3>,
        unique: bool,
        origin: Vec3,
    ) -> Area {
        Area {
            id,
            template,
            origin,
            local_bounds: bounds,
            region_bounds: bounds.translate(origin).rounded(),
            connections: Vec::new(),
            sub_areas: Vec::new(),
            unique,
            connectors,
        }
    }

    /// Moves the area, shifting its realized connection points with it.
    pub fn set_origin(&mut self, new_origin: Vec3) {
        let offset = new_origin - self.origin;
        self.origin = new_origin;
        self.region_bounds = self.local_bounds.translate(new_origin).rounded();
        for connection in &mut self.connections {
            connection.position = connection.position + offset;
        }
    }

    /// Region-space connector points admissible along `segment`.
    pub fn possible_connections(&self, segment: &Segment) -> Vec<Vec3> {
        self.connectors
            .iter()
            .map(|point| *point + self.origin)
            .filter(|point| segment.distance_to_point_2d(*point) <= CONNECTOR_TOLERANCE)
            .collect()
    }

    fn add_connection(&mut self, position: Vec3, other: AreaId, connect_position: ConnectPosition) {
        self.connections.push(AreaConnection {
            position,
            connected: other,
            connect_position,
        });
    }

    fn remove_connections_with(&mut self, other: AreaId) {
        self.connections
            .retain(|connection| connection.connected != other);
    }
}

/// The region being assembled.
pub struct Region<'a> {
    catalog: &'a Catalog,
    areas: BTreeMap<AreaId, Area>,
    pub progression: ProgressionGraph,
    next_area_id: u32,
    log: bool,
}

impl<'a> Region<'a> {
    pub fn new(catalog: &'a Catalog, log: bool) -> Region<'a> {
        Region {
            catalog,
            areas: BTreeMap::new(),
            progression: ProgressionGraph::new(),
            next_area_id: 1,
            log,
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn log_enabled(&self) -> bool {
        self.log
    }

    /// Instantiates an area template at `origin`. Returns None when the
    /// catalog has no such template; authored content is never trusted.
    pub fn create_area(&mut self, template: TemplateId, origin: Vec3) -> Option<AreaId> {
        let Some(area_template) = self.catalog.area_template(template) else {
            if self.log {
                eprintln!("catalog has no area template {}", template);
            }
            return None;
        };
        let id = AreaId(self.next_area_id);
        self.next_area_id += 1;
        let area = Area::new(
            id,
            template,
            area_template.bounds,
            area_template.connectors.clone(),
            area_template.unique,
            origin,
        );
        if self.log {
            eprintln!("adding {} ({}) at {}", id, area_template.name, origin);
        }
        self.areas.insert(id, area);
        Some(id)
    }

    /// Removes an area, its connections on both sides, and any sub-areas it
    /// owns.
    pub fn destroy_area(&mut self, id: AreaId) {
        let Some(area) = self.areas.remove(&id) else {
            return;
        };
        if self.log {
            eprintln!("deallocating {}", id);
        }
        for connection in &area.connections {
            if let Some(other) = self.areas.get_mut(&connection.connected) {
                other.remove_connections_with(id);
            }
        }
        for sub in area.sub_areas {
            self.destroy_area(sub);
        }
    }

    pub fn area(&self, id: AreaId) -> Option<&Area> {
        self.areas.get(&id)
    }

    pub fn area_mut(&mut self, id: AreaId) -> Option<&mut Area> {
        self.areas.get_mut(&id)
    }

    /// The first placed area using `template`, if any.
    pub fn area_with_template(&self, template: TemplateId) -> Option<AreaId> {
        self.areas
            .values()
            .find(|area| area.template == template)
            .map(|area| area.id)
    }

    pub fn iter_areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.values()
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    pub fn set_area_origin(&mut self, id: AreaId, origin: Vec3) {
        if let Some(area) = self.areas.get_mut(&id) {
            area.set_origin(origin);
        }
    }

    /// Records `child` as owned by `parent` for teardown purposes.
    pub fn add_sub_area(&mut self, parent: AreaId, child: AreaId) {
        if let Some(area) = self.areas.get_mut(&parent) {
            area.sub_areas.push(child);
        }
    }

    /// Creates a connection point registered on both areas.
    pub fn create_connection(
        &mut self,
        area_a: AreaId,
        area_b: AreaId,
        position: Vec3,
        connect_position: ConnectPosition,
    ) {
        if self.log {
            eprintln!("connect {} {} <> {}", position, area_a, area_b);
        }
        if let Some(area) = self.areas.get_mut(&area_a) {
            area.add_connection(position, area_b, connect_position);
        }
        if let Some(area) = self.areas.get_mut(&area_b) {
            area.add_connection(position, area_a, connect_position);
        }
    }

    /// Tight bound over every placed area.
    pub fn calculate_bound(&self) -> Aabb {
        let mut bound = Aabb::inverted_limit();
        for area in self.areas.values() {
            bound = bound.union(&area.region_bounds);
        }
        bound
    }

    /// Planar distance from `position` to the nearest placed area's bounds.
    pub fn distance_to_closest_area_bounds(&self, position: Vec3) -> f32 {
        let mut min_distance = f32::MAX;
        for area in self.areas.values() {
            min_distance = min_distance.min(area.region_bounds.distance_to_point_2d(position));
        }
        if min_distance == f32::MAX && self.log {
            eprintln!("distance to closest area queried on an empty region");
        }
        min_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AreaTemplate;

    fn test_catalog() -> Catalog {
        Catalog {
            area_templates: vec![
                AreaTemplate {
                    id: TemplateId(1),
                    name: "square".to_string(),
                    bounds: Aabb::new(Vec3::ZERO, Vec3::new(512.0, 512.0, 0.0)),
                    connectors: vec![
                        Vec3::new(512.0, 256.0, 0.0),
                        Vec3::new(0.0, 256.0, 0.0),
                    ],
                    unique: false,
                },
                AreaTemplate {
                    id: TemplateId(2),
                    name: "hall".to_string(),
                    bounds: Aabb::new(Vec3::ZERO, Vec3::new(1024.0, 256.0, 0.0)),
                    connectors: vec![Vec3::new(0.0, 128.0, 0.0)],
                    unique: true,
                },
            ],
            region_templates: Vec::new(),
            connection_nodes: Vec::new(),
        }
    }

    #[test]
    fn test_create_area_from_catalog() {
        let catalog = test_catalog();
        let mut region = Region::new(&catalog, false);
        let id = region
            .create_area(TemplateId(1), Vec3::new(100.0, 0.0, 0.0))
            .unwrap();
        let area = region.area(id).unwrap();
        assert_eq!(area.region_bounds.min, Vec3::new(100.0, 0.0, 0.0));
        assert_eq!(area.region_bounds.max, Vec3::new(612.0, 512.0, 0.0));
        assert_eq!(region.area_with_template(TemplateId(1)), Some(id));

        // Unknown templates are a data error, not a panic.
        assert_eq!(region.create_area(TemplateId(99), Vec3::ZERO), None);
    }

    #[test]
    fn test_set_origin_moves_connections() {
        let catalog = test_catalog();
        let mut region = Region::new(&catalog, false);
        let a = region.create_area(TemplateId(1), Vec3::ZERO).unwrap();
        let b = region
            .create_area(TemplateId(2), Vec3::new(512.0, 0.0, 0.0))
            .unwrap();
        region.create_connection(a, b, Vec3::new(512.0, 256.0, 0.0), ConnectPosition::One);

        region.set_area_origin(a, Vec3::new(0.0, 128.0, 0.0));
        let area = region.area(a).unwrap();
        assert_eq!(area.connections[0].position, Vec3::new(512.0, 384.0, 0.0));
        assert_eq!(area.region_bounds.min, Vec3::new(0.0, 128.0, 0.0));
        // The other side keeps its own record untouched.
        let other = region.area(b).unwrap();
        assert_eq!(other.connections[0].position, Vec3::new(512.0, 256.0, 0.0));
    }

    #[test]
    fn test_destroy_area_cleans_connections_and_sub_areas() {
        let catalog = test_catalog();
        let mut region = Region::new(&catalog, false);
        let a = region.create_area(TemplateId(1), Vec3::ZERO).unwrap();
        let b = region
            .create_area(TemplateId(2), Vec3::new(512.0, 0.0, 0.0))
            .unwrap();
        let sub = region
            .create_area(TemplateId(1), Vec3::new(4096.0, 0.0, 0.0))
            .unwrap();
        region.add_sub_area(a, sub);
        region.create_connection(a, b, Vec3::new(512.0, 256.0, 0.0), ConnectPosition::One);

        region.destroy_area(a);
        assert_eq!(region.area_count(), 1);
        assert!(region.area(sub).is_none());
        assert!(region.area(b).unwrap().connections.is_empty());
    }

    #[test]
    fn test_possible_connections_filters_by_segment() {
        let catalog = test_catalog();
        let mut region = Region::new(&catalog, false);
        let a = region.create_area(TemplateId(1), Vec3::ZERO).unwrap();
        let area = region.area(a).unwrap();

        let east = Segment::new(Vec3::new(512.0, 0.0, 0.0), Vec3::new(512.0, 512.0, 0.0));
        assert_eq!(
            area.possible_connections(&east),
            vec![Vec3::new(512.0, 256.0, 0.0)]
        );

        let north = Segment::new(Vec3::new(0.0, 512.0, 0.0), Vec3::new(512.0, 512.0, 0.0));
        assert!(area.possible_connections(&north).is_empty());
    }

    #[test]
    fn test_distance_to_closest_area_bounds() {
        let catalog = test_catalog();
        let mut region = Region::new(&catalog, false);
        assert_eq!(
            region.distance_to_closest_area_bounds(Vec3::ZERO),
            f32::MAX
        );
        region.create_area(TemplateId(1), Vec3::ZERO).unwrap();
        assert_eq!(
            region.distance_to_closest_area_bounds(Vec3::new(612.0, 256.0, 0.0)),
            100.0
        );
    }
}
