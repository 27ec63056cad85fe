//! Static region generator
//!
//! No search: every authored area lands at its fixed absolute offset, then
//! the authored connection list is walked greedily outward from the start
//! area. A fixed attempt budget bounds malformed data; connections that
//! never touch the connected set are reported and skipped.

use std::collections::HashMap;

use rand_chacha::ChaCha8Rng;

use crate::catalog::{StaticConnection, StaticGeneratorConfig, TemplateId};
use crate::picker::WeightedPicker;
use crate::region::{AreaId, ConnectPosition, Region};

use super::{apply_shared_connections, shared_connections, ContentGenerator, RegionGenerator};

/// Scan budget for the greedy connection pass.
const CONNECT_ATTEMPT_BUDGET: i32 = 100;

pub struct StaticRegionGenerator<'a> {
    config: &'a StaticGeneratorConfig,
    log: bool,
    start_area: Option<AreaId>,
    area_map: HashMap<TemplateId, AreaId>,
}

impl<'a> StaticRegionGenerator<'a> {
    pub fn new(config: &'a StaticGeneratorConfig, log: bool) -> StaticRegionGenerator<'a> {
        StaticRegionGenerator {
            config,
            log,
            start_area: None,
            area_map: HashMap::new(),
        }
    }

    fn area_for_template(&self, template: TemplateId) -> Option<AreaId> {
        self.area_map.get(&template).copied()
    }

    /// Grows the connected set from the start area, realizing authored
    /// connections as their endpoints join it.
    fn connect_areas(&mut self, rng: &mut ChaCha8Rng, region: &mut Region) {
        if self.config.areas.len() <= 1 {
            return;
        }
        if self.config.connections.is_empty() {
            if self.log {
                eprintln!("more than one static area but no connections authored");
            }
            return;
        }

        let mut working: Vec<StaticConnection> = self.config.connections.clone();
        let mut connected: Vec<TemplateId> = vec![self.config.start_area];
        let mut budget = CONNECT_ATTEMPT_BUDGET;

        loop {
            let mut next: Vec<TemplateId> = Vec::new();
            let mut remaining: Vec<StaticConnection> = Vec::new();

            for connection in working.drain(..) {
                if budget <= 0 {
                    remaining.push(connection);
                    continue;
                }
                budget -= 1;

                let area_a = self.area_for_template(connection.area_a);
                let area_b = self.area_for_template(connection.area_b);
                if area_a.is_none() && area_b.is_none() {
                    // Neither endpoint exists; the placement pass already
                    // logged the missing templates.
                    continue;
                }

                let (from, to, to_template) = if connected.contains(&connection.area_a) {
                    (area_a, area_b, connection.area_b)
                } else if connected.contains(&connection.area_b) {
                    (area_b, area_a, connection.area_a)
                } else {
                    remaining.push(connection);
                    continue;
                };

                let (Some(from), Some(to)) = (from, to) else {
                    if self.log {
                        eprintln!(
                            "authored connection {} <> {} references an area that was never placed",
                            connection.area_a, connection.area_b
                        );
                    }
                    continue;
                };

                if !self.link_areas(rng, region, from, to, connection.connect_all_shared) {
                    remaining.push(connection);
                    continue;
                }

                region.progression.add_link(from, to);
                if !next.contains(&to_template) {
                    next.push(to_template);
                }
            }

            working = remaining;
            if next.is_empty() || working.is_empty() || budget <= 0 {
                break;
            }
            for template in next {
                if !connected.contains(&template) {
                    connected.push(template);
                }
            }
        }

        if budget <= 0 && self.log {
            eprintln!("ran out of attempts while connecting static areas");
        }
        if self.log {
            for connection in &working {
                eprintln!(
                    "authored connection {} <> {} could not be realized",
                    connection.area_a, connection.area_b
                );
            }
        }
    }

    /// Realizes one authored connection between two placed areas.
    fn link_areas(
        &self,
        rng: &mut ChaCha8Rng,
        region: &mut Region,
        from: AreaId,
        to: AreaId,
        connect_all_shared: bool,
    ) -> bool {
        let shared = {
            let area_from = region.area(from).expect("static area placed");
            let area_to = region.area(to).expect("static area placed");
            shared_connections(area_from, area_to, self.log)
        };
        if shared.is_empty() {
            return false;
        }

        if connect_all_shared {
            apply_shared_connections(region, &shared, from, to);
        } else {
            let mut picker = WeightedPicker::new();
            for point in &shared {
                picker.add(*point, 1);
            }
            let Some(&point) = picker.pick(rng) else {
                return false;
            };
            region.create_connection(from, to, point, ConnectPosition::One);
        }
        true
    }
}

impl RegionGenerator for StaticRegionGenerator<'_> {
    fn generate_region(
        &mut self,
        rng: &mut ChaCha8Rng,
        region: &mut Region,
        content: &mut dyn ContentGenerator,
    ) -> bool {
        self.start_area = None;
        self.area_map.clear();

        for placement in &self.config.areas {
            let Some(id) = region.create_area(placement.template, placement.origin) else {
                continue;
            };
            self.area_map.insert(placement.template, id);
            if placement.template == self.config.start_area {
                self.start_area = Some(id);
            }
        }

        let Some(start) = self.start_area else {
            if self.log {
                eprintln!(
                    "static region start area {} was not placed",
                    self.config.start_area
                );
            }
            return false;
        };
        region.progression.set_root(start);

        self.connect_areas(rng, region);

        for placement in &self.config.areas {
            let Some(id) = self.area_for_template(placement.template) else {
                continue;
            };
            if !content.generate_area(region, id, &[placement.template]) {
                if self.log {
                    eprintln!("{} failed to generate its contents", id);
                }
                return false;
            }
        }
        true
    }

    fn start_area(&self) -> Option<AreaId> {
        self.start_area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AreaTemplate, Catalog, StaticAreaPlacement};
    use crate::geom::{Aabb, Vec3};
    use crate::generators::NoopContentGenerator;
    use crate::region::AreaConnection;
    use rand::SeedableRng;

    fn template(id: u64, connectors: Vec<Vec3>) -> AreaTemplate {
        AreaTemplate {
            id: TemplateId(id),
            name: format!("static_{}", id),
            bounds: Aabb::new(Vec3::ZERO, Vec3::new(512.0, 512.0, 0.0)),
            connectors,
            unique: false,
        }
    }

    fn row_catalog() -> Catalog {
        let both = vec![Vec3::new(0.0, 256.0, 0.0), Vec3::new(512.0, 256.0, 0.0)];
        Catalog {
            area_templates: vec![
                template(1, both.clone()),
                template(2, both.clone()),
                template(3, both),
            ],
            region_templates: Vec::new(),
            connection_nodes: Vec::new(),
        }
    }

    fn row_config() -> StaticGeneratorConfig {
        StaticGeneratorConfig {
            areas: vec![
                StaticAreaPlacement {
                    template: TemplateId(1),
                    origin: Vec3::ZERO,
                },
                StaticAreaPlacement {
                    template: TemplateId(2),
                    origin: Vec3::new(512.0, 0.0, 0.0),
                },
                StaticAreaPlacement {
                    template: TemplateId(3),
                    origin: Vec3::new(1024.0, 0.0, 0.0),
                },
            ],
            connections: vec![
                StaticConnection {
                    area_a: TemplateId(2),
                    area_b: TemplateId(3),
                    connect_all_shared: false,
                },
                StaticConnection {
                    area_a: TemplateId(1),
                    area_b: TemplateId(2),
                    connect_all_shared: false,
                },
            ],
            start_area: TemplateId(1),
        }
    }

    fn connection_positions(region: &Region, id: AreaId) -> Vec<Vec3> {
        let mut positions: Vec<Vec3> = region
            .area(id)
            .unwrap()
            .connections
            .iter()
            .map(|connection: &AreaConnection| connection.position)
            .collect();
        positions.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap());
        positions
    }

    #[test]
    fn test_static_row_places_and_links() {
        let catalog = row_catalog();
        let config = row_config();
        let mut region = Region::new(&catalog, false);
        let mut generator = StaticRegionGenerator::new(&config, false);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert!(generator.generate_region(&mut rng, &mut region, &mut NoopContentGenerator));

        assert_eq!(region.area_count(), 3);
        let a1 = region.area_with_template(TemplateId(1)).unwrap();
        let a2 = region.area_with_template(TemplateId(2)).unwrap();
        let a3 = region.area_with_template(TemplateId(3)).unwrap();

        assert_eq!(generator.start_area(), Some(a1));
        assert_eq!(region.progression.root(), Some(a1));
        // The out-of-order authored list still links outward from the start.
        assert_eq!(
            region.progression.edges(),
            vec![(a1, a2), (a2, a3)]
        );

        assert_eq!(
            connection_positions(&region, a2),
            vec![Vec3::new(512.0, 256.0, 0.0), Vec3::new(1024.0, 256.0, 0.0)]
        );
    }

    #[test]
    fn test_static_connections_are_position_derived() {
        // Same data twice yields the same connection set; the single shared
        // point per edge leaves the picker nothing to vary.
        let catalog = row_catalog();
        let config = row_config();

        let run = |seed: u64| {
            let mut region = Region::new(&catalog, false);
            let mut generator = StaticRegionGenerator::new(&config, false);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            assert!(generator.generate_region(
                &mut rng,
                &mut region,
                &mut NoopContentGenerator
            ));
            let a2 = region.area_with_template(TemplateId(2)).unwrap();
            connection_positions(&region, a2)
        };

        assert_eq!(run(1), run(999));
    }

    #[test]
    fn test_unrealizable_connection_is_not_fatal() {
        let catalog = row_catalog();
        let mut config = row_config();
        // A connection to a template that is never placed.
        config.connections.push(StaticConnection {
            area_a: TemplateId(1),
            area_b: TemplateId(42),
            connect_all_shared: false,
        });
        let mut region = Region::new(&catalog, false);
        let mut generator = StaticRegionGenerator::new(&config, false);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert!(generator.generate_region(&mut rng, &mut region, &mut NoopContentGenerator));
        assert_eq!(region.progression.area_count(), 3);
    }

    #[test]
    fn test_missing_start_area_fails() {
        let catalog = row_catalog();
        let mut config = row_config();
        config.start_area = TemplateId(42);
        let mut region = Region::new(&catalog, false);
        let mut generator = StaticRegionGenerator::new(&config, false);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert!(!generator.generate_region(&mut rng, &mut region, &mut NoopContentGenerator));
    }

    #[test]
    fn test_connect_all_shared_realizes_every_point() {
        let mut catalog = row_catalog();
        // Give templates 1 and 2 a second matching connector row.
        catalog.area_templates[0]
            .connectors
            .push(Vec3::new(512.0, 128.0, 0.0));
        catalog.area_templates[1]
            .connectors
            .push(Vec3::new(0.0, 128.0, 0.0));

        let mut config = row_config();
        config.areas.truncate(2);
        config.connections = vec![StaticConnection {
            area_a: TemplateId(1),
            area_b: TemplateId(2),
            connect_all_shared: true,
        }];

        let mut region = Region::new(&catalog, false);
        let mut generator = StaticRegionGenerator::new(&config, false);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert!(generator.generate_region(&mut rng, &mut region, &mut NoopContentGenerator));

        let a1 = region.area_with_template(TemplateId(1)).unwrap();
        let positions = connection_positions(&region, a1);
        assert_eq!(positions.len(), 2);
    }
}
