//! Single-cell region generator
//!
//! The trivial strategy: one area from a fixed template, rooted at the
//! origin. The only way it fails is missing catalog data.

use rand_chacha::ChaCha8Rng;

use crate::catalog::SingleCellGeneratorConfig;
use crate::geom::Vec3;
use crate::region::{AreaId, Region};

use super::{ContentGenerator, RegionGenerator};

pub struct SingleCellRegionGenerator<'a> {
    config: &'a SingleCellGeneratorConfig,
    log: bool,
    start_area: Option<AreaId>,
}

impl<'a> SingleCellRegionGenerator<'a> {
    pub fn new(config: &'a SingleCellGeneratorConfig, log: bool) -> SingleCellRegionGenerator<'a> {
        SingleCellRegionGenerator {
            config,
            log,
            start_area: None,
        }
    }
}

impl RegionGenerator for SingleCellRegionGenerator<'_> {
    fn generate_region(
        &mut self,
        _rng: &mut ChaCha8Rng,
        region: &mut Region,
        content: &mut dyn ContentGenerator,
    ) -> bool {
        self.start_area = None;
        let Some(id) = region.create_area(self.config.template, Vec3::ZERO) else {
            if self.log {
                eprintln!(
                    "single-cell region template {} is missing from the catalog",
                    self.config.template
                );
            }
            return false;
        };
        region.progression.set_root(id);
        self.start_area = Some(id);
        content.generate_area(region, id, &[self.config.template])
    }

    fn start_area(&self) -> Option<AreaId> {
        self.start_area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AreaTemplate, Catalog, TemplateId};
    use crate::geom::Aabb;
    use crate::generators::NoopContentGenerator;
    use rand::SeedableRng;

    fn catalog() -> Catalog {
        Catalog {
            area_templates: vec![AreaTemplate {
                id: TemplateId(1),
                name: "lone".to_string(),
                bounds: Aabb::new(Vec3::ZERO, Vec3::new(1024.0, 1024.0, 0.0)),
                connectors: Vec::new(),
                unique: false,
            }],
            region_templates: Vec::new(),
            connection_nodes: Vec::new(),
        }
    }

    #[test]
    fn test_single_cell_roots_one_area() {
        let catalog = catalog();
        let config = SingleCellGeneratorConfig {
            template: TemplateId(1),
        };
        let mut region = Region::new(&catalog, false);
        let mut generator = SingleCellRegionGenerator::new(&config, false);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(generator.generate_region(&mut rng, &mut region, &mut NoopContentGenerator));

        assert_eq!(region.area_count(), 1);
        let id = generator.start_area().unwrap();
        assert_eq!(region.progression.root(), Some(id));
        assert_eq!(region.area(id).unwrap().origin, Vec3::ZERO);
    }

    #[test]
    fn test_missing_template_fails() {
        let catalog = catalog();
        let config = SingleCellGeneratorConfig {
            template: TemplateId(9),
        };
        let mut region = Region::new(&catalog, false);
        let mut generator = SingleCellRegionGenerator::new(&config, false);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(!generator.generate_region(&mut rng, &mut region, &mut NoopContentGenerator));
        assert_eq!(region.area_count(), 0);
        assert_eq!(generator.start_area(), None);
    }
}
