//! Authored content catalog
//!
//! Read-only data the layout engine consumes: area templates with their
//! bounds and connector points, region templates with one generator config
//! each, and the global inter-region connection definitions. The engine
//! never reads files itself; callers load a catalog (typically from JSON)
//! and pass it in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::{Aabb, Side, Vec3};

/// Identifies an area template in the catalog.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TemplateId(pub u64);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Template#{}", self.0)
    }
}

/// Identifies a region template in the catalog.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RegionTemplateId(pub u64);

impl fmt::Display for RegionTemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Region#{}", self.0)
    }
}

/// Identifies a cell inside an area template, authored externally.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellId(pub u64);

/// Identifies a transition entity, authored externally.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId(pub u64);

/// Which sides of a candidate area may face its previous area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideRestriction {
    #[default]
    NoRestriction,
    North,
    East,
    South,
    West,
    NorthSouth,
    EastWest,
}

impl SideRestriction {
    pub fn allows(&self, side: Side) -> bool {
        match self {
            SideRestriction::NoRestriction => true,
            SideRestriction::North => side == Side::North,
            SideRestriction::East => side == Side::East,
            SideRestriction::South => side == Side::South,
            SideRestriction::West => side == Side::West,
            SideRestriction::NorthSouth => side == Side::North || side == Side::South,
            SideRestriction::EastWest => side == Side::East || side == Side::West,
        }
    }
}

/// One placeable area template: a local-space bounding box and the boundary
/// points where it may join a neighbor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AreaTemplate {
    pub id: TemplateId,
    pub name: String,
    /// Local-space bounds; the origin of the box is the placement anchor.
    pub bounds: Aabb,
    /// Local-space connector points, on the boundary of `bounds`.
    pub connectors: Vec<Vec3>,
    /// Unique templates never appear twice in one region.
    #[serde(default)]
    pub unique: bool,
}

/// One weighted candidate inside a sequence slot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AreaChoice {
    pub template: TemplateId,
    pub weight: i32,
    /// Restricts which of the candidate's sides may face the previous area.
    #[serde(default)]
    pub connect_on: SideRestriction,
    /// Requires one shared edge to fully contain the other after placement.
    #[serde(default)]
    pub aligned_to_previous: bool,
}

/// One authored node of the sequence plan: a weighted set of candidates and
/// the slots that connect to it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SequenceInfo {
    pub area_choices: Vec<AreaChoice>,
    #[serde(default)]
    pub connected_to: Vec<SequenceInfo>,
    /// How many of `connected_to` to realize; zero means one.
    #[serde(default)]
    pub connected_to_picks: i32,
    /// Realize every shared connector with the previous area instead of the
    /// single anchor point.
    #[serde(default)]
    pub connect_all_shared: bool,
    /// Placement is rejected unless at least this many connectors are shared
    /// with the previous area.
    #[serde(default)]
    pub shared_edge_minimum: i32,
    pub weight: i32,
}

/// Separation band for satellite placement, in region units.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SeparationRange {
    pub min: f32,
    /// Optional outer bound on the origin scan.
    #[serde(default)]
    pub max: Option<f32>,
}

impl SeparationRange {
    /// Returns the range with min <= max. A malformed pair is swapped and
    /// logged, never rejected.
    pub fn normalized(&self, log: bool) -> SeparationRange {
        if let Some(max) = self.max {
            if max < self.min {
                if log {
                    eprintln!(
                        "separation range has min {} greater than max {}, swapping",
                        self.min, max
                    );
                }
                return SeparationRange {
                    min: max,
                    max: Some(self.min),
                };
            }
        }
        *self
    }
}

/// A detached sequence placed after the main one, away from the root.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubSequence {
    pub area_sequence: Vec<SequenceInfo>,
    pub separation: SeparationRange,
    /// Placement attempts before the satellite is abandoned.
    pub tries: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SequenceGeneratorConfig {
    pub area_sequence: Vec<SequenceInfo>,
    #[serde(default)]
    pub sub_sequences: Vec<SubSequence>,
}

/// An area pinned at an absolute offset by the static generator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StaticAreaPlacement {
    pub template: TemplateId,
    pub origin: Vec3,
}

/// An authored link between two statically placed areas.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StaticConnection {
    pub area_a: TemplateId,
    pub area_b: TemplateId,
    #[serde(default)]
    pub connect_all_shared: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StaticGeneratorConfig {
    pub areas: Vec<StaticAreaPlacement>,
    #[serde(default)]
    pub connections: Vec<StaticConnection>,
    /// Template of the area the progression graph roots at.
    pub start_area: TemplateId,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SingleCellGeneratorConfig {
    pub template: TemplateId,
}

/// Generator strategy for one region template.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorConfig {
    Sequence(SequenceGeneratorConfig),
    Static(StaticGeneratorConfig),
    SingleCell(SingleCellGeneratorConfig),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionTemplate {
    pub id: RegionTemplateId,
    pub name: String,
    pub generator: GeneratorConfig,
}

/// One endpoint of an inter-region connection definition.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ConnectionTarget {
    pub region: RegionTemplateId,
    pub area: TemplateId,
    #[serde(default)]
    pub cell: Option<CellId>,
    pub entity: EntityId,
}

/// An authored teleport link between two regions.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ConnectionNode {
    pub origin: ConnectionTarget,
    pub target: ConnectionTarget,
    #[serde(default)]
    pub bidirectional: bool,
}

/// The full authored data set, read-only for the engine's lifetime.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub area_templates: Vec<AreaTemplate>,
    pub region_templates: Vec<RegionTemplate>,
    #[serde(default)]
    pub connection_nodes: Vec<ConnectionNode>,
}

impl Catalog {
    /// Parses and validates a catalog from JSON.
    pub fn from_json(text: &str) -> Result<Catalog, CatalogError> {
        let catalog: Catalog =
            serde_json::from_str(text).map_err(|e| CatalogError::Parse(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn area_template(&self, id: TemplateId) -> Option<&AreaTemplate> {
        self.area_templates.iter().find(|t| t.id == id)
    }

    pub fn region_template(&self, id: RegionTemplateId) -> Option<&RegionTemplate> {
        self.region_templates.iter().find(|t| t.id == id)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for (index, template) in self.area_templates.iter().enumerate() {
            if !template.bounds.is_valid() {
                return Err(CatalogError::InvalidBounds(template.id));
            }
            if self.area_templates[..index]
                .iter()
                .any(|t| t.id == template.id)
            {
                return Err(CatalogError::DuplicateArea(template.id));
            }
        }
        for (index, template) in self.region_templates.iter().enumerate() {
            if self.region_templates[..index]
                .iter()
                .any(|t| t.id == template.id)
            {
                return Err(CatalogError::DuplicateRegion(template.id));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogError {
    Parse(String),
    DuplicateArea(TemplateId),
    DuplicateRegion(RegionTemplateId),
    InvalidBounds(TemplateId),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Parse(e) => write!(f, "Catalog parse error: {}", e),
            CatalogError::DuplicateArea(id) => {
                write!(f, "Duplicate area template: {}", id)
            }
            CatalogError::DuplicateRegion(id) => {
                write!(f, "Duplicate region template: {}", id)
            }
            CatalogError::InvalidBounds(id) => {
                write!(f, "Area template {} has inverted bounds", id)
            }
        }
    }
}

impl std::error::Error for CatalogError {}
