use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use region_generator::ascii;
use region_generator::catalog::{
    AreaChoice, AreaTemplate, Catalog, ConnectionNode, ConnectionTarget, GeneratorConfig,
    RegionTemplate, RegionTemplateId, SeparationRange, SequenceGeneratorConfig, SequenceInfo,
    SideRestriction, SingleCellGeneratorConfig, StaticAreaPlacement, StaticConnection,
    StaticGeneratorConfig, SubSequence, TemplateId, CellId, EntityId,
};
use region_generator::generators::{center_region, link_region_generator, NoopContentGenerator};
use region_generator::geom::{Aabb, Vec3};
use region_generator::region::Region;
use region_generator::transitions::RegionTransitionCatalog;

#[derive(Parser, Debug)]
#[command(name = "region_generator")]
#[command(about = "Assemble game regions from authored area templates")]
struct Args {
    /// Catalog JSON file (uses the built-in demo catalog if not specified)
    #[arg(short, long)]
    catalog: Option<String>,

    /// Region template id to generate (defaults to the first in the catalog)
    #[arg(short, long)]
    region: Option<u64>,

    /// Random seed (uses a random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Attempts with incremented seeds before giving up
    #[arg(long, default_value = "1")]
    retries: u64,

    /// Print generation diagnostics
    #[arg(short, long)]
    verbose: bool,

    /// Keep the root area at the origin instead of recentering the region
    #[arg(long)]
    no_center: bool,

    /// Export the layout to a text file
    #[arg(long)]
    export: Option<String>,
}

fn main() {
    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => {
            let text = match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => {
                    eprintln!("Failed to read {}: {}", path, e);
                    std::process::exit(1);
                }
            };
            match Catalog::from_json(&text) {
                Ok(catalog) => catalog,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }
        None => demo_catalog(),
    };

    let region_template = match args.region {
        Some(id) => catalog.region_template(RegionTemplateId(id)),
        None => catalog.region_templates.first(),
    };
    let Some(region_template) = region_template else {
        eprintln!("Catalog has no matching region template");
        std::process::exit(1);
    };

    let base_seed = args.seed.unwrap_or_else(rand::random);
    let transitions = RegionTransitionCatalog::build(&catalog);

    for attempt in 0..args.retries.max(1) {
        let seed = base_seed.wrapping_add(attempt);
        println!(
            "Generating '{}' with seed {}...",
            region_template.name, seed
        );

        let mut region = Region::new(&catalog, args.verbose);
        let mut generator = link_region_generator(region_template, args.verbose);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        if !generator.generate_region(&mut rng, &mut region, &mut NoopContentGenerator) {
            eprintln!("Generation failed, discarding region");
            continue;
        }

        if !args.no_center {
            center_region(&mut region);
        }

        println!("Placed {} areas", region.area_count());
        print!("{}", ascii::render_region(&region));

        println!("Progression:");
        match region.progression.root() {
            Some(root) => println!("  root {}", root),
            None => println!("  (no root)"),
        }
        for (parent, child) in region.progression.edges() {
            println!("  {} -> {}", parent, child);
        }

        let mut any_transitions = false;
        for area in region.iter_areas() {
            for spec in transitions.required_transitions(region_template.id, area.template) {
                if !any_transitions {
                    println!("Required transition cells:");
                    any_transitions = true;
                }
                println!(
                    "  {} cell {:?} ({})",
                    area.id,
                    spec.cell,
                    if spec.entry { "entry" } else { "exit" }
                );
            }
        }

        if let Some(path) = &args.export {
            match ascii::export_region_file(&region, path, &region_template.name, seed) {
                Ok(()) => println!("Exported to {}", path),
                Err(e) => eprintln!("Export failed: {}", e),
            }
        }
        return;
    }

    eprintln!("All attempts failed");
    std::process::exit(1);
}

/// A small hand-authored catalog so the binary runs standalone: one
/// sequence-generated region with a satellite, one static region, one
/// single-cell region, and a bidirectional teleport between the first two.
fn demo_catalog() -> Catalog {
    let square = |id: u64, name: &str, size: f32, connectors: Vec<Vec3>, unique: bool| {
        AreaTemplate {
            id: TemplateId(id),
            name: name.to_string(),
            bounds: Aabb::new(Vec3::ZERO, Vec3::new(size, size, 0.0)),
            connectors,
            unique,
        }
    };
    let cross = |size: f32| {
        vec![
            Vec3::new(size, size / 2.0, 0.0),
            Vec3::new(0.0, size / 2.0, 0.0),
            Vec3::new(size / 2.0, size, 0.0),
            Vec3::new(size / 2.0, 0.0, 0.0),
        ]
    };

    let area_templates = vec![
        square(1, "gatehouse", 512.0, cross(512.0), true),
        square(2, "great_hall", 768.0, cross(768.0), false),
        square(3, "barracks", 512.0, cross(512.0), false),
        square(4, "shrine", 512.0, cross(512.0), false),
        AreaTemplate {
            id: TemplateId(5),
            name: "crypt".to_string(),
            bounds: Aabb::new(Vec3::ZERO, Vec3::new(1024.0, 512.0, 0.0)),
            connectors: vec![Vec3::new(0.0, 256.0, 0.0), Vec3::new(512.0, 0.0, 0.0)],
            unique: false,
        },
        square(6, "watchtower", 256.0, Vec::new(), false),
    ];

    let slot = |choices: Vec<AreaChoice>, connected_to: Vec<SequenceInfo>, picks: i32| {
        SequenceInfo {
            area_choices: choices,
            connected_to,
            connected_to_picks: picks,
            connect_all_shared: false,
            shared_edge_minimum: 0,
            weight: 1,
        }
    };
    let pick = |template: u64, weight: i32| AreaChoice {
        template: TemplateId(template),
        weight,
        connect_on: SideRestriction::NoRestriction,
        aligned_to_previous: false,
    };

    let citadel = RegionTemplate {
        id: RegionTemplateId(100),
        name: "citadel".to_string(),
        generator: GeneratorConfig::Sequence(SequenceGeneratorConfig {
            area_sequence: vec![slot(
                vec![pick(1, 1)],
                vec![
                    slot(vec![pick(2, 2), pick(3, 1)], vec![], 0),
                    slot(vec![pick(4, 1), pick(5, 1)], vec![], 0),
                ],
                2,
            )],
            sub_sequences: vec![SubSequence {
                area_sequence: vec![slot(vec![pick(6, 1)], vec![], 0)],
                separation: SeparationRange {
                    min: 3000.0,
                    max: None,
                },
                tries: 20,
            }],
        }),
    };

    let old_road = RegionTemplate {
        id: RegionTemplateId(200),
        name: "old_road".to_string(),
        generator: GeneratorConfig::Static(StaticGeneratorConfig {
            areas: vec![
                StaticAreaPlacement {
                    template: TemplateId(3),
                    origin: Vec3::ZERO,
                },
                StaticAreaPlacement {
                    template: TemplateId(4),
                    origin: Vec3::new(512.0, 0.0, 0.0),
                },
            ],
            connections: vec![StaticConnection {
                area_a: TemplateId(3),
                area_b: TemplateId(4),
                connect_all_shared: false,
            }],
            start_area: TemplateId(3),
        }),
    };

    let sanctum = RegionTemplate {
        id: RegionTemplateId(300),
        name: "sanctum".to_string(),
        generator: GeneratorConfig::SingleCell(SingleCellGeneratorConfig {
            template: TemplateId(2),
        }),
    };

    Catalog {
        area_templates,
        region_templates: vec![citadel, old_road, sanctum],
        connection_nodes: vec![ConnectionNode {
            origin: ConnectionTarget {
                region: RegionTemplateId(100),
                area: TemplateId(1),
                cell: Some(CellId(11)),
                entity: EntityId(501),
            },
            target: ConnectionTarget {
                region: RegionTemplateId(200),
                area: TemplateId(3),
                cell: Some(CellId(12)),
                entity: EntityId(502),
            },
            bidirectional: true,
        }],
    }
}
