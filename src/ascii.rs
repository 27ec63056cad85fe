//! ASCII rendering and export for generated region layouts
//!
//! Renders the placed areas top-down as a character grid for quick visual
//! inspection, plus a text export with generation metadata.

use std::fs::File;
use std::io::{self, Write};

use chrono::Local;

use crate::region::Region;

/// Units of region space represented by one character cell.
const DEFAULT_UNITS_PER_CELL: f32 = 128.0;

/// Widest grid the renderer will emit before coarsening the cell size.
const MAX_GRID_WIDTH: usize = 120;

/// Renders the region layout as an ASCII grid with a legend.
///
/// Areas are labelled A, B, C... in placement order; the progression root
/// is marked with `@` at its center and realized connection points with `+`.
pub fn render_region(region: &Region) -> String {
    if region.area_count() == 0 {
        return "(empty region)\n".to_string();
    }

    let bound = region.calculate_bound();
    let mut units_per_cell = DEFAULT_UNITS_PER_CELL;
    while (bound.width() / units_per_cell) as usize > MAX_GRID_WIDTH {
        units_per_cell *= 2.0;
    }

    let columns = ((bound.width() / units_per_cell).ceil() as usize).max(1);
    let rows = ((bound.length() / units_per_cell).ceil() as usize).max(1);
    let mut grid = vec![vec![' '; columns]; rows];

    let cell_of = |x: f32, y: f32| -> (usize, usize) {
        let column = (((x - bound.min.x) / units_per_cell) as usize).min(columns - 1);
        let row = (((y - bound.min.y) / units_per_cell) as usize).min(rows - 1);
        (column, row)
    };

    let mut legend = String::new();
    for (index, area) in region.iter_areas().enumerate() {
        let letter = (b'A' + (index % 26) as u8) as char;
        for (row, grid_row) in grid.iter_mut().enumerate() {
            for (column, cell) in grid_row.iter_mut().enumerate() {
                let x = bound.min.x + (column as f32 + 0.5) * units_per_cell;
                let y = bound.min.y + (row as f32 + 0.5) * units_per_cell;
                if x >= area.region_bounds.min.x
                    && x <= area.region_bounds.max.x
                    && y >= area.region_bounds.min.y
                    && y <= area.region_bounds.max.y
                {
                    *cell = letter;
                }
            }
        }
        legend.push_str(&format!(
            "  {}: {} origin {} bounds {}\n",
            letter, area.template, area.origin, area.region_bounds
        ));
    }

    // Connection points overwrite area fill.
    for area in region.iter_areas() {
        for connection in &area.connections {
            let (column, row) = cell_of(connection.position.x, connection.position.y);
            grid[row][column] = '+';
        }
    }

    // Mark the progression root at its center.
    if let Some(root) = region.progression.root() {
        if let Some(area) = region.area(root) {
            let center = area.region_bounds.center();
            let (column, row) = cell_of(center.x, center.y);
            grid[row][column] = '@';
        }
    }

    let mut output = String::new();
    // North at the top.
    for row in grid.iter().rev() {
        let line: String = row.iter().collect();
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output.push('\n');
    output.push_str(&legend);
    output
}

/// Writes the rendered layout and generation metadata to a text file.
pub fn export_region_file(
    region: &Region,
    path: &str,
    region_name: &str,
    seed: u64,
) -> io::Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "=== REGION LAYOUT ===")?;
    writeln!(file, "Region: {}", region_name)?;
    writeln!(file, "Seed: {}", seed)?;
    writeln!(file, "Areas: {}", region.area_count())?;
    writeln!(
        file,
        "Generated: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(file)?;

    writeln!(file, "=== MAP ===")?;
    write!(file, "{}", render_region(region))?;
    writeln!(file)?;

    writeln!(file, "=== PROGRESSION ===")?;
    match region.progression.root() {
        Some(root) => writeln!(file, "Root: {}", root)?,
        None => writeln!(file, "Root: none")?,
    }
    for (parent, child) in region.progression.edges() {
        writeln!(file, "  {} -> {}", parent, child)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AreaTemplate, Catalog, TemplateId};
    use crate::geom::{Aabb, Vec3};

    fn catalog() -> Catalog {
        Catalog {
            area_templates: vec![AreaTemplate {
                id: TemplateId(1),
                name: "block".to_string(),
                bounds: Aabb::new(Vec3::ZERO, Vec3::new(512.0, 512.0, 0.0)),
                connectors: Vec::new(),
                unique: false,
            }],
            region_templates: Vec::new(),
            connection_nodes: Vec::new(),
        }
    }

    #[test]
    fn test_render_empty_region() {
        let catalog = catalog();
        let region = Region::new(&catalog, false);
        assert_eq!(render_region(&region), "(empty region)\n");
    }

    #[test]
    fn test_render_labels_areas_and_root() {
        let catalog = catalog();
        let mut region = Region::new(&catalog, false);
        let a = region.create_area(TemplateId(1), Vec3::ZERO).unwrap();
        region
            .create_area(TemplateId(1), Vec3::new(512.0, 0.0, 0.0))
            .unwrap();
        region.progression.set_root(a);

        let rendered = render_region(&region);
        assert!(rendered.contains('A'));
        assert!(rendered.contains('B'));
        assert!(rendered.contains('@'));
        assert!(rendered.contains("Template#1"));
    }
}
