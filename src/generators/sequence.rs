//! Sequence region generator
//!
//! The backtracking search at the heart of region assembly. An authored
//! sequence plan is walked top-down; at every node the search weighted-picks
//! a sequence slot, then an area candidate, then a connector pair to anchor
//! the placement, recursing into nested slots and tearing its work back down
//! whenever a deeper level or the content callback fails. A combination that
//! failed once is never retried at the same node.

use rand_chacha::ChaCha8Rng;

use crate::catalog::{SequenceGeneratorConfig, SequenceInfo, SideRestriction, SubSequence, TemplateId};
use crate::geom::{Containment, Vec3};
use crate::picker::WeightedPicker;
use crate::region::{AreaId, ConnectPosition, Region};

use super::edges::{possible_connection_pairs, ConnectionPair, EdgeReport};
use super::{
    apply_shared_connections, shared_connections, ContentGenerator, RegionGenerator,
    OVERLAP_TOLERANCE,
};

/// Assembles a region from an authored sequence plan, then places any
/// authored satellite sequences away from the root.
pub struct SequenceRegionGenerator<'a> {
    config: &'a SequenceGeneratorConfig,
    log: bool,
    start_area: Option<AreaId>,
}

impl<'a> SequenceRegionGenerator<'a> {
    pub fn new(config: &'a SequenceGeneratorConfig, log: bool) -> SequenceRegionGenerator<'a> {
        SequenceRegionGenerator {
            config,
            log,
            start_area: None,
        }
    }
}

impl RegionGenerator for SequenceRegionGenerator<'_> {
    fn generate_region(
        &mut self,
        rng: &mut ChaCha8Rng,
        region: &mut Region,
        content: &mut dyn ContentGenerator,
    ) -> bool {
        self.start_area = None;
        let mut search = SequenceSearch::new(self.log, &self.config.area_sequence);
        let success = search.run(rng, region, content, true, Vec3::ZERO);
        self.start_area = region.progression.root();
        if !success {
            return false;
        }
        for sub in &self.config.sub_sequences {
            if !place_sub_sequence(rng, region, content, sub, self.log) {
                return false;
            }
        }
        true
    }

    fn start_area(&self) -> Option<AreaId> {
        self.start_area
    }
}

/// One placement attempt in the search tree.
///
/// Tried-sets hold indices into the candidate lists so a sequence/area
/// combination is never retried at the same node. The sequence slots tried
/// by a node's children live on that node, shared by all of them, which is
/// what makes sibling picks distinct.
struct SearchNode {
    previous: Option<usize>,
    children: Vec<usize>,
    /// Index of the chosen slot within the list this node picks from.
    seq_index: Option<usize>,
    /// Slots of this node's `connected_to` already taken by its children.
    tried_child_seqs: Vec<usize>,
    /// Area choices already tried under the current slot.
    tried_areas: Vec<usize>,
    area_index: Option<usize>,
    /// Remaining connector pairs for the current area choice. Survives
    /// child and content failures so no pair is tried twice.
    pair_picker: Option<WeightedPicker<ConnectionPair>>,
    area: Option<AreaId>,
}

impl SearchNode {
    fn new(previous: Option<usize>) -> SearchNode {
        SearchNode {
            previous,
            children: Vec::new(),
            seq_index: None,
            tried_child_seqs: Vec::new(),
            tried_areas: Vec::new(),
            area_index: None,
            pair_picker: None,
            area: None,
        }
    }
}

/// The recursive backtracking engine. Nodes live in an index arena; the
/// whole tree is discarded once the search returns.
pub struct SequenceSearch<'a> {
    log: bool,
    root_infos: &'a [SequenceInfo],
    nodes: Vec<SearchNode>,
    tried_root_seqs: Vec<usize>,
}

impl<'a> SequenceSearch<'a> {
    pub fn new(log: bool, root_infos: &'a [SequenceInfo]) -> SequenceSearch<'a> {
        SequenceSearch {
            log,
            root_infos,
            nodes: Vec::new(),
            tried_root_seqs: Vec::new(),
        }
    }

    /// Runs the search. With `use_graph` the progression graph is rooted and
    /// extended as areas commit; satellite searches pass false.
    pub fn run(
        &mut self,
        rng: &mut ChaCha8Rng,
        region: &mut Region,
        content: &mut dyn ContentGenerator,
        use_graph: bool,
        origin: Vec3,
    ) -> bool {
        if self.root_infos.is_empty() {
            return false;
        }
        let root = self.add_node(None);
        self.process_node(rng, region, content, root, use_graph, origin)
    }

    fn add_node(&mut self, previous: Option<usize>) -> usize {
        let index = self.nodes.len();
        self.nodes.push(SearchNode::new(previous));
        if let Some(parent) = previous {
            self.nodes[parent].children.push(index);
        }
        index
    }

    /// The candidate slot list this node picks from: the authored root list,
    /// or its parent's nested slots.
    fn info_list(&self, node: usize) -> &'a [SequenceInfo] {
        match self.nodes[node].previous {
            None => self.root_infos,
            Some(parent) => match self.node_info(parent) {
                Some(info) => &info.connected_to,
                None => &[],
            },
        }
    }

    fn node_info(&self, node: usize) -> Option<&'a SequenceInfo> {
        let index = self.nodes[node].seq_index?;
        self.info_list(node).get(index)
    }

    fn parent_area(&self, node: usize) -> Option<AreaId> {
        let parent = self.nodes[node].previous?;
        self.nodes[parent].area
    }

    fn process_node(
        &mut self,
        rng: &mut ChaCha8Rng,
        region: &mut Region,
        content: &mut dyn ContentGenerator,
        node: usize,
        use_graph: bool,
        origin: Vec3,
    ) -> bool {
        if self.nodes[node].previous.is_some() && self.info_list(node).is_empty() {
            // Nothing authored below the parent.
            return true;
        }

        'sequence: loop {
            if !self.pick_sequence(rng, node) {
                return false;
            }
            'area: loop {
                if !self.pick_area(rng, region, node) {
                    self.teardown_children(region, node, use_graph);
                    continue 'sequence;
                }
                'placement: loop {
                    if !self.pick_area_placement(rng, region, node, origin) {
                        if self.log {
                            eprintln!("area could not be placed next to the previous area");
                        }
                        continue 'area;
                    }
                    let area = self.nodes[node].area.expect("placement succeeded");

                    if use_graph {
                        match self.parent_area(node) {
                            None => region.progression.set_root(area),
                            Some(parent_area) => {
                                region.progression.add_link(parent_area, area);
                            }
                        }
                    }

                    let mut success = true;

                    let info = self.node_info(node).expect("node picked a slot");
                    if !info.connected_to.is_empty() {
                        let picks = if info.connected_to_picks != 0 {
                            info.connected_to_picks
                        } else {
                            1
                        };
                        for _ in 0..picks {
                            if !success {
                                break;
                            }
                            let child = self.add_node(Some(node));
                            success &=
                                self.process_node(rng, region, content, child, use_graph, origin);
                        }
                    }

                    if success {
                        let path = self.template_path(node);
                        success = content.generate_area(region, area, &path);
                        if !success && self.log {
                            eprintln!("{} failed to generate its contents", area);
                        }
                    }

                    if success {
                        return true;
                    }

                    // Children come out of the graph before this node's own
                    // link; their removals need the parent entry present.
                    self.teardown_children(region, node, use_graph);
                    if use_graph {
                        if let Some(parent_area) = self.parent_area(node) {
                            region.progression.remove_link(parent_area, area);
                        }
                    }

                    let pairs_left = self.nodes[node]
                        .pair_picker
                        .as_ref()
                        .map_or(false, |picker| !picker.is_empty());
                    if pairs_left {
                        // Retry the narrowest open choice: another connector
                        // pair for the same area.
                        self.nodes[node].tried_child_seqs.clear();
                        continue 'placement;
                    }

                    self.destroy_node_area(region, node);
                    continue 'area;
                }
            }
        }
    }

    /// Step 1: weighted-pick a slot not yet tried at this node.
    fn pick_sequence(&mut self, rng: &mut ChaCha8Rng, node: usize) -> bool {
        {
            let entry = &mut self.nodes[node];
            entry.seq_index = None;
            entry.area_index = None;
            entry.tried_areas.clear();
            entry.tried_child_seqs.clear();
            entry.pair_picker = None;
        }

        let infos = self.info_list(node);
        let picker = {
            let tried = self.tried_seqs(node);
            if infos.len() <= tried.len() {
                return false;
            }
            let mut picker = WeightedPicker::new();
            for (index, info) in infos.iter().enumerate() {
                if info.area_choices.is_empty() {
                    continue;
                }
                if tried.contains(&index) {
                    continue;
                }
                picker.add(index, info.weight);
            }
            picker
        };

        let Some(&pick) = picker.pick(rng) else {
            return false;
        };
        self.tried_seqs_mut(node).push(pick);
        self.nodes[node].seq_index = Some(pick);
        true
    }

    /// Step 2: weighted-pick an area candidate from the chosen slot,
    /// skipping candidates tried here and unique templates placed elsewhere.
    fn pick_area(&mut self, rng: &mut ChaCha8Rng, region: &Region, node: usize) -> bool {
        let Some(info) = self.node_info(node) else {
            return false;
        };
        let choices = &info.area_choices;
        if choices.is_empty() {
            return false;
        }

        self.nodes[node].area_index = None;
        self.nodes[node].pair_picker = None;
        self.nodes[node].tried_child_seqs.clear();
        if choices.len() <= self.nodes[node].tried_areas.len() {
            return false;
        }

        let mut picker = WeightedPicker::new();
        for (index, choice) in choices.iter().enumerate() {
            if self.nodes[node].tried_areas.contains(&index) {
                continue;
            }
            match region.catalog().area_template(choice.template) {
                None => {
                    if self.log {
                        eprintln!("catalog has no area template {}", choice.template);
                    }
                    continue;
                }
                Some(template) => {
                    if template.unique && region.area_with_template(choice.template).is_some() {
                        if self.log {
                            eprintln!("unique {} is already placed, skipping", choice.template);
                        }
                        continue;
                    }
                }
            }
            picker.add(index, choice.weight);
        }

        let Some(&pick) = picker.pick(rng) else {
            return false;
        };
        self.nodes[node].tried_areas.push(pick);
        self.nodes[node].area_index = Some(pick);
        true
    }

    /// Step 3: instantiate the candidate and anchor it to the previous area
    /// with the first connector pair that places cleanly. The root commits
    /// at the origin hint without a search.
    fn pick_area_placement(
        &mut self,
        rng: &mut ChaCha8Rng,
        region: &mut Region,
        node: usize,
        origin: Vec3,
    ) -> bool {
        let Some(info) = self.node_info(node) else {
            return false;
        };
        let Some(choice_index) = self.nodes[node].area_index else {
            return false;
        };
        let choice = &info.area_choices[choice_index];

        // A previous attempt's area is rebuilt from scratch.
        if let Some(existing) = self.nodes[node].area.take() {
            region.destroy_area(existing);
        } else if let Some(template) = region.catalog().area_template(choice.template) {
            if template.unique && region.area_with_template(choice.template).is_some() {
                if self.log {
                    eprintln!("duplicate unique area found during generation");
                }
                return false;
            }
        }

        let Some(area_id) = region.create_area(choice.template, Vec3::ZERO) else {
            return false;
        };

        let Some(parent) = self.nodes[node].previous else {
            region.set_area_origin(area_id, origin);
            self.nodes[node].area = Some(area_id);
            return true;
        };
        let Some(parent_area_id) = self.nodes[parent].area else {
            region.destroy_area(area_id);
            return false;
        };

        if self.nodes[node].pair_picker.is_none() {
            let candidate = region.area(area_id).expect("area just created");
            let previous = region.area(parent_area_id).expect("parent area placed");
            let next_report = EdgeReport::new(candidate, choice.connect_on);
            let prev_report = EdgeReport::new(previous, SideRestriction::NoRestriction);
            let pairs =
                possible_connection_pairs(&prev_report, &next_report, choice.aligned_to_previous);
            if pairs.is_empty() {
                if self.log {
                    eprintln!(
                        "{} cannot build any shared edge with {}",
                        choice.template, previous.template
                    );
                }
                region.destroy_area(area_id);
                return false;
            }
            let mut picker = WeightedPicker::new();
            for pair in pairs {
                picker.add(pair, 1);
            }
            self.nodes[node].pair_picker = Some(picker);
        }

        let parent_connect_all = self
            .node_info(parent)
            .map_or(false, |parent_info| parent_info.connect_all_shared);
        let shared_minimum = info.shared_edge_minimum;
        let local_bounds = region.area(area_id).expect("area just created").local_bounds;

        loop {
            let pair = {
                let picker = self.nodes[node]
                    .pair_picker
                    .as_mut()
                    .expect("picker built above");
                match picker.pick_remove(rng) {
                    Some(pair) => pair,
                    None => break,
                }
            };

            let translation = pair.translation().rounded();
            let test_bounds = local_bounds.translate(translation);

            let mut collides = false;
            for other in region.iter_areas() {
                if other.id == area_id {
                    continue;
                }
                if other
                    .region_bounds
                    .contains_xy_eps(&test_bounds, -OVERLAP_TOLERANCE)
                    != Containment::Disjoint
                {
                    collides = true;
                    break;
                }
            }
            if collides {
                continue;
            }

            region.set_area_origin(area_id, translation);

            let shared = {
                let candidate = region.area(area_id).expect("area just created");
                let previous = region.area(parent_area_id).expect("parent area placed");
                shared_connections(candidate, previous, self.log)
            };
            if shared.is_empty() {
                continue;
            }
            if shared_minimum > 0 && (shared.len() as i32) < shared_minimum {
                if self.log {
                    eprintln!(
                        "shared edge minimum prevented placement of {}",
                        choice.template
                    );
                }
                continue;
            }

            if parent_connect_all {
                apply_shared_connections(region, &shared, area_id, parent_area_id);
            } else {
                region.create_connection(
                    area_id,
                    parent_area_id,
                    pair.prev,
                    ConnectPosition::One,
                );
            }

            self.nodes[node].area = Some(area_id);
            return true;
        }

        region.destroy_area(area_id);
        false
    }

    /// Destroys every child subtree: committed areas, their sub-areas and
    /// their progression links.
    fn teardown_children(&mut self, region: &mut Region, node: usize, use_graph: bool) {
        let children = std::mem::take(&mut self.nodes[node].children);
        for child in children {
            self.teardown_children(region, child, use_graph);
            if use_graph {
                if let (Some(parent_area), Some(child_area)) =
                    (self.nodes[node].area, self.nodes[child].area)
                {
                    region.progression.remove_link(parent_area, child_area);
                }
            }
            self.destroy_node_area(region, child);
        }
    }

    fn destroy_node_area(&mut self, region: &mut Region, node: usize) {
        if let Some(area) = self.nodes[node].area.take() {
            region.destroy_area(area);
        }
    }

    /// Templates chosen from the root down to this node.
    fn template_path(&self, node: usize) -> Vec<TemplateId> {
        let mut path = Vec::new();
        self.collect_path(node, &mut path);
        path
    }

    fn collect_path(&self, node: usize, path: &mut Vec<TemplateId>) {
        if let Some(parent) = self.nodes[node].previous {
            self.collect_path(parent, path);
        }
        if let (Some(info), Some(index)) = (self.node_info(node), self.nodes[node].area_index) {
            path.push(info.area_choices[index].template);
        }
    }

    fn tried_seqs(&self, node: usize) -> &Vec<usize> {
        match self.nodes[node].previous {
            None => &self.tried_root_seqs,
            Some(parent) => &self.nodes[parent].tried_child_seqs,
        }
    }

    fn tried_seqs_mut(&mut self, node: usize) -> &mut Vec<usize> {
        match self.nodes[node].previous {
            None => &mut self.tried_root_seqs,
            Some(parent) => &mut self.nodes[parent].tried_child_seqs,
        }
    }
}

/// Places one satellite sequence: origins are scanned in outward concentric
/// squares stepped by the minimum separation, skipping origins too close to
/// the placed layout; each admissible origin costs one try. The scan itself
/// is unbounded, so the try count is what guarantees termination.
fn place_sub_sequence(
    rng: &mut ChaCha8Rng,
    region: &mut Region,
    content: &mut dyn ContentGenerator,
    sub: &SubSequence,
    log: bool,
) -> bool {
    let range = sub.separation.normalized(log);
    let step = range.min;
    if step <= 0.0 {
        if log {
            eprintln!("satellite sequence has a non-positive separation");
        }
        return false;
    }

    let mut tries = sub.tries.max(1);
    let mut grid_index: i32 = 1;
    loop {
        let squares = grid_index - 1;
        let max_squares = (squares * 4).max(1);
        let grid_offset = grid_index / 2;

        for square in 0..max_squares {
            let side = square % 4;
            let current_square = square / 4;
            let invert = current_square % 2 > 0;
            let square_offset = (current_square + 1) / 2;

            let (x, y) = match side {
                0 => (
                    if invert { square_offset } else { -square_offset },
                    grid_offset,
                ),
                1 => (
                    grid_offset,
                    if invert { -square_offset } else { square_offset },
                ),
                2 => (
                    if invert { -square_offset } else { square_offset },
                    -grid_offset,
                ),
                _ => (
                    -grid_offset,
                    if invert { square_offset } else { -square_offset },
                ),
            };

            let position = Vec3::new(x as f32 * step, y as f32 * step, 0.0);

            if let Some(max) = range.max {
                if x.abs().max(y.abs()) as f32 * step > max {
                    if log {
                        eprintln!("satellite scan passed its outer separation bound");
                    }
                    return false;
                }
            }

            if region.distance_to_closest_area_bounds(position) < range.min {
                continue;
            }

            let mut search = SequenceSearch::new(log, &sub.area_sequence);
            if search.run(rng, region, content, false, position) {
                return true;
            }

            tries -= 1;
            if tries <= 0 {
                if log {
                    eprintln!("satellite sequence ran out of placement tries");
                }
                return false;
            }
        }

        grid_index += 2;
    }
}
