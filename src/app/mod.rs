use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::anyhow;
use eframe::egui::{self, Context, Pos2, Vec2};

use crate::export::{ExportOptions, GraphExport, PhysicsOptions};
use crate::graph::SocialGraph;

mod graph;
mod highlight;
mod physics;
mod render_utils;
mod textures;
mod ui;

use textures::AvatarTextures;

pub struct ViewerExport {
    title: String,
}

impl ViewerExport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl GraphExport for ViewerExport {
    fn export(&self, graph: &SocialGraph, options: &ExportOptions) -> anyhow::Result<()> {
        let graph = graph.clone();
        let physics = options.physics.clone();
        let native_options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
            ..Default::default()
        };

        eframe::run_native(
            &self.title,
            native_options,
            Box::new(move |cc| Ok(Box::new(MutualGraphApp::new(cc, graph, physics)))),
        )
        .map_err(|error| anyhow!("viewer stopped with an error: {error}"))
    }
}

pub struct MutualGraphApp {
    model: Box<ViewModel>,
}

struct ViewModel {
    graph: SocialGraph,
    physics: PhysicsOptions,
    live_physics: bool,
    physics_sleeping: bool,
    search: String,
    selected: Option<String>,
    min_edge_weight: usize,
    hide_isolated: bool,
    show_labels: bool,
    pan: Vec2,
    zoom: f32,
    graph_dirty: bool,
    render_graph_revision: u64,
    graph_cache: Option<RenderGraph>,
    search_match_cache: Option<SearchMatchCache>,
    textures: AvatarTextures,
    max_weight: usize,
    visible_node_count: usize,
    visible_edge_count: usize,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

struct RenderGraph {
    nodes: Vec<RenderNode>,
    edges: Vec<RenderEdge>,
    index_by_id: HashMap<String, usize>,
    incident: Vec<Vec<usize>>,
    physics_scratch: PhysicsScratch,
    view_scratch: ViewScratch,
}

struct PhysicsScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    masses: Vec<f32>,
}

struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
    visible_mask: Vec<bool>,
    draw_order: Vec<usize>,
    draw_order_dirty: bool,
}

struct RenderNode {
    id: String,
    world_pos: Vec2,
    velocity: Vec2,
    base_radius: f32,
    degree: usize,
}

#[derive(Clone, Copy)]
struct RenderEdge {
    source: usize,
    target: usize,
    weight: usize,
}

struct HighlightState {
    related_nodes: HashSet<usize>,
    related_edges: HashSet<usize>,
}

impl MutualGraphApp {
    pub fn new(cc: &eframe::CreationContext<'_>, graph: SocialGraph, physics: PhysicsOptions) -> Self {
        let textures = AvatarTextures::spawn(&cc.egui_ctx, &graph);
        Self {
            model: Box::new(ViewModel::new(graph, physics, textures)),
        }
    }
}

impl eframe::App for MutualGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.model.textures.poll(ctx);
        self.model.show(ctx);
    }
}
