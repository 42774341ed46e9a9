mod forces;
mod quadtree;

use eframe::egui::Vec2;

use crate::export::{PhysicsOptions, Solver};

use super::RenderGraph;
use forces::{Falloff, Repulsion, accumulate_repulsion};
use quadtree::Cell;

const BARNES_HUT_THETA: f32 = 0.5;

/// Advances the layout by one frame. Returns whether any node still moves
/// faster than `min_velocity`.
pub(super) fn step_physics(cache: &mut RenderGraph, options: &PhysicsOptions, delta_seconds: f32) -> bool {
    let node_count = cache.nodes.len();
    if node_count == 0 {
        return false;
    }

    let params = *options.active();
    let (falloff, degree_mass) = match options.solver {
        Solver::ForceAtlas2Based => (Falloff::Linear, true),
        Solver::BarnesHut => (Falloff::Quadratic, false),
    };

    let scratch = &mut cache.physics_scratch;
    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec2::ZERO);
    scratch.positions.clear();
    scratch.masses.clear();
    for node in &cache.nodes {
        scratch.positions.push(node.world_pos);
        scratch
            .masses
            .push(if degree_mass { 1.0 + node.degree as f32 } else { 1.0 });
    }

    let forces = &mut scratch.forces;
    let positions = &scratch.positions;
    let masses = &scratch.masses;

    if let Some(tree) = Cell::build(positions, masses) {
        let repulsion = Repulsion {
            gravitational_constant: params.gravitational_constant,
            falloff,
            theta: BARNES_HUT_THETA,
        };
        for (index, force) in forces.iter_mut().enumerate() {
            accumulate_repulsion(&tree, index, positions, masses, repulsion, force);
        }
    }

    for edge in &cache.edges {
        if edge.source == edge.target || edge.source >= node_count || edge.target >= node_count {
            continue;
        }

        let delta = positions[edge.source] - positions[edge.target];
        let distance = delta.length().max(0.01);
        let pull = params.spring_constant * (params.spring_length - distance) / distance;
        forces[edge.source] += delta * pull;
        forces[edge.target] -= delta * pull;
    }

    for (index, force) in forces.iter_mut().enumerate() {
        let position = positions[index];
        match options.solver {
            Solver::ForceAtlas2Based => {
                *force -= position * (params.central_gravity * masses[index]);
            }
            Solver::BarnesHut => {
                let distance = position.length();
                if distance > 0.0001 {
                    *force -= position / distance * params.central_gravity;
                }
            }
        }
    }

    let timestep = options.timestep * (delta_seconds * 60.0).clamp(0.25, 3.0);
    let max_velocity = options.max_velocity.max(0.1);
    let mut fastest = 0.0_f32;
    for (index, node) in cache.nodes.iter_mut().enumerate() {
        let acceleration = (forces[index] - node.velocity * params.damping) / masses[index];
        let mut velocity = node.velocity + acceleration * timestep;
        let speed = velocity.length();
        if speed > max_velocity {
            velocity *= max_velocity / speed;
        }

        node.velocity = velocity;
        node.world_pos += velocity * timestep;
        fastest = fastest.max(velocity.length());
    }

    if fastest < options.min_velocity {
        for node in &mut cache.nodes {
            node.velocity = Vec2::ZERO;
        }
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::super::{RenderEdge, RenderNode};
    use super::*;

    fn node(id: &str, x: f32, degree: usize) -> RenderNode {
        RenderNode {
            id: id.to_owned(),
            world_pos: vec2(x, 0.0),
            velocity: Vec2::ZERO,
            base_radius: 10.0,
            degree,
        }
    }

    fn run_until_still(cache: &mut RenderGraph, options: &PhysicsOptions) -> usize {
        let mut frames = 0;
        while frames < 20_000 && step_physics(cache, options, 1.0 / 60.0) {
            frames += 1;
        }
        frames
    }

    #[test]
    fn empty_graph_is_still() {
        let mut cache = RenderGraph::new(Vec::new(), Vec::new());
        assert!(!step_physics(&mut cache, &PhysicsOptions::default(), 1.0 / 60.0));
    }

    #[test]
    fn lone_node_at_the_origin_sleeps_immediately() {
        let mut cache = RenderGraph::new(vec![node("a", 0.0, 0)], Vec::new());
        assert!(!step_physics(&mut cache, &PhysicsOptions::default(), 1.0 / 60.0));
        assert_eq!(cache.nodes[0].world_pos, Vec2::ZERO);
    }

    #[test]
    fn connected_pair_settles_near_the_spring_length() {
        let edges = vec![RenderEdge {
            source: 0,
            target: 1,
            weight: 1,
        }];
        let mut cache = RenderGraph::new(vec![node("a", -5.0, 1), node("b", 5.0, 1)], edges);
        let options = PhysicsOptions::default();

        let frames = run_until_still(&mut cache, &options);
        assert!(frames < 20_000);

        let distance = (cache.nodes[0].world_pos - cache.nodes[1].world_pos).length();
        assert!(distance > 80.0 && distance < 180.0, "settled at {distance}");
    }

    #[test]
    fn unconnected_nodes_drift_apart() {
        let mut cache = RenderGraph::new(vec![node("a", -5.0, 0), node("b", 5.0, 0)], Vec::new());
        step_physics(&mut cache, &PhysicsOptions::default(), 1.0 / 60.0);
        assert!(cache.nodes[0].world_pos.x < -5.0);
        assert!(cache.nodes[1].world_pos.x > 5.0);
    }
}
