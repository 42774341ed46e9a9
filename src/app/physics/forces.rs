use eframe::egui::{Vec2, vec2};

use super::quadtree::Cell;

const MIN_DISTANCE: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Falloff {
    /// forceAtlas2: force ∝ m₁m₂ / d
    Linear,
    /// Barnes–Hut gravity: force ∝ m₁m₂ / d²
    Quadratic,
}

#[derive(Clone, Copy)]
pub(super) struct Repulsion {
    pub(super) gravitational_constant: f32,
    pub(super) falloff: Falloff,
    pub(super) theta: f32,
}

impl Repulsion {
    fn between(self, delta: Vec2, mass_product: f32, index: usize) -> Vec2 {
        let distance = delta.length();
        let (direction, distance) = if distance > 0.0001 {
            (delta / distance, distance.max(MIN_DISTANCE))
        } else {
            let angle = (index as f32 * 0.618_034 + 0.29) * std::f32::consts::TAU;
            (vec2(angle.cos(), angle.sin()), MIN_DISTANCE)
        };

        let falloff = match self.falloff {
            Falloff::Linear => distance,
            Falloff::Quadratic => distance * distance,
        };
        direction * (-self.gravitational_constant * mass_product / falloff)
    }
}

pub(super) fn accumulate_repulsion(
    cell: &Cell,
    index: usize,
    positions: &[Vec2],
    masses: &[f32],
    repulsion: Repulsion,
    force: &mut Vec2,
) {
    if cell.mass <= 0.0 {
        return;
    }

    let point = positions[index];
    let own_mass = masses[index];

    if cell.is_leaf() {
        for &other in &cell.members {
            if other != index {
                *force += repulsion.between(point - positions[other], own_mass * masses[other], index);
            }
        }
        return;
    }

    let delta = point - cell.center_of_mass;
    let distance = delta.length().max(0.0001);
    let far_enough = !cell.bounds.contains(point) && (cell.bounds.side() / distance) < repulsion.theta;
    if far_enough {
        *force += repulsion.between(delta, own_mass * cell.mass, index);
        return;
    }

    for child in cell.children.iter().flatten() {
        accumulate_repulsion(child, index, positions, masses, repulsion, force);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repulsion(falloff: Falloff) -> Repulsion {
        Repulsion {
            gravitational_constant: -50.0,
            falloff,
            theta: 0.5,
        }
    }

    #[test]
    fn pushes_nodes_apart() {
        let push = repulsion(Falloff::Linear).between(vec2(10.0, 0.0), 1.0, 0);
        assert!(push.x > 0.0);
        assert!((push.x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn quadratic_falloff_decays_faster() {
        let near = repulsion(Falloff::Quadratic).between(vec2(10.0, 0.0), 1.0, 0).x;
        let far = repulsion(Falloff::Quadratic).between(vec2(20.0, 0.0), 1.0, 0).x;
        assert!((near / far - 4.0).abs() < 1e-3);
    }

    #[test]
    fn coincident_nodes_still_separate() {
        let push = repulsion(Falloff::Linear).between(Vec2::ZERO, 1.0, 3);
        assert!(push.length() > 0.0);
    }

    #[test]
    fn tree_matches_direct_sum_for_a_small_set() {
        let positions = vec![vec2(0.0, 0.0), vec2(30.0, 0.0), vec2(0.0, 40.0), vec2(-25.0, -5.0)];
        let masses = vec![1.0, 2.0, 1.0, 3.0];
        let cell = Cell::build(&positions, &masses).unwrap();
        let repulsion = repulsion(Falloff::Linear);

        let mut via_tree = Vec2::ZERO;
        accumulate_repulsion(&cell, 0, &positions, &masses, repulsion, &mut via_tree);

        let direct = (1..positions.len())
            .map(|other| repulsion.between(positions[0] - positions[other], masses[0] * masses[other], 0))
            .fold(Vec2::ZERO, |sum, push| sum + push);

        assert!((via_tree - direct).length() < 1e-3);
    }
}
