use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub physics: PhysicsOptions,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Solver {
    #[default]
    ForceAtlas2Based,
    BarnesHut,
}

impl Solver {
    pub fn label(self) -> &'static str {
        match self {
            Self::ForceAtlas2Based => "forceAtlas2Based",
            Self::BarnesHut => "barnesHut",
        }
    }
}

/// Missing fields in a partial block are taken from the forceAtlas2Based defaults.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolverParams {
    pub gravitational_constant: f32,
    pub central_gravity: f32,
    pub spring_length: f32,
    pub spring_constant: f32,
    pub damping: f32,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self::force_atlas2_based()
    }
}

impl SolverParams {
    pub fn force_atlas2_based() -> Self {
        Self {
            gravitational_constant: -50.0,
            central_gravity: 0.01,
            spring_length: 150.0,
            spring_constant: 0.08,
            damping: 0.4,
        }
    }

    pub fn barnes_hut() -> Self {
        Self {
            gravitational_constant: -2000.0,
            central_gravity: 0.3,
            spring_length: 95.0,
            spring_constant: 0.04,
            damping: 0.09,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsOptions {
    pub enabled: bool,
    pub solver: Solver,
    pub force_atlas2_based: SolverParams,
    pub barnes_hut: SolverParams,
    pub min_velocity: f32,
    pub max_velocity: f32,
    pub timestep: f32,
}

impl Default for PhysicsOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            solver: Solver::ForceAtlas2Based,
            force_atlas2_based: SolverParams::force_atlas2_based(),
            barnes_hut: SolverParams::barnes_hut(),
            min_velocity: 0.75,
            max_velocity: 50.0,
            timestep: 0.5,
        }
    }
}

impl PhysicsOptions {
    pub fn active(&self) -> &SolverParams {
        match self.solver {
            Solver::ForceAtlas2Based => &self.force_atlas2_based,
            Solver::BarnesHut => &self.barnes_hut,
        }
    }

    pub fn active_mut(&mut self) -> &mut SolverParams {
        match self.solver {
            Solver::ForceAtlas2Based => &mut self.force_atlas2_based,
            Solver::BarnesHut => &mut self.barnes_hut,
        }
    }
}

pub fn load_options(path: &Path) -> Result<ExportOptions> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout options {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid layout options in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physics_block_in_the_classic_layout_parses() {
        let raw = r#"{
          "physics": {
            "forceAtlas2Based": {
              "gravitationalConstant": -50,
              "centralGravity": 0.01,
              "springLength": 150,
              "springConstant": 0.08
            },
            "minVelocity": 0.75,
            "solver": "forceAtlas2Based"
          }
        }"#;

        let options: ExportOptions = serde_json::from_str(raw).unwrap();
        assert_eq!(options, ExportOptions::default());
    }

    #[test]
    fn solver_choice_selects_its_parameters() {
        let options: ExportOptions =
            serde_json::from_str(r#"{"physics": {"solver": "barnesHut"}}"#).unwrap();
        assert_eq!(options.physics.solver, Solver::BarnesHut);
        assert_eq!(options.physics.active(), &SolverParams::barnes_hut());
    }

    #[test]
    fn unknown_solver_is_rejected() {
        let parsed = serde_json::from_str::<ExportOptions>(r#"{"physics": {"solver": "repulsion"}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn serialises_with_camel_case_keys() {
        let value = serde_json::to_value(ExportOptions::default()).unwrap();
        assert_eq!(value["physics"]["solver"], "forceAtlas2Based");
        assert_eq!(value["physics"]["forceAtlas2Based"]["springLength"], 150.0);
    }
}
