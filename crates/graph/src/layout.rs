use serde::{Deserialize, Serialize};
use serde_json::json;

pub const DEFAULT_REPULSION: f64 = -100.0;
pub const DEFAULT_CENTRAL_GRAVITY: f64 = 0.01;
pub const DEFAULT_SPRING_LENGTH: f64 = 200.0;
pub const DEFAULT_SPRING_CONSTANT: f64 = 0.08;
pub const DEFAULT_MIN_VELOCITY: f64 = 0.75;

/// Force-directed layout parameters.
///
/// These only affect rendering; any layout engine that understands the
/// same five knobs can consume them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    /// Gravitational constant; negative values push nodes apart
    pub repulsion: f64,
    pub central_gravity: f64,
    /// Ideal edge length
    pub spring_length: f64,
    pub spring_constant: f64,
    /// Simulation stops once every node moves slower than this
    pub min_velocity: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            repulsion: DEFAULT_REPULSION,
            central_gravity: DEFAULT_CENTRAL_GRAVITY,
            spring_length: DEFAULT_SPRING_LENGTH,
            spring_constant: DEFAULT_SPRING_CONSTANT,
            min_velocity: DEFAULT_MIN_VELOCITY,
        }
    }
}

impl LayoutOptions {
    /// Physics block for vis-network's force-atlas-2 solver
    pub fn to_vis_options(&self) -> serde_json::Value {
        json!({
            "physics": {
                "forceAtlas2Based": {
                    "gravitationalConstant": self.repulsion,
                    "centralGravity": self.central_gravity,
                    "springLength": self.spring_length,
                    "springConstant": self.spring_constant
                },
                "minVelocity": self.min_velocity,
                "solver": "forceAtlas2Based"
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_option_names() {
        let value = serde_json::to_value(LayoutOptions::default()).unwrap();
        assert_eq!(value["repulsion"], -100.0);
        assert_eq!(value["centralGravity"], 0.01);
        assert_eq!(value["springLength"], 200.0);
        assert_eq!(value["springConstant"], 0.08);
        assert_eq!(value["minVelocity"], 0.75);
    }

    #[test]
    fn test_partial_override() {
        let layout: LayoutOptions = serde_json::from_str(r#"{"springLength": 120}"#).unwrap();
        assert_eq!(layout.spring_length, 120.0);
        assert_eq!(layout.repulsion, -100.0);
    }

    #[test]
    fn test_vis_options() {
        let options = LayoutOptions::default().to_vis_options();
        assert_eq!(options["physics"]["solver"], "forceAtlas2Based");
        assert_eq!(options["physics"]["forceAtlas2Based"]["gravitationalConstant"], -100.0);
        assert_eq!(options["physics"]["minVelocity"], 0.75);
    }
}
