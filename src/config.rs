//! JSON configuration of the `mlt_layers` tool.
//!
//! ```json
//! {
//!   "input": "m31.tif",
//!   "transform": { "layers": 5, "scaling": { "mode": "dyadic" },
//!                  "filter": { "kind": "gaussian", "epsilon": 0.01 } },
//!   "disabledLayers": [0],
//!   "output": { "layerDir": "out/layers", "reportJson": "out/report.json" }
//! }
//! ```
use crate::transform::TransformOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    /// Directory receiving one preview PNG per layer and channel.
    pub layer_dir: PathBuf,
    pub report_json: Option<PathBuf>,
    /// Also write the reconstruction of the enabled layers.
    #[serde(default)]
    pub reconstruction: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub input: PathBuf,
    #[serde(default)]
    pub transform: TransformOptions,
    /// Layer indices (residual = number of layers) to skip.
    #[serde(default)]
    pub disabled_layers: Vec<usize>,
    pub output: OutputConfig,
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    parse_config(&contents).map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

pub fn parse_config(json: &str) -> Result<RuntimeConfig, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::FilterFamily;
    use crate::transform::ScalingSequence;

    #[test]
    fn parses_the_documented_example() {
        let cfg = parse_config(
            r#"{
                "input": "m31.tif",
                "transform": { "layers": 5, "scaling": { "mode": "linear", "increment": 2 },
                               "filter": { "kind": "mean" } },
                "disabledLayers": [0],
                "output": { "layerDir": "out/layers", "reportJson": "out/report.json" }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.transform.layers, 5);
        assert_eq!(cfg.transform.scaling, ScalingSequence::Linear { increment: 2 });
        assert_eq!(cfg.transform.filter, FilterFamily::Mean);
        assert_eq!(cfg.disabled_layers, vec![0]);
        assert!(cfg.output.reconstruction.is_none());
    }

    #[test]
    fn transform_section_is_optional() {
        let cfg = parse_config(r#"{ "input": "a.png", "output": { "layerDir": "o" } }"#).unwrap();
        assert_eq!(cfg.transform.layers, 4);
        assert!(cfg.output.report_json.is_none());
    }
}
