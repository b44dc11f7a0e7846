//! CLI command implementations

pub mod fit;
pub mod sample;
pub mod eval;
pub mod shader;

use anyhow::{Context, Result};
use std::path::Path;
use vfx_curve::{CurveSetConfig, CurveTable};

/// Load a curve set from path
pub fn load_config(path: &Path) -> Result<CurveSetConfig> {
    CurveSetConfig::from_file(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Fit all curves of a set into a table
pub fn build_table(config: &CurveSetConfig, path: &Path) -> Result<CurveTable> {
    config
        .build_table()
        .with_context(|| format!("Failed to fit curves from: {}", path.display()))
}

/// Table index of a named curve
pub fn curve_index(config: &CurveSetConfig, name: &str) -> Result<usize> {
    config.index_of(name).with_context(|| {
        let names: Vec<&str> = config.curves.iter().map(|c| c.name.as_str()).collect();
        format!("No curve named '{}' (available: {})", name, names.join(", "))
    })
}

/// Join floats for display.
pub fn join(values: &[f32]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_index() {
        let config = CurveSetConfig::from_yaml_str(
            "curves:\n  - name: master\n    points: [[0.0, 0.0], [1.0, 0.5]]\n",
        )
        .unwrap();
        assert_eq!(curve_index(&config, "master").unwrap(), 0);
        let err = curve_index(&config, "red").unwrap_err();
        assert!(err.to_string().contains("available: master"), "{err}");
    }

    #[test]
    fn test_join() {
        assert_eq!(join(&[0.5, 1.0]), "0.5, 1");
    }
}
