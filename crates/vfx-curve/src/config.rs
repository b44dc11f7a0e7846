//! YAML curve-set definitions.
//!
//! ```yaml
//! limits: { max_knots: 120, max_coefs: 360 }
//! curves:
//!   - name: master
//!     topology: open
//!     points: [[0.0, 0.0], [0.5, 0.3], [1.0, 1.0]]
//!   - name: hue_vs_sat
//!     topology: periodic
//!     points: [[0.0, 1.0], [0.33, 1.2], [0.66, 0.9]]
//! ```
//!
//! `limits` is optional, as are each curve's `topology` (defaults to
//! `open`) and `tangents` (omitted means auto-estimated).

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CurveError, CurveResult};
use crate::table::{CurveTable, CurveTableBuilder, TableLimits};
use crate::types::{ControlPoint, Curve, CurveTopology};

/// One named curve in a curve set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveDef {
    /// Unique name within the set.
    pub name: String,
    /// Curve topology.
    #[serde(default)]
    pub topology: CurveTopology,
    /// Control points as `[x, y]` pairs.
    pub points: Vec<ControlPoint>,
    /// Optional tangents, one per point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tangents: Option<Vec<f32>>,
}

impl CurveDef {
    /// Build and validate the curve.
    pub fn to_curve(&self) -> CurveResult<Curve> {
        let result = match &self.tangents {
            Some(t) => Curve::with_tangents(self.points.clone(), t.clone(), self.topology),
            None => Curve::new(self.points.clone(), self.topology),
        };
        result.map_err(|e| match e {
            CurveError::Validation(msg) => CurveError::Validation(format!("curve '{}': {msg}", self.name)),
            other => other,
        })
    }
}

/// A set of named curves packed into one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSetConfig {
    /// Table arena sizes.
    #[serde(default)]
    pub limits: TableLimits,
    /// Curves in table order.
    pub curves: Vec<CurveDef>,
}

impl CurveSetConfig {
    /// Loads a curve set from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> CurveResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Loads a curve set from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> CurveResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;

        let mut seen = HashSet::new();
        for def in &config.curves {
            if !seen.insert(def.name.as_str()) {
                return Err(CurveError::validation(format!("duplicate curve name '{}'", def.name)));
            }
        }

        debug!(curves = config.curves.len(), "Loaded curve set");
        Ok(config)
    }

    /// Serializes the curve set back to YAML.
    pub fn to_yaml_string(&self) -> CurveResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Curve definition by name.
    pub fn curve(&self, name: &str) -> Option<&CurveDef> {
        self.curves.iter().find(|c| c.name == name)
    }

    /// Table index of a named curve.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.curves.iter().position(|c| c.name == name)
    }

    /// Build and validate every curve, in order.
    pub fn to_curves(&self) -> CurveResult<Vec<Curve>> {
        self.curves.iter().map(CurveDef::to_curve).collect()
    }

    /// Fit all curves into a table sized by `limits`. Curve indices match
    /// the order of `curves`.
    pub fn build_table(&self) -> CurveResult<CurveTable> {
        let mut builder = CurveTableBuilder::new(self.limits);
        for def in &self.curves {
            builder.push(&def.to_curve()?)?;
        }
        Ok(builder.build())
    }
}
