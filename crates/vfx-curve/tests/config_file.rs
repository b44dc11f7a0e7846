//! Loading curve sets from YAML files.

use std::io::Write;

use approx::assert_abs_diff_eq;
use tempfile::NamedTempFile;
use vfx_curve::{CurveError, CurveSetConfig, CurveTopology, GpuLanguage, ShaderBuffers, ShaderEmitter, ShaderMode};

const GRADE: &str = r#"
limits: { max_knots: 64, max_coefs: 192 }
curves:
  - name: master
    topology: open
    points: [[0.0, 0.0], [0.5, 0.3], [1.0, 1.0]]
  - name: hue_vs_sat
    topology: periodic
    points: [[0.1, 1.0], [0.4, 1.5], [0.8, 0.7]]
  - name: sat_vs_sat
    topology: diagonal
    points: [[0.0, 0.0], [0.5, 0.5], [1.0, 1.0]]
"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn load_and_evaluate() {
    let file = write_temp(GRADE);
    let config = CurveSetConfig::from_file(file.path()).unwrap();
    assert_eq!(config.curves.len(), 3);
    assert_eq!(config.limits.max_knots, 64);

    let table = config.build_table().unwrap();
    assert_eq!(table.limits().max_coefs, 192);
    assert_eq!(table.num_curves(), 3);

    let master = config.index_of("master").unwrap();
    assert_abs_diff_eq!(table.evaluate(master, 0.5), 0.3, epsilon = 1e-6);

    let hue = config.index_of("hue_vs_sat").unwrap();
    assert_eq!(table.slot(hue).unwrap().topology, CurveTopology::Periodic);
    assert_abs_diff_eq!(table.evaluate(hue, 0.4), 1.5, epsilon = 1e-5);
    assert_abs_diff_eq!(table.evaluate(hue, 1.4), 1.5, epsilon = 1e-5);

    // Identity curves take no space.
    let sat = config.index_of("sat_vs_sat").unwrap();
    assert!(table.slot(sat).unwrap().is_identity());
    assert_eq!(table.evaluate(sat, 0.8), 0.8);
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = CurveSetConfig::from_file(dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(err, CurveError::Io(_)));
}

#[test]
fn too_small_limits() {
    let file = write_temp(
        r#"
limits: { max_knots: 2, max_coefs: 6 }
curves:
  - name: master
    points: [[0.0, 0.0], [0.5, 0.3], [1.0, 1.0]]
"#,
    );
    let config = CurveSetConfig::from_file(file.path()).unwrap();
    assert!(matches!(config.build_table(), Err(CurveError::Capacity { .. })));
}

#[test]
fn shader_for_loaded_table() {
    let config = CurveSetConfig::from_file(write_temp(GRADE).path()).unwrap();
    let table = config.build_table().unwrap();

    let emitter = ShaderEmitter::new(GpuLanguage::Glsl330, ShaderBuffers::default());
    let decl = emitter.declare_buffers(table.limits(), table.num_curves());
    assert!(decl.contains("uniform int knotsOffsets[6];"), "{decl}");
    assert!(decl.contains("uniform float knots[64];"), "{decl}");
    assert_eq!(table.knots_arena().len(), 64);
    assert_eq!(table.coefs_arena().len(), 192);

    let code = emitter.emit(ShaderMode::Continuous, "evalHue");
    assert!(code.contains("bool isPeriodic"));
}
