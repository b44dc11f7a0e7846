//! Shader command: emit buffer declarations and one evaluation function.

use crate::{LangArg, ModeArg, ShaderArgs};
#[allow(unused_imports)]
use tracing::{debug, info, trace};
use anyhow::{Context, Result};
use vfx_curve::{GpuLanguage, ShaderBuffers, ShaderEmitter, ShaderMode};

impl From<ModeArg> for ShaderMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Forward => ShaderMode::Forward,
            ModeArg::Inverse => ShaderMode::Inverse,
            ModeArg::Continuous => ShaderMode::Continuous,
        }
    }
}

impl From<LangArg> for GpuLanguage {
    fn from(l: LangArg) -> Self {
        match l {
            LangArg::Glsl => GpuLanguage::Glsl330,
            LangArg::GlslEs => GpuLanguage::GlslEs300,
            LangArg::Hlsl => GpuLanguage::Hlsl50,
        }
    }
}

fn default_name(mode: ShaderMode) -> &'static str {
    match mode {
        ShaderMode::Forward => "evalCurve",
        ShaderMode::Inverse => "evalCurveRev",
        ShaderMode::Continuous => "evalCurveContinuous",
    }
}

pub fn run(args: ShaderArgs, verbose: u8) -> Result<()> {
    trace!(config = %args.config.display(), "shader::run");
    let config = super::load_config(&args.config)?;
    let table = super::build_table(&config, &args.config)?;

    let mode = ShaderMode::from(args.mode);
    let language = GpuLanguage::from(args.lang);
    let name = args.name.as_deref().unwrap_or(default_name(mode));
    let emitter = ShaderEmitter::new(language, ShaderBuffers::with_prefix(&args.prefix));

    let mut code = String::new();
    let directive = language.version_directive();
    if !directive.is_empty() {
        code.push_str(directive);
        code.push_str("\n\n");
    }
    code.push_str(&emitter.declare_buffers(table.limits(), table.num_curves()));
    code.push('\n');
    code.push_str(&emitter.emit(mode, name));

    match &args.output {
        Some(path) => {
            std::fs::write(path, &code).with_context(|| format!("Failed to write: {}", path.display()))?;
            if verbose > 0 {
                info!(function = name, "Saved {}", path.display());
            }
        }
        None => print!("{code}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        assert_eq!(default_name(ShaderMode::Forward), "evalCurve");
        assert_eq!(default_name(ShaderMode::from(ModeArg::Inverse)), "evalCurveRev");
        assert_eq!(GpuLanguage::from(LangArg::GlslEs), GpuLanguage::GlslEs300);
    }

    #[test]
    fn test_write_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("grade.yaml");
        std::fs::write(&config, "curves:\n  - name: master\n    points: [[0.0, 0.0], [0.5, 0.3], [1.0, 1.0]]\n")
            .unwrap();
        let output = dir.path().join("curve.glsl");

        let args = ShaderArgs {
            config,
            mode: ModeArg::Inverse,
            lang: LangArg::Glsl,
            name: None,
            prefix: "rgb_".into(),
            output: Some(output.clone()),
        };
        run(args, 0).unwrap();

        let code = std::fs::read_to_string(output).unwrap();
        assert!(code.starts_with("#version 330 core"));
        assert!(code.contains("uniform float rgb_coefs[360];"));
        assert!(code.contains("float evalCurveRev(int curveIdx, float x)"));
    }
}
