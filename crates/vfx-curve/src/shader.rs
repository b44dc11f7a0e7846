//! Shader code generation for curve evaluation on the GPU.
//!
//! The emitted functions read the same packed arrays a [`CurveTable`]
//! exposes (`knots_offsets`, `coefs_offsets`, `knots_arena`, `coefs_arena`)
//! and repeat the branch structure and arithmetic of [`crate::eval`]
//! line for line. Changing one side means changing the other.
//!
//! # Example
//!
//! ```rust
//! use vfx_curve::{GpuLanguage, ShaderBuffers, ShaderEmitter, ShaderMode, TableLimits};
//!
//! let emitter = ShaderEmitter::new(GpuLanguage::Glsl330, ShaderBuffers::default());
//! let decl = emitter.declare_buffers(TableLimits::default(), 4);
//! let func = emitter.emit(ShaderMode::Forward, "evalCurve");
//! assert!(decl.contains("uniform float knots[120];"));
//! assert!(func.starts_with("float evalCurve(int curveIdx, float x)"));
//! ```
//!
//! [`CurveTable`]: crate::CurveTable

use serde::{Deserialize, Serialize};

use crate::table::TableLimits;

/// Target shader language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GpuLanguage {
    /// GLSL 3.30 (OpenGL 3.3)
    #[default]
    Glsl330,
    /// GLSL ES 3.00 (WebGL 2.0)
    GlslEs300,
    /// HLSL Shader Model 5.0
    Hlsl50,
}

impl GpuLanguage {
    /// Returns the version directive for this language.
    pub fn version_directive(&self) -> &'static str {
        match self {
            GpuLanguage::Glsl330 => "#version 330 core",
            GpuLanguage::GlslEs300 => "#version 300 es\nprecision highp float;",
            GpuLanguage::Hlsl50 => "",
        }
    }

    /// Returns true if this is a GLSL variant.
    pub fn is_glsl(&self) -> bool {
        matches!(self, GpuLanguage::Glsl330 | GpuLanguage::GlslEs300)
    }
}

/// Which evaluator to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShaderMode {
    /// `float f(int curveIdx, float x)`
    #[default]
    Forward,
    /// `float f(int curveIdx, float x)`, x being the curve output.
    Inverse,
    /// `float f(int curveIdx, float x, float identity_x, bool isPeriodic, bool isDiagonal)`
    Continuous,
}

/// Names of the four external arrays the emitted code reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBuffers {
    /// Flat `(offset, count)` knot pairs, two ints per curve.
    pub knots_offsets: String,
    /// Flat `(offset, count)` coefficient pairs, two ints per curve.
    pub coefs_offsets: String,
    /// Knot arena.
    pub knots: String,
    /// Coefficient arena.
    pub coefs: String,
}

impl Default for ShaderBuffers {
    fn default() -> Self {
        Self {
            knots_offsets: "knotsOffsets".into(),
            coefs_offsets: "coefsOffsets".into(),
            knots: "knots".into(),
            coefs: "coefs".into(),
        }
    }
}

impl ShaderBuffers {
    /// Default names with a common prefix, e.g. `hue_knots`.
    pub fn with_prefix(prefix: &str) -> Self {
        let d = Self::default();
        Self {
            knots_offsets: format!("{prefix}{}", d.knots_offsets),
            coefs_offsets: format!("{prefix}{}", d.coefs_offsets),
            knots: format!("{prefix}{}", d.knots),
            coefs: format!("{prefix}{}", d.coefs),
        }
    }
}

/// Indented line accumulator.
#[derive(Debug, Default)]
struct ShaderText {
    code: String,
    indent: usize,
}

impl ShaderText {
    fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.code.push_str("  ");
            }
            self.code.push_str(text);
        }
        self.code.push('\n');
    }

    fn open(&mut self) {
        self.line("{");
        self.indent += 1;
    }

    fn close(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line("}");
    }

    fn finish(self) -> String {
        self.code
    }
}

/// Emits curve evaluation functions for one language.
#[derive(Debug, Clone, Default)]
pub struct ShaderEmitter {
    language: GpuLanguage,
    buffers: ShaderBuffers,
}

impl ShaderEmitter {
    /// Create an emitter reading the given arrays.
    pub fn new(language: GpuLanguage, buffers: ShaderBuffers) -> Self {
        Self { language, buffers }
    }

    /// Target language.
    pub fn language(&self) -> GpuLanguage {
        self.language
    }

    /// Array names.
    pub fn buffers(&self) -> &ShaderBuffers {
        &self.buffers
    }

    /// Declarations of the four arrays sized for `limits` and `num_curves`.
    pub fn declare_buffers(&self, limits: TableLimits, num_curves: usize) -> String {
        let b = &self.buffers;
        let pairs = num_curves.max(1) * 2;
        let mut st = ShaderText::default();

        if self.language.is_glsl() {
            st.line(format!("uniform int {}[{pairs}];", b.knots_offsets));
            st.line(format!("uniform int {}[{pairs}];", b.coefs_offsets));
            st.line(format!("uniform float {}[{}];", b.knots, limits.max_knots));
            st.line(format!("uniform float {}[{}];", b.coefs, limits.max_coefs));
        } else {
            // cbuffer arrays pad every element to 16 bytes; structured
            // buffers take the packed arenas as they are.
            st.line(format!("// {pairs} offset pairs, {} knots, {} coefs", limits.max_knots, limits.max_coefs));
            st.line(format!("StructuredBuffer<int> {} : register(t0);", b.knots_offsets));
            st.line(format!("StructuredBuffer<int> {} : register(t1);", b.coefs_offsets));
            st.line(format!("StructuredBuffer<float> {} : register(t2);", b.knots));
            st.line(format!("StructuredBuffer<float> {} : register(t3);", b.coefs));
        }
        st.finish()
    }

    /// Emit one complete evaluation function named `fn_name`.
    pub fn emit(&self, mode: ShaderMode, fn_name: &str) -> String {
        let mut st = ShaderText::default();
        match mode {
            ShaderMode::Forward => {
                st.line(format!("float {fn_name}(int curveIdx, float x)"));
                st.open();
                self.emit_forward(&mut st);
            }
            ShaderMode::Inverse => {
                st.line(format!("float {fn_name}(int curveIdx, float x)"));
                st.open();
                self.emit_inverse(&mut st);
            }
            ShaderMode::Continuous => {
                st.line(format!(
                    "float {fn_name}(int curveIdx, float x, float identity_x, bool isPeriodic, bool isDiagonal)"
                ));
                st.open();
                self.emit_continuous(&mut st);
            }
        }
        st.close();
        st.finish()
    }

    /// Offsets, counts and the identity shortcut.
    fn emit_prologue(&self, st: &mut ShaderText, identity: &str) {
        let b = &self.buffers;
        st.line(format!("int knotsOffs = {}[curveIdx * 2];", b.knots_offsets));
        st.line(format!("int knotsCnt = {}[curveIdx * 2 + 1];", b.knots_offsets));
        st.line(format!("int coefsOffs = {}[curveIdx * 2];", b.coefs_offsets));
        st.line(format!("int coefsCnt = {}[curveIdx * 2 + 1];", b.coefs_offsets));
        st.line("int coefsSets = coefsCnt / 3;");
        st.line("");
        st.line("if (coefsSets == 0)");
        st.open();
        st.line(format!("return {identity};"));
        st.close();
        st.line("");
        st.line(format!("float knStart = {}[knotsOffs];", b.knots));
        st.line(format!("float knEnd = {}[knotsOffs + knotsCnt - 1];", b.knots));
    }

    /// Value `offs` and tangent `slope` at the last knot.
    fn emit_end_point(&self, st: &mut ShaderText) {
        let b = &self.buffers;
        st.line(format!("float A = {}[coefsOffs + coefsSets - 1];", b.coefs));
        st.line(format!("float B = {}[coefsOffs + coefsSets * 2 - 1];", b.coefs));
        st.line(format!("float C = {}[coefsOffs + coefsSets * 3 - 1];", b.coefs));
        st.line(format!("float kn = {}[knotsOffs + knotsCnt - 2];", b.knots));
        st.line("float t = knEnd - kn;");
        st.line("float slope = 2. * A * t + B;");
        st.line("float offs = ( A * t + B ) * t + C;");
    }

    /// Linear extension below the first and above the last knot of `var`.
    fn emit_extrapolation(&self, st: &mut ShaderText, var: &str, suffix: &str) {
        let b = &self.buffers;
        st.line(format!("if ({var} <= knStart)"));
        st.open();
        st.line(format!("float B = {}[coefsOffs + coefsSets];", b.coefs));
        st.line(format!("float C = {}[coefsOffs + coefsSets * 2];", b.coefs));
        st.line(format!("return ({var} - knStart) * B + C{suffix};"));
        st.close();
        st.line(format!("else if ({var} >= knEnd)"));
        st.open();
        self.emit_end_point(st);
        st.line(format!("return ({var} - knEnd) * slope + offs{suffix};"));
        st.close();
        st.line("");
    }

    /// `A`, `B`, `C`, `kn` of piece `i`.
    fn emit_piece(&self, st: &mut ShaderText) {
        let b = &self.buffers;
        st.line(format!("float A = {}[coefsOffs + i];", b.coefs));
        st.line(format!("float B = {}[coefsOffs + coefsSets + i];", b.coefs));
        st.line(format!("float C = {}[coefsOffs + coefsSets * 2 + i];", b.coefs));
        st.line(format!("float kn = {}[knotsOffs + i];", b.knots));
    }

    fn emit_forward(&self, st: &mut ShaderText) {
        let b = &self.buffers;
        self.emit_prologue(st, "x");
        st.line("");
        self.emit_extrapolation(st, "x", "");

        st.line("int i = 0;");
        st.line("for (i = 0; i < knotsCnt - 2; ++i)");
        st.open();
        st.line(format!("if (x < {}[knotsOffs + i + 1])", b.knots));
        st.open();
        st.line("break;");
        st.close();
        st.close();
        st.line("");

        self.emit_piece(st);
        st.line("float t = x - kn;");
        st.line("return ( A * t + B ) * t + C;");
    }

    fn emit_inverse(&self, st: &mut ShaderText) {
        let b = &self.buffers;
        self.emit_prologue(st, "x");
        st.line(format!("float knStartY = {}[coefsOffs + coefsSets * 2];", b.coefs));
        st.line("");

        st.line("if (x <= knStartY)");
        st.open();
        st.line(format!("float B = {}[coefsOffs + coefsSets];", b.coefs));
        st.line(format!("float C = {}[coefsOffs + coefsSets * 2];", b.coefs));
        st.line("return abs(B) < 1e-5 ? knStart : (x - C) / B + knStart;");
        st.close();
        st.line("");

        // Scoped so the piece variables below do not clash.
        st.open();
        self.emit_end_point(st);
        st.line("if (x >= offs)");
        st.open();
        st.line("return abs(slope) < 1e-5 ? knEnd : (x - offs) / slope + knEnd;");
        st.close();
        st.close();
        st.line("");

        st.line("int i = 0;");
        st.line("for (i = 0; i < knotsCnt - 2; ++i)");
        st.open();
        st.line(format!("if (x < {}[coefsOffs + coefsSets * 2 + i + 1])", b.coefs));
        st.open();
        st.line("break;");
        st.close();
        st.close();
        st.line("");

        self.emit_piece(st);
        st.line("float C0 = C - x;");
        st.line("float discrim = sqrt(B * B - 4. * A * C0);");
        st.line("float denom = discrim + B;");
        st.line("return abs(denom) < 1e-5 ? kn : kn + (-2. * C0) / denom;");
    }

    fn emit_continuous(&self, st: &mut ShaderText) {
        let b = &self.buffers;
        self.emit_prologue(st, "identity_x");
        st.line("");

        st.line("float h = x;");
        st.line("float turns = 0.;");
        st.line("if (isPeriodic)");
        st.open();
        st.line("turns = floor(x);");
        st.line("h = x - turns;");
        st.close();
        st.line("float offset = isDiagonal ? turns : 0.;");
        st.line("");
        self.emit_extrapolation(st, "h", " + offset");

        st.line("float span = knEnd - knStart;");
        st.line("int i = min(int((h - knStart) / span * float(coefsSets)), coefsSets - 1);");
        st.line("for (int n = 0; n < coefsSets; ++n)");
        st.open();
        st.line(format!("if (i > 0 && h < {}[knotsOffs + i])", b.knots));
        st.open();
        st.line("i--;");
        st.close();
        st.line("else");
        st.open();
        st.line("break;");
        st.close();
        st.close();
        st.line("for (int n = 0; n < coefsSets; ++n)");
        st.open();
        st.line(format!("if (i < coefsSets - 1 && h >= {}[knotsOffs + i + 1])", b.knots));
        st.open();
        st.line("i++;");
        st.close();
        st.line("else");
        st.open();
        st.line("break;");
        st.close();
        st.close();
        st.line("");

        self.emit_piece(st);
        st.line("float t = h - kn;");
        st.line("return ( A * t + B ) * t + C + offset;");
    }
}
