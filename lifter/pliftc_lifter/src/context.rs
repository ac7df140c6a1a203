//! The module-level lifting context.
//!
//! `LiftCtx` owns the output module and the tables shared by every
//! function body: the global table, the function signature table, and the
//! instrumentation-intrinsic cache. It is passed explicitly through the
//! translator; nothing here is ambient state.

use crate::error::LiftError;
use crate::options::LiftOptions;
use pliftc_ir::{Module, Param, Ty};
use pliftc_pcode::ArtifactBundle;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Data layout of the emitted module.
pub const DATA_LAYOUT: &str = "e-m:e-i64:64-f80:128-n8:16:32:64-S128";
/// Target triple of the emitted module.
pub const TARGET_TRIPLE: &str = "x86_64-pc-linux-gnu";

/// Call targets that are rewritten to verifier intrinsics instead of being
/// lowered as ordinary calls.
pub const INSTRUMENTATION_LIST: [&str; 4] = [
    "sym.path_start",
    "sym.path_goal",
    "sym.path_nongoal",
    "sym.imp.rand",
];

/// The synthesized return kind of a function.
///
/// `Undefined8` is kept distinct from `Int(64)`: the decompiler's
/// `undefined8` token is ambiguous, but a `RETURN` under it must still
/// produce a 64-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetKind {
    Void,
    Undefined8,
    /// An integer return of the given bit width.
    Int(u32),
}

impl RetKind {
    pub fn ty(&self) -> Ty {
        match self {
            RetKind::Void => Ty::Void,
            RetKind::Undefined8 => Ty::Int(64),
            RetKind::Int(bits) => Ty::Int(*bits),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, RetKind::Void)
    }
}

/// A synthesized function signature: return kind plus (name, bit width)
/// per parameter, in artifact order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnSig {
    pub ret: RetKind,
    pub params: Vec<(String, u32)>,
}

impl FnSig {
    pub fn param_list(&self) -> Vec<Param> {
        self.params
            .iter()
            .map(|(name, bits)| Param {
                name: name.clone(),
                ty: Ty::Int(*bits),
            })
            .collect()
    }
}

/// Module-level state for one lifting pass.
pub struct LiftCtx<'a> {
    pub module: Module,
    pub bundle: &'a ArtifactBundle,
    /// Disambiguates identified aggregate type names across input files.
    pub filename: String,
    pub options: LiftOptions,
    /// Function name to synthesized signature; complete before any body is
    /// translated so intra-module calls resolve.
    pub signatures: HashMap<String, FnSig>,
    /// Object symbol to the integer type of its global storage.
    pub globals: HashMap<String, Ty>,
    /// Instrumentation source symbol to (emitted callee, return type).
    instrumentation: HashMap<String, (String, Ty)>,
}

impl<'a> LiftCtx<'a> {
    #[instrument(level = "debug", skip(bundle, options))]
    pub fn new(bundle: &'a ArtifactBundle, filename: &str, options: LiftOptions) -> Self {
        let mut module = Module::new(filename);
        module.data_layout = DATA_LAYOUT.to_string();
        module.triple = TARGET_TRIPLE.to_string();
        LiftCtx {
            module,
            bundle,
            filename: filename.to_string(),
            options,
            signatures: HashMap::new(),
            globals: HashMap::new(),
            instrumentation: HashMap::new(),
        }
    }

    /// Scan every artifact for object symbols and materialize one
    /// zero-initialized global per distinct symbol, sized to the declared
    /// width at first sighting.
    pub fn discover_globals(&mut self) {
        let bundle = self.bundle;
        for (name, artifact) in bundle.iter() {
            for vn in artifact.varnodes() {
                if vn.is_object() && !self.globals.contains_key(&vn.symbol) {
                    let ty = Ty::Int(8 * vn.size);
                    debug!(symbol = %vn.symbol, %ty, function = name, "discovered global");
                    self.module.add_global(&vn.symbol, ty.clone());
                    self.globals.insert(vn.symbol.clone(), ty);
                }
            }
        }
    }

    /// Walk every artifact once and install typed declarations for all
    /// functions, so calls resolve before any body exists.
    pub fn declare_signatures(&mut self) {
        let bundle = self.bundle;
        for (name, artifact) in bundle.iter() {
            let ret = match artifact.return_ty.type_name.as_str() {
                "void" => RetKind::Void,
                "undefined8" => RetKind::Undefined8,
                _ => RetKind::Int(8 * artifact.return_ty.size),
            };
            let params = artifact
                .args
                .iter()
                .map(|arg| (arg.name.clone(), 8 * arg.size))
                .collect();
            let sig = FnSig { ret, params };
            debug!(function = name, ?sig, "synthesized signature");
            self.module
                .add_function(pliftc_ir::Function::new(name, sig.ret.ty(), sig.param_list()));
            self.signatures.insert(name.to_string(), sig);
        }
    }

    /// Resolve an instrumentation call target to its canonical intrinsic,
    /// declaring and memoizing it on first use. `Ok(None)` means the call
    /// is suppressed entirely.
    pub fn instrument(&mut self, target: &str) -> Result<Option<(String, Ty)>, LiftError> {
        if let Some(cached) = self.instrumentation.get(target) {
            return Ok(Some(cached.clone()));
        }
        let (callee, ret_ty) = match target {
            "sym.path_start" => return Ok(None),
            "sym.path_goal" | "sym.path_nongoal" => ("verifier.error", Ty::Void),
            "sym.imp.rand" => ("nd", Ty::Int(32)),
            other => return Err(LiftError::UnsupportedInstrumentation(other.to_string())),
        };
        debug!(source = target, emitted = callee, "declaring instrumentation intrinsic");
        self.module
            .declare_function_if_absent(callee, ret_ty.clone(), Vec::new());
        self.instrumentation
            .insert(target.to_string(), (callee.to_string(), ret_ty.clone()));
        Ok(Some((callee.to_string(), ret_ty)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pliftc_pcode::{ArtifactBundle, FunctionArtifact, ReturnSpec};

    fn bundle() -> ArtifactBundle {
        let mut b = ArtifactBundle::new();
        b.insert(
            "f",
            FunctionArtifact {
                return_ty: ReturnSpec::new("void", 0),
                args: Vec::new(),
                locals: Vec::new(),
                blocks: Vec::new(),
            },
        );
        b
    }

    #[test]
    fn instrumentation_is_memoized_and_declared_once() {
        let bundle = bundle();
        let mut ctx = LiftCtx::new(&bundle, "demo", LiftOptions::default());
        let first = ctx.instrument("sym.path_goal").unwrap().unwrap();
        let second = ctx.instrument("sym.path_goal").unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.0, "verifier.error");
        let count = ctx
            .module
            .functions
            .iter()
            .filter(|f| f.name == "verifier.error")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn goal_and_nongoal_share_one_declaration() {
        let bundle = bundle();
        let mut ctx = LiftCtx::new(&bundle, "demo", LiftOptions::default());
        ctx.instrument("sym.path_goal").unwrap();
        ctx.instrument("sym.path_nongoal").unwrap();
        let count = ctx
            .module
            .functions
            .iter()
            .filter(|f| f.name == "verifier.error")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn path_start_is_suppressed() {
        let bundle = bundle();
        let mut ctx = LiftCtx::new(&bundle, "demo", LiftOptions::default());
        assert!(ctx.instrument("sym.path_start").unwrap().is_none());
        assert!(ctx.module.functions.iter().all(|f| f.name == "f"));
    }

    #[test]
    fn unknown_instrumentation_is_fatal() {
        let bundle = bundle();
        let mut ctx = LiftCtx::new(&bundle, "demo", LiftOptions::default());
        let err = ctx.instrument("sym.path_other").unwrap_err();
        assert!(matches!(err, LiftError::UnsupportedInstrumentation(_)));
    }
}
