//! The lifting engine: P-code function artifacts in, a typed IR module out.
//!
//! A pass runs in a fixed order. Globals are discovered and signatures are
//! synthesized across the whole bundle before any body is translated, so
//! intra-module calls resolve; each function is then lifted in bundle
//! order — locals and register slots first, then the block graph, then the
//! per-operation translation.

pub mod context;
pub mod error;
pub mod func;
pub mod options;
pub mod reconcile;
mod resolver;
mod translate;

pub use context::{FnSig, LiftCtx, RetKind, DATA_LAYOUT, INSTRUMENTATION_LIST, TARGET_TRIPLE};
pub use error::LiftError;
pub use func::{format_label, lift_function};
pub use options::{LiftOptions, StackLayout};

use pliftc_ir::Module;
use pliftc_pcode::ArtifactBundle;
use tracing::info;

/// Lift every function in `bundle` into one IR module. `filename`
/// disambiguates the identified aggregate type names the locals layouts
/// emit.
pub fn lift_bundle(
    bundle: &ArtifactBundle,
    filename: &str,
    options: LiftOptions,
) -> Result<Module, LiftError> {
    let mut ctx = LiftCtx::new(bundle, filename, options);
    ctx.discover_globals();
    ctx.declare_signatures();
    for (name, artifact) in bundle.iter() {
        lift_function(&mut ctx, name, artifact)?;
    }
    info!(
        functions = ctx.module.functions.len(),
        globals = ctx.module.globals.len(),
        "lifted bundle"
    );
    Ok(ctx.module)
}
