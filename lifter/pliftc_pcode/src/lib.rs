//! The read-only model of a decompiled function bundle.
//!
//! A front-end hands the lifter one [`artifact::ArtifactBundle`]: a mapping
//! from function name to that function's P-code artifact (signature, locals,
//! and a basic-block graph of operations over [`varnode::Varnode`]s). This
//! crate only describes that input; all translation lives in `pliftc_lifter`.

pub mod artifact;
pub mod opcode;
pub mod varnode;

pub use artifact::{ArtifactBundle, BlockArtifact, FunctionArtifact, OpArtifact, ReturnSpec, VarDecl};
pub use opcode::Opcode;
pub use varnode::{Varnode, VarnodeSlice};
