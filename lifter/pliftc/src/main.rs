// Development driver: lifts a small in-memory artifact and prints the
// textual module.
//
// PLIFTC_FILTER=debug cargo run; pipe the output to llvm-as to check it
// still assembles.
//
// The demo bundle below is the artifact shape a front-end would hand us
// for roughly:
// ```c
// long sum_to(long arg1) {
//     long var_10 = 0;
//     while (var_10 < arg1)
//         var_10 = var_10 + 1;
//     return var_10;
// }
// ```

use pliftc_ir::Module;
use pliftc_lifter::{lift_bundle, LiftOptions, StackLayout};
use pliftc_pcode::{
    ArtifactBundle, BlockArtifact, FunctionArtifact, OpArtifact, ReturnSpec, VarDecl, Varnode,
};
use tracing::debug;

fn demo_bundle() -> ArtifactBundle {
    let vn = |symbol: &str, size: u32| Varnode::new(symbol, size);

    let sum_to = FunctionArtifact {
        return_ty: ReturnSpec::new("undefined8", 8),
        args: vec![VarDecl::new("arg1", 8)],
        locals: vec![VarDecl::new("var_10", 8), VarDecl::new("bVar1", 1)],
        blocks: vec![
            BlockArtifact::new(
                "0x1000",
                vec![OpArtifact::new(
                    "COPY",
                    vec![vn("0", 8)],
                    Some(vn("var_10", 8)),
                )],
                vec!["0x1004".to_string()],
            ),
            BlockArtifact::new(
                "0x1004",
                vec![
                    OpArtifact::new(
                        "INT_SLESS",
                        vec![vn("var_10", 8), vn("arg1", 8)],
                        Some(vn("bVar1", 1)),
                    ),
                    OpArtifact::new("CBRANCH", vec![vn("0x1008", 8), vn("bVar1", 1)], None),
                ],
                vec!["0x1008".to_string(), "0x100c".to_string()],
            ),
            BlockArtifact::new(
                "0x1008",
                vec![
                    OpArtifact::new(
                        "INT_ADD",
                        vec![vn("var_10", 8), vn("1", 8)],
                        Some(vn("var_10", 8)),
                    ),
                    OpArtifact::new("BRANCH", vec![vn("0x1004", 8)], None),
                ],
                vec!["0x1004".to_string()],
            ),
            BlockArtifact::new(
                "0x100c",
                vec![OpArtifact::new(
                    "RETURN",
                    vec![vn("0x0", 8), vn("var_10", 8)],
                    None,
                )],
                vec![],
            ),
        ],
    };

    let mut bundle = ArtifactBundle::new();
    bundle.insert("sum_to", sum_to);
    bundle
}

fn lift_demo() -> Result<Module, pliftc_lifter::LiftError> {
    let bundle = demo_bundle();
    let options = LiftOptions::with_stack(StackLayout::NoOption);
    debug!(functions = bundle.len(), ?options, "lifting demo bundle");
    lift_bundle(&bundle, "demo", options)
}

fn main() {
    init_pliftc_logger();
    debug!("logging initialized");

    match lift_demo() {
        Ok(module) => print!("{}", module),
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    }
}

fn init_pliftc_logger() {
    if let Err(err) = pliftc_log::Logger::init(pliftc_log::LoggerConfig::from_env("PLIFTC")) {
        eprintln!("error initializing logger: {}", err);
        std::process::exit(1);
    }
}
