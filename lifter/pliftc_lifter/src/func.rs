//! Per-function lifting state.
//!
//! A `FnCtx` is created fresh for every function: it owns the IR function
//! under construction, the local/register slot table, the temporaries
//! table, and the block map. The entry block is fully populated (locals,
//! register slots, branch to the first artifact block) before any artifact
//! block is translated.

use crate::context::{LiftCtx, RetKind};
use crate::error::LiftError;
use crate::options::StackLayout;
use pliftc_ir::{BlockId, Builder, Function, Ty, ValueId};
use pliftc_pcode::FunctionArtifact;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Format a block address: `0x` plus lowercase hex digits left-padded to
/// eight. Both block labels and branch targets go through this, so lookups
/// are insensitive to how the producer padded an address.
pub fn format_label(raw: &str) -> String {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    format!("0x{:0>8}", digits)
}

/// The label one byte past `label`, when it parses as an address. Used to
/// tolerate the producer's off-by-one conditional-branch targets.
pub(crate) fn successor_label(label: &str) -> Option<String> {
    let digits = label.strip_prefix("0x")?;
    let addr = u64::from_str_radix(digits, 16).ok()?;
    addr.checked_add(1).map(|next| format!("0x{:08x}", next))
}

/// Per-function translation state.
pub(crate) struct FnCtx<'a, 'b> {
    pub(crate) ctx: &'a mut LiftCtx<'b>,
    pub(crate) artifact: &'a FunctionArtifact,
    pub(crate) name: &'a str,
    pub(crate) ret: RetKind,
    /// The definition being built; installed into the module at the end.
    pub(crate) func: Function,
    /// Stack slot pointers: locals by base name, plus one slot per
    /// observed register varnode.
    pub(crate) locals: HashMap<String, ValueId>,
    /// Current value per `register*`/`unique*` name. Substitution, not
    /// storage: writes replace the entry.
    pub(crate) temps: HashMap<String, ValueId>,
    /// Formatted label to IR block.
    pub(crate) blocks: HashMap<String, BlockId>,
}

/// Lift one function body into the module held by `ctx`. The signature
/// must already be declared.
#[instrument(level = "debug", skip(ctx, artifact))]
pub fn lift_function(
    ctx: &mut LiftCtx<'_>,
    name: &str,
    artifact: &FunctionArtifact,
) -> Result<(), LiftError> {
    let sig = ctx
        .signatures
        .get(name)
        .cloned()
        .ok_or_else(|| LiftError::InvariantViolation(format!("no signature for `{}`", name)))?;
    let mut func = Function::new(name, sig.ret.ty(), sig.param_list());
    let entry = func.append_block("entry");

    let mut fx = FnCtx {
        ctx,
        artifact,
        name,
        ret: sig.ret,
        func,
        locals: HashMap::new(),
        temps: HashMap::new(),
        blocks: HashMap::new(),
    };
    fx.materialize_locals(entry);
    fx.materialize_registers(entry);
    let first = fx.build_cfg()?;
    Builder::position_at_end(&mut fx.func, entry).br(first);
    fx.translate_blocks()?;

    let FnCtx { ctx, func, .. } = fx;
    ctx.module.define_function(func);
    Ok(())
}

impl FnCtx<'_, '_> {
    /// Allocate stack storage for the artifact's locals in the entry block
    /// under the configured layout policy.
    fn materialize_locals(&mut self, entry: BlockId) {
        let artifact = self.artifact;
        let layout = self.ctx.options.stack;
        debug!(
            function = self.name,
            layout = layout.name(),
            locals = artifact.locals.len(),
            "materializing locals"
        );
        match layout {
            StackLayout::SingleStruct => {
                let struct_name = self.locals_struct_name();
                let fields: Vec<Ty> = artifact
                    .locals
                    .iter()
                    .map(|local| Ty::Int(local.bits()))
                    .collect();
                self.ctx.module.set_struct_body(&struct_name, fields);
                let mut b = Builder::position_at_end(&mut self.func, entry);
                let agg = b.alloca(Ty::Struct(struct_name), None);
                for (index, local) in artifact.locals.iter().enumerate() {
                    let zero = b.const_int(32, 0);
                    let field = b.const_int(32, index as i128);
                    let ptr = b.gep(
                        agg,
                        vec![zero, field],
                        Ty::Int(local.bits()).ptr_to(),
                        true,
                        Some(&local.name),
                    );
                    self.locals.insert(local.name.clone(), ptr);
                }
            }
            StackLayout::ByteAddressable => {
                let struct_name = self.locals_struct_name();
                let mut placed = Vec::with_capacity(artifact.locals.len());
                let mut total_bytes = 0u32;
                for local in &artifact.locals {
                    let bytes = if local.name.contains("bVar") { 1 } else { local.size };
                    placed.push((local.name.clone(), total_bytes, local.bits()));
                    total_bytes += bytes;
                }
                self.ctx
                    .module
                    .set_struct_body(&struct_name, vec![Ty::Int(8); total_bytes as usize]);
                let mut b = Builder::position_at_end(&mut self.func, entry);
                let agg = b.alloca(Ty::Struct(struct_name), None);
                for (name, byte_index, bits) in placed {
                    let zero = b.const_int(32, 0);
                    let field = b.const_int(32, byte_index as i128);
                    let byte_ptr = b.gep(agg, vec![zero, field], Ty::Int(8).ptr_to(), true, None);
                    let ptr = b.bitcast(byte_ptr, Ty::Int(bits).ptr_to(), Some(&name));
                    self.locals.insert(name, ptr);
                }
            }
            StackLayout::NoOption => {
                let mut b = Builder::position_at_end(&mut self.func, entry);
                for local in &artifact.locals {
                    let ptr = b.alloca(Ty::Int(local.bits()), Some(&local.name));
                    self.locals.insert(local.name.clone(), ptr);
                }
            }
        }
    }

    /// One stack slot per distinct register varnode, sized to the widest
    /// observed use, in first-observation order.
    fn materialize_registers(&mut self, entry: BlockId) {
        let artifact = self.artifact;
        let mut order: Vec<String> = Vec::new();
        let mut widths: HashMap<String, u32> = HashMap::new();
        for vn in artifact.varnodes() {
            if !vn.is_register() {
                continue;
            }
            let bits = vn.register_bits();
            match widths.entry(vn.symbol.clone()) {
                Entry::Occupied(mut seen) => {
                    if bits > *seen.get() {
                        seen.insert(bits);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(bits);
                    order.push(vn.symbol.clone());
                }
            }
        }
        let mut b = Builder::position_at_end(&mut self.func, entry);
        for symbol in order {
            let bits = widths[&symbol];
            debug!(register = %symbol, bits, "allocating register slot");
            let ptr = b.alloca(Ty::Int(bits), Some(&symbol));
            self.locals.insert(symbol, ptr);
        }
    }

    /// Create one empty IR block per artifact block, keyed by formatted
    /// label. Returns the first artifact block, the entry's successor.
    fn build_cfg(&mut self) -> Result<BlockId, LiftError> {
        let artifact = self.artifact;
        let mut first = None;
        for block in &artifact.blocks {
            let label = format_label(&block.address);
            let id = self.func.append_block(label.clone());
            if first.is_none() {
                first = Some(id);
            }
            self.blocks.insert(label, id);
        }
        first.ok_or_else(|| {
            LiftError::CfgInconsistency(format!("function `{}` has no blocks", self.name))
        })
    }

    pub(crate) fn locals_struct_name(&self) -> String {
        format!("struct.locals.{}.{}", self.ctx.filename, self.name)
    }

    pub(crate) fn block_id(&self, label: &str) -> Result<BlockId, LiftError> {
        self.blocks.get(label).copied().ok_or_else(|| {
            LiftError::CfgInconsistency(format!("branch to unknown block {}", label))
        })
    }
}
