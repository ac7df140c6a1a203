//! Varnode resolution: mapping operand descriptors to IR values (reads)
//! and store targets (writes).
//!
//! Resolution is ordered, first match wins, and the order is part of the
//! contract: `argc`/`argv` rejection, parameters, globals, locals (which
//! include register slots), temporaries, boolean literals, and finally
//! numeric constants — where a failed parse yields a zero of the requested
//! width rather than an error.

use crate::error::LiftError;
use crate::func::FnCtx;
use crate::options::StackLayout;
use pliftc_ir::{BlockId, Builder, Ty, ValueId};
use pliftc_pcode::varnode::parse_constant;
use pliftc_pcode::Varnode;
use tracing::trace;

impl FnCtx<'_, '_> {
    /// Resolve an input varnode to a value, emitting loads and width
    /// corrections into `block` as needed. `Ok(None)` is the no-value
    /// sentinel callers may drop (call arguments do).
    pub(crate) fn fetch_input(
        &mut self,
        block: BlockId,
        vn: &Varnode,
    ) -> Result<Option<ValueId>, LiftError> {
        let symbol = vn.base_symbol().to_string();
        let bits = vn.read_bits();
        trace!(symbol = %symbol, bits, "fetching input");

        if symbol.contains("argv") || symbol.contains("argc") {
            return Err(LiftError::UnsupportedVarnode(symbol));
        }

        if symbol.contains("arg") {
            if let Some(param) = self.func.param_by_name(&symbol) {
                return Ok(Some(param));
            }
        }

        if let Some(global_ty) = self.ctx.globals.get(&symbol).cloned() {
            let gref = self.func.global_ref(&symbol, global_ty);
            let mut b = Builder::position_at_end(&mut self.func, block);
            return Ok(Some(b.load(gref)));
        }

        if let Some(&slot) = self.locals.get(&symbol) {
            if self.ctx.options.stack == StackLayout::SingleStruct {
                let mut b = Builder::position_at_end(&mut self.func, block);
                return Ok(Some(b.load(slot)));
            }
            let slot_ty = self.func.value_ty(slot).clone();
            let mut b = Builder::position_at_end(&mut self.func, block);
            let (ptr, width) = match vn.slice {
                Some(slice) => {
                    let index = b.const_int(8 * slice.size, i128::from(8 * slice.offset));
                    let ptr = b.gep(slot, vec![index], slot_ty, false, None);
                    (ptr, 8 * slice.size)
                }
                None => (slot, bits),
            };
            let mut value = b.load(ptr);
            if b.func().value_ty(value) != &Ty::Int(width) {
                value = b.trunc(value, Ty::Int(width));
            }
            return Ok(Some(value));
        }

        if let Some(&temp) = self.temps.get(&symbol) {
            let ty = self.func.value_ty(temp).clone();
            if ty.is_void() {
                return Ok(Some(self.func.const_int(1, 0)));
            }
            if let Some(width) = ty.int_width() {
                if width != 1 && width > bits {
                    let mut b = Builder::position_at_end(&mut self.func, block);
                    return Ok(Some(b.trunc(temp, Ty::Int(bits))));
                }
            }
            return Ok(Some(temp));
        }

        if symbol.contains("false") {
            return Ok(Some(self.func.const_int(1, 0)));
        }
        if symbol.contains("true") {
            return Ok(Some(self.func.const_int(1, 1)));
        }

        let value = parse_constant(&symbol).unwrap_or(0);
        Ok(Some(self.func.const_int(bits, value)))
    }

    /// Resolve an output varnode and store `value` into it. Local slots
    /// take a pointer bitcast when the value's width disagrees; register
    /// and unique names update the temporaries table; parameter targets
    /// and unknown names are ignored.
    pub(crate) fn store_output(
        &mut self,
        block: BlockId,
        vn: &Varnode,
        value: ValueId,
    ) -> Result<(), LiftError> {
        let symbol = vn.base_symbol().to_string();
        trace!(symbol = %symbol, "storing output");

        if let Some(&slot) = self.locals.get(&symbol) {
            let slot_ty = self.func.value_ty(slot).clone();
            let value_ty = self.func.value_ty(value).clone();
            let mut b = Builder::position_at_end(&mut self.func, block);
            let ptr = match vn.slice {
                Some(slice) => {
                    let index = b.const_int(8 * slice.size, i128::from(8 * slice.offset));
                    b.gep(slot, vec![index], slot_ty.clone(), false, None)
                }
                None => slot,
            };
            if !value_ty.is_void() {
                let wanted = value_ty.ptr_to();
                let ptr = if b.func().value_ty(ptr) != &wanted {
                    b.bitcast(ptr, wanted, None)
                } else {
                    ptr
                };
                b.store(value, ptr);
            }
            return Ok(());
        }

        if let Some(global_ty) = self.ctx.globals.get(&symbol).cloned() {
            let gref = self.func.global_ref(&symbol, global_ty);
            let mut b = Builder::position_at_end(&mut self.func, block);
            b.store(value, gref);
            return Ok(());
        }

        if symbol.contains("register") || symbol.contains("unique") {
            self.temps.insert(symbol, value);
            return Ok(());
        }

        // Parameter targets and anything else: ignored.
        Ok(())
    }
}
