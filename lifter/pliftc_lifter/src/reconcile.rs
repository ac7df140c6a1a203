//! Integer width reconciliation.

use pliftc_ir::{Function, Ty, ValueId};

/// Make two integer operands the same width before a binary operation.
///
/// The narrower operand is *retyped* to the wider type, not extended: no
/// conversion instruction is emitted and the bits are reinterpreted at the
/// wider width. This is the single seam to change once artifacts carry
/// operand signedness — substitute an explicit `zext`/`sext` here.
/// Non-integer operands and equal widths are left alone.
pub fn reconcile_int_widths(func: &mut Function, lhs: ValueId, rhs: ValueId) {
    let (Some(lhs_width), Some(rhs_width)) = (
        func.value_ty(lhs).int_width(),
        func.value_ty(rhs).int_width(),
    ) else {
        return;
    };
    if lhs_width == rhs_width {
        return;
    }
    if lhs_width > rhs_width {
        func.retype_value(rhs, Ty::Int(lhs_width));
    } else {
        func.retype_value(lhs, Ty::Int(rhs_width));
    }
}
