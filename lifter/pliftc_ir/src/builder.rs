//! A positioned instruction builder.
//!
//! A `Builder` appends to the end of one basic block of one function, in
//! the style of an LLVM IR builder: create it positioned on a block, emit,
//! drop it, position a new one elsewhere.

use crate::module::Function;
use crate::syntax::{BinOp, BlockId, Inst, IntPredicate, ValueId, ValueKind};
use crate::ty::Ty;

pub struct Builder<'f> {
    func: &'f mut Function,
    block: BlockId,
}

impl<'f> Builder<'f> {
    /// Position a builder at the end of `block`.
    pub fn position_at_end(func: &'f mut Function, block: BlockId) -> Self {
        Builder { func, block }
    }

    pub fn func(&self) -> &Function {
        self.func
    }

    pub fn block(&self) -> BlockId {
        self.block
    }

    fn push(&mut self, inst: Inst) {
        self.func.blocks[self.block].insts.push(inst);
    }

    fn result(&mut self, ty: Ty, name: Option<&str>) -> ValueId {
        self.func
            .new_value(ty, ValueKind::Inst, name.map(str::to_string))
    }

    pub fn const_int(&mut self, bits: u32, value: i128) -> ValueId {
        self.func.const_int(bits, value)
    }

    pub fn alloca(&mut self, ty: Ty, name: Option<&str>) -> ValueId {
        let result = self.result(ty.clone().ptr_to(), name);
        self.push(Inst::Alloca {
            result,
            allocated: ty,
        });
        result
    }

    pub fn load(&mut self, ptr: ValueId) -> ValueId {
        let pointee = self
            .func
            .value_ty(ptr)
            .pointee()
            .cloned()
            .expect("load target must be a pointer value");
        let result = self.result(pointee, None);
        self.push(Inst::Load { result, ptr });
        result
    }

    pub fn store(&mut self, value: ValueId, ptr: ValueId) {
        self.push(Inst::Store { value, ptr });
    }

    /// `getelementptr` with an explicit result type; the caller knows the
    /// layout it is indexing into.
    pub fn gep(
        &mut self,
        base: ValueId,
        indices: Vec<ValueId>,
        result_ty: Ty,
        inbounds: bool,
        name: Option<&str>,
    ) -> ValueId {
        let result = self.result(result_ty, name);
        self.push(Inst::GetElementPtr {
            result,
            base,
            indices,
            inbounds,
        });
        result
    }

    pub fn bitcast(&mut self, value: ValueId, ty: Ty, name: Option<&str>) -> ValueId {
        let result = self.result(ty.clone(), name);
        self.push(Inst::BitCast { result, value, ty });
        result
    }

    pub fn trunc(&mut self, value: ValueId, ty: Ty) -> ValueId {
        let result = self.result(ty.clone(), None);
        self.push(Inst::Trunc { result, value, ty });
        result
    }

    pub fn zext(&mut self, value: ValueId, ty: Ty) -> ValueId {
        let result = self.result(ty.clone(), None);
        self.push(Inst::ZExt { result, value, ty });
        result
    }

    pub fn sext(&mut self, value: ValueId, ty: Ty) -> ValueId {
        let result = self.result(ty.clone(), None);
        self.push(Inst::SExt { result, value, ty });
        result
    }

    /// A two-operand integer instruction; the result takes the left
    /// operand's type.
    pub fn binary(&mut self, op: BinOp, lhs: ValueId, rhs: ValueId) -> ValueId {
        let ty = self.func.value_ty(lhs).clone();
        let result = self.result(ty, None);
        self.push(Inst::Binary {
            op,
            result,
            lhs,
            rhs,
        });
        result
    }

    /// Arithmetic negation: `sub 0, value`.
    pub fn neg(&mut self, value: ValueId) -> ValueId {
        let bits = self
            .func
            .value_ty(value)
            .int_width()
            .expect("negation needs an integer operand");
        let zero = self.const_int(bits, 0);
        self.binary(BinOp::Sub, zero, value)
    }

    /// Bitwise complement: `xor value, -1`.
    pub fn not(&mut self, value: ValueId) -> ValueId {
        let bits = self
            .func
            .value_ty(value)
            .int_width()
            .expect("complement needs an integer operand");
        let ones = self.const_int(bits, -1);
        self.binary(BinOp::Xor, value, ones)
    }

    pub fn icmp(&mut self, pred: IntPredicate, lhs: ValueId, rhs: ValueId) -> ValueId {
        let result = self.result(Ty::Int(1), None);
        self.push(Inst::ICmp {
            pred,
            result,
            lhs,
            rhs,
        });
        result
    }

    /// Call a function by name. The result value exists even when `ret_ty`
    /// is void so the caller can record that the call happened.
    pub fn call(&mut self, callee: &str, ret_ty: Ty, args: Vec<ValueId>) -> ValueId {
        let result = self.result(ret_ty, None);
        self.push(Inst::Call {
            result,
            callee: callee.to_string(),
            args,
        });
        result
    }

    pub fn br(&mut self, dest: BlockId) {
        self.push(Inst::Br { dest });
    }

    /// Conditional branch. Operand order is (condition, taken-when-true,
    /// taken-when-false); callers are responsible for which block they put
    /// where.
    pub fn cond_br(&mut self, cond: ValueId, then_dest: BlockId, else_dest: BlockId) {
        self.push(Inst::CondBr {
            cond,
            then_dest,
            else_dest,
        });
    }

    pub fn ret(&mut self, value: Option<ValueId>) {
        self.push(Inst::Ret { value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_takes_the_pointee_type() {
        let mut f = Function::new("f", Ty::Void, vec![]);
        let bb = f.append_block("entry");
        let mut b = Builder::position_at_end(&mut f, bb);
        let slot = b.alloca(Ty::Int(32), Some("x"));
        let v = b.load(slot);
        assert_eq!(f.value_ty(v), &Ty::Int(32));
        assert_eq!(f.blocks[bb].insts.len(), 2);
    }

    #[test]
    fn neg_lowers_to_sub_from_zero() {
        let mut f = Function::new("f", Ty::Void, vec![]);
        let bb = f.append_block("entry");
        let mut b = Builder::position_at_end(&mut f, bb);
        let x = b.const_int(16, 5);
        let n = b.neg(x);
        assert_eq!(f.value_ty(n), &Ty::Int(16));
        match &f.blocks[bb].insts[0] {
            Inst::Binary { op, rhs, .. } => {
                assert_eq!(*op, BinOp::Sub);
                assert_eq!(*rhs, x);
            }
            other => panic!("expected sub, got {:?}", other),
        }
    }

    #[test]
    fn terminators_close_a_block() {
        let mut f = Function::new("f", Ty::Void, vec![]);
        let entry = f.append_block("entry");
        let next = f.append_block("next");
        let mut b = Builder::position_at_end(&mut f, entry);
        b.br(next);
        assert!(f.blocks[entry].is_terminated());
        assert!(!f.blocks[next].is_terminated());
    }
}
