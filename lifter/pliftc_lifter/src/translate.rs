//! Per-operation translation: the dispatch over the P-code opcode set.
//!
//! Blocks are translated in artifact order, operations in block order.
//! Every block ends in exactly one terminator: the opcodes that emit one
//! mark the block branched, and a block that never branched gets an
//! unconditional branch to its single out-edge.

use crate::context::INSTRUMENTATION_LIST;
use crate::error::LiftError;
use crate::func::{format_label, successor_label, FnCtx};
use crate::reconcile::reconcile_int_widths;
use pliftc_ir::{BinOp, BlockId, Builder, IntPredicate, Ty, ValueId};
use pliftc_pcode::{BlockArtifact, OpArtifact, Opcode, Varnode};
use tracing::debug;

fn input_vn<'op>(op: &'op OpArtifact, index: usize) -> Result<&'op Varnode, LiftError> {
    op.inputs.get(index).ok_or_else(|| {
        LiftError::InvariantViolation(format!("{} is missing input {}", op.opname, index))
    })
}

fn output_vn<'op>(op: &'op OpArtifact) -> Result<&'op Varnode, LiftError> {
    op.output.as_ref().ok_or_else(|| {
        LiftError::InvariantViolation(format!("{} is missing its output", op.opname))
    })
}

impl FnCtx<'_, '_> {
    pub(crate) fn translate_blocks(&mut self) -> Result<(), LiftError> {
        let artifact = self.artifact;
        for xblock in &artifact.blocks {
            self.translate_block(xblock)?;
        }
        Ok(())
    }

    fn translate_block(&mut self, xblock: &BlockArtifact) -> Result<(), LiftError> {
        let label = format_label(&xblock.address);
        let bb = self.block_id(&label)?;
        debug!(function = self.name, block = %label, ops = xblock.ops.len(), "translating block");

        let mut branched = false;
        for op in &xblock.ops {
            let opcode = Opcode::from_name(&op.opname)
                .ok_or_else(|| LiftError::UnsupportedOpcode(op.opname.clone()))?;
            match opcode {
                Opcode::Copy | Opcode::Cast => {
                    let value = self.input_value(bb, op, 0)?;
                    self.store_result(bb, op, value)?;
                }
                // Memory is modeled through direct local/global access.
                Opcode::Load | Opcode::Store => {}
                Opcode::Branch => {
                    self.lift_branch(bb, xblock, op)?;
                    branched = true;
                }
                Opcode::CBranch => {
                    self.lift_cbranch(bb, xblock, op)?;
                    branched = true;
                }
                Opcode::BranchInd => {
                    self.lift_branchind(bb, op)?;
                    branched = true;
                }
                Opcode::Call => self.lift_call(bb, op)?,
                Opcode::CallInd => self.lift_callind(bb, op)?,
                Opcode::Return => {
                    self.lift_return(bb, op)?;
                    branched = true;
                }
                Opcode::IntEqual => self.lift_compare(bb, op, IntPredicate::Eq)?,
                Opcode::IntNotEqual => self.lift_compare(bb, op, IntPredicate::Ne)?,
                Opcode::IntLess => self.lift_compare(bb, op, IntPredicate::Ult)?,
                Opcode::IntSLess => self.lift_compare(bb, op, IntPredicate::Slt)?,
                Opcode::IntSLessEqual => self.lift_compare(bb, op, IntPredicate::Sle)?,
                Opcode::IntLessEqual => {
                    let result = self.compute_compare(bb, op, IntPredicate::Ule)?;
                    if self.ctx.options.keep_unsigned_le_results {
                        self.store_result(bb, op, result)?;
                    }
                }
                Opcode::IntZExt => self.lift_extend(bb, op, false)?,
                Opcode::IntSExt => self.lift_extend(bb, op, true)?,
                Opcode::IntAdd => self.lift_binary(bb, op, BinOp::Add)?,
                Opcode::IntSub => self.lift_binary(bb, op, BinOp::Sub)?,
                Opcode::IntMult => self.lift_binary(bb, op, BinOp::Mul)?,
                Opcode::IntDiv => self.lift_binary(bb, op, BinOp::UDiv)?,
                Opcode::IntSDiv => self.lift_binary(bb, op, BinOp::SDiv)?,
                Opcode::IntRem => self.lift_binary(bb, op, BinOp::URem)?,
                Opcode::IntSRem => self.lift_binary(bb, op, BinOp::SRem)?,
                Opcode::IntAnd | Opcode::BoolAnd => self.lift_binary(bb, op, BinOp::And)?,
                Opcode::IntOr | Opcode::BoolOr => self.lift_binary(bb, op, BinOp::Or)?,
                Opcode::IntXor | Opcode::BoolXor => self.lift_binary(bb, op, BinOp::Xor)?,
                Opcode::IntLeft => self.lift_binary(bb, op, BinOp::Shl)?,
                Opcode::IntRight => self.lift_binary(bb, op, BinOp::LShr)?,
                Opcode::IntSRight => self.lift_binary(bb, op, BinOp::AShr)?,
                Opcode::Int2Comp => {
                    let value = self.input_value(bb, op, 0)?;
                    let result = Builder::position_at_end(&mut self.func, bb).neg(value);
                    self.store_result(bb, op, result)?;
                }
                Opcode::BoolNegate => {
                    let value = self.input_value(bb, op, 0)?;
                    let result = Builder::position_at_end(&mut self.func, bb).not(value);
                    self.store_result(bb, op, result)?;
                }
                Opcode::Piece => self.lift_piece(bb, op)?,
                Opcode::SubPiece => self.lift_subpiece(bb, op)?,
                Opcode::PtrAdd => self.lift_ptradd(bb, op)?,
                // The artifact's sign convention is already encoded in the
                // second operand, so PTRSUB is plain addition.
                Opcode::PtrSub => self.lift_binary(bb, op, BinOp::Add)?,
            }
        }

        if !branched {
            self.terminate_fallthrough(bb, xblock)?;
        }
        Ok(())
    }

    /// Fetch input `index`, treating the no-value sentinel as malformed in
    /// operand position.
    fn input_value(
        &mut self,
        bb: BlockId,
        op: &OpArtifact,
        index: usize,
    ) -> Result<ValueId, LiftError> {
        let vn = input_vn(op, index)?;
        self.fetch_input(bb, vn)?.ok_or_else(|| {
            LiftError::InvariantViolation(format!(
                "{} input {} resolved to no value",
                op.opname, index
            ))
        })
    }

    fn store_result(
        &mut self,
        bb: BlockId,
        op: &OpArtifact,
        value: ValueId,
    ) -> Result<(), LiftError> {
        let out = output_vn(op)?;
        self.store_output(bb, out, value)
    }

    /// Shared shape of the two-operand integer opcodes: resolve both
    /// inputs, reconcile widths, emit, store.
    fn lift_binary(&mut self, bb: BlockId, op: &OpArtifact, bin: BinOp) -> Result<(), LiftError> {
        let lhs = self.input_value(bb, op, 0)?;
        let rhs = self.input_value(bb, op, 1)?;
        reconcile_int_widths(&mut self.func, lhs, rhs);
        let result = Builder::position_at_end(&mut self.func, bb).binary(bin, lhs, rhs);
        self.store_result(bb, op, result)
    }

    fn compute_compare(
        &mut self,
        bb: BlockId,
        op: &OpArtifact,
        pred: IntPredicate,
    ) -> Result<ValueId, LiftError> {
        let lhs = self.input_value(bb, op, 0)?;
        let rhs = self.input_value(bb, op, 1)?;
        reconcile_int_widths(&mut self.func, lhs, rhs);
        Ok(Builder::position_at_end(&mut self.func, bb).icmp(pred, lhs, rhs))
    }

    fn lift_compare(
        &mut self,
        bb: BlockId,
        op: &OpArtifact,
        pred: IntPredicate,
    ) -> Result<(), LiftError> {
        let result = self.compute_compare(bb, op, pred)?;
        self.store_result(bb, op, result)
    }

    fn lift_extend(&mut self, bb: BlockId, op: &OpArtifact, signed: bool) -> Result<(), LiftError> {
        let value = self.input_value(bb, op, 0)?;
        let ty = Ty::Int(output_vn(op)?.store_bits());
        let mut b = Builder::position_at_end(&mut self.func, bb);
        let result = if signed {
            b.sext(value, ty)
        } else {
            b.zext(value, ty)
        };
        self.store_result(bb, op, result)
    }

    /// Unconditional branch. The out-edge is authoritative; a disagreeing
    /// literal operand is logged and overridden.
    fn lift_branch(
        &mut self,
        bb: BlockId,
        xblock: &BlockArtifact,
        op: &OpArtifact,
    ) -> Result<(), LiftError> {
        let edge = xblock.out_branches.first().ok_or_else(|| {
            LiftError::CfgInconsistency(format!(
                "block {} has a branch but no out-edge",
                xblock.address
            ))
        })?;
        let target = format_label(edge);
        if let Some(vn) = op.inputs.first() {
            let literal = format_label(&vn.symbol);
            if literal != target {
                debug!(%literal, %target, "branch literal disagrees with out-edge; edge wins");
            }
        }
        let dest = self.block_id(&target)?;
        Builder::position_at_end(&mut self.func, bb).br(dest);
        Ok(())
    }

    /// Conditional branch. The true target is matched against the literal
    /// operand (tolerating the producer's off-by-one), the remaining edge
    /// is false, and unmatched literals fall back to positional
    /// assignment. Operand order is (condition, false target, true target).
    fn lift_cbranch(
        &mut self,
        bb: BlockId,
        xblock: &BlockArtifact,
        op: &OpArtifact,
    ) -> Result<(), LiftError> {
        let true_literal = format_label(&input_vn(op, 0)?.symbol);
        let cond = self.input_value(bb, op, 1)?;

        let edges: Vec<String> = xblock.out_branches.iter().map(|e| format_label(e)).collect();
        let bumped = successor_label(&true_literal);
        let mut true_label = None;
        let mut false_label = None;
        for edge in &edges {
            if *edge == true_literal || Some(edge) == bumped.as_ref() {
                true_label = Some(edge.clone());
            } else {
                false_label = Some(edge.clone());
            }
        }
        if true_label.is_none() && edges.len() >= 2 {
            true_label = Some(edges[0].clone());
            false_label = Some(edges[1].clone());
        }
        let (Some(true_label), Some(false_label)) = (true_label, false_label) else {
            return Err(LiftError::CfgInconsistency(format!(
                "no false-branch match for conditional at {}",
                xblock.address
            )));
        };

        let true_bb = self.block_id(&true_label)?;
        let false_bb = self.block_id(&false_label)?;
        Builder::position_at_end(&mut self.func, bb).cond_br(cond, false_bb, true_bb);
        Ok(())
    }

    /// Computed branch, best effort: treated as a direct branch to the
    /// block labeled by the operand's symbol.
    fn lift_branchind(&mut self, bb: BlockId, op: &OpArtifact) -> Result<(), LiftError> {
        let vn = input_vn(op, 0)?;
        let label = format_label(&vn.symbol);
        self.fetch_input(bb, vn)?;
        let dest = self.block_id(&label)?;
        Builder::position_at_end(&mut self.func, bb).br(dest);
        Ok(())
    }

    fn lift_call(&mut self, bb: BlockId, op: &OpArtifact) -> Result<(), LiftError> {
        let callee = input_vn(op, 0)?.symbol.clone();
        let mut args = Vec::new();
        for vn in op.inputs.iter().skip(1) {
            if let Some(value) = self.fetch_input(bb, vn)? {
                args.push(value);
            }
        }

        let result = if INSTRUMENTATION_LIST.contains(&callee.as_str()) {
            match self.ctx.instrument(&callee)? {
                Some((target, ret_ty)) => Some(
                    Builder::position_at_end(&mut self.func, bb).call(&target, ret_ty, Vec::new()),
                ),
                None => None,
            }
        } else {
            let (ret_ty, takes_no_args) = match self.ctx.signatures.get(&callee) {
                Some(sig) => (sig.ret.ty(), sig.params.is_empty()),
                None => {
                    return Err(LiftError::InvariantViolation(format!(
                        "call to unknown function `{}`",
                        callee
                    )))
                }
            };
            // A zero-parameter callee is called bare no matter what the
            // operation collected.
            let args = if takes_no_args { Vec::new() } else { args };
            Some(Builder::position_at_end(&mut self.func, bb).call(&callee, ret_ty, args))
        };

        if let (Some(result), Some(out)) = (result, op.output.clone()) {
            self.store_output(bb, &out, result)?;
        }
        Ok(())
    }

    /// Indirect call: an on-demand void-of-no-arguments declaration under
    /// the literal symbol.
    fn lift_callind(&mut self, bb: BlockId, op: &OpArtifact) -> Result<(), LiftError> {
        let callee = input_vn(op, 0)?.symbol.clone();
        self.ctx
            .module
            .declare_function_if_absent(&callee, Ty::Void, Vec::new());
        Builder::position_at_end(&mut self.func, bb).call(&callee, Ty::Void, Vec::new());
        Ok(())
    }

    fn lift_return(&mut self, bb: BlockId, op: &OpArtifact) -> Result<(), LiftError> {
        if self.ret.is_void() {
            Builder::position_at_end(&mut self.func, bb).ret(None);
        } else {
            let value = self.input_value(bb, op, 1)?;
            Builder::position_at_end(&mut self.func, bb).ret(Some(value));
        }
        Ok(())
    }

    /// `[most, least]` bit concatenation: zero-extend both halves to the
    /// output width, shift the most-significant half left by the
    /// least-significant half's declared width, and OR.
    fn lift_piece(&mut self, bb: BlockId, op: &OpArtifact) -> Result<(), LiftError> {
        let out_bits = output_vn(op)?.store_bits();
        let least_bits = input_vn(op, 1)?.store_bits();
        let most = self.input_value(bb, op, 0)?;
        let least = self.input_value(bb, op, 1)?;
        let mut b = Builder::position_at_end(&mut self.func, bb);
        let least_wide = b.zext(least, Ty::Int(out_bits));
        let most_wide = b.zext(most, Ty::Int(out_bits));
        let shift = b.const_int(out_bits, i128::from(least_bits));
        let most_shifted = b.binary(BinOp::Shl, most_wide, shift);
        let result = b.binary(BinOp::Or, least_wide, most_shifted);
        self.store_result(bb, op, result)
    }

    /// Truncation. Only offset 0 is supported; the result width comes from
    /// the offset operand's declared size.
    fn lift_subpiece(&mut self, bb: BlockId, op: &OpArtifact) -> Result<(), LiftError> {
        let value = self.input_value(bb, op, 0)?;
        let offset_vn = input_vn(op, 1)?.clone();
        self.fetch_input(bb, &offset_vn)?;
        if offset_vn.symbol != "0" {
            return Err(LiftError::InvariantViolation(format!(
                "subpiece with non-zero offset `{}`",
                offset_vn.symbol
            )));
        }
        let result =
            Builder::position_at_end(&mut self.func, bb).trunc(value, Ty::Int(offset_vn.store_bits()));
        self.store_result(bb, op, result)
    }

    /// `base + index * stride`, all as integers.
    fn lift_ptradd(&mut self, bb: BlockId, op: &OpArtifact) -> Result<(), LiftError> {
        let base = self.input_value(bb, op, 0)?;
        let index = self.input_value(bb, op, 1)?;
        let stride = self.input_value(bb, op, 2)?;
        reconcile_int_widths(&mut self.func, index, stride);
        let scaled = Builder::position_at_end(&mut self.func, bb).binary(BinOp::Mul, index, stride);
        reconcile_int_widths(&mut self.func, base, scaled);
        let result = Builder::position_at_end(&mut self.func, bb).binary(BinOp::Add, base, scaled);
        self.store_result(bb, op, result)
    }

    /// A block whose operations emitted no terminator falls through to its
    /// single out-edge.
    fn terminate_fallthrough(
        &mut self,
        bb: BlockId,
        xblock: &BlockArtifact,
    ) -> Result<(), LiftError> {
        let edge = xblock.out_branches.first().ok_or_else(|| {
            LiftError::CfgInconsistency(format!(
                "block {} has no terminator and no out-edge",
                xblock.address
            ))
        })?;
        let dest = self.block_id(&format_label(edge))?;
        Builder::position_at_end(&mut self.func, bb).br(dest);
        Ok(())
    }
}
