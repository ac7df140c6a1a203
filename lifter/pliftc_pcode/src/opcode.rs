//! The integer P-code opcode set the lifter accepts.

use std::fmt;

/// A recognized P-code operation.
///
/// The artifact spells operations as strings; [`Opcode::from_name`] is the
/// gate between the producer's vocabulary and the translator. Anything it
/// does not map — floating point, flag arithmetic, the indirect-effect
/// opcodes — is rejected by the translator with the offending spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Copy,
    Load,
    Store,
    Branch,
    CBranch,
    BranchInd,
    Call,
    CallInd,
    Return,
    IntEqual,
    IntNotEqual,
    IntLess,
    IntLessEqual,
    IntSLess,
    IntSLessEqual,
    IntZExt,
    IntSExt,
    IntAdd,
    IntSub,
    IntMult,
    IntDiv,
    IntSDiv,
    IntRem,
    IntSRem,
    Int2Comp,
    IntAnd,
    IntOr,
    IntXor,
    IntLeft,
    IntRight,
    IntSRight,
    BoolNegate,
    BoolAnd,
    BoolOr,
    BoolXor,
    Piece,
    SubPiece,
    Cast,
    PtrAdd,
    PtrSub,
}

impl Opcode {
    pub fn from_name(name: &str) -> Option<Opcode> {
        use Opcode::*;
        let op = match name {
            "COPY" => Copy,
            "LOAD" => Load,
            "STORE" => Store,
            "BRANCH" => Branch,
            "CBRANCH" => CBranch,
            "BRANCHIND" => BranchInd,
            "CALL" => Call,
            "CALLIND" => CallInd,
            "RETURN" => Return,
            "INT_EQUAL" => IntEqual,
            "INT_NOTEQUAL" => IntNotEqual,
            "INT_LESS" => IntLess,
            "INT_LESSEQUAL" => IntLessEqual,
            "INT_SLESS" => IntSLess,
            "INT_SLESSEQUAL" => IntSLessEqual,
            "INT_ZEXT" => IntZExt,
            "INT_SEXT" => IntSExt,
            "INT_ADD" => IntAdd,
            "INT_SUB" => IntSub,
            "INT_MULT" => IntMult,
            "INT_DIV" => IntDiv,
            "INT_SDIV" => IntSDiv,
            "INT_REM" => IntRem,
            "INT_SREM" => IntSRem,
            "INT_2COMP" => Int2Comp,
            "INT_AND" => IntAnd,
            "INT_OR" => IntOr,
            "INT_XOR" => IntXor,
            "INT_LEFT" => IntLeft,
            "INT_RIGHT" => IntRight,
            "INT_SRIGHT" => IntSRight,
            "BOOL_NEGATE" => BoolNegate,
            "BOOL_AND" => BoolAnd,
            "BOOL_OR" => BoolOr,
            "BOOL_XOR" => BoolXor,
            "PIECE" => Piece,
            "SUBPIECE" => SubPiece,
            "CAST" => Cast,
            "PTRADD" => PtrAdd,
            "PTRSUB" => PtrSub,
            _ => return None,
        };
        Some(op)
    }

    pub fn name(&self) -> &'static str {
        use Opcode::*;
        match self {
            Copy => "COPY",
            Load => "LOAD",
            Store => "STORE",
            Branch => "BRANCH",
            CBranch => "CBRANCH",
            BranchInd => "BRANCHIND",
            Call => "CALL",
            CallInd => "CALLIND",
            Return => "RETURN",
            IntEqual => "INT_EQUAL",
            IntNotEqual => "INT_NOTEQUAL",
            IntLess => "INT_LESS",
            IntLessEqual => "INT_LESSEQUAL",
            IntSLess => "INT_SLESS",
            IntSLessEqual => "INT_SLESSEQUAL",
            IntZExt => "INT_ZEXT",
            IntSExt => "INT_SEXT",
            IntAdd => "INT_ADD",
            IntSub => "INT_SUB",
            IntMult => "INT_MULT",
            IntDiv => "INT_DIV",
            IntSDiv => "INT_SDIV",
            IntRem => "INT_REM",
            IntSRem => "INT_SREM",
            Int2Comp => "INT_2COMP",
            IntAnd => "INT_AND",
            IntOr => "INT_OR",
            IntXor => "INT_XOR",
            IntLeft => "INT_LEFT",
            IntRight => "INT_RIGHT",
            IntSRight => "INT_SRIGHT",
            BoolNegate => "BOOL_NEGATE",
            BoolAnd => "BOOL_AND",
            BoolOr => "BOOL_OR",
            BoolXor => "BOOL_XOR",
            Piece => "PIECE",
            SubPiece => "SUBPIECE",
            Cast => "CAST",
            PtrAdd => "PTRADD",
            PtrSub => "PTRSUB",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
