//! Textual rendering of a module, compatible with the LLVM assembly
//! grammar (typed pointers).

use crate::module::{Function, Module};
use crate::syntax::{Inst, ValueId, ValueKind};
use crate::ty::Ty;
use std::collections::HashMap;
use std::fmt::{self, Write as _};

/// Quote an identifier when it falls outside the bare-name grammar
/// (`[a-zA-Z$._][a-zA-Z$._0-9]*`).
pub fn quote_name(name: &str) -> String {
    fn bare_head(c: char) -> bool {
        c.is_ascii_alphabetic() || matches!(c, '$' | '.' | '_')
    }
    fn bare_tail(c: char) -> bool {
        bare_head(c) || c.is_ascii_digit()
    }
    let mut chars = name.chars();
    let bare = match chars.next() {
        Some(first) => bare_head(first) && chars.all(bare_tail),
        None => false,
    };
    if bare {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

/// Print names for a function's values: `%name` for named values, `%N`
/// numbering for unnamed instruction results, literals for constants.
struct Namer {
    names: HashMap<ValueId, String>,
}

impl Namer {
    fn for_function(func: &Function) -> Self {
        let mut names = HashMap::new();
        for (id, data) in func.values.iter_enumerated() {
            if let Some(name) = &data.name {
                names.insert(id, quote_name(name));
            }
        }
        let mut counter = 0usize;
        for block in &func.blocks {
            for inst in &block.insts {
                if let Some(result) = inst.result() {
                    if !names.contains_key(&result) && !func.value_ty(result).is_void() {
                        names.insert(result, counter.to_string());
                        counter += 1;
                    }
                }
            }
        }
        Namer { names }
    }

    fn operand(&self, func: &Function, v: ValueId) -> String {
        match &func.values[v].kind {
            ValueKind::Const(c) => c.to_string(),
            ValueKind::GlobalRef(name) => format!("@{}", quote_name(name)),
            ValueKind::Param(_) | ValueKind::Inst => match self.names.get(&v) {
                Some(name) => format!("%{}", name),
                None => "%<unnamed>".to_string(),
            },
        }
    }

    /// `ty operand`, the usual argument/operand spelling.
    fn typed_operand(&self, func: &Function, v: ValueId) -> String {
        format!("{} {}", func.value_ty(v), self.operand(func, v))
    }
}

fn write_inst(
    out: &mut fmt::Formatter<'_>,
    func: &Function,
    namer: &Namer,
    inst: &Inst,
) -> fmt::Result {
    match inst {
        Inst::Alloca { result, allocated } => {
            writeln!(
                out,
                "  {} = alloca {}",
                namer.operand(func, *result),
                allocated
            )
        }
        Inst::Load { result, ptr } => {
            writeln!(
                out,
                "  {} = load {}, {}",
                namer.operand(func, *result),
                func.value_ty(*result),
                namer.typed_operand(func, *ptr)
            )
        }
        Inst::Store { value, ptr } => {
            writeln!(
                out,
                "  store {}, {}",
                namer.typed_operand(func, *value),
                namer.typed_operand(func, *ptr)
            )
        }
        Inst::GetElementPtr {
            result,
            base,
            indices,
            inbounds,
        } => {
            let pointee = func
                .value_ty(*base)
                .pointee()
                .cloned()
                .unwrap_or(Ty::Void);
            write!(
                out,
                "  {} = getelementptr{} {}, {}",
                namer.operand(func, *result),
                if *inbounds { " inbounds" } else { "" },
                pointee,
                namer.typed_operand(func, *base)
            )?;
            for idx in indices {
                write!(out, ", {}", namer.typed_operand(func, *idx))?;
            }
            writeln!(out)
        }
        Inst::BitCast { result, value, ty } => {
            writeln!(
                out,
                "  {} = bitcast {} to {}",
                namer.operand(func, *result),
                namer.typed_operand(func, *value),
                ty
            )
        }
        Inst::Trunc { result, value, ty } => {
            writeln!(
                out,
                "  {} = trunc {} to {}",
                namer.operand(func, *result),
                namer.typed_operand(func, *value),
                ty
            )
        }
        Inst::ZExt { result, value, ty } => {
            writeln!(
                out,
                "  {} = zext {} to {}",
                namer.operand(func, *result),
                namer.typed_operand(func, *value),
                ty
            )
        }
        Inst::SExt { result, value, ty } => {
            writeln!(
                out,
                "  {} = sext {} to {}",
                namer.operand(func, *result),
                namer.typed_operand(func, *value),
                ty
            )
        }
        Inst::Binary {
            op,
            result,
            lhs,
            rhs,
        } => {
            writeln!(
                out,
                "  {} = {} {}, {}",
                namer.operand(func, *result),
                op.keyword(),
                namer.typed_operand(func, *lhs),
                namer.operand(func, *rhs)
            )
        }
        Inst::ICmp {
            pred,
            result,
            lhs,
            rhs,
        } => {
            writeln!(
                out,
                "  {} = icmp {} {}, {}",
                namer.operand(func, *result),
                pred.keyword(),
                namer.typed_operand(func, *lhs),
                namer.operand(func, *rhs)
            )
        }
        Inst::Call {
            result,
            callee,
            args,
        } => {
            let ret_ty = func.value_ty(*result);
            let mut rendered = String::new();
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    rendered.push_str(", ");
                }
                let _ = write!(rendered, "{}", namer.typed_operand(func, *arg));
            }
            if ret_ty.is_void() {
                writeln!(out, "  call void @{}({})", quote_name(callee), rendered)
            } else {
                writeln!(
                    out,
                    "  {} = call {} @{}({})",
                    namer.operand(func, *result),
                    ret_ty,
                    quote_name(callee),
                    rendered
                )
            }
        }
        Inst::Br { dest } => {
            writeln!(out, "  br label %{}", quote_name(&func.blocks[*dest].label))
        }
        Inst::CondBr {
            cond,
            then_dest,
            else_dest,
        } => {
            writeln!(
                out,
                "  br {}, label %{}, label %{}",
                namer.typed_operand(func, *cond),
                quote_name(&func.blocks[*then_dest].label),
                quote_name(&func.blocks[*else_dest].label)
            )
        }
        Inst::Ret { value } => match value {
            Some(v) => writeln!(out, "  ret {}", namer.typed_operand(func, *v)),
            None => writeln!(out, "  ret void"),
        },
    }
}

fn write_function(out: &mut fmt::Formatter<'_>, func: &Function) -> fmt::Result {
    let params = func
        .params
        .iter()
        .map(|p| format!("{} %{}", p.ty, quote_name(&p.name)))
        .collect::<Vec<_>>()
        .join(", ");

    if func.is_declaration() {
        return writeln!(
            out,
            "declare {} @{}({})",
            func.ret_ty,
            quote_name(&func.name),
            params
        );
    }

    let namer = Namer::for_function(func);
    writeln!(
        out,
        "define {} @{}({}) {{",
        func.ret_ty,
        quote_name(&func.name),
        params
    )?;
    for (i, block) in func.blocks.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{}:", quote_name(&block.label))?;
        for inst in &block.insts {
            write_inst(out, func, &namer, inst)?;
        }
    }
    writeln!(out, "}}")
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        writeln!(f, "source_filename = \"{}\"", self.name)?;
        if !self.data_layout.is_empty() {
            writeln!(f, "target datalayout = \"{}\"", self.data_layout)?;
        }
        if !self.triple.is_empty() {
            writeln!(f, "target triple = \"{}\"", self.triple)?;
        }

        if !self.struct_types.is_empty() {
            writeln!(f)?;
            for (name, fields) in &self.struct_types {
                let body = fields
                    .iter()
                    .map(Ty::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                writeln!(f, "%{} = type {{ {} }}", quote_name(name), body)?;
            }
        }

        if !self.globals.is_empty() {
            writeln!(f)?;
            for global in &self.globals {
                writeln!(
                    f,
                    "@{} = global {} {}",
                    quote_name(&global.name),
                    global.ty,
                    global.init
                )?;
            }
        }

        // Definitions first, declarations after, each preserving module order.
        for func in self.functions.iter().filter(|f| !f.is_declaration()) {
            writeln!(f)?;
            write_function(f, func)?;
        }
        let mut first = true;
        for func in self.functions.iter().filter(|f| f.is_declaration()) {
            if first {
                writeln!(f)?;
                first = false;
            }
            write_function(f, func)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::module::Param;

    #[test]
    fn quoting() {
        assert_eq!(quote_name("entry"), "entry");
        assert_eq!(quote_name("verifier.error"), "verifier.error");
        assert_eq!(quote_name("_obj.flag"), "_obj.flag");
        assert_eq!(quote_name("0x00000010"), "\"0x00000010\"");
    }

    #[test]
    fn renders_a_small_function() {
        let mut m = Module::new("demo");
        m.data_layout = "e".into();
        m.triple = "x86_64-pc-linux-gnu".into();

        let mut f = Function::new(
            "main",
            Ty::Int(64),
            vec![Param {
                name: "arg1".into(),
                ty: Ty::Int(64),
            }],
        );
        let entry = f.append_block("entry");
        let body = f.append_block("0x00000010");
        let mut b = Builder::position_at_end(&mut f, entry);
        b.br(body);
        let p = f.param_by_name("arg1").unwrap();
        let mut b = Builder::position_at_end(&mut f, body);
        let c = b.const_int(64, 2);
        let sum = b.binary(crate::syntax::BinOp::Add, p, c);
        b.ret(Some(sum));
        m.add_function(f);

        let text = m.to_string();
        assert!(text.contains("define i64 @main(i64 %arg1) {"));
        assert!(text.contains("br label %\"0x00000010\""));
        assert!(text.contains("%0 = add i64 %arg1, 2"));
        assert!(text.contains("ret i64 %0"));
    }
}
