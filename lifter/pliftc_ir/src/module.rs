//! Functions, globals, identified types, and the module that owns them.

use crate::syntax::{BlockData, BlockId, ValueData, ValueId, ValueKind};
use crate::ty::Ty;
use pliftc_utils::index_vec::IdxVec;
use tracing::debug;

/// A formal parameter: a name (from the producing varnode) and a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: Ty,
}

/// A function: declaration when `blocks` is empty, definition otherwise.
///
/// Each function owns its value arena; parameter values are created up
/// front so they can be looked up by name while the body is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub ret_ty: Ty,
    pub params: Vec<Param>,
    pub values: IdxVec<ValueId, ValueData>,
    pub blocks: IdxVec<BlockId, BlockData>,
    param_values: Vec<ValueId>,
}

impl Function {
    pub fn new(name: impl Into<String>, ret_ty: Ty, params: Vec<Param>) -> Self {
        let mut values = IdxVec::new();
        let param_values = params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                values.push(ValueData {
                    ty: p.ty.clone(),
                    kind: ValueKind::Param(i),
                    name: Some(p.name.clone()),
                })
            })
            .collect();
        Function {
            name: name.into(),
            ret_ty,
            params,
            values,
            blocks: IdxVec::new(),
            param_values,
        }
    }

    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn append_block(&mut self, label: impl Into<String>) -> BlockId {
        self.blocks.push(BlockData::new(label))
    }

    pub fn block(&self, id: BlockId) -> &BlockData {
        &self.blocks[id]
    }

    pub fn value_ty(&self, v: ValueId) -> &Ty {
        &self.values[v].ty
    }

    /// Rewrite a value's type in place. No conversion instruction is
    /// emitted: every existing use of the value observes the new type.
    /// Call sites that need a value-preserving widening must extend
    /// explicitly instead of coming through here.
    pub fn retype_value(&mut self, v: ValueId, ty: Ty) {
        debug!(from = %self.values[v].ty, to = %ty, "retyping value in place");
        self.values[v].ty = ty;
    }

    pub fn new_value(&mut self, ty: Ty, kind: ValueKind, name: Option<String>) -> ValueId {
        self.values.push(ValueData { ty, kind, name })
    }

    /// An integer constant value of the given bit width.
    pub fn const_int(&mut self, bits: u32, value: i128) -> ValueId {
        self.new_value(Ty::Int(bits), ValueKind::Const(value), None)
    }

    /// The parameter value with the given name, if any.
    pub fn param_by_name(&self, name: &str) -> Option<ValueId> {
        self.params
            .iter()
            .position(|p| p.name == name)
            .map(|i| self.param_values[i])
    }

    pub fn param_value(&self, index: usize) -> Option<ValueId> {
        self.param_values.get(index).copied()
    }

    /// A value holding the address of a module global.
    pub fn global_ref(&mut self, name: &str, pointee: Ty) -> ValueId {
        self.new_value(
            pointee.ptr_to(),
            ValueKind::GlobalRef(name.to_string()),
            None,
        )
    }
}

/// Module-scoped integer storage, zero-initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalVariable {
    pub name: String,
    pub ty: Ty,
    pub init: i128,
}

/// The output IR module.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub name: String,
    pub data_layout: String,
    pub triple: String,
    /// Identified aggregate types, in declaration order.
    pub struct_types: Vec<(String, Vec<Ty>)>,
    pub globals: Vec<GlobalVariable>,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            ..Module::default()
        }
    }

    /// Declare or redefine an identified aggregate type.
    pub fn set_struct_body(&mut self, name: &str, fields: Vec<Ty>) {
        if let Some(pos) = self.struct_types.iter().position(|(n, _)| n == name) {
            self.struct_types[pos].1 = fields;
        } else {
            self.struct_types.push((name.to_string(), fields));
        }
    }

    pub fn struct_body(&self, name: &str) -> Option<&[Ty]> {
        self.struct_types
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f.as_slice())
    }

    pub fn add_global(&mut self, name: &str, ty: Ty) {
        debug!(name, %ty, "adding zero-initialized global");
        self.globals.push(GlobalVariable {
            name: name.to_string(),
            ty,
            init: 0,
        });
    }

    pub fn get_global(&self, name: &str) -> Option<&GlobalVariable> {
        self.globals.iter().find(|g| g.name == name)
    }

    pub fn add_function(&mut self, function: Function) {
        debug!(name = %function.name, "adding function");
        self.functions.push(function);
    }

    /// Get-or-create an external declaration under the given name. An
    /// existing function (declared or defined) is left untouched.
    pub fn declare_function_if_absent(&mut self, name: &str, ret_ty: Ty, params: Vec<Param>) {
        if self.get_function(name).is_none() {
            self.add_function(Function::new(name, ret_ty, params));
        }
    }

    /// Install a definition, replacing the declaration of the same name if
    /// one exists.
    pub fn define_function(&mut self, function: Function) {
        if let Some(pos) = self.functions.iter().position(|f| f.name == function.name) {
            self.functions[pos] = function;
        } else {
            self.functions.push(function);
        }
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}
