//! Lifting options.

/// How a function's locals are laid out on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackLayout {
    /// One anonymous aggregate whose fields are the locals in artifact
    /// order; each local is addressed by field index.
    SingleStruct,
    /// One aggregate of single bytes; each local maps to a byte offset and
    /// is accessed through a pointer cast to its declared width.
    ByteAddressable,
    /// Each local is an independent stack allocation.
    NoOption,
}

impl StackLayout {
    pub fn from_name(name: &str) -> Option<StackLayout> {
        match name {
            "single_struct" => Some(StackLayout::SingleStruct),
            "byte_addressable" => Some(StackLayout::ByteAddressable),
            "no_option" => Some(StackLayout::NoOption),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StackLayout::SingleStruct => "single_struct",
            StackLayout::ByteAddressable => "byte_addressable",
            StackLayout::NoOption => "no_option",
        }
    }
}

impl Default for StackLayout {
    fn default() -> Self {
        StackLayout::NoOption
    }
}

/// Options for one lifting pass.
#[derive(Debug, Clone, Copy)]
pub struct LiftOptions {
    /// Locals layout policy.
    pub stack: StackLayout,
    /// When false, `INT_LESSEQUAL` computes its comparison but discards the
    /// result instead of storing it (compatibility behavior).
    pub keep_unsigned_le_results: bool,
}

impl Default for LiftOptions {
    fn default() -> Self {
        LiftOptions {
            stack: StackLayout::default(),
            keep_unsigned_le_results: true,
        }
    }
}

impl LiftOptions {
    pub fn with_stack(stack: StackLayout) -> Self {
        LiftOptions {
            stack,
            ..LiftOptions::default()
        }
    }
}
