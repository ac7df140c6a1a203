use std::fmt;

/// An IR type.
///
/// The lifter only ever produces integers of arbitrary width, pointers to
/// them, named aggregates for the locals layouts, and `void` for returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    Void,
    /// An integer of the given bit width.
    Int(u32),
    /// A pointer to a pointee type.
    Ptr(Box<Ty>),
    /// An identified (module-named) aggregate, referenced by name; the
    /// field list lives in the module's type table.
    Struct(String),
}

impl Ty {
    pub fn ptr_to(self) -> Ty {
        Ty::Ptr(Box::new(self))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Ty::Void)
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Ty::Int(_))
    }

    pub fn int_width(&self) -> Option<u32> {
        match self {
            Ty::Int(w) => Some(*w),
            _ => None,
        }
    }

    pub fn pointee(&self) -> Option<&Ty> {
        match self {
            Ty::Ptr(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Void => f.write_str("void"),
            Ty::Int(w) => write!(f, "i{}", w),
            Ty::Ptr(p) => write!(f, "{}*", p),
            Ty::Struct(name) => write!(f, "%{}", crate::print::quote_name(name)),
        }
    }
}
