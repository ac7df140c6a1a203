//! Operand descriptors.
//!
//! A varnode names one input or output of a P-code operation. The producer
//! is loosely typed: the class of a varnode is encoded in its symbol text
//! (`arg*`, `register0x*`, `unique*`, `var*`, `bVar*`, object symbols, or a
//! numeric literal), and declared widths drift between producers, so the
//! width helpers here reproduce the producer's conventions exactly rather
//! than normalizing them.

/// A byte sub-slice of a local, carried by varnodes that name part of a
/// wider stack variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarnodeSlice {
    /// Byte offset into the local.
    pub offset: u32,
    /// Byte width of the slice.
    pub size: u32,
}

/// One operand or result of a P-code operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Varnode {
    /// Symbolic name; the class is recognized from this text.
    pub symbol: String,
    /// Declared byte size.
    pub size: u32,
    /// Present when the varnode names a sub-slice of a local.
    pub slice: Option<VarnodeSlice>,
}

impl Varnode {
    pub fn new(symbol: impl Into<String>, size: u32) -> Self {
        Varnode {
            symbol: symbol.into(),
            size,
            slice: None,
        }
    }

    pub fn with_slice(symbol: impl Into<String>, size: u32, offset: u32, slice_size: u32) -> Self {
        Varnode {
            symbol: symbol.into(),
            size,
            slice: Some(VarnodeSlice {
                offset,
                size: slice_size,
            }),
        }
    }

    /// The symbol with any `.field` suffix stripped; local varnodes are
    /// addressed by their base name.
    pub fn base_symbol(&self) -> &str {
        if self.symbol.contains("var") {
            self.symbol.split('.').next().unwrap_or(&self.symbol)
        } else {
            &self.symbol
        }
    }

    /// Object symbols (`obj*` / `_obj*`) name module globals.
    pub fn is_object(&self) -> bool {
        self.symbol.starts_with("obj") || self.symbol.starts_with("_obj")
    }

    /// Machine-register varnodes, as spelled by the producer.
    pub fn is_register(&self) -> bool {
        self.symbol.contains("register0x")
    }

    /// Width used when this varnode is *read*. Boolean locals are one bit,
    /// and the producer leaves byte-sized operands at width 1 rather than 8.
    pub fn read_bits(&self) -> u32 {
        if self.symbol.contains("bVar") || self.size == 1 {
            1
        } else {
            8 * self.size
        }
    }

    /// Width used when this varnode is *written*: always 8 x declared size.
    pub fn store_bits(&self) -> u32 {
        8 * self.size
    }

    /// Width this observation contributes to a register slot: byte-sized
    /// sightings count as one bit, like reads.
    pub fn register_bits(&self) -> u32 {
        if self.size == 1 {
            1
        } else {
            8 * self.size
        }
    }
}

/// Parse a numeric constant symbol: optional trailing `U` marker, `0x` for
/// hexadecimal, decimal otherwise. `None` on anything unparseable — the
/// caller decides what a failed parse means.
pub fn parse_constant(symbol: &str) -> Option<i128> {
    let text = match symbol.find('U') {
        Some(pos) => &symbol[..pos],
        None => symbol,
    };
    if let Some(pos) = text.find("0x") {
        i128::from_str_radix(&text[pos + 2..], 16).ok()
    } else {
        text.parse::<i128>().ok()
    }
}
