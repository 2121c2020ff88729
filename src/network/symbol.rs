use std::fmt;

/// Function computed by a gate
///
/// The built-in symbols cover sources and sinks, constants, the usual boolean
/// operators and the triggered elements (latches and flip-flops).
/// Uninterpreted cells are represented by [`GateSymbol::Custom`], whose names live
/// in a [`CustomSymbols`] table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GateSymbol {
    /// Primary input
    In,
    /// Primary output, driven by exactly one signal
    Out,
    /// Constant false
    Zero,
    /// Constant true
    One,
    /// Identity (buffer); without inputs, an unconnected placeholder
    Nop,
    /// Negation
    Not,
    /// N-ary And
    And,
    /// N-ary Or
    Or,
    /// N-ary Xor
    Xor,
    /// N-ary Nand
    Nand,
    /// N-ary Nor
    Nor,
    /// N-ary Xnor
    Xnor,
    /// Majority of an odd number of inputs
    Maj,
    /// Level-sensitive latch: data and enable
    Latch,
    /// Edge-triggered flip-flop: data and clock
    Dff,
    /// Flip-flop with reset and set: data, clock, reset and set
    DffRs,
    /// Uninterpreted cell
    Custom(u16),
}

impl GateSymbol {
    /// All built-in symbols
    pub const BUILTIN: [GateSymbol; 16] = [
        GateSymbol::In,
        GateSymbol::Out,
        GateSymbol::Zero,
        GateSymbol::One,
        GateSymbol::Nop,
        GateSymbol::Not,
        GateSymbol::And,
        GateSymbol::Or,
        GateSymbol::Xor,
        GateSymbol::Nand,
        GateSymbol::Nor,
        GateSymbol::Xnor,
        GateSymbol::Maj,
        GateSymbol::Latch,
        GateSymbol::Dff,
        GateSymbol::DffRs,
    ];

    /// Name of a built-in symbol; custom symbols are named by their table
    pub fn name(self) -> &'static str {
        use GateSymbol::*;
        match self {
            In => "IN",
            Out => "OUT",
            Zero => "ZERO",
            One => "ONE",
            Nop => "NOP",
            Not => "NOT",
            And => "AND",
            Or => "OR",
            Xor => "XOR",
            Nand => "NAND",
            Nor => "NOR",
            Xnor => "XNOR",
            Maj => "MAJ",
            Latch => "LATCH",
            Dff => "DFF",
            DffRs => "DFFrs",
            Custom(_) => "CUSTOM",
        }
    }

    /// Returns whether the symbol is a constant
    pub fn is_constant(self) -> bool {
        matches!(self, GateSymbol::Zero | GateSymbol::One)
    }

    /// Returns whether the symbol computes the identity of its single input
    pub fn is_identity(self) -> bool {
        matches!(self, GateSymbol::Out | GateSymbol::Nop)
    }

    /// Returns whether the inputs may be permuted
    pub fn is_commutative(self) -> bool {
        use GateSymbol::*;
        matches!(self, And | Or | Xor | Nand | Nor | Xnor | Maj)
    }

    /// Returns whether nested applications may be flattened
    pub fn is_associative(self) -> bool {
        use GateSymbol::*;
        matches!(self, And | Or | Xor)
    }

    /// Returns whether the symbol is `modifier(function(...))`
    ///
    /// This holds for the positive operators too: And is Not(Nand).
    pub fn is_decomposable(self) -> bool {
        self.function().is_some()
    }

    /// Symbol applied on top of [`GateSymbol::function`] for decomposable symbols
    pub fn modifier(self) -> Option<GateSymbol> {
        if self.is_decomposable() {
            Some(GateSymbol::Not)
        } else {
            None
        }
    }

    /// Base symbol of a decomposable symbol
    pub fn function(self) -> Option<GateSymbol> {
        use GateSymbol::*;
        match self {
            And => Some(Nand),
            Or => Some(Nor),
            Xor => Some(Xnor),
            Nand => Some(And),
            Nor => Some(Or),
            Xnor => Some(Xor),
            _ => None,
        }
    }

    /// Returns whether the symbol is a latch or a flip-flop
    pub fn is_triggered(self) -> bool {
        matches!(self, GateSymbol::Latch | GateSymbol::Dff | GateSymbol::DffRs)
    }

    /// Returns whether the symbol accepts this number of inputs
    pub fn accepts_arity(self, arity: usize) -> bool {
        use GateSymbol::*;
        match self {
            In | Zero | One => arity == 0,
            Out | Not => arity == 1,
            Nop => arity <= 1,
            And | Or | Xor | Nand | Nor | Xnor => arity >= 1,
            Maj => arity % 2 == 1,
            Latch | Dff => arity == 2,
            DffRs => arity == 4,
            Custom(_) => true,
        }
    }
}

impl fmt::Display for GateSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateSymbol::Custom(i) => write!(f, "CUSTOM{}", i),
            s => write!(f, "{}", s.name()),
        }
    }
}

/// Table of custom (uninterpreted) gate symbols
///
/// Custom symbols are allocated explicitly so that several independent tables
/// may coexist, for example one per file read.
#[derive(Clone, Debug, Default)]
pub struct CustomSymbols {
    names: Vec<String>,
}

impl CustomSymbols {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the symbol with this name, allocating it if needed
    pub fn create(&mut self, name: &str) -> GateSymbol {
        if let Some(i) = self.names.iter().position(|n| n == name) {
            return GateSymbol::Custom(i as u16);
        }
        assert!(
            self.names.len() < u16::MAX as usize,
            "Too many custom gate symbols"
        );
        self.names.push(name.to_owned());
        GateSymbol::Custom((self.names.len() - 1) as u16)
    }

    /// Name of a symbol, either built-in or allocated in this table
    pub fn name(&self, symbol: GateSymbol) -> &str {
        match symbol {
            GateSymbol::Custom(i) => self.names[i as usize].as_str(),
            s => s.name(),
        }
    }

    /// Number of custom symbols
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns whether no custom symbol was allocated
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
