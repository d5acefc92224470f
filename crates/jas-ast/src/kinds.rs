//! Operator-kind enums. The original C++ source names these tersely (`aot`,
//! `asot`, `lot`, `cot`, `lsot`); spelled out here for clarity.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Neg,
}

impl ArithmeticOpKind {
    /// `true` for the strictly-unary kinds (`~`, unary `-`).
    pub fn is_unary(self) -> bool {
        matches!(self, ArithmeticOpKind::BitNot | ArithmeticOpKind::Neg)
    }

    /// `true` for `%`, which is exactly binary (unlike the variadic
    /// left-fold kinds).
    pub fn is_binary_only(self) -> bool {
        matches!(self, ArithmeticOpKind::Mod)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticSelfAssignOpKind {
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOpKind {
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOpKind {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListAlgorithmKind {
    AnyOf,
    AllOf,
    NoneOf,
    CountIf,
    FilterIf,
    Transform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextArgKind {
    /// `$#`
    ArgCount,
    /// `$*`
    Args,
}
