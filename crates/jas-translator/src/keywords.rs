//! The fixed table of `@specifier` keywords the translator recognises
//! directly (operators, self-assign operators, logical/comparison ops, and
//! list algorithms), ahead of the generic function-invocation fallback.

use jas_ast::{
    ArithmeticOpKind, ArithmeticSelfAssignOpKind, ComparisonOpKind, ListAlgorithmKind,
    LogicalOpKind,
};

pub enum OperatorKeyword {
    Arithmetic(ArithmeticOpKind),
    SelfAssign(ArithmeticSelfAssignOpKind),
    Logical(LogicalOpKind),
    Comparison(ComparisonOpKind),
    ListAlgorithm(ListAlgorithmKind),
}

/// Exact-match lookup for a one-key operator object's key, e.g. `"@plus"`.
pub fn lookup(key: &str) -> Option<OperatorKeyword> {
    use ArithmeticOpKind::*;
    use ArithmeticSelfAssignOpKind::*;
    use ComparisonOpKind::*;
    use ListAlgorithmKind::*;
    use LogicalOpKind::*;
    use OperatorKeyword::*;

    Some(match key {
        "@plus" => Arithmetic(Add),
        "@minus" => Arithmetic(Sub),
        "@multiplies" => Arithmetic(Mul),
        "@divides" => Arithmetic(Div),
        "@modulus" => Arithmetic(Mod),
        "@bitand" => Arithmetic(BitAnd),
        "@bitor" => Arithmetic(BitOr),
        "@bitxor" => Arithmetic(BitXor),
        "@bitnot" => Arithmetic(BitNot),
        "@neg" => Arithmetic(Neg),

        "@plus_assign" => SelfAssign(AddAssign),
        "@minus_assign" => SelfAssign(SubAssign),
        "@multiplies_assign" => SelfAssign(MulAssign),
        "@divides_assign" => SelfAssign(DivAssign),
        "@modulus_assign" => SelfAssign(ModAssign),
        "@bitand_assign" => SelfAssign(AndAssign),
        "@bitor_assign" => SelfAssign(OrAssign),
        "@bitxor_assign" => SelfAssign(XorAssign),

        "@and" => Logical(And),
        "@or" => Logical(Or),
        "@not" => Logical(Not),

        "@eq" => Comparison(Eq),
        "@ne" => Comparison(Ne),
        "@lt" => Comparison(Lt),
        "@gt" => Comparison(Gt),
        "@le" => Comparison(Le),
        "@ge" => Comparison(Ge),

        "@any_of" => ListAlgorithm(AnyOf),
        "@all_of" => ListAlgorithm(AllOf),
        "@none_of" => ListAlgorithm(NoneOf),
        "@count_if" => ListAlgorithm(CountIf),
        "@filter_if" => ListAlgorithm(FilterIf),
        "@transform" => ListAlgorithm(Transform),

        _ => return None,
    })
}
