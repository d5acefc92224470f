//! `render`: a one-pass, linear pseudo-syntax rendering of an [`Evaluable`],
//! used both to label evaluator backtrace frames and to describe a node in
//! a translation error message.

use jas_ast::{
    ArithmeticOpKind, ArithmeticSelfAssignOpKind, ComparisonOpKind, ContextArgKind, Evaluable,
    EvaluableKind, FunctionInvocation, ListAlgorithmKind, LogicalOpKind,
};

fn arithmetic_symbol(kind: ArithmeticOpKind) -> &'static str {
    match kind {
        ArithmeticOpKind::Add => "+",
        ArithmeticOpKind::Sub => "-",
        ArithmeticOpKind::Mul => "*",
        ArithmeticOpKind::Div => "/",
        ArithmeticOpKind::Mod => "%",
        ArithmeticOpKind::BitAnd => "&",
        ArithmeticOpKind::BitOr => "|",
        ArithmeticOpKind::BitXor => "^",
        ArithmeticOpKind::BitNot => "~",
        ArithmeticOpKind::Neg => "-",
    }
}

fn self_assign_symbol(kind: ArithmeticSelfAssignOpKind) -> &'static str {
    match kind {
        ArithmeticSelfAssignOpKind::AddAssign => "+=",
        ArithmeticSelfAssignOpKind::SubAssign => "-=",
        ArithmeticSelfAssignOpKind::MulAssign => "*=",
        ArithmeticSelfAssignOpKind::DivAssign => "/=",
        ArithmeticSelfAssignOpKind::ModAssign => "%=",
        ArithmeticSelfAssignOpKind::AndAssign => "&=",
        ArithmeticSelfAssignOpKind::OrAssign => "|=",
        ArithmeticSelfAssignOpKind::XorAssign => "^=",
    }
}

fn logical_symbol(kind: LogicalOpKind) -> &'static str {
    match kind {
        LogicalOpKind::And => "&&",
        LogicalOpKind::Or => "||",
        LogicalOpKind::Not => "!",
    }
}

fn comparison_symbol(kind: ComparisonOpKind) -> &'static str {
    match kind {
        ComparisonOpKind::Eq => "==",
        ComparisonOpKind::Ne => "!=",
        ComparisonOpKind::Lt => "<",
        ComparisonOpKind::Gt => ">",
        ComparisonOpKind::Le => "<=",
        ComparisonOpKind::Ge => ">=",
    }
}

fn list_algorithm_name(kind: ListAlgorithmKind) -> &'static str {
    match kind {
        ListAlgorithmKind::AnyOf => "any_of",
        ListAlgorithmKind::AllOf => "all_of",
        ListAlgorithmKind::NoneOf => "none_of",
        ListAlgorithmKind::CountIf => "count_if",
        ListAlgorithmKind::FilterIf => "filter_if",
        ListAlgorithmKind::Transform => "transform",
    }
}

/// Renders `node` as a compact, single-line pseudo-syntax string. Not
/// meant to round-trip back through the translator -- purely diagnostic.
pub fn render(node: &Evaluable) -> String {
    let body = match &node.kind {
        EvaluableKind::Constant(v) => v.dump(),
        EvaluableKind::Dict(entries) => {
            let items: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{k:?}: {}", render(v)))
                .collect();
            format!("{{{}}}", items.join(", "))
        }
        EvaluableKind::List(items) => {
            let items: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", items.join(", "))
        }
        EvaluableKind::ArithmeticOp { kind, params } => {
            let items: Vec<String> = params.iter().map(render).collect();
            if kind.is_unary() {
                format!("{}{}", arithmetic_symbol(*kind), items.join(", "))
            } else {
                format!("({})", items.join(&format!(" {} ", arithmetic_symbol(*kind))))
            }
        }
        EvaluableKind::ArithmeticSelfAssignOp { kind, target, value } => {
            format!("({} {} {})", render(target), self_assign_symbol(*kind), render(value))
        }
        EvaluableKind::LogicalOp { kind, params } => {
            if *kind == LogicalOpKind::Not {
                format!("!{}", render(&params[0]))
            } else {
                let items: Vec<String> = params.iter().map(render).collect();
                format!("({})", items.join(&format!(" {} ", logical_symbol(*kind))))
            }
        }
        EvaluableKind::ComparisonOp { kind, lhs, rhs } => {
            format!("({} {} {})", render(lhs), comparison_symbol(*kind), render(rhs))
        }
        EvaluableKind::ListAlgorithm { kind, list, cond } => {
            format!("@{}({}, {})", list_algorithm_name(*kind), render(list), render(cond))
        }
        EvaluableKind::FunctionInvocation(fi) => render_function_invocation(fi),
        EvaluableKind::ObjectPropertyQuery { object, path } => {
            let items: Vec<String> = path.iter().map(render).collect();
            format!("{}[{}]", render(object), items.join("/"))
        }
        EvaluableKind::Variable(name) => format!("${name}"),
        EvaluableKind::ContextArgument(n) => format!("${n}"),
        EvaluableKind::ContextArgumentsInfo(ContextArgKind::ArgCount) => "$#".to_string(),
        EvaluableKind::ContextArgumentsInfo(ContextArgKind::Args) => "$*".to_string(),
    };
    match &node.id {
        Some(id) => format!("{id} = {body}"),
        None => body,
    }
}

fn render_function_invocation(fi: &FunctionInvocation) -> String {
    let param = match fi {
        FunctionInvocation::Module { param, .. }
        | FunctionInvocation::Context { param, .. }
        | FunctionInvocation::Evaluator { param, .. }
        | FunctionInvocation::Macro { param, .. } => param,
    };
    let param_str = param.as_deref().map(render).unwrap_or_default();
    match fi {
        FunctionInvocation::Module { module, name, .. } if !module.is_empty() => {
            format!("@{module}.{name}({param_str})")
        }
        FunctionInvocation::Module { name, .. } => format!("@{name}({param_str})"),
        FunctionInvocation::Context { name, .. } => format!("@{name}({param_str})"),
        FunctionInvocation::Evaluator { name, .. } => format!("@{name}({param_str})"),
        FunctionInvocation::Macro { name, .. } => format!("!{name}({param_str})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jas_var::Var;

    #[test]
    fn renders_constant_and_operator() {
        let node = Evaluable::new(EvaluableKind::ArithmeticOp {
            kind: ArithmeticOpKind::Add,
            params: vec![Evaluable::constant(Var::Int(1)), Evaluable::constant(Var::Int(2))],
        });
        assert_eq!(render(&node), "(1 + 2)");
    }

    #[test]
    fn renders_bound_id_prefix() {
        let node = Evaluable::constant(Var::Int(3)).with_id("x");
        assert_eq!(render(&node), "x = 3");
    }

    #[test]
    fn renders_variable_and_context_argument() {
        assert_eq!(render(&Evaluable::new(EvaluableKind::Variable("x".into()))), "$x");
        assert_eq!(render(&Evaluable::new(EvaluableKind::ContextArgument(2))), "$2");
    }
}
