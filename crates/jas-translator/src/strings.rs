//! Recognising the two special string forms the translator accepts in
//! value position: variable references (`"$name"`, `"$N"`, `"$#"`, `"$*"`,
//! `"$.name"`, and the bracketed field-query form) and typed literals
//! (`"100(%d)"`, `"1.5(%f)"`, `"x(%s)"`, `"true(%b)"`).

use jas_error::{JasError, JasResult};

pub enum ParsedVariable {
    /// `$name` or `$.name` (the latter with `root = true`), optionally with
    /// a bracketed field-query path (raw, slash-delimited, untranslated).
    Named {
        name: String,
        root: bool,
        path: Option<String>,
    },
    /// `$N`, `N >= 1`.
    Positional(usize),
    /// `$#`.
    ArgCount,
    /// `$*`.
    Args,
}

pub(crate) fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splits off a trailing `[...]` bracket, if the string both contains `[`
/// and ends with `]`.
fn split_bracket(s: &str) -> (&str, Option<&str>) {
    if let Some(idx) = s.find('[') {
        if s.ends_with(']') {
            return (&s[..idx], Some(&s[idx + 1..s.len() - 1]));
        }
    }
    (s, None)
}

/// Parses a `$`-prefixed string per §3's reserved-prefix table. Returns
/// `Ok(None)` if `s` doesn't start with `$` at all (not a variable form).
pub fn parse_variable(s: &str) -> JasResult<Option<ParsedVariable>> {
    let Some(rest) = s.strip_prefix('$') else {
        return Ok(None);
    };
    if rest == "#" {
        return Ok(Some(ParsedVariable::ArgCount));
    }
    if rest == "*" {
        return Ok(Some(ParsedVariable::Args));
    }

    let (head, bracket) = split_bracket(rest);

    if let Some(name) = head.strip_prefix('.') {
        if !is_ident(name) {
            return Err(JasError::syntax(format!("invalid root variable name '${rest}'")));
        }
        return Ok(Some(ParsedVariable::Named {
            name: name.to_string(),
            root: true,
            path: bracket.map(str::to_string),
        }));
    }

    if !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()) {
        let n: usize = head
            .parse()
            .map_err(|_| JasError::syntax(format!("invalid argument index '${head}'")))?;
        if n == 0 {
            return Err(JasError::syntax("argument index '$0' is forbidden"));
        }
        if bracket.is_some() {
            return Err(JasError::syntax("positional arguments cannot carry a field query"));
        }
        return Ok(Some(ParsedVariable::Positional(n)));
    }

    if !is_ident(head) {
        return Err(JasError::syntax(format!("invalid variable name '${rest}'")));
    }
    Ok(Some(ParsedVariable::Named {
        name: head.to_string(),
        root: false,
        path: bracket.map(str::to_string),
    }))
}

pub enum TypedLiteral {
    Int(i64),
    Double(f64),
    Str(String),
    Bool(bool),
}

/// Parses `"<prefix>(%x)"` typed-literal strings; `Ok(None)` if `s` doesn't
/// end with a recognised `(%x)` suffix.
pub fn parse_typed_literal(s: &str) -> JasResult<Option<TypedLiteral>> {
    if s.len() < 4 {
        return Ok(None);
    }
    let suffix = &s[s.len() - 4..];
    let kind = match suffix {
        "(%d)" | "(%l)" => 'i',
        "(%f)" => 'f',
        "(%s)" => 's',
        "(%b)" => 'b',
        _ => return Ok(None),
    };
    let prefix = &s[..s.len() - 4];
    Ok(Some(match kind {
        'i' => TypedLiteral::Int(prefix.parse().map_err(|_| {
            JasError::syntax(format!("'{prefix}' is not a valid integer literal"))
        })?),
        'f' => TypedLiteral::Double(prefix.parse().map_err(|_| {
            JasError::syntax(format!("'{prefix}' is not a valid float literal"))
        })?),
        's' => TypedLiteral::Str(prefix.to_string()),
        'b' => match prefix {
            "true" => TypedLiteral::Bool(true),
            "false" => TypedLiteral::Bool(false),
            _ => {
                return Err(JasError::syntax(format!(
                    "'{prefix}' is not a valid bool literal"
                )))
            }
        },
        _ => unreachable!(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ordinary_and_root_and_positional() {
        assert!(matches!(
            parse_variable("$x").unwrap().unwrap(),
            ParsedVariable::Named { root: false, .. }
        ));
        assert!(matches!(
            parse_variable("$.x").unwrap().unwrap(),
            ParsedVariable::Named { root: true, .. }
        ));
        assert!(matches!(
            parse_variable("$3").unwrap().unwrap(),
            ParsedVariable::Positional(3)
        ));
        assert!(parse_variable("$0").unwrap_err().to_string().contains("forbidden"));
    }

    #[test]
    fn parses_arg_count_and_args() {
        assert!(matches!(parse_variable("$#").unwrap().unwrap(), ParsedVariable::ArgCount));
        assert!(matches!(parse_variable("$*").unwrap().unwrap(), ParsedVariable::Args));
    }

    #[test]
    fn parses_bracketed_field_query() {
        match parse_variable("$x[a/b]").unwrap().unwrap() {
            ParsedVariable::Named { name, path, .. } => {
                assert_eq!(name, "x");
                assert_eq!(path.unwrap(), "a/b");
            }
            _ => panic!("expected Named"),
        }
    }

    #[test]
    fn non_dollar_string_is_not_a_variable() {
        assert!(parse_variable("hello").unwrap().is_none());
    }

    #[test]
    fn typed_literals_round_trip() {
        assert!(matches!(
            parse_typed_literal("100(%d)").unwrap().unwrap(),
            TypedLiteral::Int(100)
        ));
        assert!(matches!(
            parse_typed_literal("1.5(%f)").unwrap().unwrap(),
            TypedLiteral::Double(v) if v == 1.5
        ));
        assert!(matches!(
            parse_typed_literal("true(%b)").unwrap().unwrap(),
            TypedLiteral::Bool(true)
        ));
        assert!(parse_typed_literal("nope(%b)").is_err());
        assert!(parse_typed_literal("plain").unwrap().is_none());
    }
}
