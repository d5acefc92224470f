//! Dot-separated version comparison (`cmp_ver` and friends) and a small
//! range-pattern matcher (`match_ver`).

use std::cmp::Ordering;

/// Compares dot-separated version tokens numerically where both sides parse
/// as integers and lexicographically otherwise; a shorter-but-equal-prefix
/// version sorts before a longer one (`"1.2"` < `"1.2.0"`).
pub fn cmp_ver(a: &str, b: &str) -> Ordering {
    let a_parts: Vec<&str> = a.split('.').collect();
    let b_parts: Vec<&str> = b.split('.').collect();
    for (x, y) in a_parts.iter().zip(b_parts.iter()) {
        let ord = match (x.parse::<i64>(), y.parse::<i64>()) {
            (Ok(xi), Ok(yi)) => xi.cmp(&yi),
            _ => x.cmp(y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a_parts.len().cmp(&b_parts.len())
}

/// A single comparison clause: an operator (`=`, `>`, `>=`, `<`, `<=`, `~`,
/// `^`) and a version, e.g. `">=1.2.3"`. `~`/`^` both mean "at least this
/// version, same major component" -- this engine doesn't distinguish minor-
/// vs-patch compatibility ranges the way some package managers do.
fn matches_clause(clause: &str, v: &str) -> bool {
    let clause = clause.trim();
    let (op, rest) = if let Some(r) = clause.strip_prefix(">=") {
        (">=", r)
    } else if let Some(r) = clause.strip_prefix("<=") {
        ("<=", r)
    } else if let Some(r) = clause.strip_prefix('>') {
        (">", r)
    } else if let Some(r) = clause.strip_prefix('<') {
        ("<", r)
    } else if let Some(r) = clause.strip_prefix('=') {
        ("=", r)
    } else if let Some(r) = clause.strip_prefix('~') {
        ("~", r)
    } else if let Some(r) = clause.strip_prefix('^') {
        ("^", r)
    } else {
        ("=", clause)
    };
    let rest = rest.trim();
    let ord = cmp_ver(v, rest);
    match op {
        ">=" => ord != Ordering::Less,
        "<=" => ord != Ordering::Greater,
        ">" => ord == Ordering::Greater,
        "<" => ord == Ordering::Less,
        "=" => ord == Ordering::Equal,
        "~" | "^" => {
            let v_major = v.split('.').next().unwrap_or("");
            let r_major = rest.split('.').next().unwrap_or("");
            v_major == r_major && ord != Ordering::Less
        }
        _ => unreachable!(),
    }
}

/// `match_ver(pattern, v)`: `pattern` is a comma-separated conjunction of
/// clauses, all of which must hold (e.g. `">=1.0.0,<2.0.0"`).
pub fn match_ver(pattern: &str, v: &str) -> bool {
    pattern.split(',').all(|clause| matches_clause(clause, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_tokens_compare_numerically() {
        assert_eq!(cmp_ver("1.9", "1.10"), Ordering::Less);
        assert_eq!(cmp_ver("1.2", "1.2.0"), Ordering::Less);
        assert_eq!(cmp_ver("2.0.0", "1.9.9"), Ordering::Greater);
    }

    #[test]
    fn match_ver_evaluates_range_conjunctions() {
        assert!(match_ver(">=1.0.0,<2.0.0", "1.5.0"));
        assert!(!match_ver(">=1.0.0,<2.0.0", "2.0.0"));
        assert!(match_ver("^1.2.0", "1.9.0"));
        assert!(!match_ver("^1.2.0", "2.0.0"));
    }
}
