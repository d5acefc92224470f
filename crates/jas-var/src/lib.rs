//! Dynamic value type (`Var`), its numeric helper (`Number`), and the
//! slash-delimited `Path` used for dict lookups and variable-field queries.

mod number;
mod path;
mod var;
mod var_ops;

pub use number::Number;
pub use path::Path;
pub use var::{Category, Dict, Var};
