//! Shorthand-normalising translator: turns arbitrary JSON into a validated
//! [`jas_ast::Evaluable`] tree, resolving `@name`/`!name` specifiers against a
//! [`jas_modules::ModuleManager`] and a caller-supplied list of reserved
//! context-function names.

mod keywords;
mod reconstruct;
mod strings;
mod syntax;
mod translate;

pub use reconstruct::reconstruct;
pub use syntax::render;
pub use translate::{ParseMode, Translator};
