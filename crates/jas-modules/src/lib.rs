//! Built-in [`FunctionModule`]s (`cif`, `list`, `dict`, `alg`) and the
//! [`ModuleManager`] registry the translator and evaluator both consult to
//! resolve and dispatch `@name` calls.

mod alg;
mod cif;
mod dict;
mod list;
mod manager;
mod version;

pub use alg::AlgModule;
pub use cif::CifModule;
pub use dict::DictModule;
pub use list::ListModule;
pub use manager::{param_items, FunctionModule, ModuleManager};
pub use version::cmp_ver;

use std::rc::Rc;

/// A [`ModuleManager`] with the four built-in modules pre-registered --
/// what [`jas::JASFacade`](https://docs.rs/jas) wires up by default.
pub fn default_module_manager() -> ModuleManager {
    let mut m = ModuleManager::new();
    m.register(Rc::new(CifModule));
    m.register(Rc::new(ListModule));
    m.register(Rc::new(DictModule));
    m.register(Rc::new(AlgModule));
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_manager_resolves_one_function_from_each_module() {
        let m = default_module_manager();
        assert!(m.find_qualified("", "len").is_some());
        assert!(m.find_qualified("list", "append").is_some());
        assert!(m.find_qualified("dict", "get").is_some());
        assert!(m.find_qualified("alg", "sort").is_some());
        assert!(m.find_bare("len").unwrap().is_some());
    }
}
