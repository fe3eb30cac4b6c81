//! Module identifier classification.
//!
//! Decides whether an id refers to a real third-party file. Pure and total,
//! no I/O.

use crate::model::{ModuleId, VIRTUAL_MODULE_SENTINEL};

/// Directory segment that marks vendored third-party code.
pub const VENDOR_DIRECTORY: &str = "node_modules";

/// True if `id` is a real file inside a vendor directory.
///
/// Rules, in order:
/// 1. the virtual sentinel anywhere means a bundler-synthesized module: false
/// 2. a `node_modules` path segment means a third-party file: true
/// 3. anything else is first-party source: false
#[must_use]
pub fn is_external(id: &str) -> bool {
    if id.contains(VIRTUAL_MODULE_SENTINEL) {
        return false;
    }

    id.split(['/', '\\'])
        .any(|segment| segment == VENDOR_DIRECTORY)
}

/// [`is_external`] for a typed module id.
#[must_use]
pub fn is_external_module(id: &ModuleId) -> bool {
    is_external(id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_modules_are_not_external() {
        assert!(!is_external("\0diskless:index.js"));
        assert!(!is_external("\0virtual:mod"));
        assert!(!is_external("/proj/node_modules/react/index.js?commonjs-proxy\0"));
    }

    #[test]
    fn test_first_party_sources_are_not_external() {
        assert!(!is_external("./src/custom/module"));
        assert!(!is_external("./src/local"));
        assert!(!is_external("/proj/src/node_modules_helper.ts"));
    }

    #[test]
    fn test_vendor_files_are_external() {
        assert!(is_external("/project/node_modules/vendor"));
        assert!(is_external("/proj/node_modules/vendor/x.js"));
        assert!(is_external(r"C:\proj\node_modules\lodash\lodash.js"));
        assert!(is_external(
            "/proj/node_modules/.pnpm/a@1.0.0/node_modules/a/index.js"
        ));
    }

    #[test]
    fn test_typed_wrapper() {
        assert!(is_external_module(&ModuleId::new(
            "/proj/node_modules/react/index.js"
        )));
        assert!(!is_external_module(&ModuleId::new("\0react")));
    }
}
