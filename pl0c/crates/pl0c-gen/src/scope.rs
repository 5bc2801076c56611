//! Per-subprogram local scope: inline constants and stack-allocated variables.
//!
//! Every procedure body gets a fresh [`Locals`] - PL/0's nested procedures
//! in this flat-global variant do not see their enclosing procedure's
//! locals, only their own declarations chained to the module's globals
//! (spec.md §3, "flat global symbol space").

use std::collections::HashMap;

use inkwell::values::{IntValue, PointerValue};
use pl0c_util::Symbol;

/// The two innermost namespaces of spec.md §4.3's three-namespace scope
/// model. The third namespace (module globals) lives on [`crate::generator::Generator`]
/// itself, since it is shared by every subprogram.
#[derive(Default)]
pub struct Locals<'ctx> {
    /// Inline compile-time values for `const` declarations local to this
    /// subprogram - never a pointer, since nothing stores to a constant.
    pub consts: HashMap<Symbol, IntValue<'ctx>>,
    /// Stack slots for `var` declarations local to this subprogram.
    pub vars: HashMap<Symbol, PointerValue<'ctx>>,
}

impl<'ctx> Locals<'ctx> {
    pub fn empty() -> Self {
        Self::default()
    }
}
