//! Template adapters.

mod builtin;

pub use builtin::BuiltinTemplates;
