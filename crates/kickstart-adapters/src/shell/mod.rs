//! Shell adapters.

mod process;
mod scripted;

pub use process::ProcessShell;
pub use scripted::ScriptedShell;
