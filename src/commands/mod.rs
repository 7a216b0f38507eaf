pub mod current;
pub mod exec;
pub mod install;
pub mod list;
pub mod pin;
pub mod releases;
pub mod uninstall;
pub mod use_version;
pub mod which;

pub use current::*;
pub use exec::*;
pub use install::*;
pub use list::*;
pub use pin::*;
pub use releases::*;
pub use uninstall::*;
pub use use_version::*;
pub use which::*;

use crate::core::{Result, Tool};

/// Parse the `--tool` option, defaulting to opa
pub(crate) fn selected_tool(tool: Option<&str>) -> Result<Tool> {
    match tool {
        Some(name) => name.parse(),
        None => Ok(Tool::Opa),
    }
}
