use crate::commands::selected_tool;
use crate::core::{
    error::{OpavmError, Result},
    github::version_from_tag,
    print_success, CommandContext,
};
use clap::Parser;

#[derive(Parser, Debug)]
pub struct UseArgs {
    /// Installed version to make the global default
    pub version: String,

    /// Target tool: opa or regal
    #[arg(long, short = 't')]
    pub tool: Option<String>,
}

pub fn execute_use(args: UseArgs) -> Result<()> {
    let tool = selected_tool(args.tool.as_deref())?;
    let context = CommandContext::initialize()?;
    let version = version_from_tag(args.version.trim());

    if context.resolver().locate(tool, version).is_none() {
        return Err(OpavmError::version_not_installed(tool, version));
    }
    context.state().set_default(tool, version)?;
    print_success(&format!("Global default for {tool} set to {version}"));
    Ok(())
}
