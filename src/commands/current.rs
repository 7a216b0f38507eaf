use crate::commands::selected_tool;
use crate::core::{error::Result, print_info, CommandContext};
use clap::Parser;

#[derive(Parser, Debug)]
pub struct CurrentArgs {
    /// Target tool: opa or regal
    #[arg(long, short = 't')]
    pub tool: Option<String>,
}

/// Print the active version and where it came from
pub fn execute_current(args: CurrentArgs) -> Result<()> {
    let tool = selected_tool(args.tool.as_deref())?;
    let context = CommandContext::initialize()?;
    let resolution = context.resolver().resolve(tool, &context.cwd)?;
    print_info(&format!("{} ({})", resolution.version, resolution.source));
    Ok(())
}
