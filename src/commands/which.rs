use crate::commands::selected_tool;
use crate::core::{error::Result, CommandContext};
use clap::Parser;

#[derive(Parser, Debug)]
pub struct WhichArgs {
    /// Target tool: opa or regal
    #[arg(long, short = 't')]
    pub tool: Option<String>,
}

/// Print the absolute path of the binary the shim would run
pub fn execute_which(args: WhichArgs) -> Result<()> {
    let tool = selected_tool(args.tool.as_deref())?;
    let context = CommandContext::initialize()?;
    let (_, installed) = context.resolver().resolve_binary(tool, &context.cwd)?;
    let binary = installed
        .binary
        .canonicalize()
        .unwrap_or(installed.binary);
    println!("{}", binary.display());
    Ok(())
}
