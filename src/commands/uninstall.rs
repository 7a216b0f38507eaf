use crate::commands::selected_tool;
use crate::core::{error::Result, print_hint, print_success, CommandContext};
use clap::Parser;

#[derive(Parser, Debug)]
pub struct UninstallArgs {
    /// Installed version to remove
    pub version: String,

    /// Target tool: opa or regal
    #[arg(long, short = 't')]
    pub tool: Option<String>,
}

pub fn execute_uninstall(args: UninstallArgs) -> Result<()> {
    let tool = selected_tool(args.tool.as_deref())?;
    let context = CommandContext::initialize()?;
    let version = args.version.trim();

    context.installer()?.uninstall(tool, version)?;
    print_success(&format!("Uninstalled {tool} {version}"));

    if context.state().get_default(tool).as_deref() == Some(version) {
        print_hint(&format!(
            "{version} was the global default for {tool}. Run: {}",
            tool.use_command("<version>")
        ));
    }
    Ok(())
}
