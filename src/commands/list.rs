use crate::commands::selected_tool;
use crate::core::{error::Result, print_info, print_section_header, CommandContext};
use clap::Parser;
use colored::*;

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Target tool: opa or regal
    #[arg(long, short = 't')]
    pub tool: Option<String>,
}

pub fn execute_list(args: ListArgs) -> Result<()> {
    let tool = selected_tool(args.tool.as_deref())?;
    let context = CommandContext::initialize()?;
    let versions = context.installer()?.installed_versions(tool)?;

    if versions.is_empty() {
        print_info(&format!(
            "No installed {tool} versions. Run: {}",
            tool.install_command("latest")
        ));
        return Ok(());
    }

    let default = context.state().get_default(tool);
    print_section_header(&format!("Installed {tool} versions"));
    for version in &versions {
        if default.as_deref() == Some(version.as_str()) {
            println!("* {} {}", version.green(), "(global default)".bright_black());
        } else {
            println!("  {version}");
        }
    }
    Ok(())
}
