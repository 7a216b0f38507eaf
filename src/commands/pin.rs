use crate::commands::selected_tool;
use crate::core::{
    error::{OpavmError, Result},
    github::ReleaseTag,
    pin::write_pin,
    print_success, CommandContext, Tool,
};
use clap::Parser;
use std::io::{self, BufRead, Write};

#[derive(Parser, Debug)]
pub struct PinArgs {
    /// Version to pin in the current directory (`latest` is resolved first)
    pub version: String,

    /// Target tool: opa or regal
    #[arg(long, short = 't')]
    pub tool: Option<String>,

    /// Install a missing version without asking
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn execute_pin(args: PinArgs) -> Result<()> {
    let tool = selected_tool(args.tool.as_deref())?;
    let context = CommandContext::initialize()?;
    let token = args.version.trim();

    let installed_version = match ReleaseTag::parse(token) {
        ReleaseTag::Exact(version) => context
            .resolver()
            .locate(tool, &version)
            .map(|installed| installed.version),
        ReleaseTag::Latest => None,
    };

    let version = match installed_version {
        Some(version) => version,
        None => {
            if !args.yes && !confirm_install(tool, token)? {
                return Err(OpavmError::version_not_installed(tool, token));
            }
            context.installer()?.install(tool, token)?.installed.version
        }
    };

    let path = write_pin(&context.cwd, tool, &version)?;
    print_success(&format!("Pinned {tool} {version} in {}", path.display()));
    Ok(())
}

/// Ask on stderr, answer on stdin. Empty input accepts; end of input declines.
fn confirm_install(tool: Tool, token: &str) -> Result<bool> {
    eprint!("{tool} {token} is not installed. Install now? [Y/n] ");
    io::stderr().flush()?;

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer)? == 0 {
        eprintln!();
        return Ok(false);
    }
    Ok(parse_confirmation(&answer))
}

fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "" | "y" | "yes")
}
