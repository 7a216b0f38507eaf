use crate::core::{
    error::{OpavmError, Result},
    print_hint, print_info, print_success,
    shim::{ensure_shim, path_instruction, shims_on_path},
    CommandContext, InstallOutcome, Tool,
};
use clap::Parser;

#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Version to install (`latest`, `1.2.3`, `v1.2.3`) or a tool name (`regal`)
    pub subject: String,

    /// Version, when the first argument names a tool
    pub version: Option<String>,

    /// Target tool: opa or regal
    #[arg(long, short = 't')]
    pub tool: Option<String>,
}

/// Which tool and version token an `install` invocation refers to.
///
/// `install 1.2.3`, `install latest`, `install regal`, `install regal 0.38.1`
/// and `install 0.38.1 --tool regal` are all accepted.
pub fn install_target(args: &InstallArgs) -> Result<(Tool, String)> {
    let subject = args.subject.trim();
    match (&args.tool, &args.version) {
        (Some(_), Some(_)) => Err(OpavmError::InvalidInstallArgs),
        (Some(tool), None) => {
            let tool: Tool = tool.parse()?;
            if subject.eq_ignore_ascii_case(tool.name()) {
                Ok((tool, "latest".to_string()))
            } else {
                Ok((tool, subject.to_string()))
            }
        }
        (None, Some(version)) => Ok((subject.parse()?, version.trim().to_string())),
        (None, None) => match subject.parse::<Tool>() {
            Ok(tool) => Ok((tool, "latest".to_string())),
            Err(_) => Ok((Tool::Opa, subject.to_string())),
        },
    }
}

pub fn execute_install(args: InstallArgs) -> Result<()> {
    let (tool, token) = install_target(&args)?;
    let context = CommandContext::initialize()?;
    let installer = context.installer()?;

    let InstallOutcome { installed, fresh } = installer.install(tool, &token)?;
    if fresh {
        print_success(&format!("Installed {tool} {}", installed.version));
    } else {
        print_info(&format!("{tool} {} is already installed", installed.version));
    }

    let shim = ensure_shim(context.layout(), tool)?;
    print_info(&format!("Shim ready at {}", shim.display()));
    if !shims_on_path(context.layout()) {
        print_hint("Add the shims directory to your PATH:");
        print_hint(&format!("  {}", path_instruction(context.layout())));
    }

    if context.state().get_default(tool).is_none() {
        print_hint(&format!(
            "No global default is set. Run: {}",
            tool.use_command(&installed.version)
        ));
    }
    Ok(())
}
