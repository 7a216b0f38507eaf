use crate::commands::selected_tool;
use crate::core::{error::Result, CommandContext};
use clap::Parser;
use std::ffi::OsString;

#[derive(Parser, Debug)]
pub struct ExecArgs {
    /// Target tool: opa or regal
    #[arg(long, short = 't')]
    pub tool: Option<String>,

    /// Arguments forwarded unchanged to the resolved binary. Everything after
    /// the first of them belongs to the tool; `--` is accepted but optional.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<OsString>,
}

/// Run the resolved binary without going through `PATH`. Returns its exit code.
pub fn execute_exec(args: ExecArgs) -> Result<i32> {
    let tool = selected_tool(args.tool.as_deref())?;
    let context = CommandContext::initialize()?;
    context.dispatcher().dispatch(tool, &context.cwd, args.args)
}
