use crate::commands::selected_tool;
use crate::core::{
    error::Result, print_info, print_section_header, CommandContext, GitHubSource, ReleaseCatalog,
};
use clap::Parser;
use colored::*;

#[derive(Parser, Debug)]
pub struct ReleasesArgs {
    /// Number of recent releases to show
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Target tool: opa or regal
    #[arg(long, short = 't')]
    pub tool: Option<String>,
}

pub fn execute_releases(args: ReleasesArgs) -> Result<()> {
    let tool = selected_tool(args.tool.as_deref())?;
    let context = CommandContext::initialize()?;
    let repo = context.config.repository(tool)?;
    let source = GitHubSource::new(context.config.github_token.clone())?;
    let catalog = ReleaseCatalog::new(source, context.config.clone());

    let releases = catalog.list_releases(tool, args.limit)?;
    print_section_header(&format!("{tool} releases (https://github.com/{repo}/releases)"));
    if releases.is_empty() {
        print_info("No releases found.");
        return Ok(());
    }

    for release in &releases {
        let published = release
            .published_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let marker = if release.prerelease {
            " pre-release".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "  {} {:<14} {}{}",
            format!("{:<12}", release.version()).cyan(),
            release.tag,
            published.bright_black(),
            marker
        );
    }
    Ok(())
}
