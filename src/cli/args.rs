use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "artpager",
    version,
    about = "selection-aware terminal pager for remote artwork catalogs",
    long_about = "Artpager lists artworks from a remote catalog page by page and keeps a selection that survives paging.\n\nExamples:\n  artpager\n  artpager --size 25 --page 3\n  artpager --url http://localhost:8080/api/v1 --timeout 5\n\nType `help` at the prompt for interactive commands."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv). RUST_LOG takes precedence."
    )]
    pub verbose: u8,

    #[arg(
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'u',
        long = "url",
        value_name = "URL",
        help_heading = "Catalog",
        help = "Catalog API base URL (defaults to https://api.artic.edu/api/v1)."
    )]
    pub url: Option<String>,

    #[arg(
        short = 't',
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "Catalog",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'x',
        long = "proxy",
        value_name = "URL",
        help_heading = "Catalog",
        help = "Route catalog requests through a proxy."
    )]
    pub proxy: Option<String>,

    #[arg(
        long = "user-agent",
        value_name = "UA",
        help_heading = "Catalog",
        help = "User-Agent header sent with catalog requests."
    )]
    pub user_agent: Option<String>,

    #[arg(
        short = 'p',
        long = "page",
        value_name = "N",
        help_heading = "View",
        help = "Page to open first (1-based)."
    )]
    pub page: Option<u32>,

    #[arg(
        short = 's',
        long = "size",
        value_name = "ROWS",
        help_heading = "View",
        help = "Rows per page: 12, 25 or 50."
    )]
    pub size: Option<u32>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Config",
        help = "Path to config file (defaults to ~/.artpager/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Config",
        help = "Write a default config file and exit."
    )]
    pub init_config: bool,
}
