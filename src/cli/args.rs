use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "pimctl",
    version,
    about = "command-line client for the particle notes service",
    long_about = "Pimctl talks to a particle notes backend: sign in once, then search, read,\nwrite and export your notes from the terminal.\n\nExamples:\n  pimctl login alice\n  pimctl search groceries\n  pimctl new \"Reading list\" --body \"<p>start here</p>\"\n  pimctl view 7f3a\n  pimctl export\n\nTip: Use --config to point at an alternate ~/.pimctl/config.yml."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 's',
        long = "srv",
        visible_alias = "server",
        value_name = "URL",
        global = true,
        help_heading = "Connection",
        help = "Backend base URL (defaults to http://127.0.0.1:8000)."
    )]
    pub server: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Connection",
        help = "Path to config file (defaults to ~/.pimctl/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        global = true,
        help_heading = "Connection",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        short = 'w',
        long = "wrk",
        visible_alias = "workers",
        value_name = "N",
        global = true,
        help_heading = "Performance",
        help = "Number of runtime worker threads."
    )]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in and store the session token.
    Login {
        username: String,
        #[arg(
            short = 'p',
            long = "pw",
            visible_alias = "password",
            value_name = "PASSWORD",
            help = "Password (prompted for when omitted)."
        )]
        password: Option<String>,
    },

    /// Create an account.
    Register {
        username: String,
        #[arg(
            short = 'p',
            long = "pw",
            visible_alias = "password",
            value_name = "PASSWORD",
            help = "Password (prompted for when omitted)."
        )]
        password: Option<String>,
    },

    /// Invalidate and clear the stored session.
    Logout,

    /// Show which account the stored session belongs to.
    Whoami,

    /// List particles, optionally filtered by a query.
    Search {
        #[arg(value_name = "QUERY")]
        query: Option<String>,
    },

    /// Create a particle.
    New {
        title: String,
        #[arg(
            short = 'b',
            long = "body",
            value_name = "HTML",
            help = "Body markup; use --body-file or your editor instead for longer notes."
        )]
        body: Option<String>,
        #[arg(
            short = 'f',
            long = "bf",
            visible_alias = "body-file",
            value_name = "FILE",
            help = "Read the body from a file ('-' for stdin)."
        )]
        body_file: Option<String>,
        #[arg(
            short = 't',
            long = "tag",
            value_name = "TAG",
            action = ArgAction::Append,
            help = "Attach a tag (repeatable)."
        )]
        tags: Vec<String>,
    },

    /// Edit an existing particle.
    Edit {
        id: String,
        #[arg(long = "title", value_name = "TITLE", help = "Replace the title.")]
        title: Option<String>,
        #[arg(
            short = 'b',
            long = "body",
            value_name = "HTML",
            help = "Replace the body markup."
        )]
        body: Option<String>,
        #[arg(
            short = 'f',
            long = "bf",
            visible_alias = "body-file",
            value_name = "FILE",
            help = "Read the replacement body from a file ('-' for stdin)."
        )]
        body_file: Option<String>,
    },

    /// Show a single particle.
    View { id: String },

    /// Delete a particle.
    Delete {
        id: String,
        #[arg(short = 'y', long = "yes", help = "Skip the confirmation prompt.")]
        yes: bool,
    },

    /// Add or remove tags on a particle.
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Show or persist the display theme (dark or light).
    Theme {
        #[arg(value_name = "THEME")]
        value: Option<String>,
    },

    /// Download a full-data export.
    Export {
        #[arg(
            short = 'o',
            long = "out",
            value_name = "FILE",
            help = "Output file (defaults to pim_export.json)."
        )]
        out: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TagAction {
    /// Attach tags to a particle.
    Add {
        id: String,
        #[arg(required = true, value_name = "TAG")]
        tags: Vec<String>,
    },
    /// Detach tags from a particle.
    Remove {
        id: String,
        #[arg(required = true, value_name = "TAG")]
        tags: Vec<String>,
    },
}
