use clap::error::ErrorKind;
use clap::Parser;
use log::{debug, LevelFilter};

use crate::api::{self, ApiClient};
use crate::cli::args::{CliArgs, Command, TagAction};
use crate::cli::validation;
use crate::commands::{self, Ctx};
use crate::config::{self, ConfigFile};
use crate::store::StateStore;

#[derive(Clone, Debug)]
struct RunConfig {
    server: String,
    timeout: usize,
    workers: usize,
    no_color: bool,
    editor: Option<String>,
    export_file: Option<String>,
    verbose: u8,
    command: Command,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let server = args
        .server
        .or(cfg.server)
        .unwrap_or_else(|| api::DEFAULT_SERVER.to_string());
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    let workers = args.workers.or(cfg.workers).unwrap_or(2);
    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    Ok(RunConfig {
        server,
        timeout,
        workers,
        no_color,
        editor: cfg.editor,
        export_file: cfg.export_file,
        verbose: args.verbose,
        command: args.command,
    })
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}

async fn run_async(run: RunConfig, store: StateStore) -> Result<(), String> {
    // The persisted theme is read before anything prints, the guard included.
    let theme = store.theme();
    let api = ApiClient::new(&run.server, run.timeout)?;
    debug!("server {}", api.base_url());

    let ctx = Ctx {
        api,
        store,
        theme,
        editor: run.editor,
        export_file: run.export_file,
    };

    match run.command {
        Command::Login { username, password } => {
            commands::auth::login(&ctx, &username, password.as_deref()).await
        }
        Command::Register { username, password } => {
            commands::auth::register(&ctx, &username, password.as_deref()).await
        }
        Command::Logout => commands::auth::logout(&ctx).await,
        Command::Whoami => commands::auth::whoami(&ctx).await,
        Command::Search { query } => commands::search::search(&ctx, query.as_deref()).await,
        Command::New {
            title,
            body,
            body_file,
            tags,
        } => {
            commands::editor::create(&ctx, &title, body.as_deref(), body_file.as_deref(), &tags)
                .await
        }
        Command::Edit {
            id,
            title,
            body,
            body_file,
        } => {
            commands::editor::update(
                &ctx,
                &id,
                title.as_deref(),
                body.as_deref(),
                body_file.as_deref(),
            )
            .await
        }
        Command::View { id } => commands::viewer::view(&ctx, &id).await,
        Command::Delete { id, yes } => commands::editor::delete(&ctx, &id, yes).await,
        Command::Tag { action } => match action {
            TagAction::Add { id, tags } => commands::editor::tag_add(&ctx, &id, &tags).await,
            TagAction::Remove { id, tags } => commands::editor::tag_remove(&ctx, &id, &tags).await,
        },
        Command::Theme { value } => commands::settings::theme(&ctx, value.as_deref()),
        Command::Export { out } => commands::settings::export(&ctx, out.as_deref()).await,
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => {
                config::ensure_default_config_file(&path)?;
                config::load_config(&path, true)?
            }
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    init_logging(run.verbose);
    if run.no_color {
        colored::control::set_override(false);
    }

    let store = StateStore::open_default()?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(run.workers)
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;
    rt.block_on(run_async(run, store))
}
