//! sma: editor for start-and-exit launcher configs.
//!
//! Each subcommand loads a config file, applies one editing action and saves
//! the normalized result back. Blank start entries are dropped on save and the
//! exit trigger keeps pointing at the command it named.

mod config;
mod editor;
mod exit_index;
mod normalize;
mod record;
mod store;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::builder::styling::{AnsiColor, Effects, Style};
use clap::builder::Styles;
use clap::{CommandFactory, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::editor::{Edit, Editor};
use crate::normalize::is_blank;
use crate::store::{SaveMode, StoreError, CONFIG_FILE_NAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Switch {
    On,
    Off,
}

/// Command-line interface definition.
#[derive(Debug, Parser)]
#[command(
    name = "sma",
    version,
    about = "Edit launcher configs: start commands and the one that ends the session",
    styles = help_styles(),
    color = clap::ColorChoice::Always,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to the JSON config file.
    #[arg(
        long,
        short,
        global = true,
        default_value = CONFIG_FILE_NAME,
        value_parser = parse_config_path
    )]
    config: PathBuf,
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show help information.
    Help,
    /// Show version information.
    Version,
    /// Create a config with no start entries.
    Create {
        /// Replace an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Print the config.
    Show,
    /// Add a start entry.
    Add {
        /// Command to start.
        command: String,
        /// Insert before this entry instead of appending.
        #[arg(long, value_parser = parse_display_number)]
        at: Option<usize>,
    },
    /// Replace the command of an entry.
    Set {
        #[arg(value_parser = parse_display_number)]
        number: usize,
        command: String,
    },
    /// Remove an entry.
    Remove {
        #[arg(value_parser = parse_display_number)]
        number: usize,
    },
    /// Move an entry to another position.
    Move {
        #[arg(value_parser = parse_display_number)]
        from: usize,
        #[arg(value_parser = parse_display_number)]
        to: usize,
    },
    /// End the session when this entry exits.
    ExitOn {
        #[arg(value_parser = parse_display_number)]
        number: usize,
    },
    /// Turn the exit trigger off, or on at entry 1 when it is off.
    ToggleExit,
    /// Turn the exit trigger off.
    ClearExit,
    /// Also kill the children of started commands.
    CascadeKill {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Set the working directory for started commands.
    Cwd { dir: String },
    /// Rewrite the config in normalized form.
    Normalize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    run(cli).await
}

fn init_tracing(default_filter: &str) {
    // RUST_LOG wins over --log-level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let path = cli.config;
    let edit = match cli.command {
        Commands::Help => {
            Cli::command().print_help()?;
            println!();
            return Ok(());
        }
        Commands::Version => {
            println!("sma {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Create { force } => {
            let mode = if force {
                SaveMode::Overwrite
            } else {
                SaveMode::CreateNew
            };
            let editor = Editor::new(&path);
            editor.save(mode).await.map_err(|err| match err {
                StoreError::AlreadyExists { .. } => {
                    anyhow!("{err}\nuse `--force` to replace it")
                }
                err => anyhow!(err).context(format!("failed to create {}", path.display())),
            })?;
            println!("created {}", path.display());
            return Ok(());
        }
        Commands::Show => {
            let editor = open_editor(&path).await?;
            print!("{}", render_config(editor.config(), editor.config_path()));
            return Ok(());
        }
        Commands::Normalize => {
            let editor = open_editor(&path).await?;
            save_editor(&editor).await?;
            print!("{}", render_config(&normalize::clean_up_start(editor.config()), &path));
            return Ok(());
        }
        Commands::Add { command, at } => match at {
            Some(display) => Edit::Insert {
                at: display - 1,
                command,
            },
            None => Edit::Push(command),
        },
        Commands::Set { number, command } => Edit::Set {
            at: number - 1,
            command,
        },
        Commands::Remove { number } => Edit::Remove { at: number - 1 },
        Commands::Move { from, to } => Edit::Move {
            from: from - 1,
            to: to - 1,
        },
        Commands::ExitOn { number } => Edit::DesignateExit { display: number },
        Commands::ToggleExit => Edit::ToggleExit,
        Commands::ClearExit => Edit::ClearExit,
        Commands::CascadeKill { state } => Edit::SetCascadeKill(state == Switch::On),
        Commands::Cwd { dir } => Edit::SetWorkingDir(dir),
    };

    let mut editor = open_editor(&path).await?;
    let len = editor.config().start.len();
    if let Edit::DesignateExit { display: requested } = &edit {
        if *requested > len {
            warn!(requested = *requested, len, "exit trigger clamped to the last entry");
        }
    }
    if !editor.apply(edit) {
        bail!(
            "no such start entry ({} has {} entr{})",
            path.display(),
            len,
            if len == 1 { "y" } else { "ies" }
        );
    }
    save_editor(&editor).await?;
    print!("{}", render_config(&normalize::clean_up_start(editor.config()), &path));
    Ok(())
}

async fn open_editor(path: &Path) -> Result<Editor> {
    Editor::open(path)
        .await
        .with_context(|| format!("failed to load config {}", path.display()))
}

async fn save_editor(editor: &Editor) -> Result<()> {
    editor
        .save(SaveMode::Overwrite)
        .await
        .with_context(|| format!("failed to save config {}", editor.config_path().display()))?;
    info!(
        path = %editor.config_path().display(),
        exit_on = ?editor.config().exit_target(),
        "config updated"
    );
    Ok(())
}

fn parse_config_path(value: &str) -> Result<PathBuf, StoreError> {
    let path = PathBuf::from(value);
    store::check_extension(&path)?;
    Ok(path)
}

fn parse_display_number(value: &str) -> Result<usize> {
    let number = value
        .parse::<usize>()
        .map_err(|_| anyhow!("invalid entry number: {}", value))?;
    if number == 0 {
        bail!("entry numbers start at 1");
    }
    Ok(number)
}

fn render_config(config: &Config, path: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "config        {}", path.display());
    let _ = writeln!(out, "version       {}", config.version);
    let _ = writeln!(out, "cwd           {}", config.working_dir);
    let _ = writeln!(
        out,
        "cascade kill  {}",
        if config.cascade_kill { "on" } else { "off" }
    );
    let _ = writeln!(
        out,
        "exit on       {}",
        match config.exit_index.target() {
            Some(_) => config.exit_index.display_number().to_string(),
            None => "-".to_string(),
        }
    );
    let _ = writeln!(out, "start");
    let target = config.exit_index.target();
    for (index, entry) in config.start.iter().enumerate() {
        let text = if is_blank(entry) { "(empty)" } else { entry.as_str() };
        let marker = if target == Some(index) { "  <- exit" } else { "" };
        let _ = writeln!(out, "  {:>2}. {}{}", index + 1, text, marker);
    }
    out
}

fn help_styles() -> Styles {
    Styles::styled()
        .header(
            Style::new()
                .fg_color(Some(AnsiColor::BrightBlue.into()))
                .effects(Effects::BOLD | Effects::UNDERLINE),
        )
        .usage(Style::new().fg_color(Some(AnsiColor::BrightBlue.into())).effects(Effects::BOLD))
        .literal(Style::new().fg_color(Some(AnsiColor::BrightWhite.into())).effects(Effects::BOLD))
        .placeholder(Style::new().fg_color(Some(AnsiColor::Cyan.into())).effects(Effects::ITALIC))
        .invalid(Style::new().fg_color(Some(AnsiColor::BrightRed.into())).effects(Effects::BOLD))
}
