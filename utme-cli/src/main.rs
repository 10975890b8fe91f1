//! utme CLI Application
//!
//! This is the command-line interface for the utme codec.
//! It uses the utme-codec library and adds:
//! - Configuration loading (TOML)
//! - Beacon request building (defaults, query encoding, IP anonymization)
//! - Stored state files (JSON)

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use utme_codec::Utme;

mod args;
mod config;
mod request;
mod state;
mod tracker;

use args::{EventArg, VarArg};
use config::AppConfig;
use tracker::Tracker;

/// utme - Encode, decode and track legacy analytics beacon parameters
#[derive(Parser, Debug)]
#[command(name = "utme-cli")]
#[command(about = "Encode and decode the utme beacon parameter", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a utme string
    Encode {
        /// Existing utme string to start from
        #[arg(long, value_name = "UTME")]
        from: Option<String>,

        #[command(flatten)]
        mutations: Mutations,

        /// Write the result to a JSON state file
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },

    /// Print the structured form of a utme string as JSON
    Decode {
        /// utme string to decode
        utme: String,
    },

    /// Build a beacon URL for an event or page view
    Track {
        #[command(flatten)]
        mutations: Mutations,

        /// Page path (utmp)
        #[arg(long, value_name = "PATH")]
        page: Option<String>,

        /// Web property id (utmac), overrides the config file
        #[arg(long, value_name = "ID")]
        account: Option<String>,

        /// Remote address, anonymized into utmip
        #[arg(long, value_name = "ADDR")]
        remote_addr: Option<String>,
    },
}

/// Mutations shared by `encode` and `track`
#[derive(Args, Debug)]
struct Mutations {
    /// Load the starting utme from a JSON state file
    #[arg(long, value_name = "FILE")]
    state: Option<PathBuf>,

    /// Event as CATEGORY,ACTION[,LABEL[,VALUE]]
    #[arg(short, long, value_name = "EVENT")]
    event: Option<EventArg>,

    /// Custom variable as SLOT=NAME=VALUE[=SCOPE] (can be repeated)
    #[arg(long = "var", value_name = "VAR")]
    vars: Vec<VarArg>,

    /// Slot to clear (can be repeated)
    #[arg(long, value_name = "SLOT", value_parser = args::parse_slot)]
    unset: Vec<usize>,
}

impl Mutations {
    fn apply_variables(&self, utme: &mut Utme) -> Result<()> {
        for var in &self.vars {
            utme.set_custom_variable(var.slot, var.variable.clone())?;
        }
        for slot in &self.unset {
            utme.unset_custom_variable(*slot)?;
        }
        Ok(())
    }

    fn load_start(&self, from: Option<&str>) -> Result<Utme> {
        match (&self.state, from) {
            (Some(path), _) => state::load_state(path),
            (None, text) => Ok(Utme::parse(text)?),
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    log::info!("utme CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using codec library v{}", utme_codec::VERSION);

    let config = match &cli.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    match cli.command {
        Command::Encode {
            from,
            mutations,
            save,
        } => encode_mode(from.as_deref(), &mutations, save.as_deref()),
        Command::Decode { utme } => decode_mode(&utme),
        Command::Track {
            mutations,
            page,
            account,
            remote_addr,
        } => {
            let mut config = config;
            if account.is_some() {
                config.tracker.account_id = account;
            }
            if remote_addr.is_some() {
                config.request.remote_addr = remote_addr;
            }
            track_mode(&config, &mutations, page.as_deref())
        }
    }
}

/// Encode mode - build a utme string and print it
fn encode_mode(from: Option<&str>, mutations: &Mutations, save: Option<&Path>) -> Result<()> {
    let mut utme = mutations.load_start(from)?;
    if let Some(EventArg(event)) = &mutations.event {
        utme.set_event(event.clone());
    }
    mutations.apply_variables(&mut utme)?;

    if let Some(path) = save {
        state::save_state(path, &utme)?;
    }
    println!("{}", utme);
    Ok(())
}

/// Decode mode - print the structured form
fn decode_mode(text: &str) -> Result<()> {
    let utme = Utme::parse(text)?;
    println!("{}", serde_json::to_string_pretty(&utme)?);
    Ok(())
}

/// Track mode - build the beacon request for an event or a page view
fn track_mode(config: &AppConfig, mutations: &Mutations, page: Option<&str>) -> Result<()> {
    let mut tracker = Tracker::new(config)?;
    if mutations.state.is_some() {
        tracker.set_utme(mutations.load_start(None)?)?;
    }
    for var in &mutations.vars {
        tracker.set_custom_variable(var.slot, var.variable.clone())?;
    }
    for slot in &mutations.unset {
        tracker.unset_custom_variable(*slot)?;
    }
    log::debug!("utme before tracking: {:?}", tracker.utme().serialize());

    let request = match &mutations.event {
        Some(EventArg(event)) => {
            if let Some(page) = page {
                tracker.set("utmp", page)?;
            }
            tracker.track_event(event.clone())?
        }
        None => tracker.track_page_view(page)?,
    };

    log::debug!("Request issued at {}", request.issued_at.to_rfc3339());
    for (name, value) in &request.headers {
        log::debug!("{}: {}", name, value);
    }
    println!("{}", request.url);
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
