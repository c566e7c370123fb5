pub mod calendar;
pub mod entries;
pub mod range;
pub mod report;
pub mod sync;
pub mod timer;

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    config::Config,
    storage::{entry_store::JsonEntryStore, session_store::SessionStore},
    sync::{remote::HttpRemoteStore, SyncCoordinator},
    tracker::session::SessionManager,
    utils::{
        clock::SystemClock,
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

use entries::{AddCommand, EditCommand, ListCommand};
use report::ReportCommand;

#[derive(Parser, Debug)]
#[command(name = "Worklog", version, long_about = None)]
#[command(about = "Track working hours with a timer, calendar totals and remote sync", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Start the timer")]
    Start {
        #[arg(help = "What you are working on")]
        description: Option<String>,
    },
    #[command(about = "Stop the timer and record the entry")]
    Stop {},
    #[command(about = "Show the running timer")]
    Status {},
    #[command(
        about = "Continue a recorded entry. The entry keeps its start and gets a new end time on the next stop"
    )]
    Resume {
        #[arg(help = "Entry index as printed by `list`")]
        index: usize,
    },
    #[command(about = "Add an entry manually")]
    Add {
        #[command(flatten)]
        command: AddCommand,
    },
    #[command(about = "Edit a recorded entry")]
    Edit {
        #[command(flatten)]
        command: EditCommand,
    },
    #[command(about = "Delete a recorded entry")]
    Delete {
        #[arg(help = "Entry index as printed by `list`")]
        index: usize,
    },
    #[command(about = "List recorded entries")]
    List {
        #[command(flatten)]
        command: ListCommand,
    },
    #[command(about = "Show a month calendar with net hours per day and week")]
    Calendar {
        #[arg(long, help = "Month to show as YYYY-MM. Defaults to the current month")]
        month: Option<String>,
    },
    #[command(about = "Write a CSV report with daily hours, weekly totals and a grand total")]
    Report {
        #[command(flatten)]
        command: ReportCommand,
    },
    #[command(about = "Export the raw entry list as CSV")]
    Export {
        #[arg(long = "start", short, help = "Start of the range, defaults to the first of the current month")]
        start_date: Option<String>,
        #[arg(long = "end", short, help = "End of the range, defaults to the last day of the current month")]
        end_date: Option<String>,
        #[arg(long, help = "Write the CSV to this file instead of stdout")]
        out: Option<PathBuf>,
    },
    #[command(about = "Log in to the remote and store the session")]
    Login {
        username: String,
        #[arg(long)]
        pin: String,
    },
    #[command(about = "Drop the stored remote session")]
    Logout {},
    #[command(about = "Replace the remote entry list with the local one")]
    Push {},
    #[command(about = "Replace the local entry list with the remote one")]
    Pull {},
    #[command(about = "Pull once, then keep pushing on a fixed period until interrupted")]
    Watch {
        #[arg(
            long,
            help = "Seconds between pushes. Defaults to the configured sync interval"
        )]
        interval: Option<u64>,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = create_application_default_path()?;
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let context = AppContext::new(app_dir)?;

    match args.commands {
        Commands::Start { description } => {
            timer::start(&context, description.as_deref().unwrap_or("")).await
        }
        Commands::Stop {} => timer::stop(&context).await,
        Commands::Status {} => timer::status(&context).await,
        Commands::Resume { index } => timer::resume(&context, index).await,
        Commands::Add { command } => entries::add(&context, command).await,
        Commands::Edit { command } => entries::edit(&context, command).await,
        Commands::Delete { index } => entries::delete(&context, index).await,
        Commands::List { command } => entries::list(&context, command).await,
        Commands::Calendar { month } => calendar::show(&context, month.as_deref()).await,
        Commands::Report { command } => report::process_report_command(&context, command).await,
        Commands::Export {
            start_date,
            end_date,
            out,
        } => report::process_export_command(&context, start_date, end_date, out).await,
        Commands::Login { username, pin } => sync::login(&context, &username, &pin).await,
        Commands::Logout {} => sync::logout(&context),
        Commands::Push {} => sync::push(&context).await,
        Commands::Pull {} => sync::pull(&context).await,
        Commands::Watch { interval } => sync::watch(&context, interval).await,
    }
}

/// Everything a command handler needs: the loaded config and handles to the local
/// stores. Remote handles are built on demand since most commands never need one.
pub struct AppContext {
    pub app_dir: PathBuf,
    pub data_dir: PathBuf,
    pub config: Config,
    pub store: Arc<JsonEntryStore>,
}

impl AppContext {
    fn new(app_dir: PathBuf) -> Result<Self> {
        let config = Config::load(&app_dir);
        let data_dir = config.data_dir.clone().unwrap_or_else(|| app_dir.clone());
        let store = Arc::new(JsonEntryStore::new(&data_dir)?);
        Ok(Self {
            app_dir,
            data_dir,
            config,
            store,
        })
    }

    pub fn session_manager(&self) -> Result<SessionManager<Arc<JsonEntryStore>>> {
        Ok(SessionManager::new(
            Arc::clone(&self.store),
            SessionStore::new(&self.data_dir)?,
            Box::new(SystemClock),
        ))
    }

    pub fn remote(&self) -> Result<HttpRemoteStore> {
        let url = self.config.remote_url.as_deref().ok_or_else(|| {
            anyhow!(
                "no remote configured, set remote_url in {:?}",
                Config::file_path(&self.app_dir)
            )
        })?;
        Ok(HttpRemoteStore::new(
            url,
            self.config.session_cookie.as_deref(),
        )?)
    }

    pub fn coordinator(&self) -> Result<SyncCoordinator<Arc<JsonEntryStore>, HttpRemoteStore>> {
        Ok(SyncCoordinator::new(Arc::clone(&self.store), self.remote()?))
    }
}
