mod config;
mod logging;
mod terminal;

use std::io;
use std::process::ExitCode;

use art_survey_adapters::{
    present_notice, present_progress, present_sync_report, FsObjectStore, JsonFileSessionStore,
    PlatformClient, SqliteSurveyStore, SystemClock,
};
use art_survey_application::{
    ApplicationError, DirectorySync, RequestPasswordResetCommand, SignUpCommand, SurveyService,
    SyncDirectoryCommand,
};
use art_survey_domain::RatingPolicy;
use clap::{Parser, Subcommand};
use config::{AppConfig, EnvSource, ProcessEnv, SurveyConfig, SyncConfig};
use terminal::{prompt, Terminal};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "art-survey", author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Register every image under the bucket folder in the photo catalog.
    Sync {
        /// Folder inside the bucket; defaults to SUPABASE_FOLDER.
        #[arg(long)]
        root: Option<String>,
        /// Walk a local directory instead of the remote bucket.
        #[arg(long, value_name = "DIR")]
        local_bucket: Option<String>,
        /// SQLite catalog used with --local-bucket.
        #[arg(long, value_name = "DB", requires = "local_bucket")]
        catalog: Option<String>,
    },
    /// Rate photos interactively.
    Rate {
        /// Link opened from an email, e.g. a password recovery link.
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account; the password is read from stdin.
    Signup {
        #[arg(long)]
        email: String,
    },
    /// Email a password reset link.
    Forgot {
        #[arg(long)]
        email: String,
        #[arg(long)]
        redirect: Option<String>,
    },
}

#[derive(Debug)]
enum CommandError {
    Runtime(String),
}

impl From<ApplicationError> for CommandError {
    fn from(value: ApplicationError) -> Self {
        Self::Runtime(value.to_string())
    }
}

impl From<io::Error> for CommandError {
    fn from(value: io::Error) -> Self {
        Self::Runtime(format!("terminal error: {value}"))
    }
}

fn main() -> ExitCode {
    logging::init_logging();
    let cli = Cli::parse();
    let config = AppConfig::default();

    match run_command(cli.command, &config, &ProcessEnv) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Runtime(message)) => {
            error!(message = message.as_str(), "command failed");
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_command(
    command: Command,
    config: &AppConfig,
    env: &dyn EnvSource,
) -> Result<(), CommandError> {
    match command {
        Command::Sync {
            root,
            local_bucket: Some(dir),
            catalog,
        } => {
            let catalog_path = catalog.unwrap_or_else(|| config.catalog_path.clone());
            let store = SqliteSurveyStore::new(catalog_path);
            store.initialize()?;
            let sync = DirectorySync::new(
                Box::new(FsObjectStore::new(dir.clone())?),
                Box::new(store.clone()),
            );
            run_sync(&sync, &dir, root.unwrap_or_default())?;
            println!(
                "catalog holds {} photos and {} ratings",
                store.photo_count()?,
                store.rating_count()?
            );
            Ok(())
        }
        Command::Sync { root, .. } => {
            let settings = SyncConfig::from_env(env)?;
            let client = PlatformClient::new(
                &settings.url,
                &settings.service_role_key,
                &settings.bucket,
            )?;
            let sync = DirectorySync::new(Box::new(client.clone()), Box::new(client));
            run_sync(
                &sync,
                &settings.bucket,
                root.unwrap_or(settings.root_prefix),
            )
        }
        Command::Rate { link, email } => {
            let settings = SurveyConfig::from_env(env)?;
            let mut terminal = Terminal {
                service: build_survey_service(&settings, config, None)?,
                base_url: &settings.url,
                bucket: &settings.bucket,
            };
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut out = io::stdout();
            terminal.session(link, email, &mut input, &mut out)?;
            Ok(())
        }
        Command::Signup { email } => {
            let settings = SurveyConfig::from_env(env)?;
            let mut service = build_survey_service(&settings, config, None)?;
            let password = read_password()?;
            let view = service.sign_up(SignUpCommand { email, password })?;
            match view.notice {
                Some(notice) => println!("{}", present_notice(&notice)),
                None => println!("signed up and signed in"),
            }
            Ok(())
        }
        Command::Forgot { email, redirect } => {
            let settings = SurveyConfig::from_env(env)?;
            let mut service = build_survey_service(&settings, config, redirect)?;
            let view = service.request_password_reset(RequestPasswordResetCommand { email })?;
            if let Some(notice) = view.notice {
                println!("{}", present_notice(&notice));
            }
            Ok(())
        }
    }
}

fn build_survey_service(
    settings: &SurveyConfig,
    config: &AppConfig,
    redirect: Option<String>,
) -> Result<SurveyService, ApplicationError> {
    let client = PlatformClient::new(&settings.url, &settings.anon_key, &settings.bucket)?;
    Ok(SurveyService::new(
        Box::new(client.clone()),
        Box::new(JsonFileSessionStore::new(config.session_path.clone())),
        Box::new(client),
        Box::new(SystemClock),
        RatingPolicy::default(),
        redirect.unwrap_or_else(|| config.reset_redirect_url.clone()),
    ))
}

fn run_sync(sync: &DirectorySync, bucket: &str, root: String) -> Result<(), CommandError> {
    info!(bucket, root = root.as_str(), "starting directory sync");
    let report = sync.run(SyncDirectoryCommand::new(root.clone()), |progress| {
        println!("{}", present_progress(&progress));
    })?;
    println!("{}", present_sync_report(&report, bucket, &root));
    Ok(())
}

fn read_password() -> Result<String, CommandError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    prompt("password", &mut input, &mut out)?
        .ok_or_else(|| CommandError::Runtime("no password given".to_string()))
}
