//! Command-line front end of the gym catalog.
//!
//! ```bash
//! gym-catalog token --role developer
//! gym-catalog --token <TOKEN> equipment create "Barbell"
//! gym-catalog exercise create --name "Bench Press" --equipment 1 --engagement chest:high
//! gym-catalog exercise list --muscle chest --order-by name --direction desc
//! gym-catalog exercise modify 1 --description "Flat bench"
//! ```

#![warn(clippy::pedantic)]

use std::{
    path::PathBuf,
    process::ExitCode,
    sync::{Arc, Mutex},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use gym_catalog_app::{
    Settings, log as app_log,
    token::{self, LocalIssuer},
};
use gym_catalog_domain::{
    self as domain, Access, CatalogError, DefaultMessages, EquipmentService, ExerciseService,
    MessageKey, MessageResolver, MuscleEngagementService, Role, Service, TokenCache,
};
use gym_catalog_storage::MemoryStore;
use log::{LevelFilter, debug, info};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "gym-catalog",
    about = "Manage a catalog of gym exercises and equipment"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Settings file
    #[arg(long, short = 'c', global = true, default_value = "gym-catalog.settings.json")]
    config: PathBuf,

    /// Catalog file override
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Access token issued by the token command
    #[arg(long, global = true)]
    token: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Equipment management
    Equipment {
        #[command(subcommand)]
        action: EquipmentCommand,
    },

    /// Exercise management
    Exercise {
        #[command(subcommand)]
        action: ExerciseCommand,
    },

    /// List all known muscle engagements
    Engagements,

    /// Issue an access token, replacing the previous one
    Token {
        /// USER may read, DEVELOPER may also change the catalog
        #[arg(long, default_value = "user", value_parser = domain::parse_enum::<Role>)]
        role: Role,
    },

    /// Show the most recent log entries
    Log,
}

impl Command {
    /// Access the command needs, `None` if it does not touch the catalog.
    fn access(&self) -> Option<Access> {
        match self {
            Command::Equipment {
                action: EquipmentCommand::Get { .. } | EquipmentCommand::List(_),
            }
            | Command::Exercise {
                action: ExerciseCommand::Get { .. } | ExerciseCommand::List { .. },
            }
            | Command::Engagements => Some(Access::Read),
            Command::Equipment { .. } | Command::Exercise { .. } => Some(Access::Write),
            Command::Token { .. } | Command::Log => None,
        }
    }
}

#[derive(Subcommand)]
enum EquipmentCommand {
    /// Show one equipment
    Get { id: u64 },

    /// List equipment
    List(PageArgs),

    /// Create an equipment
    Create { name: String },

    /// Rename an equipment
    Replace { id: u64, name: String },

    /// Delete an unused equipment
    Delete { id: u64 },
}

#[derive(Subcommand)]
enum ExerciseCommand {
    /// Show one exercise
    Get { id: u64 },

    /// List exercises
    List {
        #[command(flatten)]
        page: PageArgs,

        /// Only exercises engaging this muscle
        #[arg(long, conflicts_with = "equipment")]
        muscle: Option<String>,

        /// Only exercises using this equipment
        #[arg(long)]
        equipment: Option<u64>,
    },

    /// Create an exercise
    Create(ExerciseArgs),

    /// Replace all fields of an exercise
    Replace {
        id: u64,

        #[command(flatten)]
        exercise: ExerciseArgs,
    },

    /// Change selected fields of an exercise
    Modify {
        id: u64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        equipment: Option<u64>,

        /// Muscle engagement as MUSCLE:LEVEL, replaces all engagements
        #[arg(long = "engagement", value_parser = parse_engagement)]
        engagements: Vec<domain::MuscleEngagement>,
    },

    /// Delete an exercise
    Delete { id: u64 },
}

#[derive(Args)]
struct ExerciseArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    equipment: u64,

    /// Muscle engagement as MUSCLE:LEVEL
    #[arg(long = "engagement", value_parser = parse_engagement, required = true)]
    engagements: Vec<domain::MuscleEngagement>,
}

#[derive(Args)]
struct PageArgs {
    /// 1-based page number
    #[arg(long)]
    page: Option<usize>,

    #[arg(long)]
    page_size: Option<usize>,

    /// ASC or DESC
    #[arg(long)]
    direction: Option<String>,

    /// ID, NAME or EQUIPMENT_NAME
    #[arg(long)]
    order_by: Option<String>,
}

fn parse_engagement(value: &str) -> Result<domain::MuscleEngagement, String> {
    let (muscle, level) = value
        .split_once(':')
        .ok_or_else(|| format!("expected MUSCLE:LEVEL, got '{value}'"))?;
    Ok(domain::MuscleEngagement::new(
        domain::parse_enum(muscle).map_err(|err| err.to_string())?,
        domain::parse_enum(level).map_err(|err| err.to_string())?,
    ))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(err) = err.downcast_ref::<CatalogError>() {
                print_error(err.status(), &err.to_string());
            } else {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = Settings::load(&cli.config)
        .with_context(|| format!("failed to load settings from {}", cli.config.display()))?;

    if let Some(data_file) = cli.data_file {
        settings.data_file = data_file;
    }
    if cli.verbose {
        settings.log_level = LevelFilter::Debug;
    }

    let repository: Arc<Mutex<dyn app_log::Repository>> = match &settings.log_file {
        Some(path) => Arc::new(Mutex::new(app_log::File::new(path.clone()))),
        None => Arc::new(Mutex::new(app_log::Ring::default())),
    };
    app_log::init(repository.clone(), settings.log_level)?;
    debug!("using catalog {}", settings.data_file.display());

    let cache = TokenCache::new();
    if let Some(token) = token::load(&settings.token_file).with_context(|| {
        format!("failed to load token from {}", settings.token_file.display())
    })? {
        cache.restore(token);
    }
    let now = Utc::now();
    authorize(&cache, cli.token.as_deref(), &cli.command, now)?;

    let store = MemoryStore::load(&settings.data_file).with_context(|| {
        format!("failed to load catalog from {}", settings.data_file.display())
    })?;
    let service = Service::new(store);

    let changed = match cli.command {
        Command::Equipment { action } => equipment(&service, &settings, action)?,
        Command::Exercise { action } => exercise(&service, &settings, action)?,
        Command::Engagements => {
            print(&service.get_muscle_engagements()?)?;
            false
        }
        Command::Token { role } => {
            let issuer = LocalIssuer::new(settings.token_ttl_seconds);
            let token = cache.refresh(&issuer, role, now)?;
            token::save(&settings.token_file, &token).with_context(|| {
                format!("failed to save token to {}", settings.token_file.display())
            })?;
            print(&token)?;
            false
        }
        Command::Log => {
            let entries = repository
                .lock()
                .map_err(|err| anyhow::anyhow!("{err}"))?
                .read_entries()?;
            print(&entries)?;
            false
        }
    };

    if changed {
        service.repository().save(&settings.data_file).with_context(|| {
            format!("failed to save catalog to {}", settings.data_file.display())
        })?;
        info!("saved catalog to {}", settings.data_file.display());
    }

    Ok(())
}

type CatalogService = Service<MemoryStore>;

fn authorize(
    cache: &TokenCache,
    presented: Option<&str>,
    command: &Command,
    now: DateTime<Utc>,
) -> Result<(), CatalogError> {
    match command.access() {
        Some(access) => cache
            .authorize(presented, access, now, &DefaultMessages)
            .map(|token| debug!("authorized {access:?} access for role {}", token.role)),
        None => Ok(()),
    }
}

fn equipment(
    service: &CatalogService,
    settings: &Settings,
    action: EquipmentCommand,
) -> anyhow::Result<bool> {
    match action {
        EquipmentCommand::Get { id } => {
            print(&service.get_equipment(Some(id.into()))?)?;
            Ok(false)
        }
        EquipmentCommand::List(page) => {
            print(&service.get_equipments(&page_request(page, settings)?)?)?;
            Ok(false)
        }
        EquipmentCommand::Create { name } => {
            let equipment = domain::Equipment::new(equipment_name(&name)?);
            print(&service.create_equipment(equipment)?)?;
            Ok(true)
        }
        EquipmentCommand::Replace { id, name } => {
            print(&service.replace_equipment(domain::Equipment {
                id: Some(id.into()),
                name: equipment_name(&name)?,
            })?)?;
            Ok(true)
        }
        EquipmentCommand::Delete { id } => {
            print(&service.delete_equipment(Some(id.into()))?)?;
            Ok(true)
        }
    }
}

fn exercise(
    service: &CatalogService,
    settings: &Settings,
    action: ExerciseCommand,
) -> anyhow::Result<bool> {
    match action {
        ExerciseCommand::Get { id } => {
            print(&service.get_exercise(Some(id.into()))?)?;
            Ok(false)
        }
        ExerciseCommand::List {
            page,
            muscle,
            equipment,
        } => {
            let request = page_request(page, settings)?;
            let exercises = match (muscle, equipment) {
                (Some(muscle), _) => service.get_exercises_by_muscle(
                    domain::parse_enum(&muscle).map_err(|err| invalid_value("muscle", &err))?,
                    &request,
                )?,
                (None, Some(id)) => {
                    service.get_exercises_by_equipment(Some(id.into()), &request)?
                }
                (None, None) => service.get_exercises(&request)?,
            };
            print(&exercises)?;
            Ok(false)
        }
        ExerciseCommand::Create(args) => {
            print(&service.create_exercise(exercise_draft(args)?)?)?;
            Ok(true)
        }
        ExerciseCommand::Replace { id, exercise } => {
            let draft = exercise_draft(exercise)?.with_id(id.into());
            print(&service.replace_exercise(draft)?)?;
            Ok(true)
        }
        ExerciseCommand::Modify {
            id,
            name,
            description,
            equipment,
            engagements,
        } => {
            print(&service.modify_exercise(domain::ExercisePatch {
                id: Some(id.into()),
                name,
                description,
                equipment_id: equipment.map(domain::EquipmentID::from),
                muscle_engagements: engagements,
            })?)?;
            Ok(true)
        }
        ExerciseCommand::Delete { id } => {
            print(&service.delete_exercise(Some(id.into()))?)?;
            Ok(true)
        }
    }
}

fn exercise_draft(args: ExerciseArgs) -> Result<domain::ExerciseDraft, CatalogError> {
    Ok(domain::ExerciseDraft::new(
        domain::ExerciseName::new(&args.name).map_err(|err| invalid_value("name", &err))?,
        args.description,
        args.equipment.into(),
        args.engagements,
    ))
}

fn equipment_name(name: &str) -> Result<domain::EquipmentName, CatalogError> {
    domain::EquipmentName::new(name).map_err(|err| invalid_value("name", &err))
}

fn page_request(
    args: PageArgs,
    settings: &Settings,
) -> Result<domain::PageRequest, CatalogError> {
    domain::PageRequest::new(
        args.page,
        Some(args.page_size.unwrap_or(settings.page_size)),
        args.direction.as_deref(),
        args.order_by.as_deref(),
    )
    .map_err(|err| invalid_value("page", &err))
}

fn invalid_value(field: &str, err: &dyn std::fmt::Display) -> CatalogError {
    CatalogError::InvalidArgument(
        DefaultMessages.message(MessageKey::InvalidValue, &[&field, err]),
    )
}

fn print(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: u16,
    message: &'a str,
}

fn print_error(status: u16, message: &str) {
    match serde_json::to_string_pretty(&ErrorBody { status, message }) {
        Ok(body) => println!("{body}"),
        Err(_) => eprintln!("error {status}: {message}"),
    }
}
