use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use staffing_planner::access::{require_admin, ConfigIdentity, CurrentUser, IdentityProvider};
use staffing_planner::analysis::{resolve_inputs, run_gap_analysis, GapAnalysis, GapAnalysisRequest};
use staffing_planner::config::{Config, ConfigOverrides};
use staffing_planner::org::assignment::{assign, unassign, AssignRequest};
use staffing_planner::org::budget::{summarize_budget, BudgetSummary};
use staffing_planner::org::repository::Repository;
use staffing_planner::org::{Collection, Resource};
use staffing_planner::output::csv::{budget_to_csv, gap_to_csv, scenarios_to_csv};
use staffing_planner::output::render_json;
use staffing_planner::output::table::{
    render_actions_table, render_budget_table, render_comparison_table, render_documents_table,
    render_gap_table, render_recommendation_table, render_scenarios_table, render_whatif_table,
};
use staffing_planner::scenario::compare::compare_scenarios;
use staffing_planner::scenario::whatif::simulate_whatif;
use staffing_planner::scenario::{Scenario, ScenarioComparison, WhatIfResult};
use staffing_planner::server::run_server;
use staffing_planner::staffing::{
    compute_recommended_staffing, FormulaVariant, InputKey, StaffingInputs, StaffingLevels,
};
use staffing_planner::store::sqlite::SqliteStore;
use staffing_planner::store::{
    create_document, delete_document, get_document, list_documents, update_document,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "staffing-planner",
    about = "Staffing recommendations and gap analysis for org planning"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    db: Option<String>,
    /// Acting user id; admin rights come from `[access].admins`.
    #[arg(short, long)]
    user: Option<String>,
    /// Formula variant: simple or ratio_aware.
    #[arg(long)]
    variant: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone, Default)]
struct InputArgs {
    #[arg(long = "work-orders")]
    work_orders: Option<i64>,
    #[arg(long)]
    complaints: Option<i64>,
    #[arg(long)]
    complexity: Option<i64>,
    #[arg(long)]
    clients: Option<i64>,
    #[arg(long)]
    ratio: Option<i64>,
}

impl InputArgs {
    /// Explicit inputs when any volume is given; otherwise `None` so the
    /// stored client volumes are used.
    fn explicit(&self) -> Option<StaffingInputs> {
        if self.work_orders.is_none() && self.complaints.is_none() && self.clients.is_none() {
            return None;
        }
        Some(StaffingInputs {
            work_order_volume: self.work_orders,
            complaint_volume: self.complaints,
            complexity: self.complexity,
            client_count: self.clients,
            manager_to_client_ratio: self.ratio,
        })
    }
}

#[derive(Debug, clap::Args, Clone, Default)]
struct CurrentArgs {
    #[arg(long)]
    leadership: Option<u32>,
    #[arg(long)]
    specialist: Option<u32>,
    #[arg(long)]
    associate: Option<u32>,
    /// Count only roles in this factory when deriving current headcount.
    #[arg(long)]
    factory: Option<String>,
}

impl CurrentArgs {
    fn explicit(&self) -> Option<StaffingLevels> {
        if self.leadership.is_none() && self.specialist.is_none() && self.associate.is_none() {
            return None;
        }
        Some(StaffingLevels::new(
            self.leadership.unwrap_or(0),
            self.specialist.unwrap_or(0),
            self.associate.unwrap_or(0),
        ))
    }
}

fn analysis_request(inputs: &InputArgs, current: &CurrentArgs) -> GapAnalysisRequest {
    GapAnalysisRequest {
        inputs: inputs.explicit(),
        current: current.explicit(),
        factory_id: current.factory.clone(),
        complexity: inputs.complexity,
        manager_to_client_ratio: inputs.ratio,
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    Recommend {
        #[command(flatten)]
        inputs: InputArgs,
    },
    Gap {
        #[command(flatten)]
        inputs: InputArgs,
        #[command(flatten)]
        current: CurrentArgs,
    },
    Whatif {
        #[command(flatten)]
        inputs: InputArgs,
        #[command(flatten)]
        current: CurrentArgs,
        /// Input change as INPUT=VALUE, e.g. work_orders=4000. Repeatable.
        #[arg(long = "set", value_name = "INPUT=VALUE")]
        set: Vec<String>,
    },
    Scenario {
        #[command(subcommand)]
        command: ScenarioCommand,
    },
    Records {
        #[command(subcommand)]
        command: RecordsCommand,
    },
    Assign {
        personnel_id: String,
        role_id: String,
        #[arg(long)]
        factory: String,
    },
    Unassign {
        personnel_id: String,
    },
    Budget,
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ScenarioCommand {
    Save {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        inputs: InputArgs,
        #[command(flatten)]
        current: CurrentArgs,
    },
    List,
    Show {
        id: String,
    },
    Compare {
        base: String,
        candidate: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum RecordsCommand {
    List {
        collection: String,
    },
    Show {
        collection: String,
        id: String,
    },
    /// Creates a record from a JSON file, or replaces `--id` when given.
    Put {
        collection: String,
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        id: Option<String>,
    },
    Delete {
        collection: String,
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        db_path: cli.db.clone(),
        variant: cli
            .variant
            .as_deref()
            .map(FormulaVariant::from_str)
            .transpose()?,
    });
    init_tracing(&config.logging.filter);

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }
    if let Commands::Serve { host, port } = &cli.command {
        let host = host.clone().unwrap_or_else(|| config.server.host.clone());
        let port = port.unwrap_or(config.server.port);
        let bind = format!("{host}:{port}");
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
        return run_server(config, addr).await;
    }

    let identity = ConfigIdentity::new(&config.access);
    let user = identity.current_user(cli.user.as_deref());
    let variant = config.staffing.variant;
    let db_path = config.resolved_db_path();
    let store = SqliteStore::open(&db_path)?;

    match &cli.command {
        Commands::Recommend { inputs } => {
            let request = analysis_request(inputs, &CurrentArgs::default());
            let inputs = resolve_inputs(&store, &request, &config.staffing)?;
            let recommended = compute_recommended_staffing(&inputs, variant);
            print_recommendation(variant, &inputs, &recommended, cli.output)?;
        }
        Commands::Gap { inputs, current } => {
            let analysis =
                run_gap_analysis(&store, &analysis_request(inputs, current), &config.staffing)?;
            print_gap(&analysis, cli.output)?;
        }
        Commands::Whatif {
            inputs,
            current,
            set,
        } => {
            let changes = parse_changes(set)?;
            if changes.is_empty() {
                warn!("no --set changes given; showing the baseline");
            }
            let baseline =
                run_gap_analysis(&store, &analysis_request(inputs, current), &config.staffing)?;
            let result = simulate_whatif(&baseline.inputs, &baseline.current, &changes, variant);
            print_whatif(&result, cli.output)?;
        }
        Commands::Scenario { command } => {
            handle_scenario_command(command, &store, &config, user.as_ref(), cli.output)?;
        }
        Commands::Records { command } => {
            handle_records_command(command, &store, user.as_ref(), cli.output)?;
        }
        Commands::Assign {
            personnel_id,
            role_id,
            factory,
        } => {
            require_admin(user.as_ref(), "assign personnel")?;
            let person = assign(
                &store,
                &store,
                &AssignRequest {
                    personnel_id: personnel_id.clone(),
                    role_id: role_id.clone(),
                    factory_id: factory.clone(),
                },
            )?;
            println!("{}", render_json(&person)?);
        }
        Commands::Unassign { personnel_id } => {
            require_admin(user.as_ref(), "unassign personnel")?;
            let person = unassign(&store, personnel_id)?;
            println!("{}", render_json(&person)?);
        }
        Commands::Budget => {
            let resources = Repository::<Resource>::list(&store)?;
            print_budget(&summarize_budget(&resources), cli.output)?;
        }
        Commands::Serve { .. } | Commands::Config { .. } => {}
    }

    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &Path) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn handle_scenario_command(
    command: &ScenarioCommand,
    store: &SqliteStore,
    config: &Config,
    user: Option<&CurrentUser>,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ScenarioCommand::Save {
            name,
            description,
            inputs,
            current,
        } => {
            require_admin(user, "save scenarios")?;
            if name.trim().is_empty() {
                return Err(anyhow!("scenario name must not be empty"));
            }
            let analysis =
                run_gap_analysis(store, &analysis_request(inputs, current), &config.staffing)?;
            let mut scenario = Scenario::evaluate(
                name.trim(),
                analysis.inputs,
                analysis.current,
                analysis.variant,
            );
            if let Some(description) = description {
                scenario = scenario.with_description(description.clone());
            }
            if let Some(factory) = &current.factory {
                scenario = scenario.with_factory(factory.clone());
            }
            let saved = Repository::<Scenario>::create(store, scenario)?;
            info!(scenario = %saved.id, "saved scenario");
            print_scenarios(std::slice::from_ref(&saved), format)?;
        }
        ScenarioCommand::List => {
            let mut scenarios = Repository::<Scenario>::list(store)?;
            scenarios.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            print_scenarios(&scenarios, format)?;
        }
        ScenarioCommand::Show { id } => {
            let scenario = Repository::<Scenario>::require(store, id)?;
            print_scenario(&scenario, format)?;
        }
        ScenarioCommand::Compare { base, candidate } => {
            let base = Repository::<Scenario>::require(store, base)?;
            let candidate = Repository::<Scenario>::require(store, candidate)?;
            print_comparison(&compare_scenarios(&base, &candidate), format)?;
        }
        ScenarioCommand::Delete { id } => {
            require_admin(user, "delete scenarios")?;
            Repository::<Scenario>::delete(store, id)?;
            println!("Deleted scenario {id}");
        }
    }
    Ok(())
}

fn handle_records_command(
    command: &RecordsCommand,
    store: &SqliteStore,
    user: Option<&CurrentUser>,
    format: OutputFormat,
) -> Result<()> {
    match command {
        RecordsCommand::List { collection } => {
            let collection = Collection::from_str(collection)?;
            print_documents(&list_documents(store, collection)?, format)?;
        }
        RecordsCommand::Show { collection, id } => {
            let collection = Collection::from_str(collection)?;
            println!("{}", render_json(&get_document(store, collection, id)?)?);
        }
        RecordsCommand::Put {
            collection,
            file,
            id,
        } => {
            let collection = Collection::from_str(collection)?;
            let action = if id.is_some() { "update" } else { "create" };
            require_admin(user, &format!("{action} {collection}"))?;
            let raw = fs::read_to_string(file)
                .with_context(|| format!("failed reading record file: {}", file.display()))?;
            let body: Value = serde_json::from_str(&raw)
                .with_context(|| format!("failed parsing JSON record: {}", file.display()))?;
            let stored = match id {
                Some(id) => update_document(store, collection, id, body)?,
                None => create_document(store, collection, body)?,
            };
            println!("{}", render_json(&stored)?);
        }
        RecordsCommand::Delete { collection, id } => {
            let collection = Collection::from_str(collection)?;
            require_admin(user, &format!("delete {collection}"))?;
            delete_document(store, collection, id)?;
            println!("Deleted {collection} {id}");
        }
    }
    Ok(())
}

fn parse_changes(raw: &[String]) -> Result<Vec<(InputKey, i64)>> {
    raw.iter()
        .map(|entry| {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("expected INPUT=VALUE, got {entry}"))?;
            let key = InputKey::from_str(key)?;
            let value = value
                .trim()
                .parse::<i64>()
                .with_context(|| format!("invalid value for {key}: {value}"))?;
            Ok((key, value))
        })
        .collect()
}

fn print_recommendation(
    variant: FormulaVariant,
    inputs: &StaffingInputs,
    recommended: &StaffingLevels,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("Variant: {variant}");
            println!("{}", render_recommendation_table(recommended));
        }
        OutputFormat::Json => println!(
            "{}",
            render_json(&serde_json::json!({
                "variant": variant,
                "inputs": inputs,
                "recommended": recommended,
            }))?
        ),
        OutputFormat::Csv => {
            warn!("CSV output for recommend not implemented, using JSON");
            println!("{}", render_json(recommended)?);
        }
    }
    Ok(())
}

fn print_gap(analysis: &GapAnalysis, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!(
                "{}",
                render_gap_table(&analysis.recommended, &analysis.current, &analysis.gap)
            );
            println!("{}", render_actions_table(&analysis.actions));
        }
        OutputFormat::Json => println!("{}", render_json(analysis)?),
        OutputFormat::Csv => println!(
            "{}",
            gap_to_csv(&analysis.recommended, &analysis.current, &analysis.gap)?
        ),
    }
    Ok(())
}

fn print_whatif(result: &WhatIfResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_whatif_table(result)),
        OutputFormat::Json => println!("{}", render_json(result)?),
        OutputFormat::Csv => {
            warn!("CSV output for whatif not implemented, using JSON");
            println!("{}", render_json(result)?);
        }
    }
    Ok(())
}

fn print_scenarios(scenarios: &[Scenario], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_scenarios_table(scenarios)),
        OutputFormat::Json => println!("{}", render_json(scenarios)?),
        OutputFormat::Csv => println!("{}", scenarios_to_csv(scenarios)?),
    }
    Ok(())
}

fn print_scenario(scenario: &Scenario, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{} ({}, {})", scenario.name, scenario.id, scenario.variant);
            if !scenario.description.is_empty() {
                println!("{}", scenario.description);
            }
            println!(
                "{}",
                render_gap_table(&scenario.recommended, &scenario.current, &scenario.gap)
            );
        }
        OutputFormat::Json => println!("{}", render_json(scenario)?),
        OutputFormat::Csv => println!(
            "{}",
            gap_to_csv(&scenario.recommended, &scenario.current, &scenario.gap)?
        ),
    }
    Ok(())
}

fn print_comparison(comparison: &ScenarioComparison, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_comparison_table(comparison)),
        OutputFormat::Json => println!("{}", render_json(comparison)?),
        OutputFormat::Csv => {
            warn!("CSV output for scenario compare not implemented, using JSON");
            println!("{}", render_json(comparison)?);
        }
    }
    Ok(())
}

fn print_budget(summary: &BudgetSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_budget_table(summary)),
        OutputFormat::Json => println!("{}", render_json(summary)?),
        OutputFormat::Csv => println!("{}", budget_to_csv(summary)?),
    }
    Ok(())
}

fn print_documents(documents: &Value, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_documents_table(documents)),
        OutputFormat::Json => println!("{}", render_json(documents)?),
        OutputFormat::Csv => {
            warn!("CSV output for records not implemented, using JSON");
            println!("{}", render_json(documents)?);
        }
    }
    Ok(())
}
