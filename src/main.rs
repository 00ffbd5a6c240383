/* 3rd party libraries */
use clap::{Arg, ArgMatches, Command as Cli};
use crossbeam_channel as cbc;
use log::{error, info};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::Builder;

/* Custom libraries */
use lift_sim::config::{self, Config};
use lift_sim::console::viewer::{filter_records, render_table, summarize};
use lift_sim::console::{spawn_input_reader, Console, FloorFilter};
use lift_sim::coordinator::Coordinator;
use lift_sim::database::export::default_export_name;
use lift_sim::database::{export_csv, LogStore};
use lift_sim::elevator::ElevatorFSM;
use lift_sim::log_bridge::{LogBridge, LogCompletion};
use lift_sim::shared::{Command, DisplayUpdate};
use lift_sim::unwrap_or_exit;

fn cli() -> Cli<'static> {
    Cli::new("lift-sim")
        .about("Two-floor elevator simulator with a persistent operation log")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .takes_value(true)
                .default_value("config.toml")
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging"),
        )
        .subcommand(
            Cli::new("logs")
                .about("Print the operation log, newest first")
                .arg(floor_arg())
                .arg(search_arg())
                .arg(Arg::new("json").long("json").help("Print records as JSON")),
        )
        .subcommand(
            Cli::new("export")
                .about("Export the operation log as CSV")
                .arg(Arg::new("path").index(1).help("Output file"))
                .arg(floor_arg())
                .arg(search_arg()),
        )
        .subcommand(
            Cli::new("clear")
                .about("Delete every entry in the operation log")
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .help("Skip the confirmation prompt"),
                ),
        )
}

fn floor_arg() -> Arg<'static> {
    Arg::new("floor")
        .long("floor")
        .takes_value(true)
        .possible_values(["1", "2"])
        .help("Only include entries for this floor")
}

fn search_arg() -> Arg<'static> {
    Arg::new("search")
        .long("search")
        .takes_value(true)
        .help("Case-insensitive text to look for")
}

fn floor_filter(args: &ArgMatches) -> FloorFilter {
    match args.value_of("floor") {
        Some("1") => FloorFilter::Floor(1),
        Some("2") => FloorFilter::Floor(2),
        _ => FloorFilter::All,
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

/* Main */
fn main() -> std::io::Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.is_present("verbose"));

    // Load the configuration
    let config_path = matches.value_of("config").unwrap_or("config.toml");
    let config = unwrap_or_exit!(config::load_config(Path::new(config_path)));

    // Open the log store
    let db_path = config.database.resolve_path();
    let store = Arc::new(unwrap_or_exit!(LogStore::open(&db_path)));
    info!("Log store opened at {}", db_path.display());

    match matches.subcommand() {
        Some(("logs", sub)) => print_logs(&store, sub),
        Some(("export", sub)) => export_logs(&store, sub),
        Some(("clear", sub)) => clear_logs(&store, sub),
        _ => run_simulation(config, store),
    }
}

fn run_simulation(config: Config, store: Arc<LogStore>) -> std::io::Result<()> {
    // Initialize channels
    let (command_tx, command_rx) = cbc::unbounded::<Command>();
    let (display_tx, display_rx) = cbc::unbounded::<DisplayUpdate>();
    let (controller_log_tx, controller_log_rx) = cbc::unbounded::<LogCompletion>();
    let (front_end_log_tx, front_end_log_rx) = cbc::unbounded::<LogCompletion>();
    let (input_tx, input_rx) = cbc::unbounded::<String>();

    // Start the coordinator
    let fsm = unwrap_or_exit!(ElevatorFSM::new(config.elevator.initial_floor));
    let controller_bridge = LogBridge::new("controller", store.clone(), controller_log_tx);
    let coordinator = Coordinator::new(
        fsm,
        config.timing.clone(),
        controller_bridge,
        command_rx,
        controller_log_rx,
        display_tx,
    );

    let coordinator_thread = Builder::new()
        .name("coordinator".into())
        .spawn(move || coordinator.run())?;

    // Start the front-end
    spawn_input_reader(input_tx)?;

    let front_end_bridge = LogBridge::new("front_end", store.clone(), front_end_log_tx);
    let console = Console::new(
        store,
        front_end_bridge,
        config.elevator.initial_floor,
        command_tx,
        input_rx,
        display_rx,
        front_end_log_rx,
    );
    console.run();

    if coordinator_thread.join().is_err() {
        error!("Coordinator thread panicked");
    }
    info!("Simulation stopped");
    Ok(())
}

fn print_logs(store: &LogStore, args: &ArgMatches) -> std::io::Result<()> {
    let records = unwrap_or_exit!(store.fetch_all());
    let shown = filter_records(&records, floor_filter(args), args.value_of("search"));

    if args.is_present("json") {
        let json = unwrap_or_exit!(serde_json::to_string_pretty(&shown));
        println!("{}", json);
        return Ok(());
    }

    let summary = summarize(&records);
    print!("{}", render_table(&shown));
    println!(
        "Showing {} of {} | Floor 1: {} | Floor 2: {}",
        shown.len(),
        summary.total,
        summary.floor_1,
        summary.floor_2
    );
    Ok(())
}

fn export_logs(store: &LogStore, args: &ArgMatches) -> std::io::Result<()> {
    let records = filter_records(
        &unwrap_or_exit!(store.fetch_all()),
        floor_filter(args),
        args.value_of("search"),
    );
    if records.is_empty() {
        println!("No data to export.");
        return Ok(());
    }

    let path = match args.value_of("path") {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(default_export_name(&chrono::Local::now().naive_local())),
    };
    let count = unwrap_or_exit!(export_csv(&records, &path));
    println!("Exported {} records successfully: {}", count, path.display());
    Ok(())
}

fn clear_logs(store: &LogStore, args: &ArgMatches) -> std::io::Result<()> {
    if !args.is_present("yes") {
        print!("Are you sure you want to delete ALL log entries? This cannot be undone. [y/N] ");
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("Clear cancelled.");
            return Ok(());
        }
    }

    let removed = unwrap_or_exit!(store.clear_all());
    println!("All logs have been cleared ({} removed).", removed);
    Ok(())
}
