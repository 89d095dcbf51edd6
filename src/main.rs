use std::path::PathBuf;

use clap::{Parser, Subcommand};
use egui::Vec2;
use log::{error, info};
use spindeck::{
    LoadState, SessionLoader, SessionSource,
    sessions::{
        sessionize::{DEFAULT_BREAK_HOURS, sessionize_file},
        summary::{EMPTY_MESSAGE, SummaryView},
    },
    ui::{AppConfig, ListeningHistoryApp},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the turntable and session summary window
    Show {
        /// Session file path or http(s) URL, overrides the config file
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Print the session summary to the terminal
    Summary {
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Group a recently-played history into a session file
    Sessionize {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long, default_value_t = DEFAULT_BREAK_HOURS)]
        break_hours: f64,
    },
}

fn resolve_source(app_config: &AppConfig, input: &Option<String>) -> SessionSource {
    SessionSource::from(input.as_deref().unwrap_or(&app_config.session_source))
}

fn show(input: &Option<String>) -> Result<(), eframe::Error> {
    let mut app_config = AppConfig::from_local_file().unwrap_or_default();
    let source = resolve_source(&app_config, input);
    app_config.session_source = source.to_string();

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_inner_size(Vec2::new(app_config.window_width, app_config.window_height))
        .with_min_inner_size(Vec2::new(640., 400.));

    eframe::run_native(
        "Spindeck",
        native_options,
        Box::new(|cc| Ok(Box::new(ListeningHistoryApp::new(app_config, source, cc)))),
    )
}

fn summary(input: &Option<String>) -> Result<(), String> {
    let app_config = AppConfig::from_local_file().unwrap_or_default();
    let source = resolve_source(&app_config, input);
    let mut loader = SessionLoader::spawn(source, app_config.fetch_timeout());

    let state: &LoadState = loader.wait();
    match SummaryView::local(state) {
        SummaryView::Rows(rows) => {
            for row in rows {
                println!("{row}");
            }
            Ok(())
        }
        SummaryView::Empty => {
            println!("{EMPTY_MESSAGE}");
            Ok(())
        }
        SummaryView::Error(message) => Err(message),
        // wait() only returns terminal states
        SummaryView::Loading => Err("session loader did not finish".to_string()),
    }
}

fn main() {
    colog::init();

    let cli = Args::parse();
    ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    })
    .unwrap_or_else(|e| error!("Could not set Ctrl-C handler: {}", e));

    let result = match &cli.command {
        Commands::Show { input } => {
            show(input).map_err(|e| format!("Could not start the user interface: {e}"))
        }
        Commands::Summary { input } => summary(input),
        Commands::Sessionize {
            input,
            output,
            break_hours,
        } => sessionize_file(input, output, *break_hours)
            .map(|count| info!("Wrote {} sessions to {:?}", count, output))
            .map_err(|e| e.to_string()),
    };

    if let Err(message) = result {
        error!("{}", message);
        std::process::exit(1);
    }
}
