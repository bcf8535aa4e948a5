use ctrlc::set_handler;
use tracing_subscriber::EnvFilter;

pub mod controller;
pub mod intake;
pub mod models;
pub mod render;
pub mod search;

/// Set up logging and signal handling, resolve the backend config, and
/// build the page with each of its components.
pub fn init(
    url: Option<String>,
    config_path: Option<String>,
) -> Result<controller::PageController, Box<dyn std::error::Error>> {
    // Logs go to stderr so they don't interleave with the prompt.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    // Catching signals for exit. The prompt handles its own interrupts, so
    // this only fires while a search is in flight.
    set_handler(|| std::process::exit(0))?;

    let config = models::config::ClientConfig::resolve(url, config_path)?;
    tracing::info!(base_url = config.base_url(), "using search backend");

    let intake = intake::FileIntake::new();
    let client = search::SearchClient::new(&config)?;
    let renderer = render::ResultsRenderer::new();
    Ok(controller::PageController::new(intake, client, renderer))
}
