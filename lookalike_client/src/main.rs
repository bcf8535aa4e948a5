use lookalike_client::{
    controller::{PageController, SubmitOutcome, SubmitState},
    intake::{FileCandidate, IntakeSource},
    models::repl::Command,
};
use pico_args::Arguments;
use rustyline::{
    Cmd, ConditionalEventHandler, DefaultEditor, Event, EventContext, EventHandler, KeyEvent,
    error::ReadlineError,
};
use std::thread;
use tokio::sync::mpsc::{Receiver, Sender};
use tracing::{info, warn};

const HISTORY_FILE: &str = ".lookalike_history";

struct InterruptEventHandler;

impl ConditionalEventHandler for InterruptEventHandler {
    fn handle(
        &self,
        _: &Event,
        _: rustyline::RepeatCount,
        _: bool,
        ctx: &EventContext,
    ) -> Option<rustyline::Cmd> {
        if ctx.line().is_empty() {
            Some(Cmd::EndOfFile)
        } else {
            Some(Cmd::Interrupt)
        }
    }
}

/// User REPL loop. Reads one command at a time and then waits until the
/// main loop has finished handling it before prompting again, so nothing
/// can be typed in while a search is in flight.
fn repl(mut rx: Receiver<()>, tx: Sender<Command>) -> Result<(), ReadlineError> {
    let mut rl = DefaultEditor::new()?;
    let interrupt_event_handler = Box::new(InterruptEventHandler);
    rl.bind_sequence(
        KeyEvent::ctrl('c'),
        EventHandler::Conditional(interrupt_event_handler),
    );
    let history_path = dirs_next::home_dir().map(|dir| dir.join(HISTORY_FILE));
    if let Some(path) = &history_path {
        // No history yet on first run.
        let _ = rl.load_history(path);
    }

    while rx.blocking_recv().is_some() {
        loop {
            match rl.readline(">> ") {
                Ok(input) => {
                    if !input.trim().is_empty() {
                        rl.add_history_entry(input.as_str())?;
                        if let Some(path) = &history_path {
                            if let Err(err) = rl.save_history(path) {
                                warn!("failed to save history: {err}");
                            }
                        }
                    }
                    tx.blocking_send(Command::parse(&input))
                        .expect("command channel closed");
                    break;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => {
                    tx.blocking_send(Command::Quit)
                        .expect("command channel closed");
                    return Ok(());
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn status(controller: &PageController, preview_ready: bool) -> String {
    let file = match controller.intake().get_selected_file() {
        Some(file) => {
            let preview = if preview_ready { "previewed" } else { "loading preview" };
            format!(
                "{} ({}, {} bytes, {preview})",
                file.file_name,
                file.media_type,
                file.bytes.len()
            )
        }
        None => "none (drop a path here or use :open <path>)".to_string(),
    };
    let search = match controller.submit_state() {
        SubmitState::Idle { enabled: true } => "ready",
        SubmitState::Idle { enabled: false } => "disabled",
        SubmitState::Submitting => "searching",
    };
    format!(
        "Image:  {file}\nType:   {}\nLayer:  {}\nSearch: {search}",
        controller.garment_type(),
        controller.garment_layer()
    )
}

async fn select(controller: &mut PageController, path: String, dropped: bool) {
    let candidate = match FileCandidate::from_path(&path).await {
        Ok(candidate) => candidate,
        Err(err) => {
            println!("Error: {err}");
            return;
        }
    };
    let source = if dropped {
        IntakeSource::Drop(vec![candidate])
    } else {
        IntakeSource::Picker(vec![candidate])
    };
    // Non-images are ignored without a message.
    if let Some(preview) = controller.select_file(source) {
        if let Err(err) = preview.await {
            warn!("preview failed: {err}");
        }
        let preview_ready = controller.intake().preview().await.visible;
        println!("{}", status(controller, preview_ready));
    }
}

async fn handle(controller: &mut PageController, command: Command) {
    match command {
        Command::Open(path) => select(controller, path, false).await,
        Command::Drop(path) => select(controller, path, true).await,
        Command::Type(value) => {
            controller.set_garment_type(value);
            println!("Search: {}", if controller.can_search() { "ready" } else { "disabled" });
        }
        Command::Layer(value) => {
            controller.set_garment_layer(value);
            println!("Search: {}", if controller.can_search() { "ready" } else { "disabled" });
        }
        Command::Search => {
            match controller.submit().await {
                SubmitOutcome::Rendered(_) => print!("{}", controller.renderer().view()),
                SubmitOutcome::Malformed => println!("No results to show."),
                SubmitOutcome::Failed | SubmitOutcome::Incomplete => {}
            }
        }
        Command::Clear => controller.clear_results(),
        Command::Status => {
            let preview_ready = controller.intake().preview().await.visible;
            println!("{}", status(controller, preview_ready));
        }
        Command::Help => println!("{COMMANDS}"),
        Command::Unknown(name) => println!("Unknown command :{name}, try :help"),
        Command::Empty | Command::Quit => {}
    }
}

const COMMANDS: &str = "\
COMMANDS:
  <path>             Drop an image onto the search
  :open <path>       Pick an image to search with
  :type <text>       Set the garment type (e.g. jacket)
  :layer <text>      Set the garment layer (e.g. outer)
  :search            Find visually-similar garments
  :clear             Clear the results
  :status            Show the current inputs
  :help              Show this message
  :quit              Exit";

const HELP: &str = "\
Find garments that look like yours

USAGE:
  lookalike_client [OPTIONS]

OPTIONS:
  --url      Search backend URL     [default: http://localhost:8080]
  --config   JSON config file path

ENVIRONMENT:
  LOOKALIKE_URL            Search backend URL
  LOOKALIKE_CONFIG_PATH    JSON config file path
  RUST_LOG                 Log filter (e.g. info)

FLAGS:
  -h, --help    Print help information
";

struct Args {
    url: Option<String>,
    config_path: Option<String>,
}

/// Minimal REPL
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        println!("{}", HELP);
        std::process::exit(0);
    }

    let args = Args {
        url: pargs.opt_value_from_str("--url")?,
        config_path: pargs.opt_value_from_str("--config")?,
    };
    let Args { url, config_path } = args;
    let mut controller = lookalike_client::init(url, config_path)?;

    // Show the loader whenever a search goes in flight.
    let mut page_state = controller.subscribe();
    tokio::spawn(async move {
        let mut was_loading = false;
        while page_state.changed().await.is_ok() {
            let loading = page_state.borrow_and_update().loading;
            if loading && !was_loading {
                println!("Searching...");
            }
            was_loading = loading;
        }
    });

    match controller.client().health().await {
        Ok(true) => info!("search backend is up"),
        Ok(false) => warn!("search backend reported it isn't healthy"),
        Err(err) => warn!("search backend unreachable: {err}"),
    }

    // Channels between the prompt thread and this loop.
    let (start_repl_sender, start_repl_receiver) = tokio::sync::mpsc::channel(1);
    let (command_sender, mut command_receiver): (Sender<Command>, Receiver<Command>) =
        tokio::sync::mpsc::channel(1);
    thread::spawn(|| repl(start_repl_receiver, command_sender));

    println!("{COMMANDS}");
    start_repl_sender.send(()).await?;

    // Main loop.
    while let Some(command) = command_receiver.recv().await {
        if command == Command::Quit {
            break;
        }
        handle(&mut controller, command).await;
        for alert in controller.take_alerts() {
            println!("Alert: {alert}");
        }
        start_repl_sender.send(()).await?;
    }
    Ok(())
}
