//! Render and watch command handlers

use anyhow::{Context, Result, bail};
use clap::Args;
use fluxgraph::config::{Config, ConfigLoader};
use fluxgraph::graph::{
    Direction, GraphSession, HtmlLabel, JsonRenderAdapter, LabelRenderer, PlainLabel,
    SessionEvent, UpdateOutcome,
};
use fluxgraph::watcher::{self, FileSource, Poller, load_snapshot};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;

/// Arguments for a one-shot render
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Snapshot file (JSON, or YAML by extension)
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// Zoom level in percent
    #[arg(long, short = 'z')]
    pub zoom: Option<u32>,

    /// Layout direction (lr or tb)
    #[arg(long, value_parser = parse_direction)]
    pub direction: Option<Direction>,

    /// Plain text labels instead of HTML markup
    #[arg(long)]
    pub plain: bool,
}

/// Arguments for a polling watch
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Snapshot file, re-read on every tick
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// Poll interval in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Layout direction (lr or tb)
    #[arg(long, value_parser = parse_direction)]
    pub direction: Option<Direction>,

    /// Plain text labels instead of HTML markup
    #[arg(long)]
    pub plain: bool,
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    Direction::parse_optional(s).ok_or_else(|| format!("unknown direction '{}' (use lr or tb)", s))
}

fn new_session(config: &Config, direction: Option<Direction>) -> GraphSession {
    let mut options = config.layout.to_options();
    if let Some(direction) = direction {
        options.direction = direction;
    }
    GraphSession::new(options, config.viewport.to_settings())
}

fn labels_for(config: &Config, plain: bool) -> Result<Box<dyn LabelRenderer>> {
    if plain {
        return Ok(Box::new(PlainLabel));
    }
    let palette = config
        .palette
        .to_palette()
        .context("Invalid palette colors in configuration")?;
    Ok(Box::new(HtmlLabel::new(palette)))
}

/// Render one snapshot to a single pretty-printed frame on stdout
pub fn handle_render(args: RenderArgs, config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(config_path).context("Failed to load configuration")?;
    let snapshot = load_snapshot(&args.input)?;
    let labels = labels_for(&config, args.plain)?;

    let mut session = new_session(&config, args.direction);
    if session.apply_snapshot(&snapshot) == UpdateOutcome::KeptPrevious {
        bail!("Failed to lay out graph for {}", snapshot.root.name);
    }
    if let Some(zoom) = args.zoom {
        session.on_zoom_change(zoom);
    }

    let stdout = std::io::stdout();
    let mut adapter = JsonRenderAdapter::pretty(stdout.lock());
    session.render(&mut adapter, labels.as_ref())
}

/// A line typed on stdin during `watch`
#[derive(Debug, Clone, PartialEq)]
pub enum StdinCommand {
    Zoom(u32),
    Quit,
}

impl StdinCommand {
    /// Parse one input line; blank lines yield `None`
    pub fn parse(line: &str) -> Option<Result<Self>> {
        let mut parts = line.split_whitespace();
        let command = parts.next()?;
        Some(match (command, parts.next(), parts.next()) {
            ("quit" | "q" | "exit", None, None) => Ok(StdinCommand::Quit),
            ("zoom", Some(value), None) => value
                .parse::<u32>()
                .map(StdinCommand::Zoom)
                .with_context(|| format!("Invalid zoom value '{}'", value)),
            _ => Err(anyhow::anyhow!("Unknown command '{}' (use 'zoom N' or 'quit')", line.trim())),
        })
    }

    fn into_event(self) -> SessionEvent {
        match self {
            StdinCommand::Zoom(zoom) => SessionEvent::Zoom(zoom),
            StdinCommand::Quit => SessionEvent::Teardown,
        }
    }
}

/// Forward commands read line by line from `reader` into the event channel
///
/// Runs on its own OS thread. The thread ends on EOF, on `quit`, or once the
/// session has dropped its receiver.
fn spawn_command_reader<R>(
    reader: R,
    tx: mpsc::UnboundedSender<SessionEvent>,
) -> thread::JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    break;
                }
            };
            match StdinCommand::parse(&line) {
                None => continue,
                Some(Ok(command)) => {
                    let quit = command == StdinCommand::Quit;
                    if tx.send(command.into_event()).is_err() || quit {
                        break;
                    }
                }
                Some(Err(e)) => eprintln!("{:#}", e),
            }
        }
    })
}

/// Poll a snapshot file and stream frames until quit or Ctrl-C
pub async fn handle_watch(args: WatchArgs, config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(config_path).context("Failed to load configuration")?;
    let labels = labels_for(&config, args.plain)?;
    let interval_ms = args.interval_ms.unwrap_or(config.poll.interval_ms);
    if interval_ms == 0 {
        bail!("Poll interval must be greater than zero");
    }

    let mut session = new_session(&config, args.direction);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let source = Arc::new(FileSource::new(&args.input));
    let poller = Poller::spawn(source, Duration::from_millis(interval_ms), tx.clone());

    // Blocking reads on a detached thread never hold up runtime shutdown
    spawn_command_reader(std::io::BufReader::new(std::io::stdin()), tx.clone());

    let signal_tx = tx;
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("Interrupt received, tearing down");
            let _ = signal_tx.send(SessionEvent::Teardown);
        }
    });

    let mut adapter = JsonRenderAdapter::lines(std::io::stdout());
    let result = watcher::drive(&mut session, &mut rx, &mut adapter, labels.as_ref()).await;

    poller.stop().await;
    signal_task.abort();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::sync::mpsc as std_mpsc;
    use std::time::Instant;

    /// Input that blocks until a chunk arrives, with EOF once the sender is gone
    struct GatedInput(std_mpsc::Receiver<Vec<u8>>);

    impl Read for GatedInput {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.0.recv() {
                Ok(chunk) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    Ok(n)
                }
                Err(_) => Ok(0),
            }
        }
    }

    #[test]
    fn test_parse_stdin_commands() {
        assert_eq!(
            StdinCommand::parse("zoom 40").unwrap().unwrap(),
            StdinCommand::Zoom(40)
        );
        assert_eq!(
            StdinCommand::parse("  quit ").unwrap().unwrap(),
            StdinCommand::Quit
        );
        assert!(StdinCommand::parse("   ").is_none());
        assert!(StdinCommand::parse("zoom").unwrap().is_err());
        assert!(StdinCommand::parse("zoom -3").unwrap().is_err());
        assert!(StdinCommand::parse("pan 10").unwrap().is_err());
    }

    #[test]
    fn test_parse_direction_flag() {
        assert_eq!(parse_direction("tb"), Ok(Direction::TopToBottom));
        assert!(parse_direction("diagonal").is_err());
    }

    #[test]
    fn test_new_session_starts_loading() {
        let config = Config::default();
        let session = new_session(&config, Some(Direction::TopToBottom));
        assert!(session.graph().is_none());
        assert!(session.show_loading());
    }

    #[test]
    fn test_command_reader_forwards_zoom_and_quit() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let input = std::io::Cursor::new("zoom 30\n\nbogus\nquit\nzoom 90\n");

        spawn_command_reader(input, tx).join().unwrap();

        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Zoom(30));
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Teardown);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_teardown_while_reader_is_blocked() {
        let (gate_tx, gate_rx) = std_mpsc::channel::<Vec<u8>>();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        let started = Instant::now();

        let reader = runtime.block_on(async move {
            let mut session = new_session(&Config::default(), None);
            let (tx, mut rx) = mpsc::unbounded_channel();
            let reader =
                spawn_command_reader(std::io::BufReader::new(GatedInput(gate_rx)), tx.clone());

            tx.send(SessionEvent::Teardown).unwrap();
            let mut adapter = JsonRenderAdapter::lines(Vec::new());
            watcher::drive(&mut session, &mut rx, &mut adapter, &PlainLabel)
                .await
                .unwrap();
            reader
        });
        drop(runtime);

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!reader.is_finished());

        // The session is gone, so the next line ends the reader
        gate_tx.send(b"zoom 10\n".to_vec()).unwrap();
        reader.join().unwrap();
    }
}
