//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use tracing::Level;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Target used by [`Logger::stage`](super::Logger::stage).
pub(super) const STAGE_TARGET: &str = "dotlink::stage";
/// Target used by [`Logger::dry_run`](super::Logger::dry_run).
pub(super) const DRY_RUN_TARGET: &str = "dotlink::dry_run";

/// How an event is rendered, derived from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Stage,
    DryRun,
    Error,
    Warn,
    Info,
    Debug,
}

impl Kind {
    fn of(event: &tracing::Event<'_>) -> Self {
        let metadata = event.metadata();
        match (*metadata.level(), metadata.target()) {
            (Level::ERROR, _) => Self::Error,
            (Level::WARN, _) => Self::Warn,
            (Level::INFO, STAGE_TARGET) => Self::Stage,
            (Level::INFO, DRY_RUN_TARGET) => Self::DryRun,
            (Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// The `message` field of an event.
fn message(event: &tracing::Event<'_>) -> String {
    #[derive(Default)]
    struct Extract(String);

    impl tracing::field::Visit for Extract {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }

        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            if field.name() == "message" {
                self.0 = value.to_string();
            }
        }
    }

    let mut extract = Extract::default();
    event.record(&mut extract);
    extract.0
}

/// Appends every event to the persistent log file, timestamped and with
/// ANSI codes stripped.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate the log file for `command`, write a run header, and open it
    /// for appending.
    ///
    /// Returns `None` if the cache directory or file is unavailable; the run
    /// then logs to the console only.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let version =
            option_env!("DOTLINK_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let rule = "=".repeat(42);
        let header = format!(
            "{rule}\ndotlink {version} {command} {}\n{rule}\n",
            format_utc_datetime()
        );
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }

    fn line(kind: Kind, msg: &str) -> String {
        let ts = format_utc_time();
        let tag = match kind {
            Kind::Stage => return format!("[{ts}] ==> {msg}"),
            Kind::DryRun => "[dry run] ",
            Kind::Error => "[error] ",
            Kind::Warn => "[warn] ",
            Kind::Debug => "[debug] ",
            Kind::Info => "",
        };
        format!("[{ts}]     {tag}{msg}")
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let line = Self::line(Kind::of(event), &strip_ansi(&message(event)));
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// Console format: colored level tags, stage arrows, dimmed debug output.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let msg = message(event);
        match Kind::of(event) {
            Kind::Error => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            Kind::Warn => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            Kind::Stage => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Kind::DryRun => writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
            Kind::Info => writeln!(writer, "  {msg}"),
            Kind::Debug => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Warnings and errors go to stderr, everything else to stdout; `debug` is
/// shown only with `verbose`. The file layer under
/// `$XDG_CACHE_HOME/dotlink/<command>.log` always records `debug` and above.
/// Call once at startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
