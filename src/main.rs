use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use itertools::Itertools;
use pagefx::{
    effects::ScrollSpy,
    headless::{ScheduledScroll, Trace},
    logging::{self, LogTarget},
    presets,
    terminal::TerminalHost,
    SiteConfig, StopHandle,
};
use std::{path::PathBuf, time::Duration};

/// Typing animation and scroll-spy effects for single page sites.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the effects interactively in the terminal (the default).
    Run {
        #[command(flatten)]
        source: ConfigSource,

        /// Write logs to this file.
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Run the effects on a virtual clock and print every page change.
    Trace {
        #[command(flatten)]
        source: ConfigSource,

        /// How much virtual time to run for.
        #[arg(long, default_value_t = 10_000)]
        duration_ms: u64,

        /// Scroll to an offset at a point in time, as `<millis>:<offset>`. May be repeated.
        #[arg(long = "scroll", value_parser = ScheduledScroll::parse)]
        scrolls: Vec<ScheduledScroll>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the section the scroll spy considers active at a scroll offset.
    Spy {
        #[command(flatten)]
        source: ConfigSource,

        #[arg(long, allow_hyphen_values = true)]
        offset: f64,
    },

    /// Validate a config and print a summary of it.
    Check {
        #[command(flatten)]
        source: ConfigSource,
    },

    /// List the built-in presets.
    Presets,

    /// Print the JSON schema of the config file.
    #[cfg(feature = "json-schema")]
    Schema,
}

#[derive(Args, Default)]
struct ConfigSource {
    /// The config file to use.
    #[arg(short, long, env = "PAGEFX_CONFIG")]
    config: Option<PathBuf>,

    /// The built-in preset to use when no config file is found.
    #[arg(short, long)]
    preset: Option<String>,
}

impl ConfigSource {
    /// Resolve the config: an explicit file, then the user's config file, then a preset.
    fn load(&self) -> anyhow::Result<SiteConfig> {
        if let Some(path) = &self.config {
            if self.preset.is_some() {
                bail!("--config and --preset can't be used together");
            }
            return SiteConfig::load(path).with_context(|| format!("loading config from {}", path.display()));
        }
        if let Some(name) = &self.preset {
            return Ok(presets::load(name)?);
        }
        if let Some(path) = SiteConfig::default_path().filter(|path| path.exists()) {
            tracing::info!("using config file {}", path.display());
            return SiteConfig::load(&path).with_context(|| format!("loading config from {}", path.display()));
        }
        Ok(presets::load(presets::DEFAULT_PRESET)?)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn run(source: ConfigSource, log_file: Option<PathBuf>) -> anyhow::Result<()> {
    let target = log_file.map(LogTarget::File).unwrap_or(LogTarget::Disabled);
    logging::init(target)?;
    let config = source.load()?;
    TerminalHost::new(config, StopHandle::new()).run().context("running terminal host")
}

fn trace(source: ConfigSource, duration: Duration, scrolls: Vec<ScheduledScroll>, format: OutputFormat) -> anyhow::Result<()> {
    let config = source.load()?;
    let trace = Trace::run(&config, duration, &scrolls);
    match format {
        OutputFormat::Text => println!("{}", trace.to_text()),
        OutputFormat::Json => println!("{}", trace.to_json()?),
    }
    Ok(())
}

fn spy(source: ConfigSource, offset: f64) -> anyhow::Result<()> {
    let config = source.load()?;
    let spy = ScrollSpy::new(config.scroll_spy.bias);
    let reference = spy.reference_point(offset);
    match spy.active_section(&config.page.sections, offset) {
        Some(section) => println!("{} (reference point {reference})", section.id),
        None => println!("no section at reference point {reference}"),
    }
    Ok(())
}

fn check(source: ConfigSource) -> anyhow::Result<()> {
    let config = source.load()?;
    let typing = &config.typing;
    println!("mode:      {}", typing.mode);
    println!("phrases:   {}", typing.phrases.iter().map(|phrase| format!("{phrase:?}")).join(", "));
    println!("targets:   {}", typing.targets().join(", "));
    println!(
        "timings:   type {}ms, delete {}ms, pause {}ms, initial delay {}ms",
        typing.type_interval_ms, typing.delete_interval_ms, typing.pause_ms, typing.initial_delay_ms
    );
    println!("cursor:    {} every {}ms, {}", typing.cursor.target, typing.cursor.interval_ms, typing.cursor.start);
    println!("bias:      {}", config.scroll_spy.bias);
    println!("sections:  {}", config.page.sections.iter().map(|section| &section.id).join(", "));
    for target in typing.targets().iter().chain([&typing.cursor.target]) {
        if !config.page.elements.contains(target) {
            println!("warning:   element '{target}' is not on the page, its effect won't run");
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Run { source: ConfigSource::default(), log_file: None });
    if !matches!(command, Command::Run { .. }) {
        logging::init(LogTarget::Stderr)?;
    }
    match command {
        Command::Run { source, log_file } => run(source, log_file),
        Command::Trace { source, duration_ms, scrolls, format } => {
            trace(source, Duration::from_millis(duration_ms), scrolls, format)
        }
        Command::Spy { source, offset } => spy(source, offset),
        Command::Check { source } => check(source),
        Command::Presets => {
            for name in presets::names() {
                let marker = if name == presets::DEFAULT_PRESET { " (default)" } else { "" };
                println!("{name}{marker}");
            }
            Ok(())
        }
        #[cfg(feature = "json-schema")]
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&SiteConfig::json_schema())?);
            Ok(())
        }
    }
}
