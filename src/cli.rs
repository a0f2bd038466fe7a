// src/cli.rs
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::options::EdenConfig;
use crate::progress::Progress;
use crate::runner::{Concern, Runner};

#[derive(Parser, Debug)]
#[command(name = "eden", version, about = "Collect, merge and score U.S. places")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file; a missing file means defaults.
    #[arg(long, global = true, default_value = "eden.toml")]
    pub config: PathBuf,

    /// Directory holding `data/` (overrides `root` from the config file).
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build (or resume) the place catalog.
    Places,
    /// Collect one concern into data/<concern>.csv.
    Collect {
        #[arg(value_parser = parse_concern)]
        concern: Concern,
    },
    /// Collect and merge every master stage.
    Build,
    /// Normalize features and write EdenScore.
    Score,
    /// Everything: places, counties, build, score.
    Run,
    /// Queue the errored cells of a concern for the next collection.
    Retry {
        #[arg(value_parser = parse_concern)]
        concern: Concern,
    },
}

fn parse_concern(s: &str) -> Result<Concern, String> {
    Concern::from_name(s).ok_or_else(|| {
        let names: Vec<&str> = Concern::ALL.iter().map(|c| c.name()).collect();
        format!("unknown concern {s:?}; expected one of {}", names.join(", "))
    })
}

const BAR_TEMPLATE: &str = "{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len} ({eta})";

/// One progress bar per concern on stderr; status and failure lines print above it.
struct CliProgress {
    bar: ProgressBar,
    concern: String,
    done: usize,
    failed: usize,
}

impl CliProgress {
    fn new() -> Self {
        Self { bar: ProgressBar::new(0), concern: String::new(), done: 0, failed: 0 }
    }

    // A hidden bar (stderr not a terminal) swallows `println`.
    fn say(&self, line: &str) {
        if self.bar.is_hidden() {
            eprintln!("{line}");
        } else {
            self.bar.println(line);
        }
    }
}

impl Progress for CliProgress {
    fn begin(&mut self, concern: &str, total: usize) {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message(concern.to_string());
        self.bar = bar;
        self.concern = concern.to_string();
        self.done = 0;
        self.failed = 0;
    }

    fn log(&mut self, msg: &str) {
        self.say(msg);
    }

    fn item_done(&mut self, _label: &str) {
        self.done += 1;
        self.bar.inc(1);
    }

    fn item_failed(&mut self, label: &str, error: &str) {
        self.failed += 1;
        self.say(&format!("{label} FAILED: {error}"));
        self.bar.inc(1);
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
        if self.done + self.failed > 0 {
            self.say(&format!("{}: {} collected, {} failed.", self.concern, self.done, self.failed));
        }
    }
}

pub fn run() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let mut config = EdenConfig::load(&cli.config)?;
    if let Some(root) = cli.root {
        config.root = root;
    }
    match cli.verbose {
        0 => {}
        1 => config.log.level = "debug".into(),
        _ => config.log.level = "trace".into(),
    }
    crate::log::init(&config.log)?;

    let runner = Runner::new(config);
    let mut progress = CliProgress::new();

    match cli.command {
        Command::Places => {
            let catalog = runner.places(&mut progress)?;
            println!("{} places.", catalog.len());
        }
        Command::Collect { concern } => {
            let table = runner.collect(concern, &mut progress)?;
            println!("{concern}: {} rows in {}.", table.len(), runner.store().final_path(concern.name()).display());
        }
        Command::Build => {
            let master = runner.build(&mut progress)?;
            println!("master: {} rows, {} columns.", master.len(), master.headers().len());
        }
        Command::Score => {
            let master = runner.score()?;
            println!("Scored {} places.", master.len());
        }
        Command::Run => {
            let master = runner.run_all(&mut progress)?;
            println!("Scored {} places.", master.len());
        }
        Command::Retry { concern } => {
            let n = runner.retry(concern)?;
            println!("{concern}: {n} cells queued for retry.");
        }
    }
    Ok(())
}
