use std::{
  io::{self, Read},
  path::{Path, PathBuf},
};

use clap::Parser;
use fitsim::{
  Config, SearchMode,
  config::DEFAULT_CONFIG_FILENAME,
  script::{self, Interpreter},
};
use log::LevelFilter;
use simple_logger::SimpleLogger;

#[derive(Parser, Debug)]
#[command(name = "fitsim")]
#[command(
  about = "Runs an allocation script against a simulated first-fit or best-fit memory.",
  version
)]
struct Args {
  #[arg(short, long, help = "Enable debug logging")]
  verbose: bool,

  #[arg(
    long,
    help = "Settings file (defaults to ./fitsim.toml when present)"
  )]
  config: Option<PathBuf>,

  #[arg(long, help = "Number of cells, overrides the settings file")]
  capacity: Option<usize>,

  #[arg(long, help = "`first-fit` or `best-fit`, overrides the settings file")]
  strategy: Option<SearchMode>,

  #[arg(help = "Script to run, read from stdin when omitted")]
  script: Option<PathBuf>,
}

fn load_config(args: &Args) -> fitsim::Result<Config> {
  let mut config = match &args.config {
    Some(path) => Config::load(path)?,
    None if Path::new(DEFAULT_CONFIG_FILENAME).is_file() => Config::load(DEFAULT_CONFIG_FILENAME)?,
    None => Config::default(),
  };
  if let Some(capacity) = args.capacity {
    config.memory.capacity = capacity;
  }
  if let Some(strategy) = args.strategy {
    config.memory.strategy = strategy;
  }
  config.validate()?;
  Ok(config)
}

fn main() -> anyhow::Result<()> {
  let args = Args::parse();

  SimpleLogger::new()
    .with_level(if args.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .init()?;

  let config = load_config(&args)?;
  let text = match &args.script {
    Some(path) => std::fs::read_to_string(path)?,
    None => {
      let mut text = String::new();
      io::stdin().read_to_string(&mut text)?;
      text
    }
  };
  let statements = script::parse(&text)?;

  let mut interpreter = Interpreter::new(config.build()?);
  let failures = interpreter.run(&statements, &mut io::stdout().lock())?;
  if failures > 0 {
    log::info!("{} of {} command(s) failed", failures, statements.len());
  }
  Ok(())
}
