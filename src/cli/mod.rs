// FILE: src/cli/mod.rs

mod config;
mod handlers;

use crate::error::Result;
use crate::{CompilerOptions, CssFormat};
use clap::{Arg, ArgAction, Command};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct EnhancedCli {
    config: config::ConfigFile,
    start_time: Instant,
}

impl Default for EnhancedCli {
    fn default() -> Self {
        Self::new()
    }
}

impl EnhancedCli {
    pub fn new() -> Self {
        Self {
            config: config::ConfigFile::default(),
            start_time: Instant::now(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.start_time = Instant::now();
        let matches = self.build_cli().get_matches();

        self.setup_logging(matches.get_count("verbose"))?;

        if let Some(config_path) = matches.get_one::<String>("config") {
            self.config = config::load(config_path)?;
        }

        let result = match matches.subcommand() {
            Some(("compile", sub_matches)) => handlers::handle_compile_command(self, sub_matches),
            Some(("check", sub_matches)) => handlers::handle_check_command(sub_matches),
            Some(("modules", sub_matches)) => handlers::handle_modules_command(sub_matches),
            Some(("keyframes", sub_matches)) => handlers::handle_keyframes_command(self, sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        };

        log::debug!("Finished in {}ms", self.start_time.elapsed().as_millis());
        result
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path (.json or .toml)")
                    .global(true)
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .global(true)
                    .action(ArgAction::Count),
            )
            .subcommand(
                Command::new("compile")
                    .about("Compile a page document to a stylesheet")
                    .arg(Arg::new("input").help("Input page JSON file").required(true).index(1))
                    .arg(Arg::new("output").short('o').long("output").value_name("FILE").help("Output CSS file"))
                    .arg(Arg::new("compact").long("compact").help("Write compact CSS without optional whitespace").action(ArgAction::SetTrue))
                    .arg(Arg::new("keyframes").short('k').long("keyframes").help("Emit the full keyframe library at the top of the page").action(ArgAction::SetTrue))
                    .arg(Arg::new("prefix").long("prefix").value_name("PREFIX").help("Animation prefix for keyframes and data attributes"))
                    .arg(Arg::new("debug").short('d').long("debug").help("Enable debug mode with per-module logging").action(ArgAction::SetTrue))
                    .arg(Arg::new("stats").long("stats").help("Show detailed compilation statistics").action(ArgAction::SetTrue))
                    .arg(Arg::new("watch").short('w').long("watch").help("Watch for file changes and recompile").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("check")
                    .about("Check page documents for parse errors and unknown module types")
                    .arg(Arg::new("input").help("Input page file or directory").required(true).index(1))
                    .arg(Arg::new("recursive").short('r').long("recursive").help("Check all page files in directory recursively").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("modules")
                    .about("List registered module types")
                    .arg(Arg::new("json").long("json").help("Print full descriptors as JSON").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("keyframes")
                    .about("Print the keyframe library")
                    .arg(Arg::new("compact").long("compact").help("Write compact CSS").action(ArgAction::SetTrue))
                    .arg(Arg::new("prefix").long("prefix").value_name("PREFIX").help("Keyframe name prefix")),
            )
    }

    fn setup_logging(&self, verbose_count: u8) -> Result<()> {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .format_timestamp_secs()
            .init();
        Ok(())
    }

    /// Options from the config file, overridden by command-line flags.
    pub fn build_compiler_options(&self, matches: &clap::ArgMatches) -> Result<CompilerOptions> {
        let mut options = CompilerOptions::default();

        if let Some(prefix) = &self.config.animation_prefix {
            options.animation_prefix = prefix.clone();
        }
        if let Some(prefix) = &self.config.id_prefix {
            options.id_prefix = prefix.clone();
        }
        if let Some(prefix) = flag_value(matches, "prefix") {
            options.animation_prefix = prefix;
        }

        let compact = flag(matches, "compact") || self.config.compact_output.unwrap_or(false);
        if compact {
            options.format = CssFormat::Compact;
        }
        options.include_keyframes =
            flag(matches, "keyframes") || self.config.include_keyframes.unwrap_or(false);
        options.debug_mode = flag(matches, "debug");

        Ok(options)
    }

    /// `-o` if given, else `<output_directory>/<stem>.css`, else next to the input.
    pub fn output_path(&self, input_path: &str, matches: &clap::ArgMatches) -> PathBuf {
        if let Some(output) = matches.get_one::<String>("output") {
            return PathBuf::from(output);
        }
        let input = Path::new(input_path);
        match &self.config.output_directory {
            Some(dir) => {
                let file_name = input.with_extension("css");
                let file_name = file_name.file_name().unwrap_or_default();
                Path::new(dir).join(file_name)
            }
            None => input.with_extension("css"),
        }
    }
}

// Subcommands share option builders but not every flag.
fn flag(matches: &clap::ArgMatches, id: &str) -> bool {
    matches.try_get_one::<bool>(id).ok().flatten().copied().unwrap_or(false)
}

fn flag_value(matches: &clap::ArgMatches, id: &str) -> Option<String> {
    matches.try_get_one::<String>(id).ok().flatten().cloned()
}
