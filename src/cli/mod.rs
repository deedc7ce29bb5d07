mod config;
mod handlers;

use crate::error::{Result, TranslateError};
use crate::{Target, TranslatorOptions};
use clap::{Arg, ArgAction, Command, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub struct Cli {
    config: config::ConfigFile,
}

impl Cli {
    pub fn new() -> Self {
        Self {
            config: config::ConfigFile::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let matches = self.build_cli().get_matches();

        if let Some(config_path) = matches.get_one::<String>("config") {
            self.config = config::load(config_path)?;
        }

        self.setup_logging(matches.get_count("verbose"));

        match matches.subcommand() {
            Some(("translate", sub_matches)) => handlers::handle_translate_command(self, sub_matches),
            Some(("check", sub_matches)) => handlers::handle_check_command(self, sub_matches),
            Some(("rules", sub_matches)) => handlers::handle_rules_command(self, sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        }
    }

    fn build_cli(&self) -> Command {
        let target = || {
            Arg::new("target")
                .short('t')
                .long("target")
                .value_parser(clap::value_parser!(Target))
                .help("Output platform")
        };
        let rules = || {
            Arg::new("rules")
                .short('R')
                .long("rules")
                .value_name("PATH")
                .help("Load extra rule documents from a file or directory")
                .action(ArgAction::Append)
        };

        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .action(ArgAction::Count),
            )
            .subcommand(
                Command::new("translate")
                    .about("Translate the layouts of an Android res/ directory")
                    .arg(Arg::new("input").help("Android res/ directory").required(true).index(1))
                    .arg(Arg::new("output").short('o').long("output").value_name("DIR").help("Output directory"))
                    .arg(target())
                    .arg(rules())
                    .arg(Arg::new("define").short('D').long("define").value_name("KEY=VALUE").help("Fix the value of a template path").action(ArgAction::Append))
                    .arg(Arg::new("theme").long("theme").value_name("NAME").help("Theme used for ?attr/ references"))
                    .arg(Arg::new("fail-fast").long("fail-fast").help("Stop at the first layout that fails").action(ArgAction::SetTrue))
                    .arg(Arg::new("stats").long("stats").help("Print translation statistics as JSON").action(ArgAction::SetTrue))
                    .arg(Arg::new("watch").short('w').long("watch").help("Watch the resource directory and translate again on change").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("check")
                    .about("Translate without writing output and report failing layouts")
                    .arg(Arg::new("input").help("Android res/ directory").required(true).index(1))
                    .arg(target())
                    .arg(rules()),
            )
            .subcommand(
                Command::new("rules")
                    .about("List the loaded element and attribute rules")
                    .arg(target())
                    .arg(rules())
                    .arg(Arg::new("format").short('f').long("format").value_parser(clap::value_parser!(OutputFormat)).default_value("text").help("Listing format")),
            )
    }

    fn setup_logging(&self, verbose_count: u8) {
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
    }

    /// Flags first, then the configuration file, then defaults.
    pub fn build_translator_options(&self, matches: &clap::ArgMatches) -> Result<TranslatorOptions> {
        let mut options = TranslatorOptions::default();
        let has = |id: &str| matches.try_contains_id(id).unwrap_or(false);

        options.target = (has("target").then(|| matches.get_one::<Target>("target").copied()))
            .flatten()
            .or(self.config.target)
            .unwrap_or_default();
        if let Some(base_kind) = &self.config.base_kind {
            options.base_kind = base_kind.clone();
        }
        options.theme = (has("theme").then(|| matches.get_one::<String>("theme").cloned()))
            .flatten()
            .or_else(|| self.config.theme.clone());
        options.fail_fast = (has("fail-fast") && matches.get_flag("fail-fast")) || self.config.fail_fast.unwrap_or(false);

        if let Some(paths) = &self.config.rule_paths {
            options.rule_paths.extend(paths.iter().map(PathBuf::from));
        }
        if has("rules") {
            if let Some(paths) = matches.get_many::<String>("rules") {
                options.rule_paths.extend(paths.map(PathBuf::from));
            }
        }

        if has("define") {
            if let Some(defines) = matches.get_many::<String>("define") {
                for define in defines {
                    let (key, value) = parse_define(define)?;
                    options.overrides.insert(key, value);
                }
            }
        }
        if let Some(config_overrides) = &self.config.overrides {
            for (key, value) in config_overrides {
                options.overrides.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        Ok(options)
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_define(define: &str) -> Result<(String, String)> {
    match define.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(TranslateError::InvalidFormat {
            message: format!("Invalid definition: {}. Use KEY=VALUE format.", define),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(args: &[&str], config: config::ConfigFile) -> Result<TranslatorOptions> {
        let cli = Cli { config };
        let matches = cli.build_cli().try_get_matches_from(args).unwrap();
        let (_, sub_matches) = matches.subcommand().unwrap();
        cli.build_translator_options(sub_matches)
    }

    #[test]
    fn test_flags_override_config() {
        let config = config::ConfigFile {
            target: Some(Target::Web),
            theme: Some("ConfigTheme".to_string()),
            overrides: Some([("layout.className".to_string(), "Config".to_string())].into()),
            ..config::ConfigFile::default()
        };
        let options = options(
            &["droidc", "translate", "res", "-t", "ios", "-D", "layout.className=Flag", "-R", "extra.toml"],
            config,
        )
        .unwrap();

        assert_eq!(options.target, Target::Ios);
        assert_eq!(options.theme.as_deref(), Some("ConfigTheme"));
        assert_eq!(options.overrides["layout.className"], "Flag");
        assert_eq!(options.rule_paths, vec![PathBuf::from("extra.toml")]);
    }

    #[test]
    fn test_config_fills_missing_flags() {
        let config = config::ConfigFile {
            target: Some(Target::Web),
            fail_fast: Some(true),
            ..config::ConfigFile::default()
        };
        let options = options(&["droidc", "rules"], config).unwrap();
        assert_eq!(options.target, Target::Web);
        assert!(options.fail_fast);
    }

    #[test]
    fn test_bad_define() {
        let err = options(&["droidc", "translate", "res", "-D", "novalue"], config::ConfigFile::default()).unwrap_err();
        assert!(matches!(err, TranslateError::InvalidFormat { .. }));
    }
}
