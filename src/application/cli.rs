use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendName;
use crate::infrastructure::backends::BackendManager;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if !config_file_path.parent().unwrap().exists() {
        fs::create_dir_all(config_file_path.parent().unwrap()).await?;
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    let config_path_display = config_file_path.as_os_str().to_str().unwrap();
    println!("Created default config file at {config_path_display}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(clap::ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_models() -> Command {
    return Command::new("models")
        .about("List the models available from the configured backend.");
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("driftboard")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(false)
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_models())
        .arg(
            Arg::new(ConfigKey::Backend.to_string())
                .short('b')
                .long(ConfigKey::Backend.to_string())
                .env("DRIFTBOARD_BACKEND")
                .num_args(1)
                .help(format!(
                    "The model backend serving persona responses. [default: {}]",
                    Config::default(ConfigKey::Backend)
                ))
                .value_parser(PossibleValuesParser::new(BackendName::VARIANTS)),
        )
        .arg(
            Arg::new(ConfigKey::BackendHealthCheckTimeout.to_string())
                .long(ConfigKey::BackendHealthCheckTimeout.to_string())
                .env("DRIFTBOARD_BACKEND_HEALTH_CHECK_TIMEOUT")
                .num_args(1)
                .help(format!(
                    "Time to wait in milliseconds before timing out when doing a healthcheck for a backend. [default: {}]",
                    Config::default(ConfigKey::BackendHealthCheckTimeout)
                )),
        )
        .arg(
            Arg::new(ConfigKey::ClaudeToken.to_string())
                .long(ConfigKey::ClaudeToken.to_string())
                .env("DRIFTBOARD_CLAUDE_TOKEN")
                .num_args(1)
                .help("Anthropic's Claude API token when using the Claude backend."),
        )
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("DRIFTBOARD_CONFIG_FILE")
                .num_args(1)
                .help(format!(
                    "Path to configuration file [default: {}]",
                    Config::default(ConfigKey::ConfigFile)
                )),
        )
        .arg(
            Arg::new(ConfigKey::GeminiToken.to_string())
                .long(ConfigKey::GeminiToken.to_string())
                .env("DRIFTBOARD_GEMINI_TOKEN")
                .num_args(1)
                .help("Google's Gemini API token when using the Gemini backend."),
        )
        .arg(
            Arg::new(ConfigKey::Host.to_string())
                .long(ConfigKey::Host.to_string())
                .env("DRIFTBOARD_HOST")
                .num_args(1)
                .help(format!(
                    "Address to bind the server to. [default: {}]",
                    Config::default(ConfigKey::Host)
                )),
        )
        .arg(
            Arg::new(ConfigKey::Model.to_string())
                .short('m')
                .long(ConfigKey::Model.to_string())
                .env("DRIFTBOARD_MODEL")
                .num_args(1)
                .help(format!(
                    "The model on the backend used for persona responses. [default: {}]",
                    Config::default(ConfigKey::Model)
                )),
        )
        .arg(
            Arg::new(ConfigKey::Port.to_string())
                .short('p')
                .long(ConfigKey::Port.to_string())
                .env("DRIFTBOARD_PORT")
                .num_args(1)
                .help(format!(
                    "Port to bind the server to. [default: {}]",
                    Config::default(ConfigKey::Port)
                )),
        )
        .arg(
            Arg::new(ConfigKey::RateLimitRequests.to_string())
                .long(ConfigKey::RateLimitRequests.to_string())
                .env("DRIFTBOARD_RATE_LIMIT_REQUESTS")
                .num_args(1)
                .help(format!(
                    "Chat submissions allowed per client per window. [default: {}]",
                    Config::default(ConfigKey::RateLimitRequests)
                )),
        )
        .arg(
            Arg::new(ConfigKey::RateLimitWindowSeconds.to_string())
                .long(ConfigKey::RateLimitWindowSeconds.to_string())
                .env("DRIFTBOARD_RATE_LIMIT_WINDOW_SECONDS")
                .num_args(1)
                .help(format!(
                    "Length of the rate limit window in seconds. [default: {}]",
                    Config::default(ConfigKey::RateLimitWindowSeconds)
                )),
        );
}

/// Returns true when the process should continue on to serving.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("models", _)) => {
            Config::load(build(), vec![&matches]).await?;
            let backend =
                BackendManager::get(BackendName::parse(Config::get(ConfigKey::Backend))?)?;
            println!("{}", backend.list_models().await?.join("\n"));
            return Ok(false);
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
