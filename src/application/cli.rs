#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use chrono::Local;
use chrono::TimeZone;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use super::headless;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::help_text;
use crate::domain::models::Project;
use crate::domain::services::SessionState;
use crate::infrastructure::stores::FileStore;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

fn format_project(idx: usize, project: &Project) -> String {
    let timestamp = match Local.timestamp_millis_opt(project.timestamp).single() {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M").to_string(),
        None => "unknown".to_string(),
    };

    let mut line = project
        .prompt
        .split('\n')
        .next()
        .unwrap_or_default()
        .to_string();
    if line.chars().count() >= 70 {
        line = format!("{}...", line.chars().take(67).collect::<String>());
    }

    return format!("- ({}) {timestamp}, {line}", idx + 1);
}

async fn load_session() -> SessionState {
    return SessionState::load(Box::new(FileStore::from_config())).await;
}

async fn print_history_list() -> Result<()> {
    let session = load_session().await;
    let projects = session
        .history
        .projects()
        .iter()
        .enumerate()
        .map(|(idx, project)| {
            return format_project(idx, project);
        })
        .collect::<Vec<String>>();

    if projects.is_empty() {
        println!("There are no generated apps yet. You should build your first one!");
    } else {
        println!("{}", projects.join("\n"));
    }

    return Ok(());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
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
                .action(ArgAction::Set)
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

fn subcommand_generate() -> Command {
    return Command::new("generate")
        .about("Builds an app without the chat interface. Agent progress is printed to stderr, the generated HTML to stdout.")
        .arg(
            Arg::new("prompt")
                .help("Description of the app to build.")
                .required(true)
                .num_args(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Write the generated HTML to this file instead of stdout.")
                .num_args(1),
        );
}

fn subcommand_history() -> Command {
    return Command::new("history")
        .about("Manage previously generated apps.")
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List the most recent generated apps, newest first."))
        .subcommand(Command::new("clear").about("Delete the generated apps history."));
}

fn subcommand_session() -> Command {
    return Command::new("session")
        .about("Manage the saved chat session.")
        .arg_required_else_help(true)
        .subcommand(Command::new("show").about("Print the saved chat session as JSON."))
        .subcommand(Command::new("delete").about("Delete the saved chat session. History is kept."))
        .subcommand(Command::new("path").about("Print the data directory path."));
}

fn arg_model() -> Arg {
    return Arg::new(ConfigKey::Model.to_string())
        .short('m')
        .long(ConfigKey::Model.to_string())
        .env("CREWFORGE_MODEL")
        .num_args(1)
        .help(format!(
            "Gemini model used to generate apps. [default: {}]",
            Config::default(ConfigKey::Model)
        ))
        .global(true);
}

pub fn build() -> Command {
    let commands_text = format!(
        "{}\n  {}",
        Paint::new("CHAT COMMANDS:").underline().bold(),
        help_text()
    );

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("crewforge")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(Command::new("chat").about("Start the chat interface. This is the default."))
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_generate())
        .subcommand(subcommand_history())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .subcommand(subcommand_session())
        .arg(arg_model())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("CREWFORGE_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::DataDir.to_string())
                .long(ConfigKey::DataDir.to_string())
                .env("CREWFORGE_DATA_DIR")
                .num_args(1)
                .help(format!("Directory holding the saved session, project history and preview file. [default: {}]", Config::default(ConfigKey::DataDir)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GeminiURL.to_string())
                .long(ConfigKey::GeminiURL.to_string())
                .env("CREWFORGE_GEMINI_URL")
                .num_args(1)
                .help(format!("Gemini API URL. Can be swapped to a compatible proxy. [default: {}]", Config::default(ConfigKey::GeminiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GeminiToken.to_string())
                .long(ConfigKey::GeminiToken.to_string())
                .env("CREWFORGE_GEMINI_TOKEN")
                .hide_env_values(true)
                .num_args(1)
                .help("Gemini API token.")
                .global(true),
        );
}

pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
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
        Some(("generate", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            let prompt = match subcmd_matches.get_one::<String>("prompt") {
                Some(prompt) => prompt.to_string(),
                None => bail!("A prompt is required"),
            };
            let output = subcmd_matches.get_one::<String>("output").cloned();

            headless::generate(&prompt, output).await?;
            return Ok(false);
        }
        Some(("history", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            match subcmd_matches.subcommand() {
                Some(("list", _)) => {
                    print_history_list().await?;
                }
                Some(("clear", _)) => {
                    load_session().await.clear_history().await;
                    println!("Cleared the generated apps history");
                }
                _ => {
                    subcommand_history().print_long_help()?;
                }
            }
            return Ok(false);
        }
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(false);
        }
        Some(("session", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            match subcmd_matches.subcommand() {
                Some(("show", _)) => {
                    let snapshot = load_session().await.snapshot();
                    println!("{}", serde_json::to_string_pretty(&snapshot)?);
                }
                Some(("delete", _)) => {
                    load_session().await.reset_conversation().await?;
                    println!("Deleted the saved chat session");
                }
                Some(("path", _)) => {
                    println!("{}", Config::get(ConfigKey::DataDir));
                }
                _ => {
                    subcommand_session().print_long_help()?;
                }
            }
            return Ok(false);
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
