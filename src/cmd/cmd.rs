use std::{fs, process::exit};

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{
    ast::Printer,
    config::{Config, load_config_file},
    driver::compile,
    parser::parse,
    token::{Source, display_tokens, scan},
    util::write_file,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize a new project
    Init,
    /// Run the front end over the project source
    Check,
    /// Print the token stream of a file
    Tokens { file: String },
    /// Print the parsed AST of a file
    Ast { file: String },
}

pub fn run() {
    init_logger();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help().unwrap();
        return;
    };

    if let Err(err) = run_command(command) {
        println!("{}", err);
        exit(1);
    }
}

fn run_command(command: Command) -> Result<(), String> {
    match command {
        Command::Init => graphite_init(),

        Command::Check => {
            let (project, options) = load_config_file()?;
            compile(&project, &options, &Config::default())?;
            println!("check ok");
            Ok(())
        }

        Command::Tokens { file } => {
            let source = read_source(&file)?;
            let tokens = scan(&source, &Config::default()).map_err(|err| err.render(&source))?;
            println!("{}", display_tokens(&tokens));
            Ok(())
        }

        Command::Ast { file } => {
            let source = read_source(&file)?;
            let config = Config::default();
            let ast = scan(&source, &config)
                .and_then(|toks| parse(toks, &config))
                .map_err(|err| err.render(&source))?;
            Printer::print(&ast);
            Ok(())
        }
    }
}

fn read_source(file: &str) -> Result<Source, String> {
    match fs::read(file) {
        Err(_) => Err(format!("failed to read file: '{}'", file)),
        Ok(src) => Ok(Source::new(file.to_string(), src)),
    }
}

fn init_logger() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::OFF.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .without_time()
        .compact()
        .init();
}

static DEFAULT_GRAPHITE_TOML: &str = r#"# Graphite project configuration

[project]
src = "main.gph" # Source file
out = "main"     # Filepath of output file

[options]
debug-mode = false
"#;

fn graphite_init() -> Result<(), String> {
    if fs::exists("graphite.toml").unwrap_or(false) {
        println!("File graphite.toml already exists");
        return Ok(());
    }

    write_file("graphite.toml", DEFAULT_GRAPHITE_TOML)?;
    println!("Created graphite.toml");
    Ok(())
}
