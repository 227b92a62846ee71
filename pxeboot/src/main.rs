//! `pxeboot`: run a pxelinux config against a directory as if it were the
//! boot server, and print the boot command a board would execute.

#[macro_use]
mod console;
mod error;
mod input;
#[macro_use]
mod logging;
mod sim;

use clap::{ArgAction, Parser};
use error::{CliError, MessageError};
use input::TerminalInput;
use log::{LevelFilter, error, info};
use pxe::{BootOutcome, Environment, PxeContext, platform::BootCommand, pxe_get, pxe_process};
use serde::Deserialize;
use sim::SimPlatform;
use std::{collections::BTreeMap, fs, num::ParseIntError, path::PathBuf, process::ExitCode};

#[derive(Parser)]
#[command(version, about = "Simulate PXE booting from a pxelinux config")]
struct Args {
    /// Directory served as the TFTP root
    root: PathBuf,
    /// JSON object with the initial environment
    #[arg(short, long)]
    env: Option<PathBuf>,
    /// Set an environment variable (repeatable)
    #[arg(short = 's', long = "set", value_name = "NAME=VALUE")]
    vars: Vec<String>,
    /// Boot file name; config paths are relative to its directory
    #[arg(short, long)]
    bootfile: Option<String>,
    /// Config file to use instead of searching pxelinux.cfg/
    #[arg(short, long)]
    config: Option<String>,
    /// Always show the menu
    #[arg(short, long)]
    prompt: bool,
    /// Let absolute paths bypass the boot file directory
    #[arg(long)]
    allow_abs_path: bool,
    /// Boot commands the monitor provides
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "bootm,booti,bootz,zboot",
        value_parser = parse_boot_command
    )]
    commands: Vec<BootCommand>,
    /// End of simulated RAM
    #[arg(long, default_value = "0x80000000", value_parser = parse_addr)]
    ram_top: usize,
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Plain log output without colours
    #[arg(long)]
    no_color: bool,
}

fn parse_addr(addr: &str) -> Result<usize, ParseIntError> {
    match addr.strip_prefix("0x").or_else(|| addr.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => addr.parse(),
    }
}

fn parse_boot_command(name: &str) -> Result<BootCommand, String> {
    [
        BootCommand::Bootm,
        BootCommand::Booti,
        BootCommand::Bootz,
        BootCommand::Zboot,
    ]
    .into_iter()
    .find(|x| x.name() == name)
    .ok_or_else(|| format!("unknown boot command '{}'", name))
}

/// Values allowed in the environment file.
#[derive(Deserialize)]
#[serde(untagged)]
enum EnvValue {
    Text(String),
    Number(u64),
    Flag(bool),
}

impl EnvValue {
    fn into_string(self) -> String {
        match self {
            EnvValue::Text(text) => text,
            EnvValue::Number(value) => value.to_string(),
            EnvValue::Flag(value) => (value as u8).to_string(),
        }
    }
}

fn load_environment(args: &Args) -> Result<Environment, CliError> {
    let mut env = Environment::new();
    if let Some(path) = &args.env {
        let text = fs::read_to_string(path).map_err(|err| CliError::EnvFile {
            path: path.clone(),
            err,
        })?;
        let vars: BTreeMap<String, EnvValue> =
            serde_json::from_str(&text).map_err(|err| CliError::EnvJson {
                path: path.clone(),
                err,
            })?;
        for (name, value) in vars {
            env.set(&name, &value.into_string());
        }
    }
    for assignment in &args.vars {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| CliError::BadAssignment(assignment.clone()))?;
        env.set(name, value);
    }
    Ok(env)
}

fn run(args: Args) -> Result<(), CliError> {
    let env = load_environment(&args)?;
    let mut platform = SimPlatform::new(&args.root, env, args.ram_top);
    platform.set_supported(args.commands.clone());

    let bootfile = args
        .bootfile
        .clone()
        .or_else(|| pxe::Platform::env(&platform).get("bootfile").map(String::from));
    let mut ctx = PxeContext::new(platform, args.allow_abs_path, bootfile.as_deref())?;

    let addr = match &args.config {
        Some(config) => {
            let addr = ctx.env().require_hex("pxefile_addr_r")?;
            ctx.get_pxe_file(config, addr)?;
            addr
        }
        None => {
            let found = pxe_get(&mut ctx)?;
            info!("using {} ({} bytes)", found.path, found.size);
            found.addr
        }
    };

    let mut input = TerminalInput::new();
    let outcome = pxe_process(&mut ctx, addr, args.prompt, &mut input)?;
    debug_ex!("outcome: {:?}", outcome);
    match outcome {
        BootOutcome::Booted | BootOutcome::Localboot => {
            if let Some(argv) = ctx.platform.booted() {
                console_println!("{}", argv.join(" "));
            }
            if let Some(bootargs) = ctx.env().get("bootargs") {
                console_println!("bootargs={}", bootargs);
            }
            Ok(())
        }
        outcome => Err(CliError::NotBooted(outcome)),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = logging::level_from_env().unwrap_or(match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    });
    if let Err(err) = logging::init(level, !args.no_color) {
        log_println!("{}", &CliError::from(err) as &dyn MessageError);
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", &err as &dyn MessageError);
            ExitCode::FAILURE
        }
    }
}
