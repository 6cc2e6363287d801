use std::{
    io,
    str::FromStr,
    sync::{Arc, RwLock},
    time::Duration,
};

use anyhow::{bail, Context};
use colored::Colorize;
use libgame::{pos::Position, rule::Rule, Universe};
use strum::EnumString;
use tracing::{info, warn};

use crate::{ticker, write_state, State};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "snake_case")]
enum Command {
    Step,
    Run,
    Stop,
    Show,
    Clear,
    Reset,
    Random,
    Resize,
    Toggle,
    Rule,
    Exit,
}

#[derive(Debug, PartialEq, Eq)]
enum Reply {
    Ok,
    Frame(String),
    Exit,
}

/// Reads commands from stdin until `exit` or end of input.
pub fn run_cli(state_arc: Arc<RwLock<State>>) {
    for line_res in io::stdin().lines() {
        let line = match line_res {
            Ok(line) => line,
            Err(e) => {
                warn!("Reading stdin failed: {e}");
                break;
            }
        };

        let args = line.split_whitespace();

        match handle_cmd(&state_arc, args) {
            Ok(Reply::Ok) => println!("{}", "OK".green()),
            Ok(Reply::Frame(frame)) => print!("{frame}"),
            Ok(Reply::Exit) => break,
            Err(e) => {
                warn!("Command {line:?} rejected: {e:#}");
                eprintln!("{} {e:#}", "!".red());
            }
        }
    }

    info!("console closed");
}

fn handle_cmd<'a, I>(state_arc: &Arc<RwLock<State>>, mut args: I) -> anyhow::Result<Reply>
where
    I: Iterator<Item = &'a str>,
{
    let command = args.next().context("No command")?;
    let command = Command::from_str(command).with_context(|| format!("Unknown command {command:?}"))?;

    match command {
        Command::Step => {
            let times = next_arg(&mut args, "step count")?.unwrap_or(1);
            write_state(state_arc).universe.step(times);
        }

        Command::Run => {
            if let Some(rate) = next_arg::<u64, _>(&mut args, "interval")? {
                write_state(state_arc).interval = Duration::from_millis(rate);
            }

            ticker::spawn_ticker(state_arc.clone());
        }

        Command::Stop => {
            if !ticker::stop_ticker(state_arc) {
                bail!("Ticker is not running");
            }
        }

        Command::Show => {
            let state = write_state(state_arc);
            let frame = ticker::render_frame(&state.universe, state.clear_screen);
            return Ok(Reply::Frame(frame));
        }

        Command::Clear => {
            write_state(state_arc).universe.clear();
        }

        Command::Reset => {
            write_state(state_arc).universe.reset();
        }

        Command::Random => {
            let alive_count = required_arg(&mut args, "alive count")?;

            let mut state = write_state(state_arc);
            let rule = state.universe.rule().clone();
            let mut universe = Universe::random(
                state.universe.width(),
                state.universe.height(),
                alive_count,
            )?;
            universe.set_rule(rule);
            state.universe = universe;
        }

        Command::Resize => {
            let width = required_arg(&mut args, "width")?;
            let height = required_arg(&mut args, "height")?;

            let mut state = write_state(state_arc);
            let rule = state.universe.rule().clone();
            state.universe = Universe::with_rule(width, height, rule).context("Resizing universe")?;
            info!(width, height, "universe resized");
        }

        Command::Toggle => {
            let row = required_arg(&mut args, "row")?;
            let col = required_arg(&mut args, "col")?;

            write_state(state_arc)
                .universe
                .toggle_cell(Position::new(row, col))?;
        }

        Command::Rule => {
            let rule: Rule = required_arg(&mut args, "rule")?;
            info!(%rule, "rule changed");
            write_state(state_arc).universe.set_rule(rule);
        }

        Command::Exit => return Ok(Reply::Exit),
    }

    Ok(Reply::Ok)
}

fn next_arg<'a, T, I>(args: &mut I, name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    I: Iterator<Item = &'a str>,
{
    args.next()
        .map(|arg| arg.parse::<T>().with_context(|| format!("invalid {name} {arg:?}")))
        .transpose()
}

fn required_arg<'a, T, I>(args: &mut I, name: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    I: Iterator<Item = &'a str>,
{
    next_arg(args, name)?.with_context(|| format!("missing {name}"))
}
