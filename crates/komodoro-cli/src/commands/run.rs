use std::io::Write;

use clap::Args;
use komodoro_core::{Config, Event, PomodoroEngine, Subscription, TimerConfig, TimerState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::display::{render_state, JsonLine};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Focus length in minutes
    #[arg(long)]
    pub focus: Option<u32>,
    /// Short break length in minutes
    #[arg(long)]
    pub short_break: Option<u32>,
    /// Long break length in minutes
    #[arg(long)]
    pub long_break: Option<u32>,
    /// Focus phases before a long break
    #[arg(long)]
    pub cycles: Option<u32>,
    /// Countdown tick in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,
    /// Print one JSON object per snapshot
    #[arg(long)]
    pub json: bool,
    /// Start the first focus phase right away
    #[arg(long)]
    pub autostart: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Start,
    Pause,
    Next,
    Stop,
    Quit,
}

fn parse_control(line: &str) -> Option<Control> {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "start" => Some(Control::Start),
        "p" | "pause" => Some(Control::Pause),
        "n" | "next" | "skip" => Some(Control::Next),
        "x" | "stop" | "reset" => Some(Control::Stop),
        "q" | "quit" | "exit" => Some(Control::Quit),
        _ => None,
    }
}

fn timer_config(args: &RunArgs, mut config: Config) -> Result<TimerConfig, Box<dyn std::error::Error>> {
    if let Some(focus) = args.focus {
        config.schedule.focus_duration = focus;
    }
    if let Some(short) = args.short_break {
        config.schedule.short_break = short;
    }
    if let Some(long) = args.long_break {
        config.schedule.long_break = long;
    }
    if let Some(cycles) = args.cycles {
        config.schedule.pomodoros_before_long_break = cycles;
    }
    if let Some(tick) = args.tick_ms {
        config.clock.tick_ms = tick;
    }
    Ok(config.timer_config()?)
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let timer = timer_config(&args, Config::load()?)?;
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(session(timer, args.json, args.autostart));
    // A stdin read may still be parked on the blocking pool.
    rt.shutdown_background();
    result
}

struct Printer {
    json: bool,
    cycles: u32,
    pomodoro_max: u32,
}

impl Printer {
    fn state(&self, state: &TimerState) -> Result<(), Box<dyn std::error::Error>> {
        let mut out = std::io::stdout().lock();
        if self.json {
            let line = JsonLine {
                state,
                cycles: self.cycles,
            };
            writeln!(out, "{}", serde_json::to_string(&line)?)?;
        } else {
            writeln!(out, "{}", render_state(state, self.cycles, self.pomodoro_max))?;
        }
        out.flush()?;
        Ok(())
    }

    /// Take in every counter value already delivered.
    fn catch_up(&mut self, cycles: &mut Subscription<u32>) {
        while let Some(count) = cycles.try_recv() {
            self.cycles = count;
        }
    }

    fn bell(&self) -> Result<(), Box<dyn std::error::Error>> {
        if !self.json {
            let mut out = std::io::stdout().lock();
            write!(out, "\x07")?;
            out.flush()?;
        }
        Ok(())
    }
}

async fn session(
    timer: TimerConfig,
    json: bool,
    autostart: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = PomodoroEngine::new(timer)?;
    let mut states = engine.subscribe_state();
    let mut cycles = engine.subscribe_cycles();
    let mut events = engine.subscribe_events();
    let mut printer = Printer {
        json,
        cycles: engine.cycles(),
        pomodoro_max: engine.config().pomodoro_max(),
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if autostart {
        engine.start();
    }

    loop {
        tokio::select! {
            biased;
            Some(count) = cycles.recv() => printer.cycles = count,
            state = states.recv() => match state {
                Some(state) => {
                    // The counter is published ahead of the state it goes with.
                    printer.catch_up(&mut cycles);
                    printer.state(&state)?;
                }
                None => break,
            },
            event = events.recv() => match event {
                Ok(event) => {
                    let at = event.at().format("%H:%M:%S");
                    if let Event::PhaseStarted { phase, .. } = event {
                        tracing::info!(?phase, %at, "phase started");
                        printer.bell()?;
                    } else {
                        tracing::debug!(?event, %at, "timer event");
                    }
                }
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "missed timer events"),
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => match parse_control(&line) {
                    Some(Control::Start) => engine.start(),
                    Some(Control::Pause) => engine.pause(),
                    Some(Control::Next) => engine.next(),
                    Some(Control::Stop) => engine.stop(),
                    Some(Control::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => eprintln!("unknown command: {} (use s, p, n, x or q)", line.trim()),
                },
                None => break,
            },
        }
    }

    // Let queued commands land, then print whatever they produced.
    engine.shutdown().await;
    while let Some(state) = states.try_recv() {
        printer.catch_up(&mut cycles);
        printer.state(&state)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!(parse_control("s"), Some(Control::Start));
        assert_eq!(parse_control(" Pause "), Some(Control::Pause));
        assert_eq!(parse_control("skip"), Some(Control::Next));
        assert_eq!(parse_control("x"), Some(Control::Stop));
        assert_eq!(parse_control("QUIT"), Some(Control::Quit));
        assert_eq!(parse_control("later"), None);
    }

    #[test]
    fn flags_override_config_file() {
        let args = RunArgs {
            focus: Some(50),
            cycles: Some(2),
            tick_ms: Some(100),
            ..RunArgs::default()
        };
        let timer = timer_config(&args, Config::default()).unwrap();
        assert_eq!(timer.focus_duration(), Duration::from_secs(50 * 60));
        assert_eq!(timer.short_break_duration(), Duration::from_secs(5 * 60));
        assert_eq!(timer.pomodoro_max(), 2);
        assert_eq!(timer.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn catch_up_takes_latest_counter() {
        let counter = komodoro_core::Observable::new(0u32, 8);
        let mut cycles = counter.subscribe();
        counter.publish(1);
        counter.publish(2);

        let mut printer = Printer {
            json: true,
            cycles: 0,
            pomodoro_max: 4,
        };
        printer.catch_up(&mut cycles);
        assert_eq!(printer.cycles, 2);
        assert_eq!(cycles.try_recv(), None);
    }

    #[test]
    fn rejects_zero_length_phase() {
        let args = RunArgs {
            short_break: Some(0),
            ..RunArgs::default()
        };
        assert!(timer_config(&args, Config::default()).is_err());
    }
}
