use anyhow::Context;
use station::audio::NullSink;
use station::config;
use station::core::StationEngine;
use station::model::StationEvent;
use std::path::PathBuf;

const DEFAULT_STEPS: usize = 12;

#[derive(Debug)]
struct CliArgs {
    config: Option<PathBuf>,
    station: Option<String>,
    steps: usize,
    skip_every: Option<usize>,
    volume: Option<i32>,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            config: None,
            station: None,
            steps: DEFAULT_STEPS,
            skip_every: None,
            volume: None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = parse_args(std::env::args().skip(1).collect())?;
    let config = match &args.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config()?,
    };

    let mut engine: StationEngine<NullSink> =
        StationEngine::new(&config).context("invalid station catalog")?;
    engine.subscribe(|event| match event {
        StationEvent::TrackChanged { current, upcoming } => {
            println!("now playing: {:<32} up next: {}", current.title, upcoming.title);
        }
        StationEvent::PlayStateChanged { is_playing } => {
            println!("{}", if *is_playing { "[playing]" } else { "[paused]" });
        }
        StationEvent::ProgressUpdated(_) => {}
    });

    engine.bind(NullSink::new());
    if let Some(name) = &args.station {
        engine.select_station(name)?;
    }
    if let Some(level) = args.volume {
        engine.set_volume(level);
    }
    engine.play()?;

    for step in 1..=args.steps {
        if args.skip_every.is_some_and(|every| step % every == 0) {
            engine.skip()?;
            continue;
        }
        let Some(sink) = engine.sink_mut() else {
            break;
        };
        let event = sink.finish();
        engine.handle_event(event);
    }

    engine.pause();
    Ok(())
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        let flag = args[index].as_str();
        match flag {
            "--config" | "--station" | "--steps" | "--skip-every" | "--volume" => {
                index += 1;
                let Some(value) = args.get(index).map(|value| value.trim()) else {
                    anyhow::bail!("{flag} requires a value");
                };
                if value.is_empty() {
                    anyhow::bail!("{flag} cannot be empty");
                }
                match flag {
                    "--config" => out.config = Some(PathBuf::from(value)),
                    "--station" => out.station = Some(value.to_string()),
                    "--steps" => {
                        out.steps = value
                            .parse()
                            .with_context(|| format!("invalid --steps value {value}"))?;
                    }
                    "--skip-every" => {
                        let every: usize = value
                            .parse()
                            .with_context(|| format!("invalid --skip-every value {value}"))?;
                        if every == 0 {
                            anyhow::bail!("--skip-every must be at least 1");
                        }
                        out.skip_every = Some(every);
                    }
                    _ => {
                        out.volume = Some(
                            value
                                .parse()
                                .with_context(|| format!("invalid --volume value {value}"))?,
                        );
                    }
                }
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn print_help() {
    println!("station");
    println!("  --config path       Station configuration (default: $STATION_CONFIG or station.json)");
    println!("  --station name      Station to tune to before playing");
    println!("  --steps n           Number of transitions to simulate (default {DEFAULT_STEPS})");
    println!("  --skip-every n      Skip instead of finishing every n-th item");
    println!("  --volume 0-100      Initial volume level");
}
