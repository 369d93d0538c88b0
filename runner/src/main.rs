use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::{App, Arg, ArgMatches};
use log::info;
use sched_sim::{PriorityOrder, SchedError};

mod config;
use config::{parse_process, valid_policy, Overrides, Scenario, Settings};

mod report;
use report::{render_step, Report};

fn main() {
    let matches = build_cli().get_matches();

    if let Err(err) = run(&matches) {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

fn build_cli() -> App<'static, 'static> {
    App::new("sched-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Simulates CPU scheduling policies and reports timing and energy metrics")
        .arg(Arg::with_name("scenario")
            .short("f")
            .long("scenario")
            .takes_value(true)
            .help("TOML scenario file with [simulation] and [[process]] tables"))
        .arg(Arg::with_name("process")
            .short("p")
            .long("process")
            .takes_value(true)
            .multiple(true)
            .number_of_values(1)
            .help("Inline process pid,arrival,burst[,priority[,deadline]], repeatable"))
        .arg(Arg::with_name("policy")
            .short("s")
            .long("policy")
            .takes_value(true)
            .validator(valid_policy)
            .help("fcfs, sjf, srtf, priority[-preemptive][:lower-first|:higher-first], rr:<quantum> or dvfs[:<policy>]"))
        .arg(Arg::with_name("priority-order")
            .long("priority-order")
            .takes_value(true)
            .possible_values(&["lower-first", "higher-first"])
            .help("Which end of the priority range runs first"))
        .arg(Arg::with_name("step")
            .long("step")
            .takes_value(true)
            .validator(valid_step)
            .help("Simulation time step"))
        .arg(Arg::with_name("max-steps")
            .long("max-steps")
            .takes_value(true)
            .help("Give up after this many steps"))
        .arg(Arg::with_name("format")
            .long("format")
            .takes_value(true)
            .possible_values(&["table", "json"])
            .default_value("table")
            .help("Report format"))
        .arg(Arg::with_name("trace")
            .long("trace")
            .help("Print the run queues after every step"))
        .arg(Arg::with_name("verbose")
            .short("v")
            .long("verbose")
            .multiple(true)
            .help("More log output, repeat for trace level"))
}

fn valid_step(value: String) -> std::result::Result<(), String> {
    match value.parse::<f64>() {
        Ok(step) if step.is_finite() && step > 0.0 => Ok(()),
        _ => Err(format!("Invalid step: {}. Must be a positive number", value)),
    }
}

fn init_logging(verbosity: u64) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn overrides_from(matches: &ArgMatches) -> Result<Overrides> {
    let priority_order = matches.value_of("priority-order").map(|order| match order {
        "higher-first" => PriorityOrder::HigherFirst,
        _ => PriorityOrder::LowerFirst,
    });

    let time_step = match matches.value_of("step") {
        Some(step) => Some(step.parse().context("invalid --step")?),
        None => None,
    };

    let max_steps = match matches.value_of("max-steps") {
        Some(steps) => Some(steps.parse().context("invalid --max-steps")?),
        None => None,
    };

    let processes = match matches.values_of("process") {
        Some(values) => values.map(parse_process).collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(Overrides {
        policy: matches.value_of("policy").map(str::to_owned),
        priority_order,
        time_step,
        max_steps,
        processes,
    })
}

fn run(matches: &ArgMatches) -> Result<()> {
    init_logging(matches.occurrences_of("verbose"));

    let scenario = match matches.value_of("scenario") {
        Some(path) => Scenario::load(Path::new(path))?,
        None => Scenario::default(),
    };
    let settings = Settings::resolve(scenario, overrides_from(matches)?)?;

    let policy_name = settings.policy.to_string();
    let mut scheduler = settings.policy.scheduler()?;
    scheduler.add_processes(settings.processes)?;
    info!(
        "simulating {} processes with {} (step {})",
        scheduler.process_count(),
        policy_name,
        settings.time_step
    );

    let mut steps = 0;
    while !scheduler.is_complete() {
        if steps == settings.max_steps {
            return Err(SchedError::StepLimit(settings.max_steps).into());
        }

        scheduler.step(settings.time_step)?;
        steps += 1;

        if matches.is_present("trace") {
            println!("{}", render_step(&scheduler));
        }
    }

    let report = Report::new(&scheduler, policy_name, settings.time_step, steps);
    match matches.value_of("format") {
        Some("json") => println!("{}", report.to_json()?),
        _ => print!("{}", report),
    }

    Ok(())
}
