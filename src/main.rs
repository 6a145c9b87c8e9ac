use clap::Parser;
use color_eyre::eyre::Result;
use std::process::ExitCode;

use healthcheck::config::{Args, Config};
use healthcheck::{HealthCheck, SystemRunner, logging, report};

include!(concat!(env!("OUT_DIR"), "/git_sha.rs"));

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    if args.version {
        println!(
            "healthcheck version {} (git: {GIT_SHA})",
            env!("CARGO_PKG_VERSION")
        );
        return Ok(ExitCode::SUCCESS);
    }

    color_eyre::install()?;

    let config = Config::load()?;
    let final_config = config.merge_with_args(&args);

    match logging::init_logging(final_config.debug.unwrap_or(false)) {
        Ok(log_file) => log::debug!("Writing logs to {log_file:?}"),
        Err(e) => eprintln!("⚠️ Logging disabled: {e}"),
    }

    let settings = final_config.settings();
    let repo_path = match &args.repo {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };
    log::info!("Checking repository at {repo_path:?} with {settings:?}");

    let runner = SystemRunner::new(repo_path);
    let check = HealthCheck::new(&runner, &settings);

    let outcome = if args.json {
        check.run()
    } else {
        check.run_with(&mut |stage_report| print!("{}", report::render_stage(stage_report)))
    };
    let exit_code = outcome.exit_code(settings.strict);

    if args.json {
        println!("{}", report::render_json(&outcome, exit_code)?);
    } else {
        if let Some(aborted) = &outcome.aborted {
            eprintln!("{}", report::render_abort(aborted));
        }
        println!("{}", report::render_summary(&outcome, settings.strict));
    }

    log::info!("Health check finished with exit code {exit_code}");
    Ok(ExitCode::from(exit_code))
}
