use sim_lib::flags::SimArgs;
use sim_lib::loader::DEFAULT_PROGRAM_PATH;
use sim_lib::run_wrapper;
use std::error::Error;
use std::path::PathBuf;
use std::process;

fn main() -> Result<(), Box<dyn Error>> {
    let args = SimArgs::from_env_or_exit();
    let policy = args.policy();

    let level = if policy.verbose { "debug" } else { "info" };
    let _logger = flexi_logger::Logger::try_with_env_or_str(level)?.start()?;

    let program = args
        .program
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM_PATH));

    // A program that fails to load is never simulated
    if let Err(e) = run_wrapper::run(&program, policy, args.trace.as_deref()) {
        log::error!("{}", e);
        process::exit(1);
    }

    Ok(())
}
