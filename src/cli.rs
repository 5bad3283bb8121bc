use clap::{Arg, ArgAction, Command};
use log::debug;
use std::time::Instant;

pub fn build_cli() -> Command {
    debug!("⚙️ Building CLI interface...");
    let start_time = Instant::now();
    let cmd = Command::new("lapsectl")
        .version("0.1.0")
        .author("lapsectl Developers")
        .about("Automates a tethered camera through a timed time-lapse or eclipse session.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom configuration file")
                .action(ArgAction::Set)
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
        )
        .subcommand(
            Command::new("run")
                .about("Runs a time-lapse session with the configured or given parameters")
                .arg(Arg::new("mode").long("mode").value_name("MODE").help("Shooting mode: day, night, sunrise, sunset or custom (default: from config)").action(ArgAction::Set))
                .arg(Arg::new("duration").long("duration").value_name("SECONDS").help("Total session duration in seconds (default: from config)").value_parser(clap::value_parser!(u64)).action(ArgAction::Set))
                .arg(Arg::new("interval").long("interval").value_name("SECONDS").help("Override the shot interval in seconds (default: mode preset)").value_parser(clap::value_parser!(u64)).action(ArgAction::Set))
                .arg(Arg::new("output").short('o').long("output").value_name("DIR").help("Output directory for captured frames").action(ArgAction::Set))
                .arg(Arg::new("no-speech").long("no-speech").help("Disable spoken announcements for this session").action(ArgAction::SetTrue))
        )
        .subcommand(
            Command::new("check")
                .about("Checks camera readiness (focus mode, drive mode) without capturing")
        );
    debug!("✅ CLI interface built in {:?}", start_time.elapsed());
    cmd
}
