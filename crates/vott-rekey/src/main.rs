use clap::Parser;
use colored::Colorize;
use env_logger::Env;

mod rekey;

#[derive(Parser)]
#[command(name = "vott-rekey")]
#[command(about = "Re-key a VoTT labeling project so it opens on a new machine", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", hide = true)]
    debug: bool,

    #[command(flatten)]
    args: rekey::RekeyArgs,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default log level depends on --debug (overridden by RUST_LOG)
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    rekey::execute(cli.args)
}
