use folymarket::cli::{CliInterface, parse_cli};
use folymarket::logging::init_logging;
use folymarket::session::{Session, session_loop};
use folymarket::tui::TuiInterface;
use log::{error, info};
use std::io;

fn main() {
    let cli = parse_cli();

    let log_path = match init_logging(cli.log_file.as_deref()) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Failed to set up logging: {e}");
            std::process::exit(1);
        }
    };
    info!("starting in {} mode (log: {:?})", cli.mode.name(), log_path);

    let mut session = Session::with_history_limit(cli.mode, cli.history_limit.map(usize::from));

    if cli.tui {
        let mut interface = match TuiInterface::new() {
            Ok(interface) => interface,
            Err(e) => {
                error!("terminal setup failed: {e}");
                eprintln!("Failed to start the terminal interface: {e}");
                std::process::exit(1);
            }
        };
        session_loop(&mut session, &mut interface);
    } else {
        println!("Folymarket prediction simulator ({} mode).", cli.mode.name());
        println!("All predictions are simulated. Type 'help' for commands.");
        let stdin = io::stdin();
        let mut interface = CliInterface::new(stdin.lock());
        session_loop(&mut session, &mut interface);
    }

    info!("exiting with {} scenario(s)", session.scenarios().len());
}
