use log::error;
use paging_sim::{
    command::Command,
    meta_commands::{handle_meta_command, MetaCommand, HELP},
    repl::REPL,
    Engine, FaultDecision, MemoryConfig,
};

fn main() {
    env_logger::init();

    let mut engine = match Engine::new(MemoryConfig::default()) {
        Ok(engine) => engine,
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    };
    let repl = REPL {};
    println!("---- Paging simulator ready, .help for commands ----");

    loop {
        if let Err(err) = repl.prompt() {
            error!("{}", err);
            break;
        }
        let input = match repl.read_line() {
            Ok(Some(input)) => input,
            Ok(None) => break,
            Err(err) => {
                error!("{}", err);
                break;
            }
        };
        if input.is_empty() {
            continue;
        }

        if input.starts_with('.') {
            match handle_meta_command(&input) {
                Ok(MetaCommand::Exit) => break,
                Ok(MetaCommand::Help) => println!("{}", HELP),
                Err(_) => println!("Unrecognized command '{}'.", input),
            }
            continue;
        }

        let command: Command = match input.parse() {
            Ok(command) => command,
            Err(err) => {
                println!("{}. Try .help", err);
                continue;
            }
        };
        let result = command.execute(&mut engine, |fault| {
            let question = format!(
                "Page fault at {} in process {}. Map the process now?",
                fault.address, fault.process
            );
            match repl.confirm(&question) {
                Ok(true) => FaultDecision::Allocate,
                _ => FaultDecision::Abort,
            }
        });
        match result {
            Ok(output) => println!("{}", output),
            Err(err) => println!("Error: {}", err),
        }
    }
    println!("---- Simulator closed ----");
}
