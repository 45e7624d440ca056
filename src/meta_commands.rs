pub const HELP: &str = "\
Commands:
  create <pid> <bytes>       reserve virtual memory for a new process
  list                       list processes
  show <pid>                 dump a process's page table
  map <pid>                  give frames to every unmapped page
  unmap <pid>                take every frame back
  access <pid> <page>        look a page up
  translate <pid> <address>  translate 0vp<page>s<offset>
  grow <pid> <bytes>         request additional memory
  destroy <pid>              release everything a process holds
  stats                      access and memory statistics
  vmem | pmem                allocated pages or frames
  .help | .exit";

#[derive(Debug, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    Help,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MetaCommandError {
    UnrecognizedCommand,
}

pub fn handle_meta_command(input: &str) -> Result<MetaCommand, MetaCommandError> {
    match input.trim() {
        ".exit" => Ok(MetaCommand::Exit),
        ".help" => Ok(MetaCommand::Help),
        _ => Err(MetaCommandError::UnrecognizedCommand),
    }
}
