use std::{fmt, str::FromStr};

use page_table::PageId;

use crate::{
    engine::{Access, Engine, EngineError, FaultDecision, PageFault},
    process::ProcessId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { id: ProcessId, bytes: u64 },
    List,
    Show(ProcessId),
    Map(ProcessId),
    Unmap(ProcessId),
    Access { id: ProcessId, page: PageId },
    Translate { id: ProcessId, address: String },
    Grow { id: ProcessId, bytes: u64 },
    Destroy(ProcessId),
    Stats,
    VirtualMemory,
    PhysicalMemory,
}

#[derive(Debug, PartialEq)]
pub enum CommandError {
    UnrecognizedCommand(String),
    MissingArgument(&'static str),
    InvalidArgument { name: &'static str, value: String },
    TrailingInput(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnrecognizedCommand(word) => {
                write!(f, "unrecognized command '{}'", word)
            }
            CommandError::MissingArgument(name) => write!(f, "missing <{}>", name),
            CommandError::InvalidArgument { name, value } => {
                write!(f, "'{}' is not a valid <{}>", value, name)
            }
            CommandError::TrailingInput(rest) => write!(f, "unexpected '{}'", rest),
        }
    }
}

impl std::error::Error for CommandError {}

fn arg<'a, T: FromStr>(
    words: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<T, CommandError> {
    let word = words.next().ok_or(CommandError::MissingArgument(name))?;
    word.parse().map_err(|_| CommandError::InvalidArgument {
        name,
        value: word.to_string(),
    })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let name = words.next().unwrap_or_default();
        let command = match name {
            "create" => Command::Create {
                id: arg(&mut words, "pid")?,
                bytes: arg(&mut words, "bytes")?,
            },
            "list" => Command::List,
            "show" => Command::Show(arg(&mut words, "pid")?),
            "map" => Command::Map(arg(&mut words, "pid")?),
            "unmap" => Command::Unmap(arg(&mut words, "pid")?),
            "access" => Command::Access {
                id: arg(&mut words, "pid")?,
                page: arg(&mut words, "page")?,
            },
            "translate" => Command::Translate {
                id: arg(&mut words, "pid")?,
                address: arg(&mut words, "address")?,
            },
            "grow" => Command::Grow {
                id: arg(&mut words, "pid")?,
                bytes: arg(&mut words, "bytes")?,
            },
            "destroy" => Command::Destroy(arg(&mut words, "pid")?),
            "stats" => Command::Stats,
            "vmem" => Command::VirtualMemory,
            "pmem" => Command::PhysicalMemory,
            _ => return Err(CommandError::UnrecognizedCommand(name.to_string())),
        };
        let rest: Vec<&str> = words.collect();
        if !rest.is_empty() {
            return Err(CommandError::TrailingInput(rest.join(" ")));
        }
        Ok(command)
    }
}

impl Command {
    /// Runs the command against the engine and renders the result for the terminal.
    ///
    /// `on_fault` is only consulted by `translate`.
    pub fn execute<F>(&self, engine: &mut Engine, on_fault: F) -> Result<String, EngineError>
    where
        F: FnOnce(&PageFault) -> FaultDecision,
    {
        let output = match self {
            Command::Create { id, bytes } => {
                let process = engine.create_process(*id, *bytes)?;
                format!(
                    "Process {} created: {} pages in {} secondary tables",
                    id,
                    process.table().entry_count(),
                    process.table().table_count()
                )
            }
            Command::List => {
                let lines: Vec<String> = engine
                    .processes()
                    .map(|p| {
                        format!(
                            "Process {}: {} bytes, {} resident, {} pending",
                            p.id(),
                            p.memory_size(),
                            p.resident_bytes(),
                            p.pending_bytes()
                        )
                    })
                    .collect();
                if lines.is_empty() {
                    String::from("No processes.")
                } else {
                    lines.join("\n")
                }
            }
            Command::Show(id) => engine
                .process(*id)
                .ok_or(EngineError::ProcessNotFound(*id))?
                .to_string(),
            Command::Map(id) => {
                let report = engine.allocate_to_physical(*id)?;
                format!(
                    "Process {}: {} pages mapped, {} pending",
                    id, report.mapped, report.pending
                )
            }
            Command::Unmap(id) => {
                let freed = engine.deallocate_from_physical(*id)?;
                format!("Process {}: {} frames freed", id, freed)
            }
            Command::Access { id, page } => match engine.access(*id, *page)? {
                Access::Hit(frame) => format!("Page {} is in frame {}", page, frame),
                Access::Fault => format!(
                    "Page fault: page {} of process {} is not in physical memory",
                    page, id
                ),
            },
            Command::Translate { id, address } => {
                let pa = engine.translate(address, *id, on_fault)?;
                format!("{} -> {}", address, pa)
            }
            Command::Grow { id, bytes } => {
                let process = engine.request_additional_memory(*id, *bytes)?;
                format!("Process {} now holds {} bytes", id, process.memory_size())
            }
            Command::Destroy(id) => {
                engine.destroy_process(*id)?;
                format!("Process {} destroyed", id)
            }
            Command::Stats => engine.statistics_snapshot().to_string(),
            Command::VirtualMemory => engine.virtual_pool().allocated().to_string(),
            Command::PhysicalMemory => engine.physical_pool().allocated().to_string(),
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, CommandError};
    use crate::{
        config::{MemoryConfig, KB},
        engine::{Engine, EngineError, FaultDecision},
    };

    fn engine() -> Engine {
        Engine::new(MemoryConfig {
            chunk_size: KB,
            page_size: 4 * KB,
            virtual_space_size: 32 * 4 * KB,
            physical_space_size: 8 * 4 * KB,
            secondary_table_span: 16 * KB,
        })
        .unwrap()
    }

    fn run(engine: &mut Engine, line: &str) -> Result<String, EngineError> {
        let command: Command = line.parse().unwrap();
        command.execute(engine, |_| FaultDecision::Abort)
    }

    #[test]
    fn parse_commands() {
        assert_eq!(
            "create 1 10000".parse(),
            Ok(Command::Create { id: 1, bytes: 10000 })
        );
        assert_eq!(
            "  translate 2   0vp5s100 ".parse(),
            Ok(Command::Translate {
                id: 2,
                address: String::from("0vp5s100")
            })
        );
        assert_eq!("pmem".parse(), Ok(Command::PhysicalMemory));
        assert_eq!("destroy 4".parse(), Ok(Command::Destroy(4)));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            "launch 1".parse::<Command>(),
            Err(CommandError::UnrecognizedCommand(String::from("launch")))
        );
        assert_eq!(
            "create 1".parse::<Command>(),
            Err(CommandError::MissingArgument("bytes"))
        );
        assert_eq!(
            "map one".parse::<Command>(),
            Err(CommandError::InvalidArgument {
                name: "pid",
                value: String::from("one")
            })
        );
        assert_eq!(
            "stats now".parse::<Command>(),
            Err(CommandError::TrailingInput(String::from("now")))
        );
        assert_eq!(
            "".parse::<Command>(),
            Err(CommandError::UnrecognizedCommand(String::new()))
        );
    }

    #[test]
    fn session() {
        let mut engine = engine();
        assert_eq!(run(&mut engine, "list").unwrap(), "No processes.");
        assert_eq!(
            run(&mut engine, "create 1 10000").unwrap(),
            "Process 1 created: 3 pages in 1 secondary tables"
        );
        assert_eq!(
            run(&mut engine, "access 1 2").unwrap(),
            "Page fault: page 2 of process 1 is not in physical memory"
        );
        assert_eq!(
            run(&mut engine, "translate 1 0vp0s5").unwrap_err(),
            EngineError::TranslationAborted(crate::address::VirtualAddress::new(0, 5))
        );
        assert_eq!(
            run(&mut engine, "map 1").unwrap(),
            "Process 1: 3 pages mapped, 0 pending"
        );
        assert_eq!(run(&mut engine, "access 1 2").unwrap(), "Page 2 is in frame 2");
        assert_eq!(
            run(&mut engine, "translate 1 0vp1s77").unwrap(),
            "0vp1s77 -> 0pf1s77"
        );
        assert_eq!(
            run(&mut engine, "list").unwrap(),
            "Process 1: 10000 bytes, 10000 resident, 0 pending"
        );
        assert!(run(&mut engine, "show 1").unwrap().starts_with("Process 1 (10000 bytes)"));
        assert!(run(&mut engine, "vmem").unwrap().contains("Allocated Page 2"));
        assert!(run(&mut engine, "pmem").unwrap().contains("Allocated Frame 0"));
        assert_eq!(
            run(&mut engine, "grow 1 5000").unwrap(),
            "Process 1 now holds 15000 bytes"
        );
        assert_eq!(
            run(&mut engine, "unmap 1").unwrap(),
            "Process 1: 4 frames freed"
        );
        assert!(run(&mut engine, "stats").unwrap().contains("Page faults: 2"));
        assert_eq!(run(&mut engine, "destroy 1").unwrap(), "Process 1 destroyed");
        assert_eq!(
            run(&mut engine, "show 1").unwrap_err(),
            EngineError::ProcessNotFound(1)
        );
    }
}
