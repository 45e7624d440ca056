use std::io::{self, Write};

pub struct REPL {}

impl REPL {
    pub fn prompt(&self) -> Result<(), io::Error> {
        print!("paging > ");
        io::stdout().flush()
    }

    /// Next trimmed line, or `None` at end of input.
    pub fn read_line(&self) -> Result<Option<String>, io::Error> {
        let mut buffer = String::new();
        let stdin = std::io::stdin();
        if stdin.read_line(&mut buffer)? == 0 {
            return Ok(None);
        }
        let buffer = buffer.trim().to_string();
        Ok(Some(buffer))
    }

    /// Asks a yes/no question. Anything but `y` or `yes` is a no.
    pub fn confirm(&self, question: &str) -> Result<bool, io::Error> {
        print!("{} [y/n] ", question);
        io::stdout().flush()?;
        Ok(self
            .read_line()?
            .map_or(false, |answer| is_yes(&answer)))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::is_yes;

    #[test]
    fn yes_answers() {
        assert!(is_yes("y"));
        assert!(is_yes("YES"));
        assert!(!is_yes("n"));
        assert!(!is_yes(""));
    }
}
