use std::io::{self, Write};

use serde::Serialize;

use crate::domain::ResourceIdentifier;

#[derive(Debug, Clone, Serialize)]
pub struct RegisterSummary {
    pub files_registered: usize,
    pub batches: usize,
    pub datasets: Vec<String>,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_summary(result: &RegisterSummary) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_identifier(identifier: &ResourceIdentifier) -> io::Result<()> {
        Self::print_json(identifier)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
