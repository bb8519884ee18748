use anyhow::{Context, bail};
use std::str::FromStr;

/// One shell command, parsed from a whitespace-separated line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Construct { key: String, value: Option<String> },
    Fetch { key: String },
    Select { keys: Vec<String> },
    Loaded { key: String },
    Assign { key: String, entity_key: String, value: Option<String> },
    Purge { key: String },
    Show { key: String },
    Len,
    PurgeAll,
}

impl Command {
    /// Parses a script line. Blank lines and `#` comments yield `None`.
    pub fn parse_line(line: &str) -> anyhow::Result<Option<Self>> {
        let line = line.split_once('#').map_or(line, |(code, _)| code).trim();
        if line.is_empty() {
            return Ok(None);
        }
        line.parse().map(Some)
    }
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let name = words.next().context("Empty command")?;
        let args: Vec<String> = words.map(str::to_owned).collect();

        let command = match (name, args.as_slice()) {
            ("construct", [key]) => Self::Construct { key: key.clone(), value: None },
            ("construct", [key, value]) => {
                Self::Construct { key: key.clone(), value: Some(value.clone()) }
            },
            ("fetch", [key]) => Self::Fetch { key: key.clone() },
            ("select", keys) => Self::Select { keys: keys.to_vec() },
            ("loaded", [key]) => Self::Loaded { key: key.clone() },
            ("assign", [key, entity_key]) => {
                Self::Assign { key: key.clone(), entity_key: entity_key.clone(), value: None }
            },
            ("assign", [key, entity_key, value]) => Self::Assign {
                key: key.clone(),
                entity_key: entity_key.clone(),
                value: Some(value.clone()),
            },
            ("purge", [key]) => Self::Purge { key: key.clone() },
            ("show", [key]) => Self::Show { key: key.clone() },
            ("len", []) => Self::Len,
            ("purge-all", []) => Self::PurgeAll,
            (
                "construct" | "fetch" | "loaded" | "assign" | "purge" | "show" | "len"
                | "purge-all",
                _,
            ) => bail!("Wrong number of arguments for '{name}'"),
            _ => bail!("Unknown command '{name}'"),
        };

        Ok(command)
    }
}
