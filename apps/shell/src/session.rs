use crate::command::Command;
use keyed::{Entity, FactoryConfig, KeyedFactory};
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use tracing::{info, warn};

/// The demo entity state: an optional value and a count of configuration runs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Record {
    pub value: Option<String>,
    pub revision: u32,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value.as_deref().unwrap_or("-");
        write!(f, "value={value} rev={}", self.revision)
    }
}

pub type Records = KeyedFactory<Record, Option<String>>;

/// A factory plus the command loop that drives it.
#[derive(Debug)]
pub struct Session {
    records: Records,
    strict: bool,
}

impl Session {
    pub fn new(config: FactoryConfig, strict: bool) -> Self {
        let records = KeyedFactory::builder()
            .config(config)
            .configure(|record: &mut Record, value: Option<String>| {
                if value.is_some() {
                    record.value = value;
                }
                record.revision += 1;
            })
            .build();
        Self { records, strict }
    }

    /// Runs one command and writes its single result line.
    pub fn execute(&self, command: &Command, out: &mut impl Write) -> anyhow::Result<()> {
        match command {
            Command::Construct { key, value } => {
                let entity = self.records.construct(key.as_str(), value.clone());
                writeln!(out, "{}", describe(&entity))?;
            },
            Command::Fetch { key } => {
                writeln!(out, "{}", describe(&self.records.fetch(key.as_str())))?;
            },
            Command::Select { keys } => {
                let line = self
                    .records
                    .select(keys)
                    .iter()
                    .map(describe)
                    .collect::<Vec<_>>()
                    .join("; ");
                writeln!(out, "[{line}]")?;
            },
            Command::Loaded { key } => writeln!(out, "{}", self.records.loaded(key.as_str()))?,
            Command::Assign { key, entity_key, value } => {
                let record = Record { value: value.clone(), revision: 0 };
                let entity = Entity::new(entity_key.as_str(), record, Arc::new(()));
                match self.records.assign(key.as_str(), entity)? {
                    Some(previous) => {
                        writeln!(out, "assigned {key}, superseded {}", describe(&previous))?;
                    },
                    None => writeln!(out, "assigned {key}")?,
                }
            },
            Command::Purge { key } => match self.records.peek(key.as_str()) {
                Some(entity) => {
                    entity.purge();
                    writeln!(out, "purged {key}")?;
                },
                None => writeln!(out, "{key} not loaded")?,
            },
            Command::Show { key } => match self.records.peek(key.as_str()) {
                Some(entity) => writeln!(out, "{}", describe(&entity))?,
                None => writeln!(out, "{key} not loaded")?,
            },
            Command::Len => writeln!(out, "{}", self.records.len())?,
            Command::PurgeAll => writeln!(out, "purged {}", self.records.purge_all())?,
        }
        Ok(())
    }

    /// Runs every command in `lines`, reporting failures inline.
    ///
    /// Returns the number of failed lines. In strict mode the first failure aborts
    /// the run instead.
    pub fn run<'a>(
        &self,
        lines: impl IntoIterator<Item = &'a str>,
        out: &mut impl Write,
    ) -> anyhow::Result<usize> {
        let mut failures = 0;
        for (number, line) in lines.into_iter().enumerate() {
            let result = Command::parse_line(line)
                .and_then(|command| command.map_or(Ok(()), |c| self.execute(&c, out)));

            if let Err(err) = result {
                if self.strict {
                    return Err(err.context(format!("line {}", number + 1)));
                }
                warn!(line = number + 1, error = %err, "Command failed");
                writeln!(out, "error: {err}")?;
                failures += 1;
            }
        }

        info!(factory = self.records.name(), live = self.records.len(), failures, "Run finished");
        Ok(failures)
    }
}

fn describe(entity: &Entity<Record>) -> String {
    let marker = if entity.is_purged() { " (purged)" } else { "" };
    format!("{} {}{marker}", entity.key(), *entity.read())
}
