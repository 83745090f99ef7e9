use colored::Colorize;
use std::{fmt::Display, path::PathBuf};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("a file descriptor named {0:?} is already registered")]
    DescriptorExists(String),
    #[error("no file descriptor named {0:?} in the registry{1}")]
    DescriptorNotFound(String, Hint),
    #[error("exchange file {0:?} does not exist")]
    ExchangeFileMissing(PathBuf),
    #[error("timestamp column of {0:?} holds a complex value at row {1}")]
    ComplexTimestamp(String, usize),
    #[error("table rows have unequal lengths: row {0} has {1} columns, expected {2}")]
    RaggedTable(usize, usize, usize),
    #[error("failed to parse value {0:?} in {1:?}: {2}")]
    MalformedCell(String, PathBuf, LastError),
    #[error("record in {0:?} does not match its header width")]
    ColumnCountMismatch(PathBuf),
    #[error("infile writing timeout: {0:?} did not appear within {1:.1}s{2}")]
    InfileTimeout(PathBuf, f32, Hint),
    #[error("outfile timeout: {0:?} did not appear within {1:.1}s")]
    OutfileTimeout(PathBuf, f32),
    #[error("simulator exited with error code: {0}\n\n{1}")]
    SimProcErrorCode(i32, LastError),
    #[error("simulator terminated by signal")]
    SimProcTerminated,
    #[error("failed to execute simulator process: {0}")]
    SimProcFailed(LastError),
    #[error("failed to write exchange file {0:?}: {1}")]
    ExchangeFileNotSaved(PathBuf, LastError),
    #[error("entity root {0:?} does not exist")]
    EntityRootMissing(PathBuf),
    #[error("an entity name must not be empty")]
    EmptyEntityName,
    #[error("failed to bootstrap simulation directory: {0}")]
    SimDirNotCreated(LastError),
    #[error("failed to parse simulator profile: {0}")]
    ProfileNotParsed(LastError),
    #[error("a driver instance performs exactly one run; create a new driver")]
    DriverSpent,
}

#[derive(Debug, PartialEq)]
pub struct LastError(pub String);

impl Display for LastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Error::lowerize(self.0.to_string()))
    }
}

impl Error {
    pub fn lowerize(s: String) -> String {
        // get the first word; a silent child process leaves nothing to lowerize
        let first_word = match s.split_whitespace().into_iter().next() {
            Some(w) => w,
            None => return s,
        };
        // retain punctuation if the first word is all-caps and longer than 1 character
        if first_word.len() > 1
            && first_word
                .chars()
                .find(|c| c.is_ascii_lowercase() == true)
                .is_none()
        {
            s.to_string()
        } else {
            s.char_indices()
                .map(|(i, c)| if i == 0 { c.to_ascii_lowercase() } else { c })
                .collect()
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Hint {
    RegisterFirst,
    WriteBeforeRun,
}

impl Display for Hint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::RegisterFirst => "register the descriptor before reading or writing it",
            Self::WriteBeforeRun => "write the input data before launching the simulation",
        };
        write!(
            f,
            "\n\n{}: {}",
            "hint".green(),
            Error::lowerize(message.to_string())
        )
    }
}

pub type Fault = Box<dyn std::error::Error>;
