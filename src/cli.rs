//! Menu-driven console session.
//!
//! The session reads menu choices line by line from any [`BufRead`] and
//! writes everything it prints to any [`Write`], so it runs the same against
//! a terminal or an in-memory buffer.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use log::{debug, error};
use thiserror::Error;

use crate::config::{Backend, StoreConfig};
use crate::error::{LoadError, StoreError};
use crate::hash::DEFAULT_TABLE_SIZE;
use crate::loader::{self, CsvLayout};
use crate::util::format_elapsed;
use crate::RecordStore;

pub const DEFAULT_CSV_PATH: &str = "eBid_Monthly_Sales_Dec_2016.csv";
pub const DEFAULT_KEY: &str = "98024";

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Unbalanced binary search tree
    Tree,
    /// Chained hash table
    Hash,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Load auction bids into a keyed store and query them")]
pub struct Args {
    /// CSV file to load
    #[arg(default_value = DEFAULT_CSV_PATH)]
    pub csv_path: PathBuf,

    /// Key used by the find and remove menu entries
    #[arg(default_value = DEFAULT_KEY)]
    pub key: String,

    /// Store backend
    #[arg(short, long, value_enum, default_value_t = BackendArg::Tree)]
    pub backend: BackendArg,

    /// Bucket count for the hash backend
    #[arg(short, long, default_value_t = DEFAULT_TABLE_SIZE)]
    pub table_size: u32,
}

impl Args {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            backend: match self.backend {
                BackendArg::Tree => Backend::Tree,
                BackendArg::Hash => Backend::Hash,
            },
            table_size: self.table_size,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Choice {
    Load,
    Display,
    Find,
    Remove,
    Exit,
    Invalid(String),
}

impl Choice {
    fn parse(input: &str) -> Self {
        match input.trim().parse::<u32>() {
            Ok(1) => Choice::Load,
            Ok(2) => Choice::Display,
            Ok(3) => Choice::Find,
            Ok(4) => Choice::Remove,
            Ok(9) => Choice::Exit,
            _ => Choice::Invalid(input.trim().to_string()),
        }
    }
}

/// One interactive session over a single store.
pub struct Session<R, W> {
    store: Box<dyn RecordStore + Send + Sync>,
    csv_path: PathBuf,
    key: String,
    layout: CsvLayout,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(args: &Args, input: R, out: W) -> Result<Self, CliError> {
        let store = args.store_config().build()?;
        debug!("session using {}", store.backend_name());
        Ok(Self {
            store,
            csv_path: args.csv_path.clone(),
            key: args.key.clone(),
            layout: CsvLayout::default(),
            input,
            out,
        })
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Show the menu until the user exits or input ends.
    pub fn run(&mut self) -> Result<(), CliError> {
        loop {
            self.print_menu()?;
            let Some(choice) = self.read_choice()? else {
                writeln!(self.out)?;
                break;
            };
            match choice {
                Choice::Load => self.load()?,
                Choice::Display => self.display_all()?,
                Choice::Find => self.find()?,
                Choice::Remove => self.remove()?,
                Choice::Exit => break,
                Choice::Invalid(text) => writeln!(self.out, "Invalid choice: {text}")?,
            }
        }
        writeln!(self.out, "Good bye.")?;
        self.out.flush()?;
        Ok(())
    }

    fn print_menu(&mut self) -> io::Result<()> {
        write!(
            self.out,
            "Menu:\n  1. Load Bids\n  2. Display All Bids\n  3. Find Bid\n  4. Remove Bid\n  9. Exit\nEnter choice: "
        )?;
        self.out.flush()
    }

    /// `None` at end of input.
    fn read_choice(&mut self) -> io::Result<Option<Choice>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(Choice::parse(&line)))
    }

    fn load(&mut self) -> Result<(), CliError> {
        writeln!(self.out, "Loading CSV file {}", self.csv_path.display())?;
        let start = Instant::now();
        let result = loader::load_file(&self.csv_path, &self.layout, self.store.as_mut());
        let elapsed = start.elapsed();

        match result {
            Ok(summary) => {
                if !summary.header.is_empty() {
                    writeln!(self.out, "{}", summary.header.join(" | "))?;
                }
                writeln!(self.out, "{} bids read", summary.loaded)?;
                if summary.skipped > 0 {
                    writeln!(self.out, "{} rows skipped", summary.skipped)?;
                }
                if summary.duplicates > 0 {
                    writeln!(self.out, "{} duplicate bids skipped", summary.duplicates)?;
                }
            }
            Err(e) => {
                error!("{e}");
                writeln!(self.out, "{e}")?;
            }
        }
        writeln!(self.out, "{}", format_elapsed(elapsed))?;
        Ok(())
    }

    fn display_all(&mut self) -> Result<(), CliError> {
        for record in self.store.records() {
            writeln!(self.out, "{record}")?;
        }
        Ok(())
    }

    fn find(&mut self) -> Result<(), CliError> {
        let start = Instant::now();
        let found = self.store.search(&self.key).cloned();
        let elapsed = start.elapsed();

        match found {
            Some(record) => writeln!(self.out, "{record}")?,
            None => writeln!(self.out, "Bid Id {} not found.", self.key)?,
        }
        writeln!(self.out, "{}", format_elapsed(elapsed))?;
        Ok(())
    }

    fn remove(&mut self) -> Result<(), CliError> {
        if self.store.remove(&self.key) {
            writeln!(self.out, "Removed bid Id {}.", self.key)?;
        } else {
            writeln!(self.out, "Bid Id {} not found.", self.key)?;
        }
        Ok(())
    }
}
