use clap::{Parser, ValueEnum};

/// kvs_tool: Kestrel key-value store command line client
#[derive(Debug, Parser)]
#[command(
    name = "kvs_tool",
    about = "Inspect and modify Kestrel key-value store instances",
    version
)]
pub struct Args {
    /// Operation to perform
    #[arg(short = 'o', long, value_enum)]
    pub operation: Operation,

    /// Key to operate on (setkey, getkey, removekey)
    #[arg(short = 'k', long)]
    pub key: Option<String>,

    /// Payload for setkey, given as a JSON literal: number, true/false,
    /// quoted string, array, object or null
    #[arg(short = 'p', long)]
    pub payload: Option<String>,

    /// Instance id
    #[arg(short = 'i', long, default_value_t = 0)]
    pub instance: usize,

    /// Directory holding the store files (empty means current directory)
    #[arg(short = 'd', long, default_value = "")]
    pub dir: String,

    /// Snapshot id (snapshotrestore, getkvsfilename, gethashfilename)
    #[arg(short = 's', long)]
    pub snapshot: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    /// Write a key and persist the store
    Setkey,
    /// Print the value of a key (falls back to its default)
    Getkey,
    /// Remove a written key and persist the store
    Removekey,
    /// List all written keys
    Listkeys,
    /// Clear all written keys and persist the store
    Reset,
    /// Print the number of snapshots on disk
    Snapshotcount,
    /// Print the snapshot ring capacity
    Snapshotmaxcount,
    /// Replace the store contents with a snapshot and persist
    Snapshotrestore,
    /// Print the store file path of a generation
    Getkvsfilename,
    /// Print the hash file path of a generation
    Gethashfilename,
}
