mod args;
mod format;
mod payload;

use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;

use args::{Args, Operation};
use kestrel_common::types::{InstanceId, SnapshotId};
use kestrel_store::builder::KvsBuilder;
use kestrel_store::kvs::Kvs;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("kvs_tool: error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    tracing::debug!(
        "running {:?} on instance {} in '{}'",
        args.operation,
        args.instance,
        args.dir
    );

    let kvs = KvsBuilder::new(InstanceId(args.instance))
        .dir(&args.dir)
        .build()
        .with_context(|| format!("could not open instance {}", args.instance))?;
    // Persistence is explicit below so that a failed flush reaches the exit
    // code; the teardown flush would swallow it.
    kvs.set_flush_on_exit(false);

    match args.operation {
        Operation::Setkey => {
            let key = required_key(&args)?;
            let raw = args
                .payload
                .as_deref()
                .context("setkey requires a payload (-p)")?;
            let value = payload::parse_payload(raw).context("could not parse payload")?;
            kvs.set_value(key, value)?;
            persist(&kvs)?;
            println!("key '{key}' written");
        }
        Operation::Getkey => {
            let key = required_key(&args)?;
            let value = kvs
                .get_value(key)
                .with_context(|| format!("could not read key '{key}'"))?;
            println!("{}: {}", value.type_tag(), format::render(&value));
        }
        Operation::Removekey => {
            let key = required_key(&args)?;
            kvs.remove_key(key)
                .with_context(|| format!("could not remove key '{key}'"))?;
            persist(&kvs)?;
            println!("key '{key}' removed");
        }
        Operation::Listkeys => {
            let mut keys = kvs.get_all_keys()?;
            keys.sort();
            for key in keys {
                println!("{key}");
            }
        }
        Operation::Reset => {
            kvs.reset()?;
            persist(&kvs)?;
            println!("store reset");
        }
        Operation::Snapshotcount => {
            println!("{}", kvs.snapshot_count()?);
        }
        Operation::Snapshotmaxcount => {
            println!("{}", kvs.snapshot_max_count());
        }
        Operation::Snapshotrestore => {
            let id = required_snapshot(&args)?;
            kvs.snapshot_restore(SnapshotId(id))
                .with_context(|| format!("could not restore snapshot {id}"))?;
            persist(&kvs)?;
            println!("restored snapshot {id}");
        }
        Operation::Getkvsfilename => {
            let id = args.snapshot.unwrap_or(0);
            println!("{}", kvs.get_kvs_filename(SnapshotId(id))?.display());
        }
        Operation::Gethashfilename => {
            let id = args.snapshot.unwrap_or(0);
            println!("{}", kvs.get_hash_filename(SnapshotId(id))?.display());
        }
    }

    Ok(())
}

fn persist(kvs: &Kvs) -> Result<()> {
    kvs.flush().context("could not persist the store")
}

fn required_key(args: &Args) -> Result<&str> {
    match args.key.as_deref() {
        Some(key) => Ok(key),
        None => bail!("operation requires a key (-k)"),
    }
}

fn required_snapshot(args: &Args) -> Result<usize> {
    match args.snapshot {
        Some(id) => Ok(id),
        None => bail!("operation requires a snapshot id (-s)"),
    }
}
