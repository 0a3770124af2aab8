use std::fs;
use std::io::Read;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::Value;

use dirdb_core::{selftest, NodeStore};
use dirdb_fs::FsBackend;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        root,
        delimiter,
        ..
    } = cli;
    match command {
        Command::Ls(args) => cmd_ls(&root, &delimiter, args),
        Command::Get(args) => cmd_get(&root, &delimiter, args),
        Command::Set(args) => cmd_set(&root, &delimiter, args),
        Command::Rm(args) => cmd_rm(&root, &delimiter, args),
        Command::Mkdir(args) => cmd_mkdir(&root, &delimiter, args),
        Command::Export(args) => cmd_export(&root, &delimiter, args),
        Command::Import(args) => cmd_import(&root, args),
        Command::Selftest(_) => cmd_selftest(),
    }
}

fn open_store(root: &str) -> anyhow::Result<NodeStore<FsBackend>> {
    let backend = FsBackend::open(root).with_context(|| format!("cannot open store at {root}"))?;
    Ok(NodeStore::new(backend))
}

fn cmd_ls(root: &str, delimiter: &str, args: LsArgs) -> anyhow::Result<()> {
    let mut store = open_store(root)?;
    if let Some(path) = &args.path {
        if store.cd_by_path(path, false, delimiter).is_none() {
            bail!("no such directory: {path}");
        }
    }
    for name in store.names() {
        if store.is_dir(&name) {
            println!("{}{}", name.blue().bold(), "/".blue());
        } else {
            println!("{name}");
        }
    }
    Ok(())
}

fn cmd_get(root: &str, delimiter: &str, args: GetArgs) -> anyhow::Result<()> {
    let mut store = open_store(root)?;
    let Some(name) = store.cd_by_path(&args.path, true, delimiter) else {
        bail!("no such path: {}", args.path);
    };
    let Some(value) = store.get(&name) else {
        bail!("no value at {}", args.path);
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn cmd_set(root: &str, delimiter: &str, args: SetArgs) -> anyhow::Result<()> {
    let mut store = open_store(root)?;
    let Some(name) = store.cd_by_path(&args.path, true, delimiter) else {
        bail!("no such directory for {} (try mkdir first)", args.path);
    };
    let value: Value =
        serde_json::from_str(&args.value).unwrap_or_else(|_| Value::String(args.value.clone()));
    if !store.set(&name, value) {
        bail!("cannot set {}", args.path);
    }
    println!("{} set {}", "✓".green().bold(), args.path.yellow());
    Ok(())
}

fn cmd_rm(root: &str, delimiter: &str, args: RmArgs) -> anyhow::Result<()> {
    let mut store = open_store(root)?;
    let Some(name) = store.cd_by_path(&args.path, true, delimiter) else {
        bail!("no such path: {}", args.path);
    };
    if !store.rm(&name) {
        bail!("cannot remove {}", args.path);
    }
    println!("{} removed {}", "✓".green().bold(), args.path.yellow());
    Ok(())
}

fn cmd_mkdir(root: &str, delimiter: &str, args: MkdirArgs) -> anyhow::Result<()> {
    let mut store = open_store(root)?;
    if !store.mkdirs_by_path(&args.path, delimiter) {
        bail!("cannot create {}", args.path);
    }
    println!("{} created {}", "✓".green().bold(), args.path.yellow());
    Ok(())
}

fn cmd_export(root: &str, delimiter: &str, args: ExportArgs) -> anyhow::Result<()> {
    let mut store = open_store(root)?;
    if let Some(path) = &args.path {
        if store.cd_by_path(path, false, delimiter).is_none() {
            bail!("no such directory: {path}");
        }
    }
    let Some(json) = store.to_json_pretty(args.indent) else {
        bail!("export failed");
    };
    println!("{json}");
    Ok(())
}

fn cmd_import(root: &str, args: ImportArgs) -> anyhow::Result<()> {
    let json = match &args.file {
        Some(file) => fs::read_to_string(file).with_context(|| format!("cannot read {file}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("cannot read stdin")?;
            buf
        }
    };
    let mut store = open_store(root)?;
    if !store.from_json(&json) {
        bail!("import failed (changes up to the failure point are kept)");
    }
    println!("{} imported", "✓".green().bold());
    Ok(())
}

fn cmd_selftest() -> anyhow::Result<()> {
    let mut store = NodeStore::in_memory();
    selftest::run(&mut store)?;
    println!("{} memory backend", "✓".green().bold());

    let dir = tempfile::tempdir().context("cannot create scratch directory")?;
    let mut store = NodeStore::new(FsBackend::open(dir.path())?);
    selftest::run(&mut store)?;
    println!("{} filesystem backend", "✓".green().bold());
    Ok(())
}
