//! Entity lump inspector: summary statistics and scripted field edits.
//!
//! Reads a dumped entities lump, applies `--set`/`--rename` edits through the
//! tree model's edit gateway, prints a JSON summary to stdout and, with
//! `--out`, writes the regenerated lump. `--dump` writes the edited entities
//! as JSON.
//!
//! Run: cargo run --bin entity-stats -- maps/q3dm17.ent --set 0 message "Edited" --out out.ent

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use entity_tree::{EntityTreeModel, LumpId, ProviderTable, TextEntityCodec, TreeConfig};
use serde::Serialize;

const USAGE: &str = "Usage: entity-stats <entities-file> [--config <json>] \
[--set <entity> <key> <value>]... [--rename <entity> <old> <new>]... [--out <file>] [--dump <json>]";

#[derive(Debug)]
enum Edit {
    Set { entity: usize, key: String, value: String },
    Rename { entity: usize, old: String, new: String },
}

#[derive(Debug)]
struct Args {
    input: PathBuf,
    config: Option<PathBuf>,
    edits: Vec<Edit>,
    out: Option<PathBuf>,
    dump: Option<PathBuf>,
}

#[derive(Serialize)]
struct Summary {
    entities: usize,
    fields: usize,
    edits_applied: usize,
    classes: std::collections::BTreeMap<String, usize>,
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut iter = args.iter().skip(1);
    let input = match iter.next() {
        Some(a) if !a.starts_with("--") => PathBuf::from(a),
        Some(a) => bail!("entities file '{}' looks like a flag, not a path.\n{}", a, USAGE),
        None => bail!("{}", USAGE),
    };

    let mut parsed = Args { input, config: None, edits: Vec::new(), out: None, dump: None };
    while let Some(flag) = iter.next() {
        let mut operand = |what: &str| {
            iter.next()
                .cloned()
                .with_context(|| format!("{} expects {}", flag, what))
        };
        match flag.as_str() {
            "--config" => parsed.config = Some(PathBuf::from(operand("a path")?)),
            "--out" => parsed.out = Some(PathBuf::from(operand("a path")?)),
            "--dump" => parsed.dump = Some(PathBuf::from(operand("a path")?)),
            "--set" => {
                let entity = operand("an entity index")?.parse().context("--set entity index")?;
                let key = operand("a key")?;
                let value = operand("a value")?;
                parsed.edits.push(Edit::Set { entity, key, value });
            }
            "--rename" => {
                let entity = operand("an entity index")?.parse().context("--rename entity index")?;
                let old = operand("the current key")?;
                let new = operand("the new key")?;
                parsed.edits.push(Edit::Rename { entity, old, new });
            }
            other => bail!("unknown argument '{}'\n{}", other, USAGE),
        }
    }
    Ok(parsed)
}

fn apply(model: &mut EntityTreeModel, edit: &Edit) -> anyhow::Result<()> {
    match edit {
        Edit::Set { entity, key, value } => {
            // A missing key has no field node to edit; it cannot be added.
            let cell = model
                .find_field(*entity, key, 1)
                .with_context(|| format!("entity {} has no field '{}'", entity, key))?;
            model.apply_edit(&cell, value)?;
        }
        Edit::Rename { entity, old, new } => {
            let cell = model
                .find_field(*entity, old, 0)
                .with_context(|| format!("entity {} has no field '{}'", entity, old))?;
            model.apply_edit(&cell, new)?;
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<TreeConfig> {
    let Some(path) = path else {
        return Ok(TreeConfig::default());
    };
    TreeConfig::read_from(path)?.with_context(|| format!("config file {} not found", path.display()))
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let entities = TextEntityCodec.parse(&bytes)?;

    let mut model = EntityTreeModel::with_config(entities, config);
    let mut providers = ProviderTable::new();
    model.install_provider(&mut providers);

    for edit in &args.edits {
        apply(&mut model, edit).with_context(|| format!("applying {:?}", edit))?;
    }

    let summary = Summary {
        entities: model.store().len(),
        fields: model.store().field_count(),
        edits_applied: args.edits.len(),
        classes: model.class_histogram(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(out) = &args.out {
        let lump = providers
            .generate(LumpId::Entities)?
            .context("entities provider missing")?;
        std::fs::write(out, &lump).with_context(|| format!("writing {}", out.display()))?;
        tracing::info!("wrote {} bytes to {}", lump.len(), out.display());
    }
    if let Some(dump) = &args.dump {
        let json = serde_json::to_string_pretty(model.store().entities())?;
        std::fs::write(dump, json).with_context(|| format!("writing {}", dump.display()))?;
        tracing::info!("dumped {} entities to {}", model.store().len(), dump.display());
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("entity-stats {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("{}", USAGE);
        std::process::exit(0);
    }

    let result = parse_args(&args).and_then(run);
    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
