use anvil_fuse::{fuse_slots, FusionResolver, ItemSource};
use anvil_rules::{MaterialCatalog, RuleFile, RuleSnapshot, RuleStore};
use anvil_types::MaterialId;
use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;

use crate::cli::*;
use crate::items::{load_item, LoadedItems, Slot, Terminal};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    let rules = cli.rules;
    match cli.command {
        Command::Fuse(args) => cmd_fuse(args, &open_store(rules.as_deref())?, format),
        Command::Lookup(args) => cmd_lookup(args, &open_store(rules.as_deref())?, format),
        Command::Check(args) => cmd_check(args, format),
        Command::Materials(args) => cmd_materials(args, &open_store(rules.as_deref())?, format),
    }
}

fn open_store(path: Option<&std::path::Path>) -> anyhow::Result<RuleStore> {
    match path {
        Some(path) => RuleStore::open(path)
            .with_context(|| format!("loading rules from {}", path.display())),
        None => Ok(RuleStore::new(RuleSnapshot::vanilla().context("compiling stock rules")?)),
    }
}

fn cmd_fuse(args: FuseArgs, store: &RuleStore, format: OutputFormat) -> anyhow::Result<()> {
    let rules = store.load();
    let mut items = LoadedItems::default();
    items.insert(Slot::Left, load_item(&args.left, rules.registry())?);
    if let Some(right) = &args.right {
        items.insert(Slot::Right, load_item(right, rules.registry())?);
    }

    let resolver = FusionResolver::with_default_stages();
    let mut terminal = Terminal { format };
    fuse_slots(
        &resolver,
        store,
        &items,
        &Slot::Left,
        &Slot::Right,
        args.rename.as_deref(),
        &mut terminal,
        &(),
    );

    if args.explain {
        let left = items.snapshot(&Slot::Left);
        let right = items.snapshot(&Slot::Right);
        let r = resolver.explain(&left, &right, args.rename.as_deref(), &rules);
        match format {
            OutputFormat::Json => {
                let value = json!({
                    "stage": r.stage,
                    "reason": r.reason,
                    "breakdown": r.breakdown,
                    "deltas": r.merge.as_ref().map(|m| &m.deltas),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            OutputFormat::Text => {
                println!("  Stage: {}", r.stage.as_deref().unwrap_or("-"));
                if let Some(reason) = &r.reason {
                    println!("  Reason: {}", reason.red());
                }
                if let Some(b) = r.breakdown {
                    println!(
                        "  Cost: base {} + enchantments {} + conflicts {} + rename {} + prior work {} = {}",
                        b.base, b.enchantments, b.conflicts, b.rename, b.prior_work,
                        b.total().to_string().bold()
                    );
                }
                if let Some(merge) = &r.merge {
                    for (id, delta) in &merge.deltas {
                        println!("  {} {:?}", id.to_string().blue(), delta);
                    }
                }
            }
        }
    }
    Ok(())
}

fn cmd_lookup(args: LookupArgs, store: &RuleStore, format: OutputFormat) -> anyhow::Result<()> {
    let rules = store.load();
    let registry = rules.registry();
    let found = registry.discover_by_name(&args.name);
    if found.is_empty() {
        bail!("no enchantment matches '{}'", args.name);
    }

    if format == OutputFormat::Json {
        let entries: Vec<_> = found
            .iter()
            .filter_map(|id| registry.get(id))
            .map(|def| {
                json!({
                    "id": def.id,
                    "name": def.name,
                    "max_level": def.max_level,
                    "weight": def.weight,
                    "conflicts": registry.conflict_sets_of(&def.id).iter().map(|s| &s.name).collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if found.len() > 1 {
        println!("{} '{}' is ambiguous; {} matches:", "!".yellow().bold(), args.name, found.len());
    }
    for id in &found {
        let Some(def) = registry.get(id) else { continue };
        println!("{} {}", def.name.bold(), id.to_string().dimmed());
        println!("  Max level: {}  Weight: {}", def.max_level, def.weight);
        for set in registry.conflict_sets_of(id) {
            let others: Vec<String> = set
                .members()
                .iter()
                .filter(|m| *m != id)
                .map(|m| m.to_string())
                .collect();
            println!("  Conflicts ({}): {}", set.name.yellow(), others.join(", "));
        }
        for alias in &def.aliases {
            println!("  Alias: {}", alias.to_string().cyan());
        }
    }
    Ok(())
}

fn cmd_check(args: CheckArgs, format: OutputFormat) -> anyhow::Result<()> {
    let snapshot = RuleFile::load(&args.path)
        .and_then(RuleFile::compile)
        .with_context(|| format!("checking {}", args.path.display()))?;

    if format == OutputFormat::Json {
        let value = json!({
            "fingerprint": snapshot.fingerprint().to_hex(),
            "enchantments": snapshot.registry().len(),
            "conflict_sets": snapshot.registry().conflict_sets().len(),
            "materials": snapshot.materials().len(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} {} is valid", "✓".green().bold(), args.path.display());
    println!("  Fingerprint: {}", snapshot.fingerprint().to_hex().cyan());
    println!("  Enchantments: {}", snapshot.registry().len());
    println!("  Conflict sets: {}", snapshot.registry().conflict_sets().len());
    println!("  Materials: {}", snapshot.materials().len());
    Ok(())
}

fn cmd_materials(args: MaterialsArgs, store: &RuleStore, format: OutputFormat) -> anyhow::Result<()> {
    let rules = store.load();
    let catalog = MaterialCatalog::new();
    let views = match &args.material {
        Some(raw) => {
            let material = MaterialId::new(raw);
            match catalog.view(&rules, &material)? {
                Some(view) => vec![view],
                None => bail!("{material} has no material rule"),
            }
        }
        None => catalog.repair_materials(&rules)?,
    };

    if format == OutputFormat::Json {
        let entries: Vec<_> = views
            .iter()
            .map(|v| {
                json!({
                    "material": v.material,
                    "label": v.label,
                    "repair_strength": v.repair_strength,
                    "repairs": v.repairs.iter().map(|(item, s)| json!({ "item": item, "strength": s })).collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("No repair materials configured.");
    }
    for view in &views {
        println!("{} ({} items)", view.label.bold(), view.repairable_count);
        for (item, strength) in &view.repairs {
            println!("  {} {}", item.to_string().cyan(), strength);
        }
    }
    Ok(())
}
