use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use confpatch_diff::{diff_texts, DiffOptions, TextDiff};
use confpatch_engine::{output_for, ConfigCompare, OutputKind, PatchSettings, Selection};
use confpatch_store::FileConfigStore;
use confpatch_types::{ChangeType, Namespace, PatchDocument};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(cli.config.as_deref())?;
    match cli.command {
        Command::List(args) => cmd_list(args, settings, &cli.format),
        Command::Patch(args) => cmd_patch(args, settings, &cli.format),
        Command::Diff(args) => cmd_diff(args, settings),
        Command::Settings(_) => {
            print!("{}", settings.to_toml_string()?);
            Ok(())
        }
    }
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<PatchSettings> {
    match path {
        Some(path) => Ok(PatchSettings::load(path)?),
        None => Ok(PatchSettings::default()),
    }
}

fn open_compare(stores: &StorePair, settings: &PatchSettings) -> anyhow::Result<ConfigCompare> {
    let extension = stores
        .extension
        .as_deref()
        .unwrap_or(&settings.file_extension);
    let source = FileConfigStore::with_extension(&stores.source, extension)
        .with_context(|| format!("opening source {}", stores.source.display()))?;
    let target = FileConfigStore::with_extension(&stores.target, extension)
        .with_context(|| format!("opening target {}", stores.target.display()))?;
    Ok(ConfigCompare::new(Arc::new(source), Arc::new(target), settings))
}

fn cmd_list(args: ListArgs, settings: PatchSettings, format: &OutputFormat) -> anyhow::Result<()> {
    let compare = open_compare(&args.stores, &settings)?;
    let changes = compare.changelist()?;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&changes)?);
        return Ok(());
    }
    if changes.is_empty() {
        println!("No changes.");
        return Ok(());
    }
    for (namespace, entries) in changes.iter() {
        println!("{}", namespace.to_string().bold());
        for entry in entries.values() {
            let label = match entry.change_type {
                ChangeType::Create => "create".green(),
                ChangeType::Update => "update".yellow(),
                ChangeType::Delete => "delete".red(),
                ChangeType::Rename => "rename".cyan(),
            };
            println!("  {label:>8}  {}", entry.name);
        }
    }
    println!(
        "\n{} change(s): {} created, {} updated, {} deleted, {} renamed",
        changes.len().to_string().bold(),
        changes.count(ChangeType::Create),
        changes.count(ChangeType::Update),
        changes.count(ChangeType::Delete),
        changes.count(ChangeType::Rename)
    );
    Ok(())
}

fn cmd_patch(args: PatchArgs, mut settings: PatchSettings, format: &OutputFormat) -> anyhow::Result<()> {
    if let Some(base_path) = args.base_path {
        settings.config_base_path = base_path;
    }
    if let Some(path) = args.output_file {
        settings.output = OutputKind::File;
        settings.output_path = Some(path);
    }

    let compare = open_compare(&args.stores, &settings)?;
    let selection = parse_selection(&args.select);
    let changes = compare.changelist()?;
    let mut document = compare.collect_patches(&selection)?;
    filter_collections(&mut document, &args.collections);
    debug!(patches = document.len(), "patch document ready");

    if document.is_empty() {
        eprintln!("No changes.");
        return Ok(());
    }
    if let OutputFormat::Json = format {
        let json = serde_json::to_string_pretty(&document)?;
        match (&settings.output, &settings.output_path) {
            (OutputKind::File, Some(path)) => {
                fs::write(path, format!("{json}\n"))
                    .with_context(|| format!("writing {}", path.display()))?;
                report_written(document.len(), path);
            }
            _ => println!("{json}"),
        }
        return Ok(());
    }

    let output = output_for(&settings)?;
    output.deliver(&document, &changes)?;
    if settings.output == OutputKind::File {
        if let Some(path) = &settings.output_path {
            report_written(document.len(), path);
        }
    }
    Ok(())
}

fn report_written(patches: usize, path: &Path) {
    eprintln!(
        "{} Wrote {} patch(es) to {}",
        "✓".green().bold(),
        patches,
        path.display().to_string().bold()
    );
}

fn cmd_diff(args: DiffArgs, settings: PatchSettings) -> anyhow::Result<()> {
    let mut options = settings.diff;
    if let Some(context) = args.unified {
        options.context_lines = context;
    }
    options.collapse_ranges |= args.collapse_ranges;

    let from = read_side(&args.from)?;
    let to = read_side(&args.to)?;
    let patch = diff_texts(
        from.as_deref(),
        to.as_deref(),
        &args.from.display().to_string(),
        &args.to.display().to_string(),
        &options,
    );
    print!("{patch}");
    if args.stat {
        eprintln!("{}", stat_line(from.as_deref(), to.as_deref(), &options).dimmed());
    }
    Ok(())
}

fn stat_line(from: Option<&str>, to: Option<&str>, options: &DiffOptions) -> String {
    let diff = TextDiff::compute(from.unwrap_or_default(), to.unwrap_or_default(), options);
    let (removed, added) = diff.line_counts();
    format!(
        "{} hunk(s), {} insertion(s)(+), {} deletion(s)(-)",
        diff.hunks.len(),
        added,
        removed
    )
}

fn read_side(path: &Path) -> anyhow::Result<Option<String>> {
    if path == Path::new("/dev/null") {
        return Ok(None);
    }
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(Some(text))
}

/// `NAME` selects in the default namespace, `NAMESPACE:NAME` elsewhere.
fn parse_selection(items: &[String]) -> Selection {
    items.iter().fold(Selection::all(), |selection, item| match item.split_once(':') {
        Some((namespace, name)) => selection.include(&Namespace::new(namespace), name),
        None => selection.include(&Namespace::default_namespace(), item.as_str()),
    })
}

fn filter_collections(document: &mut PatchDocument, collections: &[String]) {
    if collections.is_empty() {
        return;
    }
    document.retain_namespaces(|key| collections.iter().any(|c| c == key));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_splits_namespace_prefix() {
        let selection = parse_selection(&["a".into(), "language.fr:b".into()]);
        assert_eq!(selection.names(&Namespace::default_namespace()), Some(vec!["a"]));
        assert_eq!(selection.names(&Namespace::new("language.fr")), Some(vec!["b"]));
        assert_eq!(selection.names(&Namespace::new("other")), None);
    }

    #[test]
    fn collections_filter_keeps_listed_namespaces() {
        let mut doc = PatchDocument::new();
        doc.insert(&Namespace::default_namespace(), "a", "p\n".into());
        doc.insert(&Namespace::new("language.fr"), "b", "q\n".into());
        filter_collections(&mut doc, &["language.fr".into()]);
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["language.fr"]);

        filter_collections(&mut doc, &[]);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn stat_counts_changed_lines() {
        let line = stat_line(Some("a\nb\nc\n"), Some("a\nB\nc\nd\n"), &DiffOptions::default());
        assert_eq!(line, "1 hunk(s), 2 insertion(s)(+), 1 deletion(s)(-)");

        let created = stat_line(None, Some("x\n"), &DiffOptions::default());
        assert_eq!(created, "1 hunk(s), 1 insertion(s)(+), 0 deletion(s)(-)");
    }

    #[test]
    fn dev_null_is_absent() {
        assert_eq!(read_side(Path::new("/dev/null")).unwrap(), None);
    }

    #[test]
    fn patch_command_writes_file() {
        let source = tempfile::TempDir::new().unwrap();
        let target = tempfile::TempDir::new().unwrap();
        fs::write(source.path().join("site.name.yml"), "value: Old\n").unwrap();
        fs::write(target.path().join("site.name.yml"), "value: New\n").unwrap();
        let out = target.path().join("changes.patch");

        let args = PatchArgs {
            stores: StorePair {
                source: source.path().to_path_buf(),
                target: target.path().to_path_buf(),
                extension: None,
            },
            output_file: Some(out.clone()),
            collections: Vec::new(),
            base_path: None,
            select: Vec::new(),
        };
        cmd_patch(args, PatchSettings::default(), &OutputFormat::Text).unwrap();

        let written = fs::read_to_string(out).unwrap();
        assert!(written.starts_with("diff --git a/site.name.yml b/site.name.yml\n"));
        assert!(written.contains("-value: Old\n+value: New\n"));
    }

    #[test]
    fn json_patch_command_honours_output_file() {
        let source = tempfile::TempDir::new().unwrap();
        let target = tempfile::TempDir::new().unwrap();
        fs::write(source.path().join("site.name.yml"), "value: Old\n").unwrap();
        fs::write(target.path().join("site.name.yml"), "value: New\n").unwrap();
        let out = target.path().join("changes.json");

        let args = PatchArgs {
            stores: StorePair {
                source: source.path().to_path_buf(),
                target: target.path().to_path_buf(),
                extension: None,
            },
            output_file: Some(out.clone()),
            collections: Vec::new(),
            base_path: None,
            select: Vec::new(),
        };
        cmd_patch(args, PatchSettings::default(), &OutputFormat::Json).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        let patch = written["default"]["site.name"].as_str().unwrap();
        assert!(patch.starts_with("diff --git a/site.name.yml b/site.name.yml\n"));
    }
}
