use std::io::{self, Write};
use std::path::{Path, PathBuf};

use colored::Colorize;

use mvb_core::Repository;
use mvb_diff::{ChangeKind, Diff};
use mvb_index::{parse_indexed_pattern, VersionRecord};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        store,
        workers,
        format,
        ..
    } = cli;
    let ctx = Context {
        store: PathBuf::from(store),
        workers,
        format,
    };
    match command {
        Command::Init(args) => cmd_init(&ctx, args),
        Command::Backup(_) => cmd_backup(&ctx),
        Command::Preview(_) => cmd_preview(&ctx),
        Command::List(args) => cmd_list(&ctx, args),
        Command::Get(args) => cmd_get(&ctx, args),
        Command::Diff(args) => cmd_diff(&ctx, args),
        Command::Restore(args) => cmd_restore(&ctx, args),
        Command::Link(args) => cmd_link(&ctx, args),
        Command::Delete(args) => cmd_delete(&ctx, args),
        Command::Check(_) => cmd_check(&ctx),
        Command::Gc(_) => cmd_gc(&ctx),
    }
}

struct Context {
    store: PathBuf,
    workers: usize,
    format: OutputFormat,
}

impl Context {
    fn repo(&self) -> anyhow::Result<Repository> {
        Ok(Repository::open(&self.store)?.with_workers(self.workers))
    }

    fn json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }
}

fn cmd_init(ctx: &Context, args: InitArgs) -> anyhow::Result<()> {
    let repo = Repository::init(&ctx.store, &args.path)?;
    println!(
        "{} Initialized store in {} backing up {}",
        "✓".green().bold(),
        repo.store_root().display().to_string().bold(),
        repo.ref_root().display().to_string().yellow()
    );
    Ok(())
}

fn cmd_backup(ctx: &Context) -> anyhow::Result<()> {
    let outcome = ctx.repo()?.backup()?;
    if ctx.json() {
        println!(
            "{}",
            serde_json::json!({ "id": outcome.id.to_hex(), "created": outcome.created })
        );
        return Ok(());
    }
    if outcome.created {
        println!("{}", outcome.id);
    } else {
        println!("{} {}", "skip".dimmed(), outcome.id);
    }
    Ok(())
}

fn cmd_preview(ctx: &Context) -> anyhow::Result<()> {
    let preview = ctx.repo()?.preview()?;
    if ctx.json() {
        println!(
            "{}",
            serde_json::json!({ "id": preview.id.to_hex(), "manifest": preview.manifest })
        );
        return Ok(());
    }
    print!("{}", preview.manifest);
    println!("{}", preview.id.to_string().yellow());
    Ok(())
}

fn cmd_list(ctx: &Context, args: ListArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let records = match args.pattern.as_deref() {
        None => repo.versions_newest_first()?,
        Some(pattern) if parse_indexed_pattern(pattern).is_some() => {
            vec![repo.resolve(pattern)?]
        }
        Some(pattern) => repo.find_versions(pattern)?,
    };
    print_records(ctx, &records)
}

fn cmd_get(ctx: &Context, args: GetArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let version = match args.version.as_deref() {
        None => return print_records(ctx, &repo.versions_newest_first()?),
        Some(pattern) => repo.resolve(pattern)?,
    };
    match args.path.as_deref() {
        None => print!("{}", repo.manifest_text(&version.digest)?),
        Some(path) if path.is_empty() || path.ends_with('/') => {
            for entry in repo.entries_under(&version.digest, path)? {
                print!("{}", mvb_manifest::encode_entry(&entry));
            }
        }
        Some(path) => {
            // Object bytes go to stdout as-is; logging stays on stderr.
            let mut out = io::stdout().lock();
            repo.read_file_to(&version.digest, path, &mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn cmd_diff(ctx: &Context, args: DiffArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let from = repo.resolve_or_latest(args.from.as_deref())?;
    let diff = match args.to.as_deref() {
        Some(pattern) => {
            let to = repo.resolve(pattern)?;
            repo.diff_versions(&from.digest, &to.digest)?
        }
        None => repo.diff_worktree(&from.digest)?,
    };
    print_diff(ctx, &diff)
}

fn cmd_restore(ctx: &Context, args: RestoreArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let version = repo.resolve_or_latest(args.version.as_deref())?;
    let target = args.path.as_ref().map(PathBuf::from);
    let applied = repo.restore(&version.digest, target.as_deref())?;

    print_diff(ctx, &applied)?;
    if !ctx.json() {
        println!(
            "{} Restored {}",
            "✓".green().bold(),
            version.digest.to_string().yellow()
        );
    }
    Ok(())
}

fn cmd_link(ctx: &Context, args: LinkArgs) -> anyhow::Result<()> {
    let repo = ctx.repo()?;
    let version = repo.resolve(&args.version)?;
    let count = repo.link(&version.digest, Path::new(&args.path))?;
    println!(
        "{} Linked {} entries of {} into {}",
        "✓".green().bold(),
        count.to_string().bold(),
        version.digest.short_hex().yellow(),
        args.path.bold()
    );
    Ok(())
}

fn cmd_delete(ctx: &Context, args: DeleteArgs) -> anyhow::Result<()> {
    let removed = ctx.repo()?.delete_versions(&args.pattern)?;
    if ctx.json() {
        println!("{}", serde_json::json!({ "removed": removed }));
        return Ok(());
    }
    println!("{} version(s) deleted", removed.to_string().bold());
    Ok(())
}

fn cmd_check(ctx: &Context) -> anyhow::Result<()> {
    let report = ctx.repo()?.verify_objects()?;
    if ctx.json() {
        println!(
            "{}",
            serde_json::json!({ "checked": report.checked, "corrupt": report.corrupt })
        );
    } else {
        for id in &report.corrupt {
            println!("{} {}", "corrupt".red().bold(), id);
        }
        println!("{} object(s) checked", report.checked.to_string().bold());
    }
    if report.is_clean() {
        Ok(())
    } else {
        anyhow::bail!("{} corrupt object(s)", report.corrupt.len())
    }
}

fn cmd_gc(ctx: &Context) -> anyhow::Result<()> {
    let report = ctx.repo()?.sweep_unreferenced()?;
    if ctx.json() {
        println!(
            "{}",
            serde_json::json!({ "removed": report.removed, "pruned_dirs": report.pruned_dirs })
        );
        return Ok(());
    }
    for id in &report.removed {
        println!("{} {}", "removed".dimmed(), id);
    }
    println!(
        "{} {} object(s) removed, {} shard dir(s) pruned",
        "✓".green(),
        report.removed.len().to_string().bold(),
        report.pruned_dirs
    );
    Ok(())
}

fn print_records(ctx: &Context, records: &[VersionRecord]) -> anyhow::Result<()> {
    if ctx.json() {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }
    for record in records {
        println!("{} {}", record.digest, record.timestamp.to_string().dimmed());
    }
    Ok(())
}

fn print_diff(ctx: &Context, diff: &Diff) -> anyhow::Result<()> {
    if ctx.json() {
        println!("{}", serde_json::to_string_pretty(&diff.changes)?);
        return Ok(());
    }
    for change in &diff.changes {
        let line = change.to_string();
        let line = match change.kind {
            ChangeKind::Add => line.green(),
            ChangeKind::Modify => line.yellow(),
            ChangeKind::Delete => line.red(),
        };
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn run(args: &[&str]) -> anyhow::Result<()> {
        run_command(Cli::try_parse_from(args).unwrap())
    }

    #[test]
    fn init_backup_restore_through_the_cli() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("store");
        let tree = dir.path().join("tree");
        fs::create_dir(&tree).unwrap();
        fs::write(tree.join("a.txt"), "X").unwrap();

        let store = store.to_str().unwrap();
        run(&["mvb", "--store", store, "init", tree.to_str().unwrap()]).unwrap();
        run(&["mvb", "--store", store, "backup"]).unwrap();

        fs::write(tree.join("a.txt"), "ZZ").unwrap();
        run(&["mvb", "--store", store, "backup"]).unwrap();
        run(&["mvb", "--store", store, "restore", "v1"]).unwrap();
        assert_eq!(fs::read_to_string(tree.join("a.txt")).unwrap(), "X");
    }

    #[test]
    fn commands_fail_cleanly_without_a_store() {
        let dir = tempdir().unwrap();
        let store = dir.path().to_str().unwrap().to_string();
        assert!(run(&["mvb", "--store", &store, "backup"]).is_err());
        assert!(run(&["mvb", "--store", &store, "list"]).is_err());
    }

    #[test]
    fn check_fails_on_a_tampered_store() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("store");
        let tree = dir.path().join("tree");
        fs::create_dir(&tree).unwrap();
        fs::write(tree.join("a.txt"), "X").unwrap();

        let store_arg = store.to_str().unwrap();
        run(&["mvb", "--store", store_arg, "init", tree.to_str().unwrap()]).unwrap();
        run(&["mvb", "--store", store_arg, "backup"]).unwrap();
        assert!(run(&["mvb", "--store", store_arg, "check"]).is_ok());

        let x = mvb_types::Digest::of_bytes(b"X").to_hex();
        let object = store.join("objects").join(&x[..2]).join(&x[2..]);
        fs::write(object, "flipped").unwrap();
        assert!(run(&["mvb", "--store", store_arg, "check"]).is_err());
    }

    #[test]
    fn delete_then_gc_shrinks_the_store() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("store");
        let tree = dir.path().join("tree");
        fs::create_dir(&tree).unwrap();
        fs::write(tree.join("a.txt"), "X").unwrap();

        let store_arg = store.to_str().unwrap();
        run(&["mvb", "--store", store_arg, "init", tree.to_str().unwrap()]).unwrap();
        run(&["mvb", "--store", store_arg, "backup"]).unwrap();

        run(&["mvb", "--store", store_arg, "delete", "v1"]).unwrap();
        run(&["mvb", "--store", store_arg, "gc"]).unwrap();
        assert!(fs::read_dir(store.join("objects")).unwrap().next().is_none());
    }
}
