use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use markup_merge::report::{render_check, render_stats, CheckReport};
use markup_merge::rules::resolve_rules;
use markup_tree::{
    merge_with_stats, parse_file, write_file, Alignment, KeyedComparator, MergeOptions, Node,
};
use tracing::debug;

mod cli;
mod logging;
mod path_guard;

use cli::{CheckArgs, Cli, Command, ComparatorArgs, MergeArgs, OutputFormat, RenderArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Merge(args) => run_merge(args),
        Command::Check(args) => run_check(args),
        Command::Render(args) => run_render(args),
    }
}

fn run_merge(args: MergeArgs) -> Result<()> {
    let left = load_tree(&args.left, args.comparator.root_element)?;
    let right = load_tree(&args.right, args.comparator.root_element)?;
    let (comparator, options) = build_comparator(&args.comparator)?;

    let (merged, stats) = merge_with_stats(&left, &right, &comparator, &options)
        .with_context(|| {
            format!(
                "failed to merge {} with {}",
                args.left.display(),
                args.right.display()
            )
        })?;

    if let Some(out_path) = &args.output {
        path_guard::ensure_output_is_not_input(out_path, &[&args.left, &args.right])?;
        write_file(&merged, out_path)
            .with_context(|| format!("failed to write merged output {}", out_path.display()))?;
    } else {
        print!("{merged}");
    }

    if args.summary {
        eprintln!("{}", render_stats(&stats));
    }

    Ok(())
}

fn run_check(args: CheckArgs) -> Result<()> {
    let left = load_tree(&args.left, args.comparator.root_element)?;
    let right = load_tree(&args.right, args.comparator.root_element)?;
    let (comparator, options) = build_comparator(&args.comparator)?;

    let outcome = merge_with_stats(&left, &right, &comparator, &options);
    let report = CheckReport::from_outcome(outcome.as_ref().map(|(_, stats)| *stats));

    match args.format {
        OutputFormat::Text => println!("{}", render_check(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if args.strict && !report.mergeable {
        bail!(
            "strict mode failed: {} and {} cannot be merged",
            args.left.display(),
            args.right.display()
        );
    }

    Ok(())
}

fn run_render(args: RenderArgs) -> Result<()> {
    let document = parse_file(&args.file)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;
    let node = Node::from(document);

    match args.format {
        OutputFormat::Text => print!("{node}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&node)?),
    }

    Ok(())
}

fn load_tree(path: &Path, root_element: bool) -> Result<Node> {
    let document =
        parse_file(path).with_context(|| format!("failed to parse {}", path.display()))?;

    if !root_element {
        return Ok(Node::from(document));
    }

    let mut roots = document.element_children();
    match (roots.next(), roots.next()) {
        (Some(root), None) => Ok(Node::from(root.clone())),
        (None, _) => bail!("{} has no root element", path.display()),
        (Some(_), Some(_)) => bail!("{} has more than one top-level element", path.display()),
    }
}

fn build_comparator(args: &ComparatorArgs) -> Result<(KeyedComparator, MergeOptions)> {
    let rules = resolve_rules(args.rules.as_deref(), &args.keys, &args.deep)
        .context("failed to resolve comparator rules")?;
    let comparator = KeyedComparator::new(rules);
    debug!(
        keys = comparator.rules().keys.len(),
        deep = comparator.rules().deep.len(),
        "comparator rules loaded"
    );

    let options = MergeOptions {
        alignment: if args.lookahead {
            Alignment::Lookahead
        } else {
            Alignment::Greedy
        },
    };

    Ok((comparator, options))
}
