use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use ffs::config::{self, Settings};
use ffs::patch::{apply_patch, PatchType};
use ffs::preview::{render_text_diff, RenderMode};
use ffs::search::{SearchEngine, SearchOptions};
use ffs::tree::{build_tree, render_text, to_json_minified, to_json_pretty};
use ffs::workflow::{EditOutcome, EditWorkflow, StdinConfirm, WorkflowOptions};
use ffs::{apply_suggestion, CancellationToken, FileEditRequest, Suggestion};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ffs")]
#[command(about = "Line-addressed file patching and concurrent text search", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to $FFS_CONFIG, ./ffs.toml, ~/.config/ffs/ffs.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a structured edit request (JSON file, or - for stdin)
    Edit {
        request: PathBuf,

        /// Apply without asking for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Do not print a preview of the edits
        #[arg(long)]
        no_preview: bool,

        /// Highlight changed lines with a background color
        #[arg(long)]
        highlight: bool,
    },

    /// Apply a JSON line-map patch such as {"2": "new text"} to a file
    Patch {
        file: PathBuf,

        /// Patch JSON, or @path to read it from a file
        patch: String,

        /// Insert entries at their line numbers instead of overwriting
        #[arg(short, long)]
        adding: bool,

        /// Show the result without writing the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show a line diff of the change
        #[arg(short, long)]
        diff: bool,
    },

    /// Search files below a directory for matching lines
    Search {
        root: PathBuf,
        query: String,

        #[arg(short = 'c', long)]
        match_case: bool,

        #[arg(short = 'w', long)]
        whole_word: bool,

        /// Treat the query as a regular expression
        #[arg(short = 'r', long)]
        regex: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the directory tree
    Tree {
        /// Root directory (defaults to the working directory)
        path: Option<PathBuf>,

        /// Only list files matching these globs
        #[arg(short, long)]
        include: Vec<String>,

        /// Skip entries matching these globs
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Print as pretty JSON
        #[arg(long)]
        json: bool,

        /// Print as single-line JSON
        #[arg(long, conflicts_with = "json")]
        minified: bool,
    },

    /// Replace a file's content with the content of another file
    Suggest {
        file: PathBuf,
        new_content: PathBuf,

        /// Show a line diff of the change
        #[arg(short, long)]
        diff: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    ffs::logging::init(cli.verbose);

    let settings = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Edit {
            request,
            yes,
            no_preview,
            highlight,
        } => cmd_edit(&settings, &request, yes, no_preview, highlight),

        Commands::Patch {
            file,
            patch,
            adding,
            dry_run,
            diff,
        } => cmd_patch(&file, &patch, adding, dry_run, diff),

        Commands::Search {
            root,
            query,
            match_case,
            whole_word,
            regex,
            json,
        } => {
            let options = SearchOptions {
                match_case: settings.search.match_case || match_case,
                match_whole_word: settings.search.match_whole_word || whole_word,
                use_regex: settings.search.use_regex || regex,
            };
            cmd_search(&root, &query, options, json)
        }

        Commands::Tree {
            path,
            include,
            exclude,
            json,
            minified,
        } => {
            let include = if include.is_empty() {
                settings.tree.include.clone()
            } else {
                include
            };
            let exclude = if exclude.is_empty() {
                settings.tree.exclude.clone()
            } else {
                exclude
            };
            cmd_tree(path, &include, &exclude, json, minified)
        }

        Commands::Suggest {
            file,
            new_content,
            diff,
        } => cmd_suggest(&file, &new_content, diff),
    }
}

/// Read a request body from a path, or stdin for `-`.
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        return Ok(input);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn cmd_edit(
    settings: &Settings,
    request_path: &Path,
    yes: bool,
    no_preview: bool,
    highlight: bool,
) -> Result<()> {
    let options = WorkflowOptions {
        preview: settings.edit.preview && !no_preview,
        prompt: settings.edit.confirm && !yes,
        render_mode: if settings.edit.highlight || highlight {
            RenderMode::Highlight
        } else {
            RenderMode::Markers
        },
    };

    // The request consumes stdin, so the prompt would only ever see EOF
    if options.prompt && request_path == Path::new("-") {
        bail!("cannot confirm an edit request read from stdin; pass --yes");
    }

    let input = read_input(request_path)?;
    let request = FileEditRequest::from_json(&input).context("invalid edit request")?;

    let mut confirm = StdinConfirm;
    let mut stdout = io::stdout();
    let outcome = EditWorkflow::new(options, &mut confirm, &mut stdout).run(&request)?;

    match outcome {
        EditOutcome::Applied {
            file,
            lines_before,
            lines_after,
        } => {
            println!(
                "{} Successfully updated file {} ({} -> {} lines)",
                "✓".green(),
                file.display(),
                lines_before,
                lines_after
            );
            Ok(())
        }
        EditOutcome::Aborted { file } => {
            eprintln!(
                "{} Edit aborted, {} left unchanged",
                "⊘".yellow(),
                file.display()
            );
            std::process::exit(1);
        }
    }
}

fn cmd_patch(file: &Path, patch: &str, adding: bool, dry_run: bool, show_diff: bool) -> Result<()> {
    let patch = match patch.strip_prefix('@') {
        Some(path) => read_input(Path::new(path))?,
        None => patch.to_string(),
    };
    let patch_type = if adding {
        PatchType::Adding
    } else {
        PatchType::Replacing
    };

    let original =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let updated = apply_patch(&original, &patch, patch_type)?;

    if show_diff {
        println!("{}", format!("--- {} (original)", file.display()).dimmed());
        println!("{}", format!("+++ {} (patched)", file.display()).dimmed());
        print!("{}", render_text_diff(&original, &updated));
    }

    if dry_run {
        if !show_diff {
            println!("{updated}");
        }
        println!("{}", "[DRY RUN - file not written]".cyan());
        return Ok(());
    }

    ffs::fs::atomic_write(file, updated.as_bytes())
        .with_context(|| format!("failed to write {}", file.display()))?;
    println!("{} Patched {}", "✓".green(), file.display());
    Ok(())
}

fn cmd_search(root: &Path, query: &str, options: SearchOptions, json: bool) -> Result<()> {
    let engine = SearchEngine::new();
    let mut results = engine.search(root, query, options, &CancellationToken::new())?;

    // Stable output for humans; the engine itself makes no ordering promise
    results.sort_by(|a, b| {
        (&a.file_path, a.line_number).cmp(&(&b.file_path, b.line_number))
    });

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for result in &results {
        println!(
            "{}:{}: {}",
            result.file_path.bright_blue(),
            result.line_number.to_string().yellow(),
            result.line_content
        );
    }
    eprintln!("{}", format!("{} matches", results.len()).dimmed());
    Ok(())
}

fn cmd_tree(
    path: Option<PathBuf>,
    include: &[String],
    exclude: &[String],
    json: bool,
    minified: bool,
) -> Result<()> {
    let root = match path {
        Some(path) => path,
        None => std::env::current_dir().context("could not get working directory")?,
    };

    let Some(tree) = build_tree(&root, include, exclude)? else {
        println!("{}", "No entries match the given filters".yellow());
        return Ok(());
    };

    if minified {
        println!("{}", to_json_minified(&tree)?);
    } else if json {
        println!("{}", to_json_pretty(&tree)?);
    } else {
        println!("{}", tree.name.bold());
        print!("{}", render_text(&tree));
    }
    Ok(())
}

fn cmd_suggest(file: &Path, new_content: &Path, show_diff: bool) -> Result<()> {
    let proposed = read_input(new_content)?;
    let original =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;

    let updated = apply_suggestion(&Suggestion::whole_file(file, proposed))?;

    if show_diff {
        print!("{}", render_text_diff(&original, &updated));
    }
    println!("{} Updated {}", "✓".green(), file.display());
    Ok(())
}
