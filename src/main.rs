use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use symtree::reflect::split_path;
use symtree::{render_tree, CrateSource, EntityId, Loader, RustdocAdapter, TreeOptions};

fn cli() -> Command {
    Command::new("symtree")
        .about("Print the module tree of a Rust crate")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("roots")
                .help("Module path to print, e.g. `serde::de` or `pkg.sub`")
                .value_name("ROOT")
                .required(true)
                .num_args(1..),
        )
        .arg(
            Arg::new("depth")
                .help("Deepest level printed below the root")
                .long("depth")
                .short('d')
                .value_parser(value_parser!(usize))
                .default_value("2"),
        )
        .arg(
            Arg::new("all")
                .help("Include private names (leading `_` or non-public items)")
                .long("all")
                .short('a')
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("doc")
                .help("Show the first line of each doc comment")
                .long("doc")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .help("Read rustdoc JSON from a file (`.zst` is decompressed)")
                .long("json")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .conflicts_with_all(["manifest-path", "crate-version"]),
        )
        .arg(
            Arg::new("manifest-path")
                .help("Document a local package with the nightly toolchain")
                .long("manifest-path")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .conflicts_with("crate-version"),
        )
        .arg(
            Arg::new("crate-version")
                .help("Version to download from docs.rs [default: latest]")
                .long("crate-version")
                .value_name("VERSION"),
        )
        .arg(
            Arg::new("cache-dir")
                .help("Where downloaded JSON is cached")
                .long("cache-dir")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .help("Log more to stderr (-v debug, -vv trace)")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count),
        )
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Loaded crates, keyed by normalized crate name. A fixed source serves
/// every root from one crate under the empty key.
struct Workspace {
    loader: Loader,
    source: CrateSource,
    fixed: bool,
    adapters: HashMap<String, RustdocAdapter>,
}

impl Workspace {
    fn from_matches(matches: &ArgMatches) -> Self {
        let (source, fixed) = if let Some(path) = matches.get_one::<PathBuf>("json") {
            (CrateSource::Json(path.clone()), true)
        } else if let Some(path) = matches.get_one::<PathBuf>("manifest-path") {
            (CrateSource::Manifest(path.clone()), true)
        } else {
            let version = matches
                .get_one::<String>("crate-version")
                .cloned()
                .unwrap_or_else(|| "latest".to_string());
            (CrateSource::DocsRs { version }, false)
        };
        let loader = match matches.get_one::<PathBuf>("cache-dir") {
            Some(dir) => Loader::new(Some(dir.clone())),
            None => Loader::with_default_cache(),
        };
        Self {
            loader,
            source,
            fixed,
            adapters: HashMap::new(),
        }
    }

    fn resolve(&mut self, root: &str) -> Result<(String, EntityId)> {
        let crate_name = split_path(root)
            .next()
            .ok_or_else(|| anyhow!("empty root name"))?;
        let key = if self.fixed {
            String::new()
        } else {
            crate_name.replace('-', "_")
        };
        if !self.adapters.contains_key(&key) {
            let crate_data = self.loader.load(&self.source, crate_name)?;
            self.adapters
                .insert(key.clone(), RustdocAdapter::new(crate_data));
        }
        let entity = self.adapters[&key].resolve(root)?;
        debug!("resolved {} to {}", root, entity);
        Ok((key, entity))
    }
}

fn run(matches: &ArgMatches) -> Result<bool> {
    let options = TreeOptions::new()
        .with_depth(
            matches
                .get_one::<usize>("depth")
                .copied()
                .unwrap_or(TreeOptions::DEFAULT_DEPTH),
        )
        .with_private(matches.get_flag("all"))
        .with_docs(matches.get_flag("doc"));
    let roots: Vec<&String> = matches
        .get_many::<String>("roots")
        .map(|values| values.collect())
        .unwrap_or_default();

    let mut workspace = Workspace::from_matches(matches);
    let mut resolved = Vec::new();
    let mut failed = false;
    for root in &roots {
        match workspace.resolve(root) {
            Ok(found) => resolved.push((root.as_str(), found)),
            Err(err) => {
                eprintln!("error: {}: {:#}", root, err);
                failed = true;
            }
        }
    }
    if failed {
        return Ok(false);
    }

    let mut stdout = io::stdout().lock();
    for (i, (label, (key, entity))) in resolved.iter().enumerate() {
        if i > 0 {
            writeln!(stdout)?;
        }
        let tree = render_tree(&workspace.adapters[key], *entity, label, &options);
        stdout.write_all(tree.as_bytes())?;
    }
    stdout.flush()?;
    Ok(true)
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    match run(&matches) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
