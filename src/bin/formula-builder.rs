use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use formula_builder::build::BuildTool;
use formula_builder::pipeline::run_install;
use formula_builder::platform::{Feature, Platform};
use formula_builder::process::ensure_exists;
use formula_builder::report::write_outcome;
use formula_builder::resolver::BuildRequest;
use formula_builder::Formula;

fn usage() -> &'static str {
    "Usage:\n  formula-builder install <formula.toml> <source_dir> <dest_dir> \
     [--platform <linux|macos>] [--with-dbus|--without-dbus] \
     [--json-output <path>] [-- <standard args...>]"
}

struct InstallArgs {
    formula_path: PathBuf,
    source_dir: PathBuf,
    dest_dir: PathBuf,
    platform: Platform,
    dbus_override: Option<bool>,
    json_output: Option<PathBuf>,
    standard_args: Vec<String>,
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.split_first() {
        Some((cmd, rest)) if cmd == "install" => install(parse_install_args(rest)?),
        _ => bail!(usage()),
    }
}

fn install(args: InstallArgs) -> Result<()> {
    let formula = Formula::load(&args.formula_path)?;
    ensure_exists(&args.source_dir, "source directory")?;

    // Recommended deps in the formula decide the defaults; the CLI flags
    // override them.
    let mut features = formula.default_features(args.platform);
    match args.dbus_override {
        Some(true) => features.enable(Feature::Dbus),
        Some(false) => features.disable(Feature::Dbus),
        None => {}
    }

    let tool = BuildTool::find()?;
    let request = BuildRequest {
        platform: args.platform,
        features,
        standard_args: args.standard_args,
    };

    let outcome = run_install(&formula, &tool, &request, &args.source_dir, &args.dest_dir)?;

    if let Some(path) = &args.json_output {
        write_outcome(path, &outcome)?;
    }

    if !outcome.smoke_test_passed {
        bail!(
            "smoke test failed for '{}': {} did not exit successfully on --help",
            formula.name,
            args.dest_dir.join(formula.binary_name()).display()
        );
    }

    println!("[install:{}] done", formula.name);
    Ok(())
}

fn parse_install_args(args: &[String]) -> Result<InstallArgs> {
    let (positional_and_flags, standard_args) = split_on_separator(args);

    let mut positional: Vec<&String> = Vec::new();
    let mut platform: Option<Platform> = None;
    let mut dbus_override: Option<bool> = None;
    let mut json_output: Option<PathBuf> = None;

    let mut iter = positional_and_flags.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--platform" => {
                let value = iter
                    .next()
                    .with_context(|| "--platform requires a value".to_string())?;
                platform = Some(value.parse()?);
            }
            "--with-dbus" => dbus_override = Some(true),
            "--without-dbus" => dbus_override = Some(false),
            "--json-output" => {
                let value = iter
                    .next()
                    .with_context(|| "--json-output requires a value".to_string())?;
                json_output = Some(PathBuf::from(value));
            }
            flag if flag.starts_with("--") => {
                bail!("unknown option '{}'\n{}", flag, usage())
            }
            _ => positional.push(arg),
        }
    }

    let [formula_path, source_dir, dest_dir] = positional.as_slice() else {
        bail!(
            "expected <formula.toml> <source_dir> <dest_dir>, got {} positional arguments\n{}",
            positional.len(),
            usage()
        );
    };

    let platform = match platform {
        Some(p) => p,
        None => Platform::host()?,
    };

    Ok(InstallArgs {
        formula_path: PathBuf::from(formula_path.as_str()),
        source_dir: PathBuf::from(source_dir.as_str()),
        dest_dir: PathBuf::from(dest_dir.as_str()),
        platform,
        dbus_override,
        json_output,
        standard_args,
    })
}

/// Split CLI arguments on the `--` separator; everything after it is passed
/// through to the configure step verbatim.
fn split_on_separator(args: &[String]) -> (Vec<String>, Vec<String>) {
    match args.iter().position(|a| a == "--") {
        Some(pos) => (args[..pos].to_vec(), args[pos + 1..].to_vec()),
        None => (args.to_vec(), Vec::new()),
    }
}
