// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! `rt-load`: a thin command-line shell around [`rt_runtime::LoadSubsystem`],
//! for exercising the loading subsystem by hand. Plumbing only — the real
//! reader/evaluator belongs to whatever language runtime embeds this crate.

mod evaluator;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use evaluator::LineEvaluator;
use rt_core::{FeatureName, LoadFlags};
use rt_dynload::LibloadingShim;
use rt_runtime::{Init, LoadSubsystem};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "rt-load", about = "Exercise the code-loading subsystem")]
struct Cli {
    /// Directory to prepend to the load path, may be given more than once.
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    include: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// `load(filename)`.
    Load { filename: String },
    /// `require(feature)`.
    Require { feature: String },
    /// `dynamic-load(filename)`.
    DynamicLoad { filename: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let subsystem = Arc::new(LoadSubsystem::initialize(Init {
        evaluator: LineEvaluator::new(),
        dlshim: LibloadingShim,
        source_suffixes: vec![".scm".to_string(), ".sld".to_string()],
        dso_suffixes: vec![dylib_suffix().to_string()],
        built_in_provided: Vec::new(),
    }));
    subsystem.evaluator().attach(subsystem.clone());

    for dir in &cli.include {
        subsystem.add_load_path(dir.clone(), false);
    }

    match cli.command {
        Command::Load { filename } => {
            let module = subsystem.evaluator().current_module();
            subsystem
                .load(&filename, LoadFlags::default().propagate_error(true), &module)
                .with_context(|| format!("loading \"{filename}\""))?;
        }
        Command::Require { feature } => {
            subsystem
                .require(&FeatureName::new(feature.clone()), LoadFlags::default().propagate_error(true))
                .with_context(|| format!("requiring \"{feature}\""))?;
        }
        Command::DynamicLoad { filename } => {
            subsystem.dynamic_load(&filename, None).with_context(|| format!("dynamic-loading \"{filename}\""))?;
        }
    }

    Ok(())
}

fn dylib_suffix() -> &'static str {
    if cfg!(target_os = "macos") {
        ".dylib"
    } else if cfg!(windows) {
        ".dll"
    } else {
        ".so"
    }
}
