//! CLI command handler: layer defaults, `.rechunk.toml` and flags, then run the pipeline.

use anyhow::Result;
use kdam::Animation;
use log::{debug, info};

use crate::engine::arg_parser::Cli;
use crate::engine::progress::{ProgressBarConfig, create_progress_bar};
use crate::pipeline::{report_errors, run_pipeline, setup_pipeline};
use crate::transform::TransformSelector;
use crate::utils::{Colors, apply_file_to_opts, load_rechunk_toml, setup_logging};
use crate::{Opts, RechunkOpts, RunReport};

/// Overwrite opts field from the CLI when the flag was given.
macro_rules! apply_cli_opt {
    ($cli:expr, $opts:expr, $field:ident) => {
        if let Some(v) = $cli.$field.clone() {
            $opts.$field = v;
        }
    };
}

/// Defaults, then the settings file in the input directory, then flags.
/// A settings file that does not parse is an error, never silently skipped.
pub fn build_opts(cli: &Cli) -> Result<Opts> {
    let mut opts = Opts {
        input_dir: cli.input_dir.clone(),
        ..Opts::default()
    };
    if let Some(file) = load_rechunk_toml(&cli.input_dir)? {
        apply_file_to_opts(&file, &mut opts);
    }
    apply_cli_opt!(cli, opts, output_dir);
    apply_cli_opt!(cli, opts, chunk_size);
    apply_cli_opt!(cli, opts, batch_size);
    apply_cli_opt!(cli, opts, max_concurrent_files);
    if cli.chunk_parallelism.is_some() {
        opts.chunk_parallelism = cli.chunk_parallelism;
    }
    apply_cli_opt!(cli, opts, prefix);
    apply_cli_opt!(cli, opts, pattern);
    apply_cli_opt!(cli, opts, records_field);
    apply_cli_opt!(cli, opts, hint_field);
    apply_cli_opt!(cli, opts, order);
    apply_cli_opt!(cli, opts, verbose);
    Ok(opts)
}

/// Run the whole pipeline. Only setup and write failures are returned as errors; per-file
/// failures are printed in the summary.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = build_opts(cli)?;
    setup_logging(opts.verbose);
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );

    let lib_opts = RechunkOpts::from(&opts);
    let ctx = setup_pipeline(&opts.input_dir, &opts.output_dir, &lib_opts)?;
    let bar = opts.verbose.then(|| {
        create_progress_bar(ProgressBarConfig::new(
            ctx.files.len(),
            "Rechunking",
            Animation::Classic,
        ))
    });

    let report = run_pipeline(&ctx, &TransformSelector::default(), bar.as_ref())?;
    if bar.is_some() {
        eprintln!();
    }
    report_errors(&report.errors);
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &RunReport) {
    let failed = report.files_failed();
    let files = format!(
        "{}/{} files ok",
        report.files_succeeded, report.files_discovered
    );
    let files = if failed == 0 {
        Colors::colorize(Colors::OK, &files)
    } else {
        Colors::colorize(Colors::FAILED, &files)
    };
    info!(
        "{} | {} records in {} batch file(s)",
        files,
        report.records_written,
        report.batches.len()
    );
    if failed > 0 {
        info!(
            "{}",
            Colors::colorize(
                Colors::STAGE,
                &format!("{failed} file(s) skipped; see errors above")
            )
        );
    }
}
