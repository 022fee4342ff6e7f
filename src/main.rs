use crate::commands::{Cli, Commands};
use anyhow::Result;
use binchunker::{ExtractOptions, merge_image, split_image};
use clap::Parser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;
use log::info;

mod commands;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let logger = env_logger::builder()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .build();

    let level = logger.filter();
    let pb = MultiProgress::new();

    LogWrapper::new(pb.clone(), logger).try_init()?;
    log::set_max_level(level);

    let options = ExtractOptions::from(cli.command.extract_args());

    match cli.command {
        Commands::Split(cmd) => {
            let report = split_image(&cmd.bin, &cmd.cue, &cmd.basename, &options, &pb).await?;
            info!("Wrote {} track files", report.files.len());
        }
        Commands::Merge(cmd) => {
            let report = merge_image(
                &cmd.cue,
                &cmd.output_bin,
                cmd.basename.as_deref(),
                &options,
                cmd.force,
                &pb,
            )
            .await?;
            info!(
                "Merged into {} ({} tracks, {} track files written)",
                report.merged.bin_path.display(),
                report.tracks.len(),
                report.files.len()
            );
        }
    }

    Ok(())
}
