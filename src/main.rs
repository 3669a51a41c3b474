use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use caption_scribe::captions::{parse_track, Dialect};
use caption_scribe::cli::{Cli, Commands, LogFormat};
use caption_scribe::config::Config;
use caption_scribe::extractors::{read_track, SourceRegistry};
use caption_scribe::output::{print_to_console, render_transcript, save_to_file};
use caption_scribe::transcribe::TranscriptPipeline;
use caption_scribe::utils;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match cli.command {
        Commands::Fetch {
            url,
            output,
            languages,
            dialect,
            no_dump,
            print,
        } => {
            let config = Config::load()
                .await?
                .with_overrides(languages, dialect.map(Dialect::from), no_dump.then_some(false))?;

            // Non-fatal: the tool may still be reachable through a custom path
            let missing_deps = utils::check_dependencies(&config.extractor.yt_dlp_path).await;
            if !missing_deps.is_empty() {
                eprintln!("{}", style("⚠️  Dependency check warnings:").yellow());
                for dep in missing_deps {
                    eprintln!("   • {}", dep);
                }
                eprintln!("   (Continuing anyway - local caption files still work)");
            }

            let pipeline = TranscriptPipeline::new(config, !cli.quiet)?;
            let input = if pipeline.registry().is_local_file(&url) {
                url
            } else {
                utils::validate_and_normalize_url(&url)?
            };

            let artifact = pipeline.run(&input).await?;

            if print {
                print_to_console(&artifact)?;
                return Ok(());
            }

            let path = output.unwrap_or_else(|| utils::default_output_path(&pipeline.config().app.output_dir, &input));
            save_to_file(&artifact, &path).await?;

            println!("{} {}", style("Transcript saved to:").green(), path.display());
            if let Some(title) = &artifact.title {
                println!("  Title: {}", title);
            }
            if let Some(duration) = artifact.duration {
                println!("  Duration: {}", utils::format_duration(duration));
            }
            match &artifact.transcript.lang {
                Some(lang) if artifact.transcript.has_transcript => {
                    println!("  Captions: {} ({} cues)", lang, artifact.transcript.cue_count)
                }
                _ => println!("  Captions: {}", style("none available").yellow()),
            }
        }
        Commands::Clean {
            file,
            dialect,
            language,
            format,
        } => {
            let track = read_track(&file, dialect.map(Dialect::from), language.as_deref())?;

            match parse_track(&track) {
                Ok(transcript) => println!("{}", render_transcript(&transcript, format)?),
                Err(e) => eprintln!("{} {}", style("No usable captions:").yellow(), e),
            }
        }
        Commands::Convert { file, to, from, output } => {
            let track = read_track(&file, from.map(Dialect::from), None)?;
            let transcript = parse_track(&track)
                .with_context(|| format!("Could not parse {}", file.display()))?;
            let converted = transcript.to_dialect(to.into());

            match output {
                Some(output) => {
                    let path = utils::converted_output_path(&file, &output, to.into());
                    write_output(&path, &converted)?;
                    println!("{} {}", style("Converted captions saved to:").green(), path.display());
                }
                None => print!("{}", converted),
            }
        }
        Commands::Config { show } => {
            let config = Config::load().await?;
            if show {
                config.display();
            } else {
                config.save().await?;
                println!("Configuration file: {}", Config::config_path()?.display());
            }
        }
        Commands::Platforms => {
            let config = Config::load().await?;
            let registry = SourceRegistry::from_config(&config, false)?;

            println!("Supported platforms:");
            for platform in registry.list_platforms() {
                println!("  • {}", platform);
            }
        }
    }

    Ok(())
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("caption_scribe={0},captionscribe={0}", default_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match cli.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(path, content)?;
    Ok(())
}
