use aicut_core::settings::preset_default;
use aicut_core::{AlignmentOutcome, ClipKind, Editor, EditorSettings, TimeUs};
use aicut_services::image_gen::{generate_clip, FileImageGenerator};
use aicut_services::probe::{self, MediaKind};
use aicut_services::transcription::{request_for_file, transcribe_file, FileTranscriber};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

/// Caption alignment for trimmed timeline clips
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Editor settings file (JSON)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a media file and report its natural duration
    Probe { media: PathBuf },

    /// Print the transcription request body for a media file
    Request { media: PathBuf },

    /// Place a generated image on the timeline
    Image {
        /// Prompt the image was generated from
        #[arg(short, long)]
        prompt: String,
        /// Image-generation reply to use (JSON with mimeType and base64 data)
        #[arg(short, long)]
        reply: PathBuf,
        /// Timeline position, seconds
        #[arg(long, default_value_t = 0.0)]
        at: f64,
    },

    /// Place a transcript of MEDIA on a trimmed clip and show what plays when
    Align {
        media: PathBuf,
        /// Transcription reply to use (JSON array of startTime/endTime/text)
        #[arg(short, long)]
        transcript: PathBuf,
        /// Clip position on the timeline, seconds
        #[arg(long, default_value_t = 0.0)]
        start: f64,
        /// Trim offset into the source, seconds
        #[arg(long, default_value_t = 0.0)]
        offset: f64,
        /// Visible length, seconds; probed from the media when omitted
        #[arg(long)]
        duration: Option<f64>,
        /// Timeline times to project, seconds
        #[arg(long = "at")]
        at: Vec<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => EditorSettings::load_from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => preset_default(),
    };

    match cli.command {
        Commands::Probe { media } => probe_media(media).await,
        Commands::Request { media } => {
            let request = request_for_file(&media).await?;
            println!("{}", serde_json::to_string_pretty(&request)?);
            Ok(())
        }
        Commands::Image { prompt, reply, at } => insert_image(settings, &prompt, reply, at).await,
        Commands::Align {
            media,
            transcript,
            start,
            offset,
            duration,
            at,
        } => {
            let trim = Trim {
                start: TimeUs::from_seconds(start),
                offset: TimeUs::from_seconds(offset),
                duration: duration.map(TimeUs::from_seconds),
            };
            align(settings, media, transcript, trim, &at).await
        }
    }
}

async fn probe_media(path: PathBuf) -> Result<()> {
    let media = probe::locate(&path)?;
    let duration = match media.kind {
        MediaKind::Video => Some(probe::probe_duration(&media.path).await?),
        MediaKind::Image => None,
    };
    let report = json!({
        "name": media.name,
        "source": media.locator,
        "kind": media.kind.name(),
        "durationSeconds": duration.map(|d| d.as_seconds()),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

struct Trim {
    start: TimeUs,
    offset: TimeUs,
    duration: Option<TimeUs>,
}

async fn align(settings: EditorSettings, media_path: PathBuf, transcript: PathBuf, trim: Trim, at: &[f64]) -> Result<()> {
    let media = probe::locate(&media_path)?;
    if media.kind != MediaKind::Video {
        bail!("{} is not a video; captions need a video clip", media.name);
    }

    let mut editor = Editor::new(settings);
    let kind = ClipKind::Video {
        source: media.locator.clone(),
        source_offset_us: trim.offset,
    };
    // an explicit visible length stands in for the natural duration
    let natural = trim.duration.map(|d| trim.offset + d);
    let clip_id = editor.add_media_clip_at(trim.start, kind, media.name.clone(), natural)?;

    if trim.duration.is_none() {
        match probe::probe_duration(&media.path).await {
            Ok(natural) => editor.resolve_duration(clip_id, natural)?,
            Err(e) => tracing::warn!("keeping placeholder duration for {}: {e}", media.name),
        }
    }

    let captions = transcribe_file(&FileTranscriber::new(transcript), &media.path).await?;
    let outcome = editor.insert_captions(clip_id, &captions)?;

    let status = match &outcome {
        AlignmentOutcome::NothingTranscribed => "nothing transcribed",
        AlignmentOutcome::NothingSurvived { .. } => "nothing survived trimming",
        AlignmentOutcome::Placed { .. } => "placed",
    };
    let dropped: Vec<_> = outcome
        .dropped()
        .iter()
        .map(|d| json!({ "index": d.index, "text": d.text, "reason": d.reason.to_string() }))
        .collect();

    let projections: Vec<_> = at
        .iter()
        .map(|&t| {
            let p = aicut_core::project(editor.store.clips(), TimeUs::from_seconds(t));
            json!({
                "time": t,
                "visual": p.active_visual.map(|c| c.label.as_str()),
                "captions": p.active_captions,
            })
        })
        .collect();

    let report = json!({
        "status": status,
        "clips": editor.store.clips(),
        "dropped": dropped,
        "projections": projections,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn insert_image(settings: EditorSettings, prompt: &str, reply: PathBuf, at: f64) -> Result<()> {
    let mut editor = Editor::new(settings);
    let (kind, label) = generate_clip(&FileImageGenerator::new(reply), prompt).await?;
    let id = editor.add_media_clip_at(TimeUs::from_seconds(at), kind, label, None)?;
    let clip = editor
        .store
        .get(id)
        .context("inserted image is missing from the timeline")?;
    println!("{}", serde_json::to_string_pretty(clip)?);
    Ok(())
}
