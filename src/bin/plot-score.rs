use std::path::PathBuf;

use clap::Parser;
use midiscribe::cli;
use midiscribe::pipeline::NoteSpan;
use midiscribe::{CompilerConfig, Pipeline};
use plotters::prelude::*;

const NOTE_HEIGHT: f32 = 0.8;
const PITCH_MARGIN: f32 = 2.0;

/// Render a compiled score as a piano roll
#[derive(Parser)]
#[command(name = "plot-score")]
struct Args {
    /// Path to the score file
    input: PathBuf,

    /// Output SVG path
    output: PathBuf,

    /// RON configuration file with playback defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn pitch_bounds(spans: &[NoteSpan]) -> (f32, f32) {
    let lo = spans.iter().map(|s| s.pitch).min().unwrap_or(60) as f32;
    let hi = spans.iter().map(|s| s.pitch).max().unwrap_or(60) as f32;
    (lo - PITCH_MARGIN, hi + PITCH_MARGIN)
}

fn create_plot(
    args: &Args,
    spans: &[NoteSpan],
    tempos: &[(u32, u32)],
    last_tick: u32,
    ppq: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(&args.output, (1000, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_tick = last_tick.max(1) as f32;
    let (lo, hi) = pitch_bounds(spans);

    let title = format!(
        "{} ({} notes, ppq={})",
        args.input.display(),
        spans.len(),
        ppq
    );

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f32..max_tick, lo..hi)?;

    chart
        .configure_mesh()
        .x_desc("Tick")
        .y_desc("MIDI pitch")
        .x_labels(10)
        .y_labels(10)
        .draw()?;

    chart.draw_series(spans.iter().map(|span| {
        let pitch = span.pitch as f32;
        Rectangle::new(
            [
                (span.start as f32, pitch - NOTE_HEIGHT / 2.0),
                (span.end as f32, pitch + NOTE_HEIGHT / 2.0),
            ],
            Palette99::pick(span.channel as usize).filled(),
        )
    }))?;

    // Tempo changes along the bottom edge
    chart.draw_series(
        tempos
            .iter()
            .map(|&(tick, _)| Circle::new((tick as f32, lo), 4, RED.filled())),
    )?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    cli::init_logging(false);

    let config = match &args.config {
        Some(path) => CompilerConfig::load(path)?,
        None => CompilerConfig::default(),
    };

    let text = cli::read_score(&args.input)?;
    let compilation = Pipeline::new(config).compile(&text)?;
    let spans = compilation.note_spans();
    let tempos = compilation.tempo_changes();

    println!("Score Plot");
    println!("==========");
    println!("  Notes: {}", spans.len());
    println!("  Tempo changes: {}", tempos.len());
    println!("  Last tick: {}", compilation.last_tick());
    println!();

    print!("  Creating plot... ");
    create_plot(
        &args,
        &spans,
        &tempos,
        compilation.last_tick(),
        compilation.ppq,
    )?;
    println!("done");

    println!();
    println!("Output: {}", args.output.display());

    Ok(())
}
