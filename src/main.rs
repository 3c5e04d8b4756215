use anyhow::Context;
use clap::{Parser, Subcommand};
use image::ImageReader;
use std::path::PathBuf;
use std::sync::Arc;

use steel_defects::annotations::{LogProgress, Split, Taxonomy, convert_batch};
use steel_defects::config::*;
use steel_defects::detection::model::YoloV5Model;
use steel_defects::detection::render::render_detections;
use steel_defects::detection::summary::format_percent;
use steel_defects::detection::{DefectDetector, DetectorConfig, is_supported_image};

#[derive(Parser)]
#[command(name = "steel-defects")]
#[command(about = "Steel surface defect detection and VOC → YOLO label conversion")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert Pascal VOC descriptors of the train and validation splits into YOLO labels
    Convert {
        #[arg(long, value_name = "DIR", default_value = TRAIN_ANNOTATIONS_DIR)]
        train_src: PathBuf,

        #[arg(long, value_name = "DIR", default_value = TRAIN_LABELS_DIR)]
        train_dst: PathBuf,

        #[arg(long, value_name = "DIR", default_value = VALID_ANNOTATIONS_DIR)]
        valid_src: PathBuf,

        #[arg(long, value_name = "DIR", default_value = VALID_LABELS_DIR)]
        valid_dst: PathBuf,

        /// Comma-separated class names, in class id order (defaults to the NEU steel classes)
        #[arg(long, value_delimiter = ',')]
        classes: Option<Vec<String>>,
    },

    /// Detect surface defects in an image and print an inspection summary
    Detect {
        /// Path to input image file (jpg, jpeg or png)
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        #[arg(long, value_name = "FILE", default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Minimum confidence, between 0.1 and 1.0
        #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD, value_parser = parse_confidence)]
        confidence: f32,

        #[arg(long, default_value_t = DEFAULT_IOU_THRESHOLD)]
        iou: f32,

        /// Save the annotated image to this path
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Save debug outputs to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,
    },
}

fn parse_confidence(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|e| format!("{}", e))?;
    if (MIN_CONFIDENCE_THRESHOLD..=MAX_CONFIDENCE_THRESHOLD).contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "confidence must be between {} and {}",
            MIN_CONFIDENCE_THRESHOLD, MAX_CONFIDENCE_THRESHOLD
        ))
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match args.command {
        Command::Convert {
            train_src,
            train_dst,
            valid_src,
            valid_dst,
            classes,
        } => {
            let taxonomy = classes.map(Taxonomy::new).unwrap_or_default();
            run_convert(
                &taxonomy,
                Split::new("train", train_src, train_dst),
                Split::new("valid", valid_src, valid_dst),
            )
        }
        Command::Detect {
            image_path,
            model,
            confidence,
            iou,
            output,
            debug_out,
        } => run_detect(image_path, model, confidence, iou, output, debug_out),
    }
}

fn run_convert(taxonomy: &Taxonomy, train: Split, valid: Split) -> anyhow::Result<()> {
    let train_report = convert_batch(&train, taxonomy, &mut LogProgress::every(TRAIN_PROGRESS_INTERVAL))?;
    let valid_report = convert_batch(&valid, taxonomy, &mut LogProgress::every(VALID_PROGRESS_INTERVAL))?;

    println!("\nConversion completed!");
    println!(
        "Train labels converted: {}/{}",
        train_report.converted, train_report.discovered
    );
    println!(
        "Valid labels converted: {}/{}",
        valid_report.converted, valid_report.discovered
    );
    println!("Train .txt files created: {}", train_report.verified);
    println!("Valid .txt files created: {}", valid_report.verified);

    Ok(())
}

fn run_detect(
    image_path: PathBuf,
    model_path: PathBuf,
    confidence: f32,
    iou: f32,
    output: Option<PathBuf>,
    debug_out: Option<PathBuf>,
) -> anyhow::Result<()> {
    if !is_supported_image(&image_path) {
        anyhow::bail!(
            "Unsupported image type: {} (expected one of {})",
            image_path.display(),
            IMAGE_EXTENSIONS.join(", ")
        );
    }

    tracing::debug!("Loading image: {:?}", image_path);
    let img = ImageReader::open(&image_path)
        .with_context(|| format!("Failed to open {}", image_path.display()))?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    tracing::debug!("Image loaded: {}x{}", img.width(), img.height());

    let model = YoloV5Model::load(&model_path, DEFAULT_INPUT_SIZE)?;
    let detector = DefectDetector::new(
        Arc::new(model),
        DetectorConfig {
            confidence_threshold: confidence,
            iou_threshold: iou,
            taxonomy: Taxonomy::neu_steel(),
            debug_out,
        },
    )?;

    let report = detector.detect(img.clone())?;

    if let Some(output_path) = output {
        render_detections(&img, &report.detections)
            .save(&output_path)
            .map_err(|e| anyhow::anyhow!("Failed to save annotated image: {}", e))?;
        println!("Annotated image saved to {}", output_path.display());
    }

    let summary = &report.summary;
    println!("\n=== Detection Summary ===");
    println!("Total defects: {}", summary.total);

    if let Some(average) = summary.average_confidence {
        println!("Avg confidence: {}", format_percent(average));
        println!("Defect types: {}", summary.defect_types);

        println!("\n{:<20} {:>10}", "Defect Type", "Confidence");
        for detection in &report.detections {
            println!(
                "{:<20} {:>10}",
                detection.class_name,
                format_percent(detection.confidence)
            );
        }

        println!("\nDefects detected - {}", summary.verdict);
    } else {
        println!("No defects detected - {}", summary.verdict);
    }

    Ok(())
}
