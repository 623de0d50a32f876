use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use vogue_application::GenerateOutcome;
use vogue_core::TryOnMode;
use vogue_core::presets::{STYLE_PRESETS, style_preset};
use vogue_infrastructure::{VoguePaths, read_image, write_image};

use super::bootstrap::{App, bootstrap};
use super::render;

/// How the desired outfit is described.
#[derive(Debug)]
pub enum Outfit {
    Prompt(String),
    /// One-based, as printed by `vogue presets`.
    Preset(usize),
    Garment(PathBuf),
}

/// Maps a one-based preset number to its index.
pub fn preset_index(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .filter(|index| style_preset(*index).is_some())
        .ok_or_else(|| anyhow!("Preset must be between 1 and {}", STYLE_PRESETS.len()))
}

pub async fn run(
    paths: &VoguePaths,
    photo: &Path,
    outfit: Outfit,
    output: Option<&Path>,
) -> Result<()> {
    if let Outfit::Preset(number) = &outfit {
        preset_index(*number)?;
    }

    let App {
        config,
        workflow,
        events,
    } = bootstrap(paths).await?;
    let printer = render::spawn_event_printer(events);

    let person = read_image(photo)
        .await
        .with_context(|| format!("Failed to read {}", photo.display()))?;
    workflow.set_person_image(person).await;
    if let Some(text) = workflow.snapshot().await.outfit_analysis {
        render::print_analysis(&text);
    }

    match outfit {
        Outfit::Prompt(text) => {
            workflow.set_mode(TryOnMode::TextDescribed).await;
            workflow.set_prompt_text(text).await;
        }
        Outfit::Preset(number) => {
            workflow.set_mode(TryOnMode::TextDescribed).await;
            workflow.apply_preset(preset_index(number)?).await;
        }
        Outfit::Garment(path) => {
            let garment = read_image(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            workflow.set_mode(TryOnMode::ItemBased).await;
            workflow.set_garment_image(garment).await;
        }
    }

    let outcome = workflow.generate().await;
    let session = workflow.snapshot().await;

    drop(workflow);
    let _ = printer.await;

    if let Some(advice) = &session.match_advice {
        render::print_match_advice(advice);
    }
    ensure_generated(outcome)?;

    let image = session
        .generated_image
        .context("Generation finished without an image")?;
    let target = output.map_or_else(|| PathBuf::from(&config.output_file), Path::to_path_buf);
    write_image(&target, &image)
        .await
        .with_context(|| format!("Failed to save {}", target.display()))?;

    println!("已儲存試穿結果: {}", target.display());
    Ok(())
}

pub fn ensure_generated(outcome: GenerateOutcome) -> Result<()> {
    match outcome {
        GenerateOutcome::Completed => Ok(()),
        GenerateOutcome::Skipped(reason) => bail!("Nothing to generate: {reason:?}"),
        GenerateOutcome::Failed(err) => Err(anyhow!(err)),
        GenerateOutcome::Superseded => bail!("Generation was superseded"),
    }
}
