use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use vogue_application::AnalysisOutcome;
use vogue_infrastructure::{VoguePaths, read_image};

use super::bootstrap::{App, bootstrap};
use super::render;

pub async fn run(paths: &VoguePaths, photo: &Path) -> Result<()> {
    let App {
        workflow, events, ..
    } = bootstrap(paths).await?;
    let printer = render::spawn_event_printer(events);

    let image = read_image(photo)
        .await
        .with_context(|| format!("Failed to read {}", photo.display()))?;
    let outcome = workflow.set_person_image(image).await;
    let session = workflow.snapshot().await;

    drop(workflow);
    let _ = printer.await;

    ensure_analyzed(outcome)?;
    if let Some(text) = &session.outfit_analysis {
        render::print_analysis(text);
    }
    Ok(())
}

pub fn ensure_analyzed(outcome: AnalysisOutcome) -> Result<()> {
    match outcome {
        AnalysisOutcome::Completed => Ok(()),
        AnalysisOutcome::Failed(err) => Err(anyhow!(err)),
        AnalysisOutcome::Superseded => bail!("Analysis was superseded"),
    }
}
