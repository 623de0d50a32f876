//! Styling workflow: the controller that owns a [`Session`] and drives the
//! AI gateway on the user's behalf.
//!
//! Every mutation goes through a method on [`StylingWorkflow`]. The session
//! lock is never held across a gateway call, so a snapshot taken while a
//! request is in flight shows the loading state.
//!
//! Each person-image change and each reset starts a new epoch. Results of a
//! call that started in an older epoch are dropped on arrival, so a slow
//! response can never write into a session the user has already replaced.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use vogue_core::presets::style_preset;
use vogue_core::{
    ImagePayload, LoadingLabel, Notice, Session, SessionPhase, StylingError, StylingGateway,
    TryOnMode, WorkflowEvent,
};

/// Why [`StylingWorkflow::generate`] did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoPersonImage,
    EmptyPrompt,
    NoGarmentImage,
    /// Another operation is still in flight.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Completed,
    Failed(StylingError),
    /// The session was replaced or reset before the answer arrived.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum GenerateOutcome {
    Completed,
    Skipped(SkipReason),
    Failed(StylingError),
    /// The session was replaced or reset before the answer arrived.
    Superseded,
}

#[derive(Debug, Default)]
struct WorkflowState {
    session: Session,
    epoch: u64,
}

/// Inputs captured when a generation starts.
enum GenerationPlan {
    FromText {
        person: ImagePayload,
        prompt: String,
    },
    FromItem {
        person: ImagePayload,
        garment: ImagePayload,
    },
}

pub struct StylingWorkflow {
    gateway: Arc<dyn StylingGateway>,
    state: Mutex<WorkflowState>,
    events: Option<UnboundedSender<WorkflowEvent>>,
}

impl StylingWorkflow {
    /// Creates a workflow with an empty session.
    pub fn new(gateway: Arc<dyn StylingGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(WorkflowState::default()),
            events: None,
        }
    }

    /// Publishes loading transitions and notices to `sender`.
    pub fn with_events(mut self, sender: UnboundedSender<WorkflowEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// A copy of the current session.
    pub async fn snapshot(&self) -> Session {
        self.state.lock().await.session.clone()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.state.lock().await.session.phase()
    }

    /// Stores a new person photo, clears everything derived from the old
    /// one, then critiques the new outfit.
    pub async fn set_person_image(&self, image: ImagePayload) -> AnalysisOutcome {
        {
            let mut state = self.state.lock().await;
            state.session.replace_person_image(image.clone());
            state.epoch += 1;
            tracing::info!(
                epoch = state.epoch,
                bytes = image.byte_len(),
                "[Workflow] person image set"
            );
        }
        self.analyze_outfit(image).await
    }

    /// Runs the outfit critique for `image` and stores the result.
    ///
    /// Failures leave `outfit_analysis` empty and publish a notice.
    pub async fn analyze_outfit(&self, image: ImagePayload) -> AnalysisOutcome {
        let epoch = self.begin(LoadingLabel::AnalyzingStyle).await;

        let result = self.gateway.describe_style(&image).await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            tracing::debug!(epoch, "[Workflow] discarding stale outfit analysis");
            return AnalysisOutcome::Superseded;
        }

        let outcome = match result {
            Ok(text) => {
                state.session.outfit_analysis = Some(text);
                AnalysisOutcome::Completed
            }
            Err(err) => {
                tracing::error!(error = %err, "[Workflow] outfit analysis failed");
                state.session.outfit_analysis = None;
                self.emit(WorkflowEvent::Notice {
                    notice: Notice::for_failure(&err),
                });
                AnalysisOutcome::Failed(err)
            }
        };
        state.session.finish_loading();
        drop(state);

        self.emit(WorkflowEvent::LoadingFinished);
        outcome
    }

    /// Stores a garment photo. Only the previous match advice is cleared.
    pub async fn set_garment_image(&self, image: ImagePayload) {
        let mut state = self.state.lock().await;
        state.session.replace_garment_image(image);
        tracing::info!("[Workflow] garment image set");
    }

    pub async fn set_mode(&self, mode: TryOnMode) {
        let mut state = self.state.lock().await;
        state.session.mode = mode;
        tracing::debug!(%mode, "[Workflow] mode changed");
    }

    pub async fn set_prompt_text(&self, text: impl Into<String>) {
        self.state.lock().await.session.prompt_text = text.into();
    }

    /// Uses a quick-pick preset as the prompt. Returns `false` for an
    /// unknown index, leaving the prompt untouched.
    pub async fn apply_preset(&self, index: usize) -> bool {
        match style_preset(index) {
            Some(preset) => {
                self.set_prompt_text(preset).await;
                true
            }
            None => false,
        }
    }

    /// Clears the person photo and everything derived from it. An operation
    /// still in flight is abandoned; its result will be discarded.
    pub async fn reset(&self) {
        let was_loading = {
            let mut state = self.state.lock().await;
            let was_loading = state.session.is_loading;
            state.session.reset();
            state.epoch += 1;
            tracing::info!(epoch = state.epoch, "[Workflow] session reset");
            was_loading
        };
        if was_loading {
            self.emit(WorkflowEvent::LoadingFinished);
        }
    }

    /// The primary action: render the person in the requested outfit.
    ///
    /// In item mode the compatibility critique runs first and the render
    /// only starts once it has settled successfully. Whatever succeeded
    /// before a failure stays in the session.
    pub async fn generate(&self) -> GenerateOutcome {
        let (plan, epoch) = {
            let mut state = self.state.lock().await;
            let plan = match Self::plan_generation(&state.session) {
                Ok(plan) => plan,
                Err(reason) => {
                    tracing::debug!(?reason, "[Workflow] generate skipped");
                    return GenerateOutcome::Skipped(reason);
                }
            };
            let label = match plan {
                GenerationPlan::FromText { .. } => LoadingLabel::SynthesizingFromText,
                GenerationPlan::FromItem { .. } => LoadingLabel::AnalyzingMatch,
            };
            state.session.clear_generation_outputs();
            state.session.begin_loading(label);
            (plan, state.epoch)
        };

        let outcome = match plan {
            GenerationPlan::FromText { person, prompt } => {
                self.emit(WorkflowEvent::LoadingStarted {
                    label: LoadingLabel::SynthesizingFromText,
                });
                self.generate_from_text(epoch, &person, &prompt).await
            }
            GenerationPlan::FromItem { person, garment } => {
                self.emit(WorkflowEvent::LoadingStarted {
                    label: LoadingLabel::AnalyzingMatch,
                });
                self.generate_from_item(epoch, &person, &garment).await
            }
        };

        match outcome {
            Ok(()) => {
                self.settle(epoch, None).await;
                GenerateOutcome::Completed
            }
            Err(Some(err)) => {
                tracing::error!(error = %err, "[Workflow] generation failed");
                self.settle(epoch, Some(&err)).await;
                GenerateOutcome::Failed(err)
            }
            Err(None) => {
                tracing::debug!(epoch, "[Workflow] discarding stale generation");
                GenerateOutcome::Superseded
            }
        }
    }

    fn plan_generation(session: &Session) -> Result<GenerationPlan, SkipReason> {
        if session.is_loading {
            return Err(SkipReason::Busy);
        }
        let person = session
            .person_image
            .clone()
            .ok_or(SkipReason::NoPersonImage)?;

        match session.mode {
            TryOnMode::TextDescribed => {
                if session.prompt_text.is_empty() {
                    return Err(SkipReason::EmptyPrompt);
                }
                Ok(GenerationPlan::FromText {
                    person,
                    prompt: session.prompt_text.clone(),
                })
            }
            TryOnMode::ItemBased => {
                let garment = session
                    .garment_image
                    .clone()
                    .ok_or(SkipReason::NoGarmentImage)?;
                Ok(GenerationPlan::FromItem { person, garment })
            }
        }
    }

    /// `Err(None)` means the epoch moved on and the result, success or
    /// failure, was dropped.
    async fn generate_from_text(
        &self,
        epoch: u64,
        person: &ImagePayload,
        prompt: &str,
    ) -> Result<(), Option<StylingError>> {
        let image = self.gateway.synthesize_from_text(person, prompt).await;
        self.store_image(epoch, image).await
    }

    async fn generate_from_item(
        &self,
        epoch: u64,
        person: &ImagePayload,
        garment: &ImagePayload,
    ) -> Result<(), Option<StylingError>> {
        let advice = self.gateway.describe_match(person, garment).await;
        {
            let mut state = self.state.lock().await;
            if state.epoch != epoch {
                return Err(None);
            }
            state.session.match_advice = Some(advice?);
            state.session.begin_loading(LoadingLabel::SynthesizingTryOn);
        }
        self.emit(WorkflowEvent::LoadingStarted {
            label: LoadingLabel::SynthesizingTryOn,
        });

        let image = self.gateway.synthesize_from_item(person, garment).await;
        self.store_image(epoch, image).await
    }

    async fn store_image(
        &self,
        epoch: u64,
        image: Result<ImagePayload, StylingError>,
    ) -> Result<(), Option<StylingError>> {
        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            return Err(None);
        }
        let image = image?;
        tracing::info!(bytes = image.byte_len(), "[Workflow] try-on image stored");
        state.session.generated_image = Some(image);
        Ok(())
    }

    /// Marks the session as loading and returns the epoch the operation
    /// belongs to.
    async fn begin(&self, label: LoadingLabel) -> u64 {
        let epoch = {
            let mut state = self.state.lock().await;
            state.session.begin_loading(label);
            state.epoch
        };
        self.emit(WorkflowEvent::LoadingStarted { label });
        epoch
    }

    /// Clears the loading flag once, unless the epoch has moved on.
    async fn settle(&self, epoch: u64, failure: Option<&StylingError>) {
        {
            let mut state = self.state.lock().await;
            if state.epoch != epoch {
                return;
            }
            state.session.finish_loading();
        }
        if let Some(err) = failure {
            self.emit(WorkflowEvent::Notice {
                notice: Notice::for_failure(err),
            });
        }
        self.emit(WorkflowEvent::LoadingFinished);
    }

    fn emit(&self, event: WorkflowEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event);
        }
    }
}
