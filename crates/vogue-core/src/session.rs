//! Session domain model.
//!
//! A [`Session`] is the transient state of one styling interaction: the
//! person photo, the try-on inputs, and whatever the AI service has produced
//! so far. The workflow controller is the only writer; everything here is
//! plain data plus the state transitions the controller composes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::image::ImagePayload;

/// How the desired outfit is described.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum TryOnMode {
    /// Free-text description of the new look.
    #[default]
    #[strum(to_string = "text", serialize = "text_described")]
    TextDescribed,
    /// An uploaded garment photo, preceded by a compatibility critique.
    #[strum(to_string = "item", serialize = "item_based")]
    ItemBased,
}

/// What the session is currently waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingLabel {
    AnalyzingStyle,
    AnalyzingMatch,
    SynthesizingFromText,
    SynthesizingTryOn,
}

impl LoadingLabel {
    /// User-facing label (zh-TW).
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadingLabel::AnalyzingStyle => "正在分析您的穿搭風格...",
            LoadingLabel::AnalyzingMatch => "正在分析單品搭配性...",
            LoadingLabel::SynthesizingFromText => "正在根據描述合成造型...",
            LoadingLabel::SynthesizingTryOn => "正在為您試穿這件單品...",
        }
    }
}

impl std::fmt::Display for LoadingLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse state derived from a [`Session`]; never stored.
///
/// There is no error phase. A failed call returns the session to `Ready`
/// and the failure is reported as a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Empty,
    Analyzing,
    Ready,
    Generating,
}

/// The mutable state of one person's in-progress styling interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub person_image: Option<ImagePayload>,
    #[serde(default)]
    pub mode: TryOnMode,
    pub outfit_analysis: Option<String>,
    /// Only meaningful in [`TryOnMode::ItemBased`].
    pub garment_image: Option<ImagePayload>,
    /// Only meaningful in [`TryOnMode::ItemBased`].
    pub match_advice: Option<String>,
    pub generated_image: Option<ImagePayload>,
    /// Only meaningful in [`TryOnMode::TextDescribed`].
    #[serde(default)]
    pub prompt_text: String,
    #[serde(default)]
    pub is_loading: bool,
    pub loading_label: Option<LoadingLabel>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.person_image.is_none() {
            return SessionPhase::Empty;
        }
        match (self.is_loading, self.loading_label) {
            (true, Some(LoadingLabel::AnalyzingStyle)) => SessionPhase::Analyzing,
            (true, _) => SessionPhase::Generating,
            (false, _) => SessionPhase::Ready,
        }
    }

    /// Stores a new person photo and drops everything derived from the old one.
    /// The mode survives.
    pub fn replace_person_image(&mut self, image: ImagePayload) {
        self.clear_derived();
        self.person_image = Some(image);
    }

    /// Stores a garment photo. Only the match advice is invalidated; a
    /// previously generated image stays visible until the next generation.
    pub fn replace_garment_image(&mut self, image: ImagePayload) {
        self.garment_image = Some(image);
        self.match_advice = None;
    }

    /// Back to the initial empty state.
    pub fn reset(&mut self) {
        *self = Session::default();
    }

    pub fn begin_loading(&mut self, label: LoadingLabel) {
        self.is_loading = true;
        self.loading_label = Some(label);
    }

    pub fn finish_loading(&mut self) {
        self.is_loading = false;
        self.loading_label = None;
    }

    /// Clears the outputs of a previous generation before a new one starts.
    pub fn clear_generation_outputs(&mut self) {
        self.generated_image = None;
        self.match_advice = None;
    }

    /// Whether the primary action has everything it needs in the current mode.
    pub fn can_generate(&self) -> bool {
        if self.is_loading || self.person_image.is_none() {
            return false;
        }
        match self.mode {
            TryOnMode::TextDescribed => !self.prompt_text.is_empty(),
            TryOnMode::ItemBased => self.garment_image.is_some(),
        }
    }

    fn clear_derived(&mut self) {
        self.outfit_analysis = None;
        self.match_advice = None;
        self.generated_image = None;
        self.garment_image = None;
        self.prompt_text.clear();
    }
}
