use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TutorError;

/// One logical operation offered to end users.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    Solve,
    Explain,
    Formulas,
    Tips,
    Image,
    Transcribe,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Self::Solve,
        Self::Explain,
        Self::Formulas,
        Self::Tips,
        Self::Image,
        Self::Transcribe,
    ];

    /// Capabilities answered by text completion providers.
    pub const TEXT: &'static [Capability] =
        &[Self::Solve, Self::Explain, Self::Formulas, Self::Tips];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solve => "solve",
            Self::Explain => "explain",
            Self::Formulas => "formulas",
            Self::Tips => "tips",
            Self::Image => "image",
            Self::Transcribe => "transcribe",
        }
    }

    /// Default sampling temperature used when the request does not carry a valid one.
    pub fn default_temperature(self) -> f32 {
        match self {
            Self::Solve => 0.2,
            Self::Formulas => 0.1,
            Self::Explain | Self::Tips => 0.3,
            Self::Image | Self::Transcribe => 0.0,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solve" => Ok(Self::Solve),
            "explain" => Ok(Self::Explain),
            "formulas" => Ok(Self::Formulas),
            "tips" | "study-tips" | "study_tips" => Ok(Self::Tips),
            "image" => Ok(Self::Image),
            "transcribe" => Ok(Self::Transcribe),
            other => Err(TutorError::invalid_input(format!(
                "Unknown capability: {}",
                other
            ))),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_subject() -> String {
    "Mathematics".to_string()
}

fn default_difficulty() -> String {
    "Intermediate".to_string()
}

fn default_general() -> String {
    "General".to_string()
}

fn default_level() -> String {
    "intermediate".to_string()
}

fn default_learning_style() -> String {
    "Visual".to_string()
}

fn default_study_goal() -> String {
    "General Understanding".to_string()
}

fn default_image_style() -> String {
    "educational".to_string()
}

/// Input for [`Capability::Solve`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveInput {
    pub problem: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_true")]
    pub show_steps: bool,
    #[serde(default = "default_true")]
    pub include_theory: bool,
    #[serde(default = "default_true")]
    pub include_diagrams: bool,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Input for [`Capability::Explain`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainInput {
    pub concept: String,
    #[serde(default = "default_general")]
    pub subject: String,
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub include_examples: bool,
    #[serde(default)]
    pub include_history: bool,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Input for [`Capability::Formulas`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaInput {
    pub subject: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Input for [`Capability::Tips`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyTipsInput {
    pub subject: String,
    #[serde(default = "default_learning_style")]
    pub learning_style: String,
    #[serde(default = "default_study_goal")]
    pub study_goal: String,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Input for [`Capability::Image`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    pub prompt: String,
    #[serde(default)]
    pub context: String,
    #[serde(default = "default_image_style")]
    pub style: String,
}

/// Input for [`Capability::Transcribe`]: base64-encoded audio.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeInput {
    pub audio: String,
    #[serde(default)]
    pub format: Option<String>,
}

/// A spoken problem: transcribed first, then solved with the solve options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSolveInput {
    pub audio: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_true")]
    pub show_steps: bool,
    #[serde(default = "default_true")]
    pub include_theory: bool,
    #[serde(default = "default_true")]
    pub include_diagrams: bool,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl VoiceSolveInput {
    pub fn transcribe_input(&self) -> TranscribeInput {
        TranscribeInput {
            audio: self.audio.clone(),
            format: self.format.clone(),
        }
    }

    /// Solve request for the transcribed `problem`, carrying these options.
    pub fn solve_input(&self, problem: impl Into<String>) -> SolveInput {
        SolveInput {
            problem: problem.into(),
            subject: self.subject.clone(),
            difficulty: self.difficulty.clone(),
            show_steps: self.show_steps,
            include_theory: self.include_theory,
            include_diagrams: self.include_diagrams,
            temperature: self.temperature,
        }
    }
}

/// A labelled diagram of one concept. Rendered into an [`ImageInput`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramInput {
    pub concept: String,
    #[serde(default = "default_general")]
    pub subject: String,
    #[serde(default = "default_level")]
    pub difficulty: String,
}

/// A picture accompanying a problem statement. Rendered into an [`ImageInput`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IllustrationInput {
    pub problem: String,
    #[serde(default = "default_general")]
    pub subject: String,
}

/// `Err(InvalidInput)` when `value` is blank.
pub(crate) fn require(field: &str, value: &str) -> Result<(), TutorError> {
    if value.trim().is_empty() {
        return Err(TutorError::invalid_input(format!(
            "Field '{}' cannot be empty",
            field
        )));
    }
    Ok(())
}

/// Typed input of a capability request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "capability", content = "input", rename_all = "camelCase")]
pub enum CapabilityInput {
    Solve(SolveInput),
    Explain(ExplainInput),
    Formulas(FormulaInput),
    Tips(StudyTipsInput),
    Image(ImageInput),
    Transcribe(TranscribeInput),
}

impl CapabilityInput {
    pub fn capability(&self) -> Capability {
        match self {
            Self::Solve(_) => Capability::Solve,
            Self::Explain(_) => Capability::Explain,
            Self::Formulas(_) => Capability::Formulas,
            Self::Tips(_) => Capability::Tips,
            Self::Image(_) => Capability::Image,
            Self::Transcribe(_) => Capability::Transcribe,
        }
    }

    /// Reject inputs whose required text is empty.
    pub fn validate(&self) -> Result<(), TutorError> {
        let (field, value) = match self {
            Self::Solve(input) => ("problem", &input.problem),
            Self::Explain(input) => ("concept", &input.concept),
            Self::Formulas(input) => ("subject", &input.subject),
            Self::Tips(input) => ("subject", &input.subject),
            Self::Image(input) => ("prompt", &input.prompt),
            Self::Transcribe(input) => ("audio", &input.audio),
        };
        require(field, value)
    }

    /// Requested temperature, or the capability default when missing or outside 0..=1.
    pub fn temperature(&self) -> f32 {
        let requested = match self {
            Self::Solve(input) => input.temperature,
            Self::Explain(input) => input.temperature,
            Self::Formulas(input) => input.temperature,
            Self::Tips(input) => input.temperature,
            Self::Image(_) | Self::Transcribe(_) => None,
        };

        requested
            .filter(|t| (0.0..=1.0).contains(t))
            .unwrap_or_else(|| self.capability().default_temperature())
    }
}
