//! Renders capability inputs into provider requests.
//!
//! Formatting is plain: a system line naming the subject
//! expert and a numbered list of what the answer must contain.

use crate::errors::TutorError;
use crate::models::{
    require, CapabilityInput, CompletionRequest, DiagramInput, ExplainInput, FormulaInput,
    IllustrationInput, ImageInput, ImageRequest, ProviderRequest, SolveInput, StudyTipsInput,
};

const SOLVE_MAX_TOKENS: u32 = 3000;
const TEXT_MAX_TOKENS: u32 = 2500;
/// Problem text longer than this is cut before it goes into an image prompt.
const ILLUSTRATION_PROBLEM_CHARS: usize = 150;

/// Build the provider request for a synchronous capability.
///
/// Transcription has no provider request; it goes through the job poller.
pub fn build_request(input: &CapabilityInput) -> Result<ProviderRequest, TutorError> {
    let temperature = input.temperature();
    let request = match input {
        CapabilityInput::Solve(input) => ProviderRequest::Completion(solve(input, temperature)),
        CapabilityInput::Explain(input) => ProviderRequest::Completion(explain(input, temperature)),
        CapabilityInput::Formulas(input) => {
            ProviderRequest::Completion(formulas(input, temperature))
        }
        CapabilityInput::Tips(input) => ProviderRequest::Completion(study_tips(input, temperature)),
        CapabilityInput::Image(input) => ProviderRequest::Image(image(input)),
        CapabilityInput::Transcribe(_) => {
            return Err(TutorError::invalid_input(
                "Transcription requests are not sent as completions",
            ))
        }
    };
    Ok(request)
}

fn numbered(lines: &[String]) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{}. {}", i + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn solve(input: &SolveInput, temperature: f32) -> CompletionRequest {
    let mut requirements = vec!["Start with a brief overview of the concepts involved.".to_string()];
    requirements.push(if input.show_steps {
        "Break the solution into clear, logical steps showing all calculations.".to_string()
    } else {
        "Provide a concise solution.".to_string()
    });
    if input.include_theory {
        requirements.push("Explain the theoretical principles behind the solution.".to_string());
    }
    if input.include_diagrams {
        requirements.push("Describe any diagrams or graphs that would help.".to_string());
    }
    requirements.push("End with a summary of the key takeaways.".to_string());

    CompletionRequest {
        system: Some(format!(
            "You are an expert professor of {} who solves problems with clear, step-by-step explanations.",
            input.subject
        )),
        prompt: format!(
            "Solve the following {}-level {} problem.\n\nPROBLEM: {}\n\nRequirements:\n{}\n\nUse headings and mathematical notation where applicable.",
            input.difficulty,
            input.subject,
            input.problem.trim(),
            numbered(&requirements)
        ),
        temperature,
        max_tokens: SOLVE_MAX_TOKENS,
    }
}

fn explain(input: &ExplainInput, temperature: f32) -> CompletionRequest {
    let mut sections = vec![
        "Definition and basic explanation".to_string(),
        "Key principles and mechanisms".to_string(),
    ];
    if input.include_history {
        sections.push("Historical development and important contributors".to_string());
    }
    if input.include_examples {
        sections.push("Practical examples and real-world applications".to_string());
    }
    sections.push("Common misconceptions".to_string());
    sections.push("Related concepts".to_string());

    CompletionRequest {
        system: Some(format!(
            "You are an expert professor of {} who explains complex ideas clearly for every learning level.",
            input.subject
        )),
        prompt: format!(
            "Explain the concept of '{}' at an {} level in {}.\n\nStructure:\n{}",
            input.concept.trim(),
            input.level,
            input.subject,
            numbered(&sections)
        ),
        temperature,
        max_tokens: TEXT_MAX_TOKENS,
    }
}

fn formulas(input: &FormulaInput, temperature: f32) -> CompletionRequest {
    let topic = if input.topic.trim().is_empty() {
        "the core topics".to_string()
    } else {
        input.topic.trim().to_string()
    };
    let focus = match input.search_term.trim() {
        "" => String::new(),
        term => format!("\nFocus on formulas related to \"{}\".", term),
    };

    CompletionRequest {
        system: Some(format!(
            "You are an expert in {} who writes accurate, well organized formula references.",
            input.subject
        )),
        prompt: format!(
            "Write a reference of the most important formulas in {} within {}.{}\n\nFor each formula give the notation, define every variable, note SI units and when it applies.",
            topic, input.subject, focus
        ),
        temperature,
        max_tokens: TEXT_MAX_TOKENS,
    }
}

fn study_tips(input: &StudyTipsInput, temperature: f32) -> CompletionRequest {
    let challenges = if input.challenges.is_empty() {
        "none specified".to_string()
    } else {
        input.challenges.join(", ")
    };

    CompletionRequest {
        system: Some("You are an experienced study coach for STEM students.".to_string()),
        prompt: format!(
            "Create a personalized study plan for {}.\n\nLearning style: {}\nGoal: {}\nChallenges: {}\n\nInclude study strategies, time management and how to handle each challenge.",
            input.subject, input.learning_style, input.study_goal, challenges
        ),
        temperature,
        max_tokens: TEXT_MAX_TOKENS,
    }
}

fn image(input: &ImageInput) -> ImageRequest {
    let mut prompt = format!("{} illustration of {}", input.style, input.prompt.trim());
    if !input.context.trim().is_empty() {
        prompt.push_str(&format!(", in the context of {}", input.context.trim()));
    }
    prompt.push_str(", clear labels, clean white background, high detail");
    ImageRequest { prompt }
}

/// Image request for a subject-specific diagram of one concept.
pub fn diagram_image(input: &DiagramInput) -> Result<ImageInput, TutorError> {
    require("concept", &input.concept)?;
    let concept = input.concept.trim();
    let prompt = match input.subject.as_str() {
        "Physics" => format!("Clear scientific diagram illustrating {} in physics, with labels and arrows, educational style, technical drawing", concept),
        "Chemistry" => format!("Chemical diagram showing {}, molecular structure, clean scientific illustration with proper notation", concept),
        "Mathematics" => format!("Mathematical visualization of {}, geometric diagram with clear notation, educational graph, clean lines", concept),
        "Biology" => format!("Biological diagram depicting {}, anatomical illustration with labels, scientific accuracy, educational poster style", concept),
        "Engineering" => format!("Technical engineering diagram of {}, blueprint style with measurements, professional technical drawing", concept),
        _ => format!("Educational diagram illustrating {}", concept),
    };

    Ok(ImageInput {
        prompt,
        context: format!("{} education - {} level", input.subject, input.difficulty),
        style: "diagram".to_string(),
    })
}

/// Image request illustrating a problem statement.
pub fn problem_illustration_image(input: &IllustrationInput) -> Result<ImageInput, TutorError> {
    require("problem", &input.problem)?;
    let problem = input.problem.trim();
    let text = if problem.chars().count() > ILLUSTRATION_PROBLEM_CHARS {
        let cut: String = problem.chars().take(ILLUSTRATION_PROBLEM_CHARS).collect();
        format!("{}...", cut)
    } else {
        problem.to_string()
    };

    Ok(ImageInput {
        prompt: format!("Visual illustration for {} problem: {}", input.subject, text),
        context: format!("Problem solving visualization - {}", input.subject),
        style: "educational".to_string(),
    })
}
