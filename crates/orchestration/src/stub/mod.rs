//! Canned answers used when every provider of a chain is rate limited.
//!
//! Content is deterministic: the same input always yields the same payload.

mod formulas;

use crate::models::{
    CapabilityInput, ExplainInput, FormulaInput, Payload, SolveInput, StudyTipsInput,
};

const UNAVAILABLE_NOTE: &str =
    "> **Note:** This is sample content shown while the AI service is unavailable or rate limited.";

/// Produces fallback content for a capability.
///
/// Returns `None` when the capability has no sensible canned answer
/// (images and transcriptions).
pub trait StubResponder: Send + Sync {
    fn respond(&self, input: &CapabilityInput) -> Option<Payload>;
}

/// Markdown templates plus built-in formula sheets.
#[derive(Clone, Copy, Debug, Default)]
pub struct CannedContent;

impl StubResponder for CannedContent {
    fn respond(&self, input: &CapabilityInput) -> Option<Payload> {
        let content = match input {
            CapabilityInput::Solve(input) => solution(input),
            CapabilityInput::Explain(input) => explanation(input),
            CapabilityInput::Formulas(input) => formula_sheet(input),
            CapabilityInput::Tips(input) => study_tips(input),
            CapabilityInput::Image(_) | CapabilityInput::Transcribe(_) => return None,
        };
        Some(Payload::text(content))
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn solution(input: &SolveInput) -> String {
    format!(
        "# Solution: {problem}\n\n\
         ## Problem Analysis\n\
         This is a {difficulty} level {subject} problem.\n\n\
         {note}\n\n\
         ## Solution Approach\n\
         1. **Identify** the key concepts and the given information\n\
         2. **Plan** a strategy for solving the problem\n\
         3. **Execute** the solution step by step\n\
         4. **Verify** the answer\n\n\
         ## Step-by-Step Solution\n\n\
         ### Step 1: Problem Setup\n\
         Write down what is given and what needs to be found.\n\n\
         ### Step 2: Apply Concepts\n\
         Use the relevant formulas and principles from {subject}.\n\n\
         ### Step 3: Calculate\n\
         Carry out the calculations.\n\n\
         ### Step 4: Final Answer\n\
         State the result with units where they apply.\n\n\
         > **Status:** Please try again later for a complete AI-generated solution.\n",
        problem = truncate(input.problem.trim(), 100),
        difficulty = input.difficulty.to_lowercase(),
        subject = input.subject,
        note = UNAVAILABLE_NOTE,
    )
}

fn explanation(input: &ExplainInput) -> String {
    format!(
        "# Understanding: {concept}\n\n\
         ## Overview\n\
         A short overview of **{concept}** in {subject}.\n\n\
         {note}\n\n\
         ## Key Points\n\
         1. **Definition**: {concept} is a core idea in {subject}\n\
         2. **Applications**: it appears in many practical problems\n\
         3. **Examples**: look for real-world situations where it applies\n\n\
         ## Level: {level}\n\
         This outline is aimed at the {level} level.\n\n\
         > **Status:** Please try again later for a complete AI-generated explanation.\n",
        concept = input.concept.trim(),
        subject = input.subject,
        level = input.level,
        note = UNAVAILABLE_NOTE,
    )
}

fn formula_sheet(input: &FormulaInput) -> String {
    if let Some(sheet) = formulas::sheet(&input.subject, &input.topic) {
        return sheet.to_string();
    }

    let topic = if input.topic.trim().is_empty() {
        "General"
    } else {
        input.topic.trim()
    };
    format!(
        "# {subject} - {topic} Formulas\n\n\
         {note}\n\n\
         A full formula reference for {subject} ({topic}) will be available once the AI service is back.\n",
        subject = input.subject.trim(),
        topic = topic,
        note = UNAVAILABLE_NOTE,
    )
}

fn study_tips(input: &StudyTipsInput) -> String {
    let challenges = if input.challenges.is_empty() {
        "None specified".to_string()
    } else {
        input.challenges.join(", ")
    };

    format!(
        "# Personalized Study Plan for {subject}\n\n\
         ## Your Profile\n\
         - **Subject**: {subject}\n\
         - **Learning Style**: {style}\n\
         - **Study Goal**: {goal}\n\
         - **Challenges**: {challenges}\n\n\
         ## Study Strategies\n\
         1. Build a solid foundation in the fundamentals of {subject}\n\
         2. Lean on {style_lower} materials that suit how you learn\n\
         3. Break \"{goal}\" into weekly milestones and track progress\n\n\
         ## Time Management\n\
         - **Pomodoro**: 25-minute focused sessions\n\
         - **Spaced repetition**: review at increasing intervals\n\
         - **Active recall**: test yourself regularly\n\n\
         {note}\n",
        subject = input.subject.trim(),
        style = input.learning_style,
        style_lower = input.learning_style.to_lowercase(),
        goal = input.study_goal,
        challenges = challenges,
        note = UNAVAILABLE_NOTE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageInput, TranscribeInput};

    fn solve(problem: &str) -> CapabilityInput {
        CapabilityInput::Solve(SolveInput {
            problem: problem.to_string(),
            subject: "Physics".to_string(),
            difficulty: "Intermediate".to_string(),
            show_steps: true,
            include_theory: true,
            include_diagrams: true,
            temperature: None,
        })
    }

    #[test]
    fn test_solution_is_deterministic() {
        let a = CannedContent.respond(&solve("A ball is thrown upward")).unwrap();
        let b = CannedContent.respond(&solve("A ball is thrown upward")).unwrap();
        assert_eq!(a, b);
        let text = a.as_text().unwrap();
        assert!(text.starts_with("# Solution: A ball is thrown upward"));
        assert!(text.contains("intermediate level Physics problem"));
    }

    #[test]
    fn test_long_problem_is_truncated() {
        let problem = "x".repeat(150);
        let payload = CannedContent.respond(&solve(&problem)).unwrap();
        let first_line = payload.as_text().unwrap().lines().next().unwrap().to_string();
        assert_eq!(first_line, format!("# Solution: {}...", "x".repeat(100)));
    }

    #[test]
    fn test_known_formula_sheet() {
        let input = CapabilityInput::Formulas(FormulaInput {
            subject: "physics".to_string(),
            topic: "Mechanics".to_string(),
            search_term: String::new(),
            temperature: None,
        });
        let payload = CannedContent.respond(&input).unwrap();
        let text = payload.as_text().unwrap();
        assert!(text.starts_with("# Classical Mechanics Formulas"));
        assert!(text.contains("F = ma"));
    }

    #[test]
    fn test_unknown_formula_sheet_uses_template() {
        let input = CapabilityInput::Formulas(FormulaInput {
            subject: "Biology".to_string(),
            topic: "Genetics".to_string(),
            search_term: String::new(),
            temperature: None,
        });
        let payload = CannedContent.respond(&input).unwrap();
        assert!(payload
            .as_text()
            .unwrap()
            .starts_with("# Biology - Genetics Formulas"));
    }

    #[test]
    fn test_study_tips_lists_challenges() {
        let input = CapabilityInput::Tips(StudyTipsInput {
            subject: "Chemistry".to_string(),
            learning_style: "Visual".to_string(),
            study_goal: "Pass the final".to_string(),
            challenges: vec!["focus".to_string(), "time".to_string()],
            temperature: None,
        });
        let payload = CannedContent.respond(&input).unwrap();
        assert!(payload.as_text().unwrap().contains("**Challenges**: focus, time"));
    }

    #[test]
    fn test_no_stub_for_media() {
        let image = CapabilityInput::Image(ImageInput {
            prompt: "a pulley".to_string(),
            context: String::new(),
            style: "educational".to_string(),
        });
        let audio = CapabilityInput::Transcribe(TranscribeInput {
            audio: "UklGRg==".to_string(),
            format: None,
        });
        assert!(CannedContent.respond(&image).is_none());
        assert!(CannedContent.respond(&audio).is_none());
    }
}
