//! Transcript post-processing.

/// Cleans up a raw transcript before it is returned to the user.
pub trait TranscriptEnhancer: Send + Sync {
    fn enhance(&self, raw: &str) -> String;
}

/// Normalizes whitespace and applies sentence case.
#[derive(Clone, Copy, Debug, Default)]
pub struct SentenceCaseEnhancer;

impl TranscriptEnhancer for SentenceCaseEnhancer {
    fn enhance(&self, raw: &str) -> String {
        let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();

        let mut out = String::with_capacity(normalized.len());
        let mut start_of_sentence = true;
        for c in normalized.chars() {
            if start_of_sentence && c.is_alphabetic() {
                out.extend(c.to_uppercase());
                start_of_sentence = false;
            } else {
                out.push(c);
            }
            if matches!(c, '.' | '?' | '!') {
                start_of_sentence = true;
            }
        }
        out
    }
}

/// Returns the transcript untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThrough;

impl TranscriptEnhancer for PassThrough {
    fn enhance(&self, raw: &str) -> String {
        raw.to_string()
    }
}
