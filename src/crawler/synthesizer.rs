//! Record synthesis
//!
//! Turns the extracted text of one page into a [`Record`]. The text is cut to
//! the configured number of characters; when a generator is available it is
//! asked for a question/answer pair under the run's retry policy, otherwise (or
//! when every attempt fails) the record carries the fallback sentinel.

use crate::crawler::progress::Progress;
use crate::generation::{GenerationError, QaGenerator, RetryPolicy};
use crate::output::Record;

/// A synthesized record and how it was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub record: Record,

    /// True if the question/answer came from the generator
    pub generated: bool,
}

impl Synthesis {
    fn fallback(context: &str) -> Self {
        Self {
            record: Record::fallback(context),
            generated: false,
        }
    }
}

/// Returns the first `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Builds the record for one page
///
/// Returns `None` when the truncated text is blank; the page then produces no
/// record at all. Generation failures never escape: they are reported on the
/// progress channel and folded into a fallback record.
pub async fn synthesize(
    text: &str,
    source_url: &str,
    max_chars: usize,
    generator: Option<&dyn QaGenerator>,
    retry: &RetryPolicy,
    progress: &Progress,
) -> Option<Synthesis> {
    let context = truncate_chars(text, max_chars);
    if context.trim().is_empty() {
        return None;
    }

    let Some(generator) = generator else {
        return Some(Synthesis::fallback(context));
    };

    let result = retry
        .run(
            |_| async move {
                match generator.generate(context, source_url).await {
                    Ok(pair) if pair.question.trim().is_empty() || pair.answer.trim().is_empty() => {
                        Err(GenerationError::MalformedResponse(
                            "empty question or answer".to_string(),
                        ))
                    }
                    other => other,
                }
            },
            |attempt, err: &GenerationError| {
                progress.warn(format!(
                    "Generation attempt {} for {} failed: {}",
                    attempt + 1,
                    source_url,
                    err
                ));
                err.is_retryable()
            },
        )
        .await;

    match result {
        Ok(pair) => {
            progress.info(format!(
                "Generated Q&A for {} using {}",
                source_url,
                generator.name()
            ));
            Some(Synthesis {
                record: Record {
                    context: context.to_string(),
                    question: pair.question,
                    answer: pair.answer,
                },
                generated: true,
            })
        }
        Err(_) => {
            progress.warn(format!(
                "Giving up on Q&A generation for {}; recording fallback values",
                source_url
            ));
            Some(Synthesis::fallback(context))
        }
    }
}
