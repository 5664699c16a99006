use crate::languages::{Language, display_name_for};
use crate::providers::{SourceLanguage, SummaryFormat, SummaryLength, SummaryOptions, SummaryStyle};

/// Context passed along with every summary request
pub const SUMMARY_CONTEXT: &str = "This is a user-generated text.";

pub const DETECTION_PROMPT: &str = r#"You identify the language of the text the user sends.

Respond with a single JSON object and nothing else:
{"language": "<ISO 639-1 code>", "confidence": <number between 0 and 1>}

Rules:
- Use the two-letter lowercase code (en, es, fr, pt, ru, tr, ...).
- Judge the dominant language when the text mixes languages.
- Never translate or comment on the text.
"#;

/// System prompt for a translation from `source` into `target`
pub fn translation_prompt(source: &SourceLanguage, target: Language) -> String {
    let from = match source {
        SourceLanguage::Auto => "the language it is written in".to_string(),
        SourceLanguage::Code(code) => display_name_for(code),
    };

    format!(
        "You are a translation engine. Translate the user's text from {} into {}.\n\
         Reply with the translation only: no quotes, notes, or explanations.\n\
         Keep formatting, line breaks and punctuation where the target language allows.",
        from,
        target.display_name()
    )
}

/// System prompt for a summary shaped by `options`
pub fn summary_prompt(options: &SummaryOptions) -> String {
    let style = match options.style {
        SummaryStyle::KeyPoints => "the key points of the text as a bulleted list",
        SummaryStyle::TlDr => "a short overview of the text, like a TL;DR",
        SummaryStyle::Teaser => "an intriguing teaser that makes the reader want to read the text",
        SummaryStyle::Headline => "a single headline capturing the main point of the text",
    };
    let length = match (options.style, options.length) {
        (SummaryStyle::KeyPoints, SummaryLength::Short) => "at most 3 bullet points",
        (SummaryStyle::KeyPoints, SummaryLength::Medium) => "at most 5 bullet points",
        (SummaryStyle::KeyPoints, SummaryLength::Long) => "at most 7 bullet points",
        (SummaryStyle::Headline, SummaryLength::Short) => "at most 12 words",
        (SummaryStyle::Headline, SummaryLength::Medium) => "at most 17 words",
        (SummaryStyle::Headline, SummaryLength::Long) => "at most 22 words",
        (_, SummaryLength::Short) => "one sentence",
        (_, SummaryLength::Medium) => "up to three sentences",
        (_, SummaryLength::Long) => "up to five sentences",
    };
    let format = match options.format {
        SummaryFormat::Markdown => "Format the answer as Markdown.",
        SummaryFormat::PlainText => "Use plain text without any Markdown.",
    };

    format!(
        "You summarize text. Produce {} using {}. {}\n\
         Write the summary in the same language as the text.\n\
         Context: {}",
        style, length, format, SUMMARY_CONTEXT
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_prompt_names_languages() {
        let prompt = translation_prompt(&SourceLanguage::Code("es".into()), Language::French);
        assert!(prompt.contains("from Spanish into French"));

        let auto = translation_prompt(&SourceLanguage::Auto, Language::Turkish);
        assert!(auto.contains("into Turkish"));
    }

    #[test]
    fn test_summary_prompt_follows_options() {
        let prompt = summary_prompt(&SummaryOptions::default());
        assert!(prompt.contains("key points"));
        assert!(prompt.contains("at most 5 bullet points"));
        assert!(prompt.contains("Markdown"));
        assert!(prompt.contains(SUMMARY_CONTEXT));

        let plain = summary_prompt(&SummaryOptions {
            style: SummaryStyle::Headline,
            format: SummaryFormat::PlainText,
            length: SummaryLength::Short,
        });
        assert!(plain.contains("at most 12 words"));
        assert!(plain.contains("plain text"));
    }
}
