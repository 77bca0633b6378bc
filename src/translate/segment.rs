/// Exclamations that are kept as drawn instead of being translated
pub const PASS_THROUGH_TOKENS: &[&str] = &["UGH", "URGH"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Ascii,
    NonAscii,
}

/// Maximal substring whose characters are all ASCII or all non-ASCII
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRun<'a> {
    pub text: &'a str,
    pub kind: RunKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationDecision {
    Translate,
    PassThrough,
}

fn kind_of(c: char) -> RunKind {
    if c.is_ascii() { RunKind::Ascii } else { RunKind::NonAscii }
}

/// Split `text` at every ASCII / non-ASCII boundary.
///
/// Concatenating the returned runs gives back `text`; the empty string has no runs.
pub fn split_runs(text: &str) -> Vec<TextRun<'_>> {
    let mut runs = Vec::new();
    let mut chars = text.char_indices();

    let Some((_, first)) = chars.next() else {
        return runs;
    };

    let mut start = 0;
    let mut kind = kind_of(first);
    for (offset, c) in chars {
        let next = kind_of(c);
        if next != kind {
            runs.push(TextRun { text: &text[start..offset], kind });
            start = offset;
            kind = next;
        }
    }
    runs.push(TextRun { text: &text[start..], kind });
    runs
}

impl TextRun<'_> {
    pub fn decision(&self) -> TranslationDecision {
        if self.kind == RunKind::NonAscii
            || self.text.trim().chars().count() == 1
            || PASS_THROUGH_TOKENS.contains(&self.text)
        {
            TranslationDecision::PassThrough
        } else {
            TranslationDecision::Translate
        }
    }
}
