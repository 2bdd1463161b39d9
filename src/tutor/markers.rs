//! Fixed literals the tutor model embeds in otherwise free-form replies.
//!
//! Every check here is a substring search. The model is an untrusted text
//! source, so nothing assumes a marker sits at the start of a reply or appears
//! only once.

/// Precedes a `|`-separated list of quiz choices.
pub const OPTIONS_MARKER: &str = "##OPTIONS##";
/// Starts the end-of-lesson report.
pub const FINAL_REPORT_MARKER: &str = "## FINAL REPORT ##";
/// Announces the switch from the quiz to free conversation.
pub const CONVERSATION_START_PHRASE: &str = "이제 자유 대화를 해보자.";
/// The tutor asks which subject the student wants help naming.
pub const HELP_ACTIVATION_PHRASE: &str = "무슨 과목에 대해 이야기하고 싶니?";
/// The tutor hands the sentence back to the student after the hint.
pub const HELP_RESOLUTION_PHRASE: &str = "이제 너가 한번 써봐!";

/// A model reply split into display text and quiz choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub message: String,
    pub options: Vec<String>,
}

impl ParsedReply {
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }
}

/// Split `text` at the first options marker.
///
/// Accepts the marker with or without its trailing colon. Options are trimmed
/// and empty entries dropped; a marker with no usable options leaves the
/// reply without choices.
pub fn parse_options(text: &str) -> ParsedReply {
    let Some((head, tail)) = text.split_once(OPTIONS_MARKER) else {
        return ParsedReply {
            message: text.trim().to_string(),
            options: Vec::new(),
        };
    };

    let tail = tail.strip_prefix(':').unwrap_or(tail);
    // A repeated marker would otherwise leak into the last option.
    let tail = tail.split(OPTIONS_MARKER).next().unwrap_or_default();

    let options = tail
        .split('|')
        .map(str::trim)
        .filter(|option| !option.is_empty())
        .map(String::from)
        .collect();

    ParsedReply {
        message: head.trim().to_string(),
        options,
    }
}

pub fn contains_final_report(text: &str) -> bool {
    text.contains(FINAL_REPORT_MARKER)
}

pub fn contains_help_activation(text: &str) -> bool {
    text.contains(HELP_ACTIVATION_PHRASE)
}

pub fn contains_help_resolution(text: &str) -> bool {
    text.contains(HELP_RESOLUTION_PHRASE)
}

pub fn contains_conversation_start(text: &str) -> bool {
    text.contains(CONVERSATION_START_PHRASE)
}
