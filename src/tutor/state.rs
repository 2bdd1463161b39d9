//! Dialogue phase tracking.
//!
//! [`transition`] is a pure function from the current [`DialogueState`] and
//! one model reply to the next state. The session owns the transcript and the
//! network call; everything that decides *what a reply means* lives here.

use super::markers::{
    contains_conversation_start, contains_final_report, contains_help_activation,
    contains_help_resolution,
};
use serde::Serialize;
use strum::{Display, EnumString};

/// Coarse stage of the scripted lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    #[default]
    Quiz,
    Conversation,
    Report,
}

/// Per-session tracker state.
///
/// Invariants: `report_ready` implies `report_text` is set, and `turn_count`
/// never changes once `report_ready` is true.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DialogueState {
    turn_count: u32,
    help_mode: bool,
    report_ready: bool,
    report_text: Option<String>,
    phase: Phase,
}

impl DialogueState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn help_mode(&self) -> bool {
        self.help_mode
    }

    pub fn report_ready(&self) -> bool {
        self.report_ready
    }

    pub fn report_text(&self) -> Option<&str> {
        self.report_text.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

/// How turns spent in the vocabulary-help detour are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnPolicy {
    /// When false, a turn that enters, stays in, or leaves help mode does not
    /// advance `turn_count`.
    pub count_help_turns: bool,
}

/// What a reply did to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Transition {
    /// The reply carried the final report; the lesson is over.
    ReportReady,
    HelpStarted,
    HelpResolved,
    /// The quiz ended and free conversation began.
    ConversationStarted,
    /// Ordinary reply; at most the turn counter moved.
    Continued,
    /// The report was already ready; the reply was not interpreted.
    Ignored,
}

/// Apply one model reply to `state`.
pub fn transition(
    mut state: DialogueState,
    reply: &str,
    policy: TurnPolicy,
) -> (DialogueState, Transition) {
    if state.report_ready {
        return (state, Transition::Ignored);
    }

    if contains_final_report(reply) {
        state.report_ready = true;
        state.report_text = Some(reply.to_string());
        state.phase = Phase::Report;
        state.help_mode = false;
        return (state, Transition::ReportReady);
    }

    let was_help = state.help_mode;
    let mut event = Transition::Continued;

    if contains_help_activation(reply) {
        state.help_mode = true;
        event = Transition::HelpStarted;
    } else if was_help && contains_help_resolution(reply) {
        state.help_mode = false;
        event = Transition::HelpResolved;
    }

    if state.phase == Phase::Quiz && contains_conversation_start(reply) {
        state.phase = Phase::Conversation;
        if event == Transition::Continued {
            event = Transition::ConversationStarted;
        }
    }

    let in_help_detour = was_help || state.help_mode;
    if policy.count_help_turns || !in_help_detour {
        state.turn_count = state.turn_count.saturating_add(1);
    }

    (state, event)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELP_PROMPT: &str = "무슨 과목에 대해 이야기하고 싶니? 한국어로 말해줘. (What subject do you want to talk about? Tell me in Korean.)";
    const HELP_DONE: &str = "음악은 Music이야! 이제 너가 한번 써봐! (Now, you try writing it!)";
    const REPORT: &str = "## FINAL REPORT ##\n총 4문제 중 3문제를 맞혔습니다.";

    fn apply(state: DialogueState, reply: &str) -> (DialogueState, Transition) {
        transition(state, reply, TurnPolicy::default())
    }

    #[test]
    fn plain_reply_counts_a_turn() {
        let (state, event) = apply(DialogueState::new(), "Great! 😊");
        assert_eq!(event, Transition::Continued);
        assert_eq!(state.turn_count(), 1);
        assert!(!state.help_mode());
        assert_eq!(state.phase(), Phase::Quiz);
    }

    #[test]
    fn final_report_sets_ready_and_stores_text() {
        let (state, event) = apply(DialogueState::new(), REPORT);
        assert_eq!(event, Transition::ReportReady);
        assert!(state.report_ready());
        assert_eq!(state.report_text(), Some(REPORT));
        assert_eq!(state.phase(), Phase::Report);
        assert_eq!(state.turn_count(), 0);
    }

    #[test]
    fn turn_count_freezes_after_report() {
        let (state, _) = apply(DialogueState::new(), "Q1");
        let (state, _) = apply(state, REPORT);
        let frozen = state.turn_count();

        let (state, event) = apply(state, "anything else");
        assert_eq!(event, Transition::Ignored);
        assert_eq!(state.turn_count(), frozen);

        let (state, event) = apply(state, REPORT);
        assert_eq!(event, Transition::Ignored);
        assert_eq!(state.turn_count(), frozen);
    }

    #[test]
    fn help_enters_only_on_activation_phrase() {
        let (state, event) = apply(DialogueState::new(), "무슨 과목을 좋아하니?");
        assert_eq!(event, Transition::Continued);
        assert!(!state.help_mode());

        let (state, event) = apply(state, HELP_PROMPT);
        assert_eq!(event, Transition::HelpStarted);
        assert!(state.help_mode());
    }

    #[test]
    fn help_leaves_only_on_resolution_phrase() {
        let (state, _) = apply(DialogueState::new(), HELP_PROMPT);

        let (state, event) = apply(state, "음악? 좋아! 이제 써봐!");
        assert_eq!(event, Transition::Continued);
        assert!(state.help_mode());

        let (state, event) = apply(state, HELP_DONE);
        assert_eq!(event, Transition::HelpResolved);
        assert!(!state.help_mode());
    }

    #[test]
    fn resolution_phrase_outside_help_is_plain() {
        let (state, event) = apply(DialogueState::new(), HELP_DONE);
        assert_eq!(event, Transition::Continued);
        assert!(!state.help_mode());
        assert_eq!(state.turn_count(), 1);
    }

    #[test]
    fn help_detour_turns_are_not_counted_by_default() {
        let (state, _) = apply(DialogueState::new(), "Q1");
        assert_eq!(state.turn_count(), 1);

        let (state, _) = apply(state, HELP_PROMPT);
        let (state, _) = apply(state, "still helping");
        let (state, _) = apply(state, HELP_DONE);
        assert_eq!(state.turn_count(), 1);

        let (state, _) = apply(state, "My favorite subject is Music. 🎵");
        assert_eq!(state.turn_count(), 2);
    }

    #[test]
    fn help_detour_turns_count_when_enabled() {
        let policy = TurnPolicy {
            count_help_turns: true,
        };
        let (state, _) = transition(DialogueState::new(), HELP_PROMPT, policy);
        let (state, _) = transition(state, HELP_DONE, policy);
        assert_eq!(state.turn_count(), 2);
    }

    #[test]
    fn conversation_phrase_moves_quiz_to_conversation_once() {
        let reply = "Great job! 퀴즈 잘했어! 이제 자유 대화를 해보자. What is your favorite subject?";
        let (state, event) = apply(DialogueState::new(), reply);
        assert_eq!(event, Transition::ConversationStarted);
        assert_eq!(state.phase(), Phase::Conversation);

        let (state, event) = apply(state, reply);
        assert_eq!(event, Transition::Continued);
        assert_eq!(state.phase(), Phase::Conversation);
    }

    #[test]
    fn report_marker_wins_over_other_markers() {
        let reply = format!("{HELP_PROMPT}\n{REPORT}");
        let (state, event) = apply(DialogueState::new(), &reply);
        assert_eq!(event, Transition::ReportReady);
        assert!(!state.help_mode());
    }

    #[test]
    fn phase_parses_from_snake_case() {
        assert_eq!("conversation".parse::<Phase>().unwrap(), Phase::Conversation);
        assert_eq!(Phase::Report.to_string(), "report");
    }
}
