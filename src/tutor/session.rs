use super::markers::parse_options;
use super::prompt::{APOLOGY, COMPLETION_NOTICE, GREETING, HELP_COMMAND, SYSTEM_INSTRUCTION};
use super::report::{QuizReport, parse_report_with_default};
use super::state::{DialogueState, Phase, Transition, TurnPolicy, transition};
use crate::config::Config;
use crate::error::TutorError;
use crate::providers::{ChatMessage, Provider};
use uuid::Uuid;

/// Result of one call to the model, tagged so a failure can never be
/// mistaken for lesson content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    Generated(String),
    Unavailable { cause: String },
}

/// What the student sees after a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutput {
    /// A normal tutor message, possibly with quiz choices.
    Reply {
        message: String,
        options: Vec<String>,
        transition: Transition,
    },
    /// The lesson is over; the report view takes over.
    ReportReady {
        notice: String,
        report: QuizReport,
    },
    /// The model could not be reached. Nothing was recorded; the same input
    /// can be sent again.
    Unavailable { apology: String },
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub model: String,
    pub temperature: f64,
    pub policy: TurnPolicy,
    pub default_quiz_total: u32,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model().to_string(),
            temperature: config.default_temperature,
            policy: TurnPolicy {
                count_help_turns: config.tutor.count_help_turns,
            },
            default_quiz_total: config.tutor.default_quiz_total,
        }
    }
}

/// One student's lesson: transcript, tracker state and the provider it talks to.
pub struct TutorSession {
    id: Uuid,
    provider: Box<dyn Provider>,
    settings: SessionSettings,
    transcript: Vec<ChatMessage>,
    state: DialogueState,
    pending_options: Vec<String>,
}

impl TutorSession {
    pub fn new(provider: Box<dyn Provider>, settings: SessionSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider,
            settings,
            transcript: vec![ChatMessage::model(GREETING)],
            state: DialogueState::new(),
            pending_options: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn greeting(&self) -> &str {
        GREETING
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Quiz choices from the latest reply, if it asked a question.
    pub fn pending_options(&self) -> &[String] {
        &self.pending_options
    }

    pub fn is_finished(&self) -> bool {
        self.state.report_ready()
    }

    /// Help is offered during free conversation while no quiz question is open.
    pub fn can_request_help(&self) -> bool {
        self.state.phase() == Phase::Conversation
            && self.pending_options.is_empty()
            && !self.state.report_ready()
    }

    pub fn report(&self) -> Option<QuizReport> {
        self.state
            .report_text()
            .map(|text| parse_report_with_default(text, self.settings.default_quiz_total))
    }

    /// Send one student message and interpret the tutor's reply.
    pub async fn advance(&mut self, user_text: &str) -> Result<TurnOutput, TutorError> {
        if self.state.report_ready() {
            return Err(TutorError::SessionComplete);
        }
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return Err(TutorError::EmptyMessage);
        }

        self.transcript.push(ChatMessage::user(user_text));
        let previous_options = std::mem::take(&mut self.pending_options);

        let text = match self.fetch_reply().await {
            ModelReply::Generated(text) => text,
            ModelReply::Unavailable { cause } => {
                tracing::warn!(session = %self.id, cause = %cause, "Tutor reply unavailable");
                self.transcript.pop();
                self.pending_options = previous_options;
                return Ok(TurnOutput::Unavailable {
                    apology: APOLOGY.to_string(),
                });
            }
        };

        let (state, event) = transition(
            std::mem::take(&mut self.state),
            &text,
            self.settings.policy,
        );
        self.state = state;
        tracing::info!(
            session = %self.id,
            turn = self.state.turn_count(),
            phase = %self.state.phase(),
            help_mode = self.state.help_mode(),
            transition = %event,
            "Tutor turn complete"
        );

        if event == Transition::ReportReady {
            let report = parse_report_with_default(&text, self.settings.default_quiz_total);
            return Ok(TurnOutput::ReportReady {
                notice: COMPLETION_NOTICE.to_string(),
                report,
            });
        }

        let parsed = parse_options(&text);
        self.transcript.push(ChatMessage::model(text));
        self.pending_options.clone_from(&parsed.options);

        Ok(TurnOutput::Reply {
            message: parsed.message,
            options: parsed.options,
            transition: event,
        })
    }

    /// Answer the open quiz question with choice `index` (0-based).
    pub async fn choose_option(&mut self, index: usize) -> Result<TurnOutput, TutorError> {
        if self.state.report_ready() {
            return Err(TutorError::SessionComplete);
        }
        if self.pending_options.is_empty() {
            return Err(TutorError::NoPendingOptions);
        }
        let Some(choice) = self.pending_options.get(index).cloned() else {
            return Err(TutorError::OptionOutOfRange {
                index,
                available: self.pending_options.len(),
            });
        };
        self.advance(&choice).await
    }

    /// Ask the tutor for the English name of a subject.
    pub async fn request_help(&mut self) -> Result<TurnOutput, TutorError> {
        if self.state.report_ready() {
            return Err(TutorError::SessionComplete);
        }
        if !self.can_request_help() {
            return Err(TutorError::HelpUnavailable);
        }
        self.advance(HELP_COMMAND).await
    }

    async fn fetch_reply(&self) -> ModelReply {
        match self
            .provider
            .chat_with_history(
                Some(SYSTEM_INSTRUCTION.as_str()),
                &self.transcript,
                &self.settings.model,
                self.settings.temperature,
            )
            .await
        {
            Ok(response) => {
                if let Some(tokens) = response.total_tokens() {
                    tracing::debug!(session = %self.id, tokens, "Model usage");
                }
                ModelReply::Generated(response.text)
            }
            Err(e) => ModelReply::Unavailable {
                cause: format!("{e:#}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderResponse;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};

    /// Replays canned replies; `None` simulates an exhausted retry loop.
    struct Scripted {
        replies: Mutex<VecDeque<Option<&'static str>>>,
        seen: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    }

    impl Provider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn chat_with_history<'a>(
            &'a self,
            _system_prompt: Option<&'a str>,
            messages: &'a [ChatMessage],
            _model: &'a str,
            _temperature: f64,
        ) -> Pin<Box<dyn Future<Output = anyhow::Result<ProviderResponse>> + Send + 'a>> {
            Box::pin(async move {
                self.seen.lock().unwrap().push(messages.to_vec());
                match self.replies.lock().unwrap().pop_front().flatten() {
                    Some(text) => Ok(ProviderResponse::text_only(text.to_string())),
                    None => anyhow::bail!("all 3 attempts failed"),
                }
            })
        }
    }

    fn session(replies: Vec<Option<&'static str>>) -> (TutorSession, Arc<Mutex<Vec<Vec<ChatMessage>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let provider = Scripted {
            replies: Mutex::new(replies.into()),
            seen: Arc::clone(&seen),
        };
        let settings = SessionSettings {
            model: "test-model".into(),
            temperature: 0.7,
            policy: TurnPolicy::default(),
            default_quiz_total: 4,
        };
        (TutorSession::new(Box::new(provider), settings), seen)
    }

    #[tokio::test]
    async fn transcript_starts_with_greeting() {
        let (s, _) = session(vec![]);
        assert_eq!(s.transcript(), &[ChatMessage::model(GREETING)]);
    }

    #[tokio::test]
    async fn reply_with_options_is_split_and_recorded() {
        let (mut s, seen) = session(vec![Some("Q1? ##OPTIONS##: Math | Music | Art")]);
        let out = s.advance("ready!").await.unwrap();

        assert_eq!(
            out,
            TurnOutput::Reply {
                message: "Q1?".into(),
                options: vec!["Math".into(), "Music".into(), "Art".into()],
                transition: Transition::Continued,
            }
        );
        assert_eq!(s.pending_options(), ["Math", "Music", "Art"]);
        assert_eq!(s.transcript().len(), 3);
        assert_eq!(s.state().turn_count(), 1);

        let sent = seen.lock().unwrap();
        assert_eq!(sent[0].last(), Some(&ChatMessage::user("ready!")));
    }

    #[tokio::test]
    async fn choose_option_sends_option_text() {
        let (mut s, seen) = session(vec![
            Some("Q1? ##OPTIONS##: Math | Music"),
            Some("Correct! ✨"),
        ]);
        s.advance("ready").await.unwrap();
        s.choose_option(1).await.unwrap();

        assert!(s.pending_options().is_empty());
        let sent = seen.lock().unwrap();
        assert_eq!(sent[1].last(), Some(&ChatMessage::user("Music")));
    }

    #[tokio::test]
    async fn choose_option_rejects_bad_index_without_calling_model() {
        let (mut s, seen) = session(vec![Some("Q1? ##OPTIONS##: A | B")]);
        s.advance("ready").await.unwrap();

        let err = s.choose_option(2).await.unwrap_err();
        assert_eq!(
            err,
            TutorError::OptionOutOfRange {
                index: 2,
                available: 2
            }
        );
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn choose_option_without_question_fails() {
        let (mut s, _) = session(vec![]);
        assert_eq!(s.choose_option(0).await.unwrap_err(), TutorError::NoPendingOptions);
    }

    #[tokio::test]
    async fn empty_message_rejected() {
        let (mut s, seen) = session(vec![]);
        assert_eq!(s.advance("   ").await.unwrap_err(), TutorError::EmptyMessage);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn final_report_is_not_appended_and_ends_session() {
        let (mut s, _) = session(vec![Some(
            "## FINAL REPORT ##\n총 4문제 중 3문제를 맞혔습니다.\n자유 대화 중 문장 완성 지도가 2회 제공되었습니다.\n최고야!",
        )]);
        let before = s.transcript().len();

        let out = s.advance("bye").await.unwrap();
        let TurnOutput::ReportReady { notice, report } = out else {
            panic!("expected report");
        };
        assert_eq!(notice, COMPLETION_NOTICE);
        assert_eq!(report.correct_answers, 3);
        assert_eq!(report.guidance_count, 2);

        // Only the user message was added.
        assert_eq!(s.transcript().len(), before + 1);
        assert!(s.is_finished());
        assert_eq!(s.report(), Some(report));
        assert_eq!(s.advance("more").await.unwrap_err(), TutorError::SessionComplete);
    }

    #[tokio::test]
    async fn unavailable_reply_rolls_back_and_keeps_state() {
        let (mut s, _) = session(vec![Some("Q1? ##OPTIONS##: A | B"), None]);
        s.advance("ready").await.unwrap();
        let transcript = s.transcript().to_vec();
        let state = s.state().clone();

        let out = s.choose_option(0).await.unwrap();
        assert_eq!(
            out,
            TurnOutput::Unavailable {
                apology: APOLOGY.into()
            }
        );
        assert_eq!(s.transcript(), transcript.as_slice());
        assert_eq!(s.state(), &state);
        assert_eq!(s.pending_options(), ["A", "B"]);
    }

    #[tokio::test]
    async fn help_only_during_free_conversation() {
        let (mut s, seen) = session(vec![
            Some("Great job! 퀴즈 잘했어! 이제 자유 대화를 해보자. What is your favorite subject?"),
            Some("무슨 과목에 대해 이야기하고 싶니? 한국어로 말해줘."),
        ]);
        assert_eq!(s.request_help().await.unwrap_err(), TutorError::HelpUnavailable);

        s.advance("Correct!").await.unwrap();
        assert!(s.can_request_help());

        let out = s.request_help().await.unwrap();
        assert!(matches!(
            out,
            TurnOutput::Reply {
                transition: Transition::HelpStarted,
                ..
            }
        ));
        assert!(s.state().help_mode());
        let sent = seen.lock().unwrap();
        assert_eq!(sent[1].last(), Some(&ChatMessage::user(HELP_COMMAND)));
    }

    #[tokio::test]
    async fn help_unavailable_while_question_open() {
        let (mut s, _) = session(vec![Some(
            "이제 자유 대화를 해보자. Which one? ##OPTIONS##: Math | Art",
        )]);
        s.advance("ok").await.unwrap();
        assert_eq!(s.state().phase(), Phase::Conversation);
        assert!(!s.can_request_help());
    }
}
