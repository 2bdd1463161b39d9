#[path = "support/scripted_provider.rs"]
mod scripted_provider;

use scripted_provider::ScriptedProvider;
use sinu::error::TutorError;
use sinu::providers::MessageRole;
use sinu::tutor::{Phase, SessionSettings, Transition, TurnOutput, TurnPolicy, TutorSession};

const Q1: &str = "Q1. 'Science'는 무슨 과목일까? ##OPTIONS##: 과학 | 수학 | 음악";
const Q2: &str = "정답! 🎉 Q2. 'Music'은? ##OPTIONS##: 체육 | 음악 | 미술";
const START_TALK: &str = "잘했어! 이제 자유 대화를 해보자. What subject do you like?";
const HELP_PROMPT: &str = "무슨 과목에 대해 이야기하고 싶니? 한국어로 말해줘.";
const HELP_ANSWER: &str = "수학은 Math야! 이제 너가 한번 써봐!";
const PRAISE: &str = "Great sentence! 😊";
const REPORT: &str = "## FINAL REPORT ##\n총 2문제 중 1문제를 맞혔습니다. 문장 완성 지도가 1회 제공되었습니다.\n정말 잘했어요!";

fn settings(count_help_turns: bool) -> SessionSettings {
    SessionSettings {
        model: "test-model".into(),
        temperature: 0.7,
        policy: TurnPolicy { count_help_turns },
        default_quiz_total: 4,
    }
}

fn session(replies: Vec<Result<&'static str, &'static str>>, count_help_turns: bool) -> TutorSession {
    TutorSession::new(
        Box::new(ScriptedProvider::new(replies)),
        settings(count_help_turns),
    )
}

#[tokio::test]
async fn full_lesson_reaches_report() {
    let mut session = session(
        vec![
            Ok(Q1),
            Ok(Q2),
            Ok(START_TALK),
            Ok(HELP_PROMPT),
            Ok(HELP_ANSWER),
            Ok(PRAISE),
            Ok(REPORT),
        ],
        false,
    );

    let out = session.advance("Yes!").await.unwrap();
    let TurnOutput::Reply { options, .. } = out else {
        panic!("expected a quiz question, got {out:?}");
    };
    assert_eq!(options, ["과학", "수학", "음악"]);
    assert!(!session.can_request_help());

    session.choose_option(0).await.unwrap();
    let out = session.choose_option(1).await.unwrap();
    assert!(matches!(
        out,
        TurnOutput::Reply {
            transition: Transition::ConversationStarted,
            ..
        }
    ));
    assert_eq!(session.state().phase(), Phase::Conversation);
    assert!(session.can_request_help());
    let before_help = session.state().turn_count();

    let out = session.request_help().await.unwrap();
    assert!(matches!(
        out,
        TurnOutput::Reply {
            transition: Transition::HelpStarted,
            ..
        }
    ));
    assert!(session.state().help_mode());

    let out = session.advance("수학").await.unwrap();
    assert!(matches!(
        out,
        TurnOutput::Reply {
            transition: Transition::HelpResolved,
            ..
        }
    ));
    assert!(!session.state().help_mode());
    assert_eq!(session.state().turn_count(), before_help);

    session.advance("I like Math.").await.unwrap();
    assert_eq!(session.state().turn_count(), before_help + 1);

    let out = session.advance("Bye!").await.unwrap();
    let TurnOutput::ReportReady { report, .. } = out else {
        panic!("expected the report, got {out:?}");
    };
    assert_eq!(report.total_questions, 2);
    assert_eq!(report.correct_answers, 1);
    assert_eq!(report.guidance_count, 1);
    assert!((report.accuracy_percent() - 50.0).abs() < f64::EPSILON);
    assert!(report.remark.contains("정말 잘했어요!"));
    assert!(session.is_finished());
    assert_eq!(session.report(), Some(report));

    let frozen = session.state().turn_count();
    assert_eq!(
        session.advance("one more?").await.unwrap_err(),
        TutorError::SessionComplete
    );
    assert_eq!(session.state().turn_count(), frozen);
}

#[tokio::test]
async fn help_turns_count_when_configured() {
    let mut session = session(
        vec![Ok(START_TALK), Ok(HELP_PROMPT), Ok(HELP_ANSWER)],
        true,
    );
    session.advance("ready").await.unwrap();
    session.request_help().await.unwrap();
    session.advance("과학").await.unwrap();
    assert_eq!(session.state().turn_count(), 3);
}

#[tokio::test]
async fn provider_failure_leaves_session_untouched() {
    let scripted = ScriptedProvider::new(vec![
        Ok(Q1),
        Err("all 3 attempts failed"),
        Ok(Q2),
    ]);
    let seen = scripted.seen();
    let mut session = TutorSession::new(Box::new(scripted), settings(false));

    session.advance("Yes!").await.unwrap();
    let transcript_len = session.transcript().len();
    let turns = session.state().turn_count();

    let out = session.choose_option(0).await.unwrap();
    assert!(matches!(out, TurnOutput::Unavailable { .. }));
    assert_eq!(session.transcript().len(), transcript_len);
    assert_eq!(session.state().turn_count(), turns);
    assert_eq!(session.pending_options(), ["과학", "수학", "음악"]);

    // The same choice can be retried.
    session.choose_option(0).await.unwrap();
    assert_eq!(session.state().turn_count(), turns + 1);

    let calls = seen.lock().unwrap();
    assert_eq!(calls.len(), 3);
    let last = calls.last().unwrap();
    assert_eq!(last.first().map(|m| m.role), Some(MessageRole::Model));
    assert_eq!(last.last().map(|m| m.text.as_str()), Some("과학"));
}

#[tokio::test]
async fn help_is_refused_during_quiz() {
    let mut session = session(vec![Ok(Q1)], false);
    assert_eq!(
        session.request_help().await.unwrap_err(),
        TutorError::HelpUnavailable
    );
    session.advance("Yes!").await.unwrap();
    assert_eq!(
        session.choose_option(7).await.unwrap_err(),
        TutorError::OptionOutOfRange {
            index: 7,
            available: 3
        }
    );
}
