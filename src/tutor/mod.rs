//! The scripted quiz → free conversation → report lesson.

pub mod markers;
pub mod prompt;
pub mod report;
pub mod session;
pub mod state;

pub use markers::{ParsedReply, parse_options};
pub use report::{QuizReport, parse_report, parse_report_with_default};
pub use session::{ModelReply, SessionSettings, TurnOutput, TutorSession};
pub use state::{DialogueState, Phase, Transition, TurnPolicy, transition};
