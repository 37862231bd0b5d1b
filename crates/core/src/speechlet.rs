use crate::models::{Card, PlainTextSpeech, Reprompt, RepromptSpeech, SpeechletResponse};

const PLAIN_TEXT: &str = "PlainText";
const SIMPLE_CARD: &str = "Simple";

pub const WELCOME_TITLE: &str = "Welcome";
pub const STATUS_TITLE: &str = "Train Line Status";

const EXAMPLE_PHRASING: &str =
    "Please tell me what train line you are interested in by saying, the one train or the D. train";

/// Builds one speechlet. The card always repeats the spoken text.
///
/// A `None` reprompt tells the platform not to reprompt; the session closes if the
/// user stays silent.
pub fn build_speechlet(
    title: &str,
    output: &str,
    reprompt: Option<&str>,
    should_end_session: bool,
) -> SpeechletResponse {
    SpeechletResponse {
        output_speech: PlainTextSpeech {
            kind: PLAIN_TEXT.to_string(),
            text: output.to_string(),
        },
        card: Card {
            kind: SIMPLE_CARD.to_string(),
            title: title.to_string(),
            content: output.to_string(),
        },
        reprompt: Reprompt {
            output_speech: RepromptSpeech {
                kind: PLAIN_TEXT.to_string(),
                text: reprompt.map(ToString::to_string),
            },
        },
        should_end_session,
    }
}

pub fn welcome_speechlet() -> SpeechletResponse {
    let output = format!("Welcome to the MTA Subway Service Status app. {EXAMPLE_PHRASING}");
    build_speechlet(WELCOME_TITLE, &output, Some(EXAMPLE_PHRASING), false)
}

pub fn status_speechlet(display_label: &str, status: &str) -> SpeechletResponse {
    let output = format!("The status of the {display_label} train line is {status}");
    build_speechlet(STATUS_TITLE, &output, None, true)
}

pub fn unrecognized_line_speechlet() -> SpeechletResponse {
    let retry = "Try saying, what is the status of the one train or the D. train?";
    let output = format!("I'm not sure what train line that is. {retry}");
    build_speechlet(STATUS_TITLE, &output, Some(retry), false)
}

pub fn status_unavailable_speechlet(display_label: &str) -> SpeechletResponse {
    let output = format!(
        "The status of the {display_label} train line is temporarily unavailable. Please try again in a moment."
    );
    build_speechlet(
        STATUS_TITLE,
        &output,
        Some("Which train line would you like the status of?"),
        false,
    )
}
