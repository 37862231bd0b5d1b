use subway_core::{
    classify_slot, status_speechlet, status_unavailable_speechlet, unrecognized_line_speechlet,
    Classification, IntentPayload, SpeechletResponse, TRAIN_LINE_SLOT,
};
use subway_status::StatusSource;
use tracing::{info, warn};

/// Terminal outcome of a `GetTrainStatus` intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    SlotUnrecognized { spoken: Option<String> },
    StatusFetched {
        classification: Classification,
        status: String,
    },
    StatusUnavailable { classification: Classification },
}

impl Resolution {
    pub fn into_speechlet(self) -> SpeechletResponse {
        match self {
            Self::SlotUnrecognized { .. } => unrecognized_line_speechlet(),
            Self::StatusFetched {
                classification,
                status,
            } => status_speechlet(&classification.display_label, &status),
            Self::StatusUnavailable { classification } => {
                status_unavailable_speechlet(&classification.display_label)
            }
        }
    }
}

/// Classifies the `TrainLine` slot and, only when it names a known line, fetches its status once.
pub async fn resolve_train_status<S>(source: &S, intent: &IntentPayload) -> Resolution
where
    S: StatusSource,
{
    let spoken = intent.slot_value(TRAIN_LINE_SLOT);
    let classification = classify_slot(spoken);

    if !classification.is_recognized() {
        info!(spoken = ?spoken, "train line not recognized");
        return Resolution::SlotUnrecognized {
            spoken: spoken.map(ToString::to_string),
        };
    }

    match source.fetch_status(classification.group).await {
        Ok(status) => Resolution::StatusFetched {
            classification,
            status,
        },
        Err(error) => {
            warn!(line = %classification.group, error = %error, "status fetch failed");
            Resolution::StatusUnavailable { classification }
        }
    }
}
