pub mod classifier;
pub mod models;
pub mod speechlet;

pub use classifier::{classify, classify_slot, normalize_token};
pub use models::*;
pub use speechlet::{
    build_speechlet, status_speechlet, status_unavailable_speechlet, unrecognized_line_speechlet,
    welcome_speechlet,
};
