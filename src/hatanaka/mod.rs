//! Compact RINEX (Hatanaka) differential decoding
mod numdiff;
mod obs;
mod textdiff;

pub use numdiff::{DataArc, DEFAULT_ORDER, MAX_ORDER};
pub use obs::ObsArcs;
pub use textdiff::{CharArc, TextDiff};

pub(crate) use obs::parse_init_token;
