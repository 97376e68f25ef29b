#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::type_complexity)]

/*
 * RINEX-OBS is part of the Geo-Rust framework.
 * Authors: Guillaume W. Bres <guillaume.bressaix@gmail.com> et al.
 * This framework is shipped under the Mozilla Public V2 license.
 */

extern crate gnss_rs as gnss;

#[macro_use]
extern crate num_derive;

#[macro_use]
extern crate lazy_static;

pub mod ambiguity;
pub mod decoder;
pub mod epoch;
pub mod hatanaka;
pub mod header;
pub mod observation;
pub mod reader;
pub mod scanner;
pub mod sink;
pub mod version;

mod columns;
mod error;
mod prn;

#[cfg(test)]
mod tests;

pub use error::{Error, FormatError, Warning};

/// Package to include all basic structures
pub mod prelude {
    // export
    pub use crate::{
        ambiguity::AmbiguityTracker,
        decoder::Decoder,
        epoch::EpochFlag,
        error::{Error, FormatError, Warning},
        header::{HeaderStore, HeaderValue, Value},
        observation::{LliFlags, ObservationValue},
        reader::{LineReader, LineSource},
        sink::{ObservationData, ObservationRecord, ObservationSink},
        version::Version,
    };

    // pub re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
}
