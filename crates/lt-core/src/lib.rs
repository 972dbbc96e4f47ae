//! Core domain logic for swim meet lane timing.
//!
//! This crate contains the fundamental types and logic for:
//! - Times: fixed-point race times and their text forms
//! - Heats and lanes: one normalized view of start lists and results
//! - Resolution: turning redundant watch readings into one final time
//! - Codecs: reading and writing each timing system's files
//! - Meet programs: gathering start lists into an event list

pub mod codec;
mod error;
mod heat;
mod lane;
pub mod nameformat;
pub mod program;
pub mod resolver;
pub mod startlist;
mod time;

pub use codec::{ColoradoScb, DolphinCsv, DolphinDo4, Generic, TimingSystem};
pub use error::{CodecError, FormatError, ValidationError};
pub use heat::{Heat, HeatBuilder, HeatOrderKey, NUM_LANES, Numbering, Round};
pub use lane::{Lane, LaneBuilder, MAX_READINGS};
pub use nameformat::{NameMode, arrange_name, format_name};
pub use program::{DolphinEvent, FullProgram, MeetProgram};
pub use resolver::{ResolverKind, SimpleResolver, StandardResolver, TimeResolver};
pub use startlist::StartList;
pub use time::{MIN_VALID_TIME, ResolvedTime, Time, combine_times, format_time, median, parse_time};
