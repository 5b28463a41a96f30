//! `ntm-output` — simulation output backends.
//!
//! # Crate layout
//!
//! | Module       | Contents                                          |
//! |--------------|---------------------------------------------------|
//! | [`row`]      | plain row types written by every backend          |
//! | [`writer`]   | the `OutputWriter` trait                          |
//! | [`csv`]      | CSV backend (three files per run)                 |
//! | [`observer`] | `SimOutputObserver<W>` bridging sim → writer      |
//! | [`error`]    | `OutputError`, `OutputResult<T>`                  |

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{FlowCellRow, TickSummaryRow, ZoneSnapshotRow};
pub use writer::OutputWriter;
