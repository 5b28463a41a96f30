//! `ntm-core` — foundational types for the `ntm` network transmission model.
//!
//! This crate is a dependency of every other `ntm-*` crate.  It intentionally
//! has no `ntm-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `AreaId`                          |
//! | [`point`]       | `Point2`, planar distance                             |
//! | [`time`]        | `Tick`, `SimClock`, `NtmSettings`                     |
//! | [`rng`]         | `SimRng` (seeded, reproducible)                       |
//! | [`error`]       | `NtmError`, `NtmResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod point;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{NtmError, NtmResult};
pub use ids::{AreaId, EdgeId, NodeId};
pub use point::Point2;
pub use rng::SimRng;
pub use time::{NtmSettings, SimClock, Tick};
