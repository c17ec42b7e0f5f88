//! The attendance decision engine: pure functions from a settings
//! snapshot plus "now" to an accept/reject decision. No IO lives here;
//! the api layer loads the snapshot, calls in, and persists the result.

pub mod classify;
pub mod decision;
pub mod geo;
pub mod report;
pub mod shifts;
pub mod window;
