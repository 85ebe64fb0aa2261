//! Cookie and preference storage.
//!
//! The inspection core never touches these; commands own reading cookies
//! from a jar and persisting per-cookie preferences.

pub mod cookie;
pub mod jar;
pub mod state;
