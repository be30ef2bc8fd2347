//! Settings for the deck: transport timing, audio defaults, tape sources,
//! storage and logging. Loaded from an optional TOML file layered under
//! `TAPEDECK__*` environment overrides.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
