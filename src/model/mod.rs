//! In-memory model handed to the generator, plus a loader for models stored
//! as YAML or JSON (used by the `balgen` binary).

mod load;
mod types;

pub use load::{load_model, parse_model};
pub use types::*;
