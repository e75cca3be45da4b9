//! boxkit: runtime interface adapters ("boxes") with once-per-pair binding.
//!
//! A box wraps an existing object behind a caller-chosen interface and
//! forwards each call straight to the object's matching method. Method
//! matching and adapter generation run once per (target class, interface)
//! pair and are cached; every later box creation and call pays no lookup
//! cost. Unmatched interface methods either throw a distinguished error or
//! return the zero value of their declared return type, chosen per factory.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod adapter;
pub mod cache;
pub mod class;
pub mod descriptor;
pub mod emit;
pub mod error;
pub mod factory;
mod generator;
pub mod prelude;
pub mod registry;
pub mod value;
