//! Integration layer between a host test framework and an external VHDL
//! simulator toolchain (`vlib`/`vmap`/`vcom`/`vsim`).
//!
//! The crate assembles the composite shell command for a simulation run,
//! marshals numeric test vectors through tab-separated exchange files, and
//! waits on the filesystem for the opaque simulator subprocess to signal
//! readiness and completion.
//!
//! A typical session:
//! 1. build a [`Session`](core::session::Session) for the entity under test
//!    and a [`Registry`](core::exchange::Registry) of exchange files,
//! 2. `write` the stimulus tables,
//! 3. assemble the command with [`build_command`](core::command::build_command)
//!    and execute it with a [`Driver`](core::driver::Driver),
//! 4. `read` the response tables and `teardown` the registry.

pub mod core;
pub mod error;
pub mod util;
