//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives a complete brewery
//! session through its message interface against mock ports.  No real
//! hardware or wall-clock waits are needed, except in `wall_clock_tests`.

mod adapter_tests;
mod mock_bus;
mod scenario_tests;
mod wall_clock_tests;
