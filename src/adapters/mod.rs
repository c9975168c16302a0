//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter        | Implements          | Connects to                  |
//! |----------------|---------------------|------------------------------|
//! | `channel_sink` | StatusSink          | embassy-sync channel → transport |
//! | `float_switch` | LevelSensor         | embedded-hal GPIO input      |
//! | `log_sink`     | StatusSink          | `log` facade                 |
//! | `time`         | TickSource          | async-io-mini reactor timer  |
//! |                | Stopwatch           | monotonic clock              |

pub mod channel_sink;
pub mod float_switch;
pub mod log_sink;
pub mod time;
