//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                          | Connects to              |
//! |------------|-------------------------------------|--------------------------|
//! | `hardware` | DigitalPort, AnalogPort, ClockPort, | Simulated stack model    |
//! |            | DelayNs                             |                          |
//! | `log_sink` | EventSink                           | `log` facade             |
//! | `time`     | ClockPort, DelayNs                  | `std::time` / sleep      |

pub mod hardware;
pub mod log_sink;
pub mod time;
