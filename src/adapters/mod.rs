//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter           | Implements      | Connects to                  |
//! |-------------------|-----------------|------------------------------|
//! | `attribute_store` | AttributeStore  | In-memory data model         |
//! | `gpio`            | PinDriver       | ESP32 GPIO / host simulation |
//! | `hal_pins`        | PinDriver       | `embedded-hal` typed pins    |
//! | `log_sink`        | EventSink       | Serial log output            |
//! | `nvs`             | ConfigPort      | NVS / in-memory store        |
//! | `time`            | (clock)         | ESP32 system timer           |

pub mod attribute_store;
pub mod gpio;
pub mod hal_pins;
pub mod log_sink;
pub mod nvs;
pub mod time;
