//! STM32H743 board support — pin map, clocks, and the hardware
//! implementations of the platform seams.
//!
//! # Pin assignments
//!
//! These constants document the target PCB assignment; change them to match
//! your board before flashing.
//!
//! | Signal        | MCU pin | Notes                                  |
//! |---------------|---------|----------------------------------------|
//! | SD SCK        | PA5     | SPI1, 400 kHz                          |
//! | SD MISO       | PA6     | SPI1                                   |
//! | SD MOSI       | PA7     | SPI1                                   |
//! | SD CS         | PB6     | Software chip select, active low       |
//! | Speaker       | PA4     | DAC1_OUT1, 8-bit right-aligned         |
//! | Previous      | PC6     | EXTI6, active low, internal pull-up    |
//! | Play/Pause    | PC7     | EXTI7, active low, internal pull-up    |
//! | Next          | PC8     | EXTI8, active low, internal pull-up    |
//! | Power switch  | PA0     | WKUP1; switch drives the line, low=off |
//! | Status LED    | PB14    | Fault indicator, active high           |
//!
//! # Task split
//!
//! The sample feed runs on an [`InterruptExecutor`] so the 125 µs tick
//! preempts SD traffic on the thread executor. Everything else — refill
//! worker, button watchers, power watcher, the jukebox loop — is
//! thread-mode.
//!
//! [`InterruptExecutor`]: embassy_executor::InterruptExecutor

pub mod audio;
pub mod board;
pub mod buttons;
pub mod power;
pub mod storage;

pub use audio::{sample_feed_task, BoardDac, GateState, TickerGate};
pub use buttons::button_task;
pub use power::{power_watch_task, IwdgLiveness, StandbyControl};
pub use storage::{SdError, SdFile, SdMount, SdState, SdStorage};
