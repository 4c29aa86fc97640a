//! Mock trigger button for testing and development.
//!
//! Presses are delivered through an internal channel fed by
//! [`MockTriggerHandle`].

use crate::{HardwareError, Result, traits::TriggerInput, types::TriggerEvent};
use tokio::sync::mpsc;

/// Mock trigger button.
///
/// # Examples
///
/// ```
/// use puzzlebox_hardware::mock::MockTrigger;
/// use puzzlebox_hardware::traits::TriggerInput;
///
/// #[tokio::main]
/// async fn main() -> puzzlebox_hardware::Result<()> {
///     let (mut trigger, handle) = MockTrigger::new();
///
///     tokio::spawn(async move {
///         handle.press().await.unwrap();
///     });
///
///     let _event = trigger.next_trigger().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTrigger {
    /// Channel receiver for simulated presses
    press_rx: mpsc::Receiver<TriggerEvent>,
}

impl MockTrigger {
    /// Create a new mock trigger and the handle that presses it.
    pub fn new() -> (Self, MockTriggerHandle) {
        let (press_tx, press_rx) = mpsc::channel(32);
        (Self { press_rx }, MockTriggerHandle { press_tx })
    }
}

impl TriggerInput for MockTrigger {
    async fn next_trigger(&mut self) -> Result<TriggerEvent> {
        self.press_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected("Trigger channel closed"))
    }
}

/// Handle for pressing a mock trigger.
#[derive(Debug, Clone)]
pub struct MockTriggerHandle {
    press_tx: mpsc::Sender<TriggerEvent>,
}

impl MockTriggerHandle {
    /// Press the button now.
    ///
    /// # Errors
    ///
    /// Returns an error if the trigger has been dropped.
    pub async fn press(&self) -> Result<()> {
        self.send(TriggerEvent::now()).await
    }

    /// Deliver a specific press event.
    ///
    /// # Errors
    ///
    /// Returns an error if the trigger has been dropped.
    pub async fn send(&self, event: TriggerEvent) -> Result<()> {
        self.press_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected("Trigger channel closed"))
    }
}
