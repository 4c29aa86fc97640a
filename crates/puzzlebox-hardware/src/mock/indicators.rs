//! Mock stage indicators for testing and development.

use crate::{Result, traits::IndicatorBank};
use puzzlebox_core::constants::INDICATOR_COUNT;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct IndicatorState {
    lit: [bool; INDICATOR_COUNT],
    history: Vec<(usize, bool)>,
}

/// Mock indicator bank with [`INDICATOR_COUNT`] lights.
#[derive(Debug)]
pub struct MockIndicators {
    state: Arc<Mutex<IndicatorState>>,
}

impl MockIndicators {
    /// Create an indicator bank with every light off.
    pub fn new() -> (Self, MockIndicatorsHandle) {
        let state = Arc::new(Mutex::new(IndicatorState::default()));
        let indicators = Self {
            state: Arc::clone(&state),
        };
        (indicators, MockIndicatorsHandle { state })
    }
}

impl Default for MockIndicators {
    fn default() -> Self {
        Self::new().0
    }
}

impl IndicatorBank for MockIndicators {
    async fn set_indicator(&mut self, index: usize, lit: bool) -> Result<()> {
        if index >= INDICATOR_COUNT {
            return Err(puzzlebox_core::Error::InvalidIndicatorIndex {
                index,
                max: INDICATOR_COUNT - 1,
            }
            .into());
        }

        let mut state = self.state.lock().await;
        state.lit[index] = lit;
        state.history.push((index, lit));
        Ok(())
    }

    fn indicator_count(&self) -> usize {
        INDICATOR_COUNT
    }
}

/// Handle for inspecting mock indicators.
#[derive(Debug, Clone)]
pub struct MockIndicatorsHandle {
    state: Arc<Mutex<IndicatorState>>,
}

impl MockIndicatorsHandle {
    /// Current state of every light.
    pub async fn lit(&self) -> [bool; INDICATOR_COUNT] {
        self.state.lock().await.lit
    }

    /// Every change applied so far, in order.
    pub async fn history(&self) -> Vec<(usize, bool)> {
        self.state.lock().await.history.clone()
    }

    /// Number of times an indicator was switched on.
    pub async fn times_lit(&self, index: usize) -> usize {
        self.state
            .lock()
            .await
            .history
            .iter()
            .filter(|&&(i, lit)| i == index && lit)
            .count()
    }

    /// Forget the change history.
    pub async fn clear_history(&self) {
        self.state.lock().await.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HardwareError;

    #[tokio::test]
    async fn test_mock_indicators_set() {
        let (mut indicators, handle) = MockIndicators::new();

        indicators.set_indicator(0, true).await.unwrap();
        indicators.set_indicator(4, true).await.unwrap();
        indicators.set_indicator(0, false).await.unwrap();

        assert_eq!(handle.lit().await, [false, false, false, false, true]);
        assert_eq!(handle.times_lit(0).await, 1);
        assert_eq!(handle.history().await.len(), 3);
    }

    #[tokio::test]
    async fn test_mock_indicators_out_of_range() {
        let (mut indicators, _handle) = MockIndicators::new();

        let result = indicators.set_indicator(INDICATOR_COUNT, true).await;
        assert!(matches!(
            result,
            Err(HardwareError::Core(
                puzzlebox_core::Error::InvalidIndicatorIndex { index: 5, max: 4 }
            ))
        ));
    }

    #[test]
    fn test_mock_indicators_count() {
        let indicators = MockIndicators::default();
        assert_eq!(indicators.indicator_count(), 5);
    }
}
