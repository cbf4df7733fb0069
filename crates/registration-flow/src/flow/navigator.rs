use serde::Serialize;

use super::errors::NavigationError;

/// Cursor into the active step list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepNavigator {
    step_number: usize,
    step_count: usize,
}

impl StepNavigator {
    pub fn new(step_count: usize) -> Self {
        Self {
            step_number: 0,
            step_count,
        }
    }

    pub fn step_number(&self) -> usize {
        self.step_number
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn is_first_step(&self) -> bool {
        self.step_number == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.step_number + 1 >= self.step_count
    }

    pub fn advance(&mut self) -> Result<(), NavigationError> {
        if self.is_last_step() {
            return Err(NavigationError::AlreadyLastStep {
                step_number: self.step_number,
                step_count: self.step_count,
            });
        }
        self.step_number += 1;
        Ok(())
    }

    /// Steps back once; a no-op on the first step. Returns whether the cursor moved.
    pub fn retreat(&mut self) -> bool {
        if self.is_first_step() {
            return false;
        }
        self.step_number -= 1;
        true
    }

    /// Adopts a new list length, clamping the cursor to the last valid index.
    pub fn resync(&mut self, step_count: usize) {
        self.step_count = step_count;
        self.step_number = self.step_number.min(step_count.saturating_sub(1));
    }

    pub fn jump_to(&mut self, index: usize) -> Result<(), NavigationError> {
        if index >= self.step_count {
            return Err(NavigationError::OutOfRange {
                index,
                step_count: self.step_count,
            });
        }
        self.step_number = index;
        Ok(())
    }

    pub fn reset(&mut self, step_count: usize) {
        *self = Self::new(step_count);
    }
}
