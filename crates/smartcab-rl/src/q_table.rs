//! Value table for tabular Q-learning

use ndarray::{Array2, ArrayView1};

use smartcab_core::{Action, Result, SmartcabError};

use crate::state::StateKey;

/// Dense Q-table: one row per [`StateKey`], one column per action
///
/// Every (state, action) pair is allocated up front. The entry for each
/// state's suggested action starts at `initial_bias`, the rest at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable {
    values: Array2<f64>,
    initial_bias: f64,
}

impl ValueTable {
    /// Build the fully enumerated table
    pub fn new(initial_bias: f64) -> Self {
        let mut values = Array2::zeros((StateKey::CARDINALITY, Action::COUNT));
        for state in StateKey::all() {
            values[[state.index(), state.suggested_action().index()]] = initial_bias;
        }

        Self {
            values,
            initial_bias,
        }
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn state_count(&self) -> usize {
        self.values.nrows()
    }

    pub fn initial_bias(&self) -> f64 {
        self.initial_bias
    }

    pub fn get(&self, state: &StateKey, action: Action) -> Result<f64> {
        self.values
            .get((state.index(), action.index()))
            .copied()
            .ok_or_else(|| SmartcabError::lookup(state, action))
    }

    /// Overwrite one entry. Values are not clamped.
    pub fn set(&mut self, state: &StateKey, action: Action, value: f64) -> Result<()> {
        let slot = self
            .values
            .get_mut((state.index(), action.index()))
            .ok_or_else(|| SmartcabError::lookup(state, action))?;
        *slot = value;
        Ok(())
    }

    /// All action values for a state, in canonical action order
    pub fn values(&self, state: &StateKey) -> Result<ArrayView1<'_, f64>> {
        let row = state.index();
        if row >= self.values.nrows() {
            return Err(SmartcabError::lookup(state, Action::ALL[0]));
        }
        Ok(self.values.row(row))
    }

    /// Highest-valued action for a state
    ///
    /// Ties go to the earliest action in canonical order
    /// (`none`, `forward`, `left`, `right`).
    pub fn best_action(&self, state: &StateKey) -> Result<(Action, f64)> {
        let row = self.values(state)?;
        let mut best = (Action::ALL[0], row[0]);
        for (&action, &value) in Action::ALL.iter().zip(row.iter()).skip(1) {
            if value > best.1 {
                best = (action, value);
            }
        }
        Ok(best)
    }

    pub fn max_value(&self, state: &StateKey) -> Result<f64> {
        self.best_action(state).map(|(_, value)| value)
    }

    /// Every entry as (state, action, value), in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (StateKey, Action, f64)> + '_ {
        self.values
            .indexed_iter()
            .filter_map(|((row, col), &value)| {
                Some((StateKey::from_index(row)?, Action::from_index(col)?, value))
            })
    }

    /// Number of states whose greedy action no longer matches the route suggestion
    pub fn overridden_states(&self) -> usize {
        StateKey::all()
            .filter(|state| {
                self.best_action(state)
                    .map(|(action, _)| action != state.suggested_action())
                    .unwrap_or(false)
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use smartcab_core::{Heading, Light, Sensed};

    use super::*;

    fn state(waypoint: Heading, light: Light) -> StateKey {
        StateKey::new(waypoint, Sensed::clear(light))
    }

    #[test]
    fn test_full_enumeration() {
        let table = ValueTable::new(3.5);
        assert_eq!(table.len(), StateKey::CARDINALITY * Action::COUNT);
        assert_eq!(table.len(), 2048);
        assert_eq!(table.state_count(), 512);
        assert_eq!(table.iter().count(), 2048);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_bias_seeding() {
        let table = ValueTable::new(3.5);
        for key in StateKey::all() {
            for action in Action::ALL {
                let expected = if action == key.suggested_action() { 3.5 } else { 0.0 };
                assert_eq!(table.get(&key, action).unwrap(), expected);
            }
        }
        assert_eq!(table.overridden_states(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut table = ValueTable::new(1.0);
        let key = state(Heading::Left, Light::Red);

        table.set(&key, Heading::Right, -42.5).unwrap();
        assert_eq!(table.get(&key, Heading::Right).unwrap(), -42.5);
        assert_eq!(table.get(&key, Heading::Left).unwrap(), 1.0);
    }

    #[test]
    fn test_best_action_follows_bias() {
        let table = ValueTable::new(3.5);
        let key = state(Heading::Forward, Light::Green);
        assert_eq!(table.best_action(&key).unwrap(), (Heading::Forward, 3.5));
    }

    #[test]
    fn test_best_action_tie_break() {
        let mut table = ValueTable::new(0.0);
        let key = state(Heading::Right, Light::Green);

        // All zero: first in canonical order
        assert_eq!(table.best_action(&key).unwrap(), (Heading::None, 0.0));

        table.set(&key, Heading::Left, 1.0).unwrap();
        table.set(&key, Heading::Right, 1.0).unwrap();
        for _ in 0..10 {
            assert_eq!(table.best_action(&key).unwrap(), (Heading::Left, 1.0));
        }
    }

    #[test]
    fn test_best_action_with_negative_values() {
        let mut table = ValueTable::new(0.0);
        let key = state(Heading::None, Light::Red);
        for action in Action::ALL {
            table.set(&key, action, -1.0).unwrap();
        }
        table.set(&key, Heading::Right, -0.5).unwrap();

        assert_eq!(table.best_action(&key).unwrap(), (Heading::Right, -0.5));
        assert_eq!(table.max_value(&key).unwrap(), -0.5);
    }

    #[test]
    fn test_overridden_states() {
        let mut table = ValueTable::new(3.5);
        let key = state(Heading::Forward, Light::Red);
        table.set(&key, Heading::None, 5.0).unwrap();

        assert_eq!(table.overridden_states(), 1);
    }
}
