use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use strum::VariantArray;

use crate::{
    assert_interval,
    decay::Constant,
    env::{Dir, Environment, Exp},
    exploration::{Choice, EpsilonGreedy},
};

use super::Hashable;

/// The learned value of each of the four actions in one state
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionValues {
    pub up: f64,
    pub down: f64,
    pub left: f64,
    pub right: f64,
}

impl ActionValues {
    /// The greedy action for this entry
    ///
    /// Scans in [`Dir`] declaration order and only a strictly greater value
    /// displaces the incumbent, so `Up` wins an all-zero entry.
    pub fn best(&self) -> Dir {
        let mut best = Dir::Up;
        for &dir in Dir::VARIANTS {
            if self[dir] > self[best] {
                best = dir;
            }
        }
        best
    }

    /// The value of the greedy action
    pub fn max(&self) -> f64 {
        self[self.best()]
    }
}

impl Index<Dir> for ActionValues {
    type Output = f64;

    fn index(&self, dir: Dir) -> &f64 {
        match dir {
            Dir::Up => &self.up,
            Dir::Down => &self.down,
            Dir::Left => &self.left,
            Dir::Right => &self.right,
        }
    }
}

impl IndexMut<Dir> for ActionValues {
    fn index_mut(&mut self, dir: Dir) -> &mut f64 {
        match dir {
            Dir::Up => &mut self.up,
            Dir::Down => &mut self.down,
            Dir::Left => &mut self.left,
            Dir::Right => &mut self.right,
        }
    }
}

/// Configuration for the [`QTableAgent`]
pub struct QTableAgentConfig {
    pub exploration: EpsilonGreedy<Constant>,
    pub alpha: f64,
    pub gamma: f64,
}

impl Default for QTableAgentConfig {
    fn default() -> Self {
        Self {
            exploration: EpsilonGreedy::new(Constant::new(0.2)),
            alpha: 0.1,
            gamma: 0.9,
        }
    }
}

/// A simple Q-learning agent that utilizes a Q-table to learn its environment
///
/// The action space is the fixed four-heading compass; the state space is
/// anything hashable, so one agent can serve any number of environments that
/// share a state encoding. Entries are materialized on first touch with all
/// four actions at zero.
pub struct QTableAgent<S: Hashable> {
    q_table: HashMap<S, ActionValues>,
    exploration: EpsilonGreedy<Constant>,
    alpha: f64, // learning rate
    gamma: f64, // discount factor
    steps: u32, // transitions learned so far
}

impl<S: Hashable> QTableAgent<S> {
    /// Initialize a new `QTableAgent`
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn new(config: QTableAgentConfig) -> Self {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert_interval!(config.gamma, 0.0, 1.0);
        Self {
            q_table: HashMap::new(),
            exploration: config.exploration,
            alpha: config.alpha,
            gamma: config.gamma,
            steps: 0,
        }
    }

    pub fn q_table(&self) -> &HashMap<S, ActionValues> {
        &self.q_table
    }

    /// Choose an action for `state` under the exploration policy
    pub fn act(&mut self, state: S) -> Dir {
        match self.exploration.choose(self.steps) {
            Choice::Explore => Dir::VARIANTS[thread_rng().gen_range(0..Dir::VARIANTS.len())],
            Choice::Exploit => self.best_action(state),
        }
    }

    /// The greedy action for `state`, materializing the entry if absent
    pub fn best_action(&mut self, state: S) -> Dir {
        self.q_table.entry(state).or_default().best()
    }

    /// Apply the one-step Q-learning update for a single transition
    pub fn learn(&mut self, exp: Exp<S>) {
        let Exp {
            state,
            action,
            reward,
            next_state,
        } = exp;

        let max_next = self.q_table.entry(next_state).or_default().max();
        let values = self.q_table.entry(state).or_default();
        let q = values[action];
        values[action] = q + self.alpha * (reward + self.gamma * max_next - q);
        self.steps += 1;
    }

    /// Run one observe → act → step → learn cycle against `env`
    ///
    /// **Returns** the reward for the transition
    pub fn drive<E>(&mut self, env: &mut E) -> f64
    where
        E: Environment<State = S, Action = Dir>,
    {
        let state = env.observe();
        let action = self.act(state);
        let (next_state, reward) = env.step(action);
        self.learn(Exp {
            state,
            action,
            reward,
            next_state,
        });
        reward
    }

    /// Clone out the learned table, e.g. for persistence
    pub fn export_learned_values(&self) -> HashMap<S, ActionValues> {
        self.q_table.clone()
    }

    /// Replace the learned table wholesale, e.g. from a restored snapshot
    pub fn import_state(&mut self, table: HashMap<S, ActionValues>) {
        self.q_table = table;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> QTableAgent<u8> {
        QTableAgent::new(QTableAgentConfig::default())
    }

    #[test]
    fn fresh_entry_breaks_ties_up() {
        let mut agent = agent();
        assert_eq!(agent.best_action(7), Dir::Up);

        // equal nonzero values also resolve to the earliest-scanned action
        let mut values = ActionValues::default();
        for &dir in Dir::VARIANTS {
            values[dir] = 3.5;
        }
        assert_eq!(values.best(), Dir::Up);
    }

    #[test]
    fn strictly_greater_value_wins() {
        let mut values = ActionValues::default();
        values.left = 0.25;
        assert_eq!(values.best(), Dir::Left);
        values.down = 0.25;
        assert_eq!(values.best(), Dir::Down);
    }

    #[test]
    fn touched_states_hold_four_finite_values() {
        let mut agent = agent();
        agent.best_action(1);
        agent.learn(Exp {
            state: 2,
            action: Dir::Right,
            reward: -100.0,
            next_state: 3,
        });

        for state in [1, 2, 3] {
            let values = agent.q_table()[&state];
            for &dir in Dir::VARIANTS {
                assert!(values[dir].is_finite());
            }
        }
    }

    #[test]
    fn zero_reward_update_is_idempotent() {
        let mut agent = agent();
        for _ in 0..50 {
            agent.learn(Exp {
                state: 1,
                action: Dir::Up,
                reward: 0.0,
                next_state: 1,
            });
            assert_eq!(agent.q_table()[&1].up, 0.0);
        }
    }

    #[test]
    fn update_moves_toward_td_target() {
        let mut agent = agent();
        agent.learn(Exp {
            state: 1,
            action: Dir::Right,
            reward: 10.0,
            next_state: 2,
        });
        // Q = 0 + 0.1 * (10 + 0.9 * 0 - 0)
        assert!((agent.q_table()[&1].right - 1.0).abs() < 1e-12);

        agent.learn(Exp {
            state: 3,
            action: Dir::Down,
            reward: -1.0,
            next_state: 1,
        });
        // bootstraps from max_a Q(1, a) = Q(1, right)
        let expected = 0.1 * (-1.0 + 0.9 * 1.0);
        assert!((agent.q_table()[&3].down - expected).abs() < 1e-12);
    }

    #[test]
    fn import_restores_greedy_behavior() {
        let mut agent = agent();
        agent.learn(Exp {
            state: 1,
            action: Dir::Left,
            reward: 10.0,
            next_state: 2,
        });
        agent.learn(Exp {
            state: 2,
            action: Dir::Down,
            reward: 10.0,
            next_state: 1,
        });

        let exported = agent.export_learned_values();
        let mut restored = QTableAgent::new(QTableAgentConfig::default());
        restored.import_state(exported);

        for state in [1, 2] {
            assert_eq!(restored.best_action(state), agent.best_action(state));
        }
    }

    #[test]
    #[should_panic]
    fn rejects_out_of_interval_alpha() {
        QTableAgent::<u8>::new(QTableAgentConfig {
            alpha: 1.5,
            ..Default::default()
        });
    }
}
