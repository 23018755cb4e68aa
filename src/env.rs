use serde::{Deserialize, Serialize};
use strum::{EnumIter, VariantArray};

/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
///
/// This base trait represents the common case of a discrete-time MDP with one agent
/// and a finite state space and action space.
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State;

    /// A representation of an action that an agent can take to affect the environment
    type Action;

    /// Derive the current state without advancing the environment
    fn observe(&self) -> Self::State;

    /// Determine if the state is active or terminal
    fn is_active(&self) -> bool;

    /// Update the environment in response to an action taken by an agent
    ///
    /// **Returns** `(next_state, reward)`
    fn step(&mut self, action: Self::Action) -> (Self::State, f64);

    /// Reset the environment to an initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> Self::State;
}

/// A single `(state, action, reward, next_state)` transition
pub struct Exp<S> {
    pub state: S,
    pub action: Dir,
    pub reward: f64,
    pub next_state: S,
}

/// The four grid headings, doubling as the action set.
///
/// Declaration order is the greedy scan order, so `Up` wins all-zero ties.
/// Screen convention: y grows downward.
#[derive(
    EnumIter,
    VariantArray,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub enum Dir {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Dir {
    /// Unit offset of one step along this heading
    pub fn vector(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    /// 0 for vertical, 1 for horizontal
    pub fn axis(self) -> u8 {
        self as u8 / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_pair_up() {
        assert_eq!(Dir::Up.axis(), Dir::Down.axis());
        assert_eq!(Dir::Left.axis(), Dir::Right.axis());
        assert_ne!(Dir::Up.axis(), Dir::Right.axis());
    }

    #[test]
    fn vectors_are_unit_steps() {
        for dir in [Dir::Up, Dir::Down, Dir::Left, Dir::Right] {
            let (dx, dy) = dir.vector();
            assert_eq!(dx.abs() + dy.abs(), 1);
        }
    }
}
