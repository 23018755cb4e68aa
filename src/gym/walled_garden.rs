use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::debug;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

use crate::env::{Dir, Environment};

/// Position coordinates in pixels, always grid-aligned
pub type Pos = (i32, i32);

/// Pixel step of one grid cell
pub const GRID: i32 = 20;

/// Court dimensions in pixels
pub const COURT: (i32, i32) = (400, 400);

/// How long a dead snake lies in place before the garden restarts
pub const REVIVE_DELAY: Duration = Duration::from_millis(1000);

const SPAWN: Pos = (160, 160);
const SPAWN_DIR: Dir = Dir::Right;
const FOOD_PLACEMENT_TRIES: usize = 8;

const STEP_REWARD: f64 = -1.0;
const FOOD_REWARD: f64 = 10.0;
const DEATH_REWARD: f64 = -100.0;

/// What a snake knows about its situation: the compass sign of the food
/// offset from its head, and its own heading
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Observation {
    pub food_x: i8,
    pub food_y: i8,
    pub facing: Dir,
}

pub struct Snake {
    body: VecDeque<Pos>,
    dir: Dir,
}

impl Snake {
    fn new() -> Self {
        Self {
            body: VecDeque::from([SPAWN]),
            dir: SPAWN_DIR,
        }
    }

    fn head(&self) -> Pos {
        *self.body.front().expect("body is not empty")
    }

    /// Adopt `dir` unless it shares the current axis of motion; reversing
    /// into the neck (or re-requesting the current heading) is a no-op
    fn turn(&mut self, dir: Dir) -> Dir {
        if dir.axis() != self.dir.axis() {
            self.dir = dir;
        }

        self.dir
    }
}

/// Whether a garden is running or waiting out a death
#[derive(Clone, Copy, Debug)]
pub enum Phase {
    Active,
    GameOver { revive_at: Instant },
}

/// One snake, its food, and the walls around them
pub struct WalledGarden {
    snake: Snake,
    food: Pos,
    score: u32,
    phase: Phase,
}

impl WalledGarden {
    pub fn new() -> Self {
        let mut garden = Self {
            snake: Snake::new(),
            food: SPAWN,
            score: 0,
            phase: Phase::Active,
        };
        garden.spawn_food();
        garden
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn food(&self) -> Pos {
        self.food
    }

    pub fn body(&self) -> impl Iterator<Item = Pos> + '_ {
        self.snake.body.iter().copied()
    }

    /// Restart the garden if its revival deadline has passed
    ///
    /// **Returns** whether the garden came back to life
    pub fn heal(&mut self) -> bool {
        match self.phase {
            Phase::GameOver { revive_at } if Instant::now() >= revive_at => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    /// Uniform placement with a bounded retry against the body; a crowded
    /// board may legally end up with food on a segment
    fn spawn_food(&mut self) {
        let mut rng = thread_rng();
        for attempt in 0..=FOOD_PLACEMENT_TRIES {
            let cell = (
                rng.gen_range(0..COURT.0 / GRID) * GRID,
                rng.gen_range(0..COURT.1 / GRID) * GRID,
            );
            if attempt == FOOD_PLACEMENT_TRIES || !self.snake.body.contains(&cell) {
                self.food = cell;
                return;
            }
        }
    }

    fn in_bounds(&self, pos: Pos) -> bool {
        pos.0 >= 0 && pos.1 >= 0 && pos.0 < COURT.0 && pos.1 < COURT.1
    }

    fn is_colliding(&self) -> bool {
        let head = self.snake.head();
        !self.in_bounds(head) || self.snake.body.iter().skip(1).any(|&seg| seg == head)
    }
}

impl Environment for WalledGarden {
    type State = Observation;
    type Action = Dir;

    fn observe(&self) -> Observation {
        let head = self.snake.head();
        Observation {
            food_x: (self.food.0 - head.0).signum() as i8,
            food_y: (self.food.1 - head.1).signum() as i8,
            facing: self.snake.dir,
        }
    }

    fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active)
    }

    fn step(&mut self, action: Dir) -> (Observation, f64) {
        let dir = self.snake.turn(action);
        let head = self.snake.head();
        let (dx, dy) = dir.vector();
        let new_head = (head.0 + dx * GRID, head.1 + dy * GRID);
        self.snake.body.push_front(new_head);

        let mut reward = STEP_REWARD;
        if new_head == self.food {
            self.score += 10;
            self.spawn_food();
            reward = FOOD_REWARD;
        } else {
            self.snake.body.pop_back();
        }

        // checked after the move so an eating tick can still die; death wins
        if self.is_colliding() {
            reward = DEATH_REWARD;
            self.phase = Phase::GameOver {
                revive_at: Instant::now() + REVIVE_DELAY,
            };
            debug!("snake died at score {}", self.score);
        }

        (self.observe(), reward)
    }

    fn reset(&mut self) -> Observation {
        self.snake = Snake::new();
        self.score = 0;
        self.phase = Phase::Active;
        self.spawn_food();
        self.observe()
    }
}

#[cfg(test)]
mod tests {
    use crate::algo::tabular::q_table::{QTableAgent, QTableAgentConfig};

    use super::*;

    fn garden_with(body: &[Pos], dir: Dir, food: Pos) -> WalledGarden {
        WalledGarden {
            snake: Snake {
                body: VecDeque::from_iter(body.iter().copied()),
                dir,
            },
            food,
            score: 0,
            phase: Phase::Active,
        }
    }

    #[test]
    fn observation_is_food_compass_plus_heading() {
        let garden = garden_with(&[(160, 160)], Dir::Right, (200, 160));
        let obs = garden.observe();
        assert_eq!(
            obs,
            Observation {
                food_x: 1,
                food_y: 0,
                facing: Dir::Right,
            }
        );

        // a fresh table has no opinion yet, so the tie-break answers
        let mut agent = QTableAgent::new(QTableAgentConfig::default());
        assert_eq!(agent.best_action(obs), Dir::Up);
    }

    #[test]
    fn reversal_is_rejected() {
        let mut snake = Snake::new();
        snake.dir = Dir::Up;
        assert_eq!(snake.turn(Dir::Down), Dir::Up);
        assert_eq!(snake.turn(Dir::Up), Dir::Up);
        assert_eq!(snake.turn(Dir::Left), Dir::Left);
    }

    #[test]
    fn wall_collision_ends_the_game() {
        let mut garden = garden_with(&[(COURT.0 - GRID, 160)], Dir::Right, (0, 0));
        let (_, reward) = garden.step(Dir::Right);
        assert_eq!(reward, DEATH_REWARD);
        assert!(!garden.is_active());
    }

    #[test]
    fn self_collision_ends_the_game() {
        // hooking down bites the flank; the tail cell itself would be safe
        let body = [
            (100, 100),
            (120, 100),
            (120, 120),
            (100, 120),
            (100, 140),
        ];
        let mut garden = garden_with(&body, Dir::Left, (300, 300));
        let (_, reward) = garden.step(Dir::Down);
        assert_eq!(reward, DEATH_REWARD);
        assert!(!garden.is_active());
    }

    #[test]
    fn tail_chasing_is_safe() {
        let body = [(100, 100), (120, 100), (120, 120), (100, 120)];
        let mut garden = garden_with(&body, Dir::Left, (300, 300));
        let (_, reward) = garden.step(Dir::Down);
        assert_eq!(reward, STEP_REWARD);
        assert!(garden.is_active());
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut garden = garden_with(&[(160, 160), (140, 160)], Dir::Right, (180, 160));
        let (_, reward) = garden.step(Dir::Right);
        assert_eq!(reward, FOOD_REWARD);
        assert_eq!(garden.score(), 10);
        assert_eq!(garden.body().count(), 3);
        assert!(garden.is_active());
    }

    #[test]
    fn ordinary_tick_keeps_length() {
        let mut garden = garden_with(&[(160, 160), (140, 160)], Dir::Right, (0, 0));
        let (_, reward) = garden.step(Dir::Right);
        assert_eq!(reward, STEP_REWARD);
        assert_eq!(garden.score(), 0);
        assert_eq!(garden.body().count(), 2);
    }

    #[test]
    fn heal_waits_for_the_deadline() {
        let mut garden = garden_with(&[(COURT.0 - GRID, 160)], Dir::Right, (0, 0));
        garden.step(Dir::Right);
        assert!(!garden.heal(), "revival must wait out the delay");

        garden.phase = Phase::GameOver {
            revive_at: Instant::now(),
        };
        assert!(garden.heal());
        assert!(garden.is_active());
        assert_eq!(garden.score(), 0);
        assert_eq!(garden.body().count(), 1);
        assert_eq!(garden.observe().facing, SPAWN_DIR);
    }

    #[test]
    fn food_lands_on_the_grid() {
        let garden = WalledGarden::new();
        let (fx, fy) = garden.food();
        assert_eq!(fx % GRID, 0);
        assert_eq!(fy % GRID, 0);
        assert!(garden.in_bounds((fx, fy)));
    }
}
