pub mod walled_garden;

pub use walled_garden::WalledGarden;
