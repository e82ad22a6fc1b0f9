//! Spawn-gate predicate deciding when a boss encounter may begin.

#[derive(Debug, Clone, PartialEq)]
pub enum GateMode {
    Coins,
    Distance,
    CoinsAndDistance,
    /// Unrecognized mode string from a config table. Evaluates as the coins
    /// check rather than failing closed.
    Other(String),
}

#[derive(Debug, Clone)]
pub struct SpawnGate {
    pub mode: GateMode,
    pub min_coins: u32,
    pub min_distance: f32,
}

impl SpawnGate {
    pub fn coins(min_coins: u32) -> Self {
        Self {
            mode: GateMode::Coins,
            min_coins,
            min_distance: 0.0,
        }
    }

    pub fn distance(min_distance: f32) -> Self {
        Self {
            mode: GateMode::Distance,
            min_coins: 0,
            min_distance,
        }
    }

    pub fn coins_and_distance(min_coins: u32, min_distance: f32) -> Self {
        Self {
            mode: GateMode::CoinsAndDistance,
            min_coins,
            min_distance,
        }
    }

    /// Pure predicate over the current progress snapshot.
    pub fn reached(&self, coins: u32, distance_traveled: f32) -> bool {
        match &self.mode {
            GateMode::Coins => coins >= self.min_coins,
            GateMode::Distance => distance_traveled >= self.min_distance,
            GateMode::CoinsAndDistance => {
                coins >= self.min_coins && distance_traveled >= self.min_distance
            }
            GateMode::Other(_) => coins >= self.min_coins,
        }
    }
}
