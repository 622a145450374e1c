//! Mission flags: one completion bit per sub-mission
//!
//! The finale can only be reached once the three core missions are done;
//! that order is enforced by the turntable gate, not by this struct.

use serde::{Deserialize, Serialize};

use heavenseve_common::config::WatchedFlag;

/// Persistent completion state of the four sub-missions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionFlags {
    /// Forest: all gifts found
    pub forest: bool,
    /// Room: closet sorted, plush delivered
    pub room: bool,
    /// Basement: bike repaired
    pub bike: bool,
    /// Turntable played
    pub finale: bool,
}

/// Names a single flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissionFlag {
    Forest,
    Room,
    Bike,
    Finale,
}

impl MissionFlags {
    /// Forest, room and bike are done
    pub fn all_core_completed(&self) -> bool {
        self.forest && self.room && self.bike
    }

    pub fn is_set(&self, flag: MissionFlag) -> bool {
        match flag {
            MissionFlag::Forest => self.forest,
            MissionFlag::Room => self.room,
            MissionFlag::Bike => self.bike,
            MissionFlag::Finale => self.finale,
        }
    }

    /// Set a flag. Returns true if it was not set before.
    pub fn set(&mut self, flag: MissionFlag) -> bool {
        let slot = match flag {
            MissionFlag::Forest => &mut self.forest,
            MissionFlag::Room => &mut self.room,
            MissionFlag::Bike => &mut self.bike,
            MissionFlag::Finale => &mut self.finale,
        };
        let changed = !*slot;
        *slot = true;
        changed
    }

    /// Back to a fresh playthrough
    pub fn reset(&mut self) {
        *self = MissionFlags::default();
    }

    /// Whether a watched flag is set (`WatchedFlag::None` never is)
    pub fn watched(&self, flag: WatchedFlag) -> bool {
        match flag {
            WatchedFlag::None => false,
            WatchedFlag::Forest => self.forest,
            WatchedFlag::Room => self.room,
            WatchedFlag::Bike => self.bike,
            WatchedFlag::Finale => self.finale,
        }
    }
}
