//! Level metadata: shot budgets, start positions and wall layouts

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::wall::{Wall, WallKind};
use crate::error::LevelError;

/// Scene name for a level number
pub fn scene_name(number: u32) -> String {
    format!("Level{number}")
}

/// Static geometry of a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Where the ball sits when the level has no explicit start position
    pub spawn: Vec2,
    pub walls: Vec<Wall>,
}

/// Everything needed to start a level, resolved from the table
#[derive(Debug, Clone, PartialEq)]
pub struct LevelDetails {
    pub number: u32,
    /// Shots allowed for this level
    pub attempts: u32,
    pub start_pos: Option<Vec2>,
    pub layout: LevelLayout,
}

impl LevelDetails {
    /// Ball position at level start
    pub fn start_position(&self) -> Vec2 {
        self.start_pos.unwrap_or(self.layout.spawn)
    }

    pub fn scene_name(&self) -> String {
        scene_name(self.number)
    }
}

/// Per-level tables, keyed by level number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTable {
    pub attempts: BTreeMap<u32, u32>,
    #[serde(default)]
    pub start_positions: BTreeMap<u32, Vec2>,
    pub layouts: BTreeMap<u32, LevelLayout>,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LevelTable {
    /// The three shipped levels
    pub fn builtin() -> Self {
        let attempts = BTreeMap::from([(1, 1), (2, 2), (3, 3)]);
        let start_positions = BTreeMap::from([(1, Vec2::new(-1.0, -2.3))]);
        let layouts = BTreeMap::from([(1, level_one()), (2, level_two()), (3, level_three())]);
        Self {
            attempts,
            start_positions,
            layouts,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Resolve a level; a number missing from the attempts table is a config error
    pub fn load(&self, number: u32) -> Result<LevelDetails, LevelError> {
        let attempts = *self
            .attempts
            .get(&number)
            .ok_or(LevelError::UnknownLevel { number })?;
        let layout = self
            .layouts
            .get(&number)
            .cloned()
            .ok_or(LevelError::MissingLayout { number })?;

        Ok(LevelDetails {
            number,
            attempts,
            start_pos: self.start_positions.get(&number).copied(),
            layout,
        })
    }

    /// Lowest level number in the table
    pub fn first_level(&self) -> Option<u32> {
        self.attempts.keys().next().copied()
    }

    /// Highest level number in the table
    pub fn last_level(&self) -> Option<u32> {
        self.attempts.keys().next_back().copied()
    }
}

/// Floor, side walls and ceiling shared by every level; ids 1..=4
fn boundary() -> Vec<Wall> {
    vec![
        Wall::new(1, WallKind::Normal, Vec2::new(-3.5, -3.0), Vec2::new(3.5, -2.55)),
        Wall::new(2, WallKind::Normal, Vec2::new(-3.5, -3.0), Vec2::new(-3.0, 5.5)),
        Wall::new(3, WallKind::Normal, Vec2::new(3.0, -3.0), Vec2::new(3.5, 5.5)),
        Wall::new(4, WallKind::Normal, Vec2::new(-3.5, 5.0), Vec2::new(3.5, 5.5)),
    ]
}

fn level_one() -> LevelLayout {
    let mut walls = boundary();
    walls.push(Wall::new(10, WallKind::Objective, Vec2::new(1.5, 1.6), Vec2::new(3.0, 2.0)));
    LevelLayout {
        spawn: Vec2::new(-1.0, -2.3),
        walls,
    }
}

fn level_two() -> LevelLayout {
    let mut walls = boundary();
    // Divider the ball has to clear
    walls.push(Wall::new(10, WallKind::Normal, Vec2::new(-0.2, -2.55), Vec2::new(0.2, 1.0)));
    walls.push(Wall::new(11, WallKind::Objective, Vec2::new(1.8, -2.55), Vec2::new(3.0, -2.2)));
    LevelLayout {
        spawn: Vec2::new(-2.0, -2.3),
        walls,
    }
}

fn level_three() -> LevelLayout {
    let mut walls = boundary();
    walls.push(Wall::new(10, WallKind::Normal, Vec2::new(-3.0, 0.5), Vec2::new(-0.5, 0.8)));
    walls.push(Wall::new(11, WallKind::Normal, Vec2::new(0.5, -1.0), Vec2::new(3.0, -0.7)));
    walls.push(Wall::new(12, WallKind::Objective, Vec2::new(-1.0, 4.6), Vec2::new(0.0, 5.0)));
    LevelLayout {
        spawn: Vec2::new(2.0, -2.3),
        walls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_attempts() {
        let table = LevelTable::builtin();
        assert_eq!(table.load(1).map(|l| l.attempts), Ok(1));
        assert_eq!(table.load(2).map(|l| l.attempts), Ok(2));
        assert_eq!(table.load(3).map(|l| l.attempts), Ok(3));
        assert_eq!(table.first_level(), Some(1));
        assert_eq!(table.last_level(), Some(3));
    }

    #[test]
    fn test_unknown_level_is_config_error() {
        let table = LevelTable::builtin();
        assert_eq!(table.load(4), Err(LevelError::UnknownLevel { number: 4 }));
        assert_eq!(table.load(0), Err(LevelError::UnknownLevel { number: 0 }));
    }

    #[test]
    fn test_missing_layout() {
        let mut table = LevelTable::builtin();
        table.attempts.insert(7, 2);
        assert_eq!(table.load(7), Err(LevelError::MissingLayout { number: 7 }));
    }

    #[test]
    fn test_start_position_falls_back_to_spawn() {
        let table = LevelTable::builtin();
        let one = table.load(1).unwrap();
        assert_eq!(one.start_pos, Some(Vec2::new(-1.0, -2.3)));
        assert_eq!(one.start_position(), Vec2::new(-1.0, -2.3));

        let two = table.load(2).unwrap();
        assert_eq!(two.start_pos, None);
        assert_eq!(two.start_position(), two.layout.spawn);
    }

    #[test]
    fn test_every_level_has_an_objective() {
        let table = LevelTable::builtin();
        for number in table.attempts.keys() {
            let level = table.load(*number).unwrap();
            assert!(level.layout.walls.iter().any(|w| w.is_objective()));
        }
    }

    #[test]
    fn test_scene_names() {
        assert_eq!(scene_name(3), "Level3");
        assert_eq!(LevelTable::builtin().load(2).unwrap().scene_name(), "Level2");
    }

    #[test]
    fn test_json_table() {
        let json = r#"{
            "attempts": { "5": 4 },
            "layouts": {
                "5": {
                    "spawn": [0.0, 0.0],
                    "walls": [
                        { "id": 1, "min": [-1.0, -1.0], "max": [1.0, -0.5] },
                        { "id": 2, "kind": "Objective", "min": [2.0, 2.0], "max": [3.0, 3.0] }
                    ]
                }
            }
        }"#;
        let table = LevelTable::from_json(json).unwrap();
        let level = table.load(5).unwrap();
        assert_eq!(level.attempts, 4);
        assert_eq!(level.start_pos, None);
        assert_eq!(level.layout.walls[0].kind, WallKind::Normal);
        assert_eq!(level.layout.walls[1].kind, WallKind::Objective);
    }
}
