pub mod code;
pub mod lead;
pub mod mission;
pub mod pair;
pub mod score;

pub use code::Code;
pub use lead::Lead;
pub use mission::{MainMission, MissionOption, OptionKey, TieMission};
pub use pair::CodePair;
pub use score::ScoreTable;
