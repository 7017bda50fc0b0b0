//! Built-in classification stages.

pub mod material_repair;
pub mod rename;
pub mod sacrifice;
pub mod same_item;

pub use material_repair::MaterialRepairStage;
pub use rename::RenameStage;
pub use sacrifice::SacrificeStage;
pub use same_item::SameItemStage;
