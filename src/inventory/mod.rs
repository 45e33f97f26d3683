mod generate;
mod groups;
mod model;

pub(crate) use generate::PROCESS_NAMES;
pub use generate::{GeneratorConfig, generate_seeded};
pub use groups::{GroupSpec, GroupTable};
pub use model::{Asset, AssetKind, Inventory, Process, ProcessStatus};
