// Lab and log spreadsheet importers
//
// Each importer reads one source into a `Table` whose columns carry the
// source prefix (`Log: `, `Sal: `, `Oxy: `, `Chl: `, `Nuts: `, `DIC: `).

pub mod carbon;
pub mod chlorophyll;
pub mod discrete;
pub mod name_map;
pub mod nutrients;
pub mod oxygen;
pub mod salinity;
pub mod sampling_log;
pub mod sheet;

pub use name_map::ChannelNameMap;
pub use sampling_log::SamplingLog;
pub use sheet::{SheetError, SheetReader};
