mod inventory;
mod stock;
mod wantlist;

pub use inventory::InventoryService;
pub use stock::{InWantlist, StockService};
pub use wantlist::WantlistService;
