pub mod discogs;
pub mod inventory;
pub mod page;
pub mod wantlist;

pub use discogs::{InventoryResponse, Listing, PaginatedResponse, Want, WantlistResponse};
pub use inventory::{FilteredInventory, SellerInventory, SellerListing};
pub use page::Page;
pub use wantlist::UserWantlist;
