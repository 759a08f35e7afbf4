pub mod audit;
pub mod cards;
pub mod collection;
pub mod error;
pub mod handlers;
pub mod import;
pub mod middleware;
pub mod preferences;
pub mod routes;
pub mod sets;
pub mod stats;
pub mod wishlist;

pub use routes::create_router;
