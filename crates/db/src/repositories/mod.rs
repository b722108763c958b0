//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod definition_repo;
pub mod faction_repo;
pub mod figurine_type_repo;
pub mod order_repo;
pub mod possession_repo;
pub mod user_repo;

pub use definition_repo::DefinitionRepo;
pub use faction_repo::FactionRepo;
pub use figurine_type_repo::FigurineTypeRepo;
pub use order_repo::OrderRepo;
pub use possession_repo::PossessionRepo;
pub use user_repo::UserRepo;
