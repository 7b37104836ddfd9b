//! Database access
//!
//! One flat `recipes` table keyed by article URL. Callers pass the pool in;
//! nothing here holds a global database path.

pub mod init;
pub mod recipes;

pub use init::{init_database, open_in_memory};
pub use recipes::{
    count_recipes, load_all_recipes, load_recipe_by_url, record_from_row, save_recipe,
    SELECT_COLUMNS,
};
