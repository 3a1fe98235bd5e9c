pub mod constraint_index;
pub mod schema_extension;
pub mod table_column;
pub mod timescale;
pub mod view_function_trigger;
