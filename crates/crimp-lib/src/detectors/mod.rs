pub mod force;
