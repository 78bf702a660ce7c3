pub mod hangboard;
