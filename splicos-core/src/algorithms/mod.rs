pub mod dynamic_programming;
