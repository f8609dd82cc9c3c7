pub mod controller;
pub mod index;
pub mod model;
pub mod render;
pub mod service;
pub mod tree;
