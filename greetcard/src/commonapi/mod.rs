pub mod drawer;
