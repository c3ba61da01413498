pub mod modelimpl;
