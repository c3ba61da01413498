pub mod loggers;
