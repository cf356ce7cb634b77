//! Model module: CIFAR-10 CNN architecture and weight loading

pub mod cnn;
pub mod loader;

pub use cnn::{Cifar10Cnn, Cifar10CnnConfig, ConvBlock};
pub use loader::{load_classifier, load_config, save_classifier};
