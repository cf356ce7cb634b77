//! CIFAR-10 class table
//!
//! The classifier emits one score per class in this fixed order.

use crate::NUM_CLASSES;

/// CIFAR-10 class names, indexed by the classifier's output position
pub const CLASS_NAMES: [&str; NUM_CLASSES] = [
    "airplane",
    "automobile",
    "bird",
    "cat",
    "deer",
    "dog",
    "frog",
    "horse",
    "ship",
    "truck",
];

/// Look up the label for a class index
pub fn class_name(class_id: usize) -> Option<&'static str> {
    CLASS_NAMES.get(class_id).copied()
}
