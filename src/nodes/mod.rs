// Node lifecycle module

mod controller;

pub use controller::NodeLifecycleController;
