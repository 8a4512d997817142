#[cfg(target_os = "linux")]
pub mod evdev_to_key_code;
pub mod key_names;

#[cfg(target_os = "linux")]
pub use evdev_to_key_code::EvdevToKeyCode;
pub use key_names::KeyNames;
