/// Alert decisions and the shared notification.
///
/// Submodules:
/// - `thresholds`: foreground tracker classification (magnitude, delta,
///   tsunami rules).
/// - `sentinel`: background sentinel rule for a fixed region.
/// - `notifier`: the single displayed notification and its expiry timer.

pub mod notifier;
pub mod sentinel;
pub mod thresholds;
