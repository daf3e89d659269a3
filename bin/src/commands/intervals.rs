//! Intervals command implementation.

use candlefold_lib::Interval;

/// Prints the interval presets.
pub(crate) fn list_intervals() {
    println!("{:<10} {:>10}", "INTERVAL", "SECONDS");
    println!("{}", "-".repeat(21));

    for interval in Interval::presets() {
        println!("{:<10} {:>10}", interval.to_string(), interval.seconds());
    }

    println!("\nAny <n>s, <n>m, <n>h or <n>d is accepted as well.");
}
