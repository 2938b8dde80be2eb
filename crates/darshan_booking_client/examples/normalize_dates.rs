//! Print how each argument normalizes, e.g.
//! `cargo run --example normalize_dates -- 2024-01-15 "2024-01-15 10:30:00" 1700000000 "4:30 PM"`

use darshan_booking_client::{format_for_display, to_12_hour, to_24_hour, to_canonical_iso};

fn main() {
    for arg in std::env::args().skip(1) {
        println!("{arg:?}");
        println!("  canonical: {}", to_canonical_iso(arg.as_str()).unwrap_or_else(|| "-".into()));
        println!("  display:   {}", format_for_display(Some(&arg), None));
        println!("  24-hour:   {}", to_24_hour(&arg));
        println!("  12-hour:   {}", to_12_hour(&arg));
    }
}
