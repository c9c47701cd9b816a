//! `dsus codes` – print the response code table.

use dsus_core::CheckCode;

pub fn run_codes() {
    println!("{:<5} {:<20} {}", "CODE", "LABEL", "DESCRIPTION");
    for code in CheckCode::ALL {
        println!(
            "{:<5} {:<20} {}",
            code.as_u16(),
            code.label(),
            code.description()
        );
    }
}
