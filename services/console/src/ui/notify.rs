//! services/console/src/ui/notify.rs
//!
//! Console stand-ins for the dashboard's toast notifications.

use colored::Colorize;

pub fn info(message: &str) {
    println!("{}", message.blue());
}

pub fn warning(message: &str) {
    println!("{}", format!("! {message}").yellow());
}

pub fn error(message: &str) {
    eprintln!("{}", format!("x {message}").red());
}
