use anyhow::Result;
use console::style;
use inquire::{Password, PasswordDisplayMode, Text};

pub fn get_user_input(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input = Text::new(prompt);

    if let Some(default_value) = default {
        input = input.with_default(default_value);
    }

    let result = input.prompt()?;
    Ok(result)
}

pub fn get_secret_input(prompt: &str) -> Result<String> {
    let secret = Password::new(prompt)
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    Ok(secret)
}

// Diagnostics go to stderr so stdout only carries report lines.

pub fn print_success(message: &str) {
    eprintln!("{} {}", style("✔").bold().green(), message);
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", style("⚠").bold().yellow(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", style("✘").bold().red(), message);
}

pub fn print_info(message: &str) {
    eprintln!("{} {}", style("ℹ").bold().blue(), message);
}

pub fn print_header(title: &str) {
    let border = "═".repeat(title.chars().count() + 4);
    println!("{}", style(&border).bold().cyan());
    println!("  {}", style(title).bold());
    println!("{}", style(&border).bold().cyan());
}
