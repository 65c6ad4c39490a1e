use std::io::{self, Write};

pub fn prompt_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Asks a yes/no question; anything but `y`/`yes` declines.
pub fn prompt_confirm(prompt: &str) -> io::Result<bool> {
    let input = prompt_line(&format!("{prompt} [y/N] "))?;
    Ok(is_affirmative(&input))
}

fn is_affirmative(input: &str) -> bool {
    matches!(input.to_ascii_lowercase().as_str(), "y" | "yes")
}
