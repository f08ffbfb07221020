use std::path::{Path, PathBuf};

use rand::distributions::{Alphanumeric, Distribution};

pub fn rand_str(length: usize) -> String {
  let rng = rand::thread_rng();
  let characters: Vec<char> = Alphanumeric
    .sample_iter(rng)
    .map(|c| c.into())
    .take(length)
    .collect();
  characters.iter().collect::<String>()
}

/// Create an empty `.svg` file and return its path.
///
/// Inside `dir` the file is named after `stem` and replaces any earlier
/// export. Without a directory it gets a random name in the system temp
/// directory, and an existing file there is never overwritten.
pub fn create_svg_file(
  dir: Option<&Path>,
  stem: &str,
) -> Result<PathBuf, std::io::Error> {
  let mut options = std::fs::OpenOptions::new();
  options.write(true).truncate(true);

  let file_path = match dir {
    Some(dir) => {
      options.create(true);
      dir.join(format!("{stem}.svg"))
    }
    None => {
      options.create_new(true);
      std::env::temp_dir().join(format!("{}.svg", rand_str(16)))
    }
  };

  options.open(&file_path).map(|_| file_path)
}

pub fn html_escape(s: &str) -> String {
  s.replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
  if text.chars().count() <= max {
    return text.to_string();
  }
  let kept: String = text.chars().take(max.saturating_sub(3)).collect();
  format!("{kept}...")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn truncates_long_text() {
    assert_eq!(truncate("short", 30), "short");
    assert_eq!(truncate("abcdefghij", 6), "abc...");
  }

  #[test]
  fn escapes_markup() {
    assert_eq!(html_escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
  }
}
