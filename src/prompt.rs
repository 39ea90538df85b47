use std::io::{self, BufRead, Write};

use crate::pipeline::Stage;

/// Asks the stage's yes/no question and reads one answer line. Only `y` confirms.
pub fn ask<R: BufRead, W: Write>(stage: Stage, input: &mut R, output: &mut W) -> bool {
    if write!(output, "{} (y/n): ", stage.question()).and_then(|_| output.flush()).is_err() {
        return false;
    }
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => answer.trim() == "y",
        Err(_) => false,
    }
}

pub fn ask_stdin(stage: Stage) -> bool {
    ask(stage, &mut io::stdin().lock(), &mut io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(stage: Stage, line: &str) -> (bool, String) {
        let mut output = Vec::new();
        let confirmed = ask(stage, &mut line.as_bytes(), &mut output);
        (confirmed, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_only_y_confirms(){
        assert_eq!(answer(Stage::Proceed, "y\n"), (true, "OK to Proceed? (y/n): ".to_string()));
        assert!(answer(Stage::Save, " y \r\n").0);
        assert!(!answer(Stage::Save, "yes\n").0);
        assert!(!answer(Stage::Save, "Y\n").0);
        assert!(!answer(Stage::View, "n\n").0);
        assert!(!answer(Stage::View, "").0);
    }
}
