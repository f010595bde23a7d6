//! Interactive collection of a cutting stock request.

use cutstock_core::{CuttingStockRequest, ItemType};
use std::io::{self, BufRead, Write};

/// Typing this at any prompt abandons the whole request.
pub const CANCEL_SENTINEL: &str = "cancel";

/// Result of a prompt: a value, or the user backing out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompted<T> {
    Value(T),
    Cancelled,
}

macro_rules! try_prompt {
    ($e:expr) => {
        match $e? {
            Prompted::Value(value) => value,
            Prompted::Cancelled => return Ok(Prompted::Cancelled),
        }
    };
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Asks until the answer parses as an integer `>= min`.
    ///
    /// End of input counts as cancellation.
    pub fn ask_u32(&mut self, prompt: &str, min: u32) -> io::Result<Prompted<u32>> {
        loop {
            write!(self.output, "{prompt}")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(Prompted::Cancelled);
            }

            let answer = line.trim();
            if answer.eq_ignore_ascii_case(CANCEL_SENTINEL) {
                return Ok(Prompted::Cancelled);
            }

            match answer.parse::<u32>() {
                Ok(value) if value >= min => return Ok(Prompted::Value(value)),
                _ => writeln!(
                    self.output,
                    "Invalid input, expected a whole number of at least {min}. \
                     Try again or type '{CANCEL_SENTINEL}' to quit."
                )?,
            }
        }
    }

    /// Bar length, item count, then demand and length for every item.
    pub fn collect_request(&mut self) -> io::Result<Prompted<CuttingStockRequest>> {
        let bar_length = try_prompt!(self.ask_u32("Bar length: ", 1));
        let item_count = try_prompt!(self.ask_u32("Number of item types: ", 1));

        let mut items = Vec::new();
        for index in 1..=item_count {
            writeln!(self.output, "\nItem {index}:")?;
            let demand = try_prompt!(self.ask_u32(&format!("Demand of item {index}: "), 0));
            let length = try_prompt!(self.ask_u32(&format!("Length of item {index}: "), 1));
            items.push(ItemType::new(length, demand));
        }

        Ok(Prompted::Value(CuttingStockRequest::new(bar_length, items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(script: &str) -> (Prompted<CuttingStockRequest>, String) {
        let mut output = Vec::new();
        let result = Prompter::new(script.as_bytes(), &mut output)
            .collect_request()
            .unwrap();
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_collects_full_request() {
        let (result, _) = collect("100\n2\n5\n30\n3\n45\n");
        let Prompted::Value(request) = result else {
            panic!("expected a request");
        };
        assert_eq!(request.bar_length, 100);
        assert_eq!(request.lengths(), vec![30, 45]);
        assert_eq!(request.demand(), vec![5, 3]);
    }

    #[test]
    fn test_invalid_answers_are_reprompted() {
        let (result, output) = collect("abc\n-4\n0\n100\n1\n2\n30\n");
        assert!(matches!(result, Prompted::Value(_)));
        assert_eq!(output.matches("Invalid input").count(), 3);
        assert_eq!(output.matches("Bar length: ").count(), 4);
    }

    #[test]
    fn test_cancel_at_any_prompt() {
        assert_eq!(collect("cancel\n").0, Prompted::Cancelled);
        assert_eq!(collect("100\n2\n5\nCANCEL\n").0, Prompted::Cancelled);
    }

    #[test]
    fn test_end_of_input_cancels() {
        assert_eq!(collect("100\n").0, Prompted::Cancelled);
    }

    #[test]
    fn test_huge_item_count_is_asked_lazily() {
        let (result, output) = collect("100\n4000000000\n");
        assert_eq!(result, Prompted::Cancelled);
        assert!(output.contains("Item 1:"));
        assert!(!output.contains("Item 2:"));
    }
}
