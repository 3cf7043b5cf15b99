use crate::evaluator::Limits;
use crate::interpreter;
use crate::types::Expression;
use ansi_term::Colour::{Green, Red};
use ansi_term::Style;
use clap::Parser;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "lazy_demo")]
#[command(about = "Evaluates a few built-in programs and prints what each one reduces to")]
#[command(after_help = "Set RUST_LOG=lazy_scope=trace to watch the reduction.")]
pub struct Options {
    /// Give up on a program after N reduction steps
    #[arg(long, value_name = "N", default_value_t = Limits::default().max_steps)]
    pub max_steps: usize,

    /// Give up on expressions nested more than N levels deep
    #[arg(long, value_name = "N", default_value_t = Limits::default().max_depth)]
    pub max_depth: usize,

    /// Never color the output
    #[arg(long)]
    pub no_color: bool,
}

impl Options {
    pub fn limits(&self) -> Limits {
        Limits {
            max_steps: self.max_steps,
            max_depth: self.max_depth,
        }
    }

    pub fn color(&self) -> bool {
        !self.no_color && atty::is(atty::Stream::Stdout)
    }
}

/// One line describing how a program fared.
pub fn report(
    name: &str,
    program: &Expression,
    outcome: &interpreter::Result,
    color: bool,
) -> String {
    let paint = |style: Style, text: String| match color {
        true => style.paint(text).to_string(),
        false => text,
    };
    let title = paint(Style::new().bold(), format!("{}:", name));
    let result = match outcome {
        Ok(value) => paint(Green.normal(), value.to_string()),
        Err(failure) => paint(Red.normal(), format!("error: {}", failure)),
    };
    format!("{} {}\n  => {}", title, program, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::Failure;
    use crate::types::Value;
    use clap::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn parse(list: &[&str]) -> Result<Options, clap::Error> {
        Options::try_parse_from(std::iter::once("lazy_demo").chain(list.iter().copied()))
    }

    #[test]
    fn limits_come_from_flags() {
        let options = parse(&["--max-steps", "10", "--max-depth", "4", "--no-color"]).unwrap();
        assert_eq!(
            options.limits(),
            Limits {
                max_steps: 10,
                max_depth: 4
            }
        );
        assert!(!options.color());
    }

    #[test]
    fn defaults_without_flags() {
        let options = parse(&[]).unwrap();
        assert_eq!(options.limits(), Limits::default());
        assert!(!options.no_color);
    }

    #[test]
    fn bad_flags_are_reported() {
        assert_eq!(
            parse(&["--frobnicate"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert!(parse(&["--max-steps"]).is_err());
        assert_eq!(
            parse(&["--max-depth", "deep"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
    }

    #[test]
    fn plain_reports() {
        let program = Expression::id("x");
        assert_eq!(
            report("ok", &program, &Ok(Value::new(1i64)), false),
            "ok: x\n  => 1"
        );
        assert_eq!(
            report(
                "missing",
                &program,
                &Err(Failure::MissingIdentifier("x".into())),
                false
            ),
            "missing: x\n  => error: 'x' not found"
        );
    }
}
