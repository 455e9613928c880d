use anyhow::{Context, Result, bail};
use clap::Args;
use orbit_core::{DecodedFrame, frame::Function};

#[derive(Args)]
pub struct InspectArgs {
    /// Frame bytes as hex, e.g. `FE 00 04 02` or `FE000402`.
    #[arg(required = true, num_args = 1..)]
    pub hex: Vec<String>,
}

impl InspectArgs {
    pub fn run(&self) -> Result<()> {
        let bytes = parse_hex(&self.hex.concat())?;
        let frame = DecodedFrame::parse(&bytes).context("frame is not valid")?;

        match frame.function {
            Function::Stop => println!("function: stop"),
            Function::MoveXy => {
                let steps = frame.steps();
                println!("function: move x+y");
                println!("x: {} steps @ {} steps/s", steps.x(), frame.x.speed);
                println!(
                    "y: {} steps @ {} steps/s (wire {})",
                    steps.y(),
                    frame.y.speed,
                    frame.y.steps
                );
            }
        }
        println!("checksum: 0x{:02X} ok", frame.checksum);

        Ok(())
    }
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let digits: String = input
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    if !digits.is_ascii() {
        bail!("hex input contains non-ASCII characters");
    }
    if digits.len() % 2 != 0 {
        bail!("hex input has an odd number of digits");
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("invalid hex byte {:?}", &digits[i..i + 2]))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spaced_and_packed_hex() {
        assert_eq!(parse_hex("FE 00 04 02").unwrap(), vec![0xFE, 0x00, 0x04, 0x02]);
        assert_eq!(parse_hex("0xfe000402").unwrap(), vec![0xFE, 0x00, 0x04, 0x02]);
        assert!(parse_hex("FE0").is_err());
        assert!(parse_hex("ZZ").is_err());
    }
}
