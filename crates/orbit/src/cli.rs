use anyhow::{Context, Result};
use orbit::config::Config;
use orbit_core::Vector2;
use std::path::Path;

pub mod encode;
pub mod inspect;
pub mod run;

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Parses `X,Y` into a vector.
fn parse_vector(value: &str) -> Result<Vector2> {
    let (x, y) = value
        .split_once(',')
        .with_context(|| format!("expected X,Y but got {value:?}"))?;
    let x = x
        .trim()
        .parse()
        .with_context(|| format!("invalid x component {x:?}"))?;
    let y = y
        .trim()
        .parse()
        .with_context(|| format!("invalid y component {y:?}"))?;
    Ok(Vector2::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vectors() {
        assert_eq!(parse_vector("10,-2.5").unwrap(), Vector2::new(10.0, -2.5));
        assert_eq!(parse_vector(" 1 , 2 ").unwrap(), Vector2::new(1.0, 2.0));
        assert!(parse_vector("10").is_err());
        assert!(parse_vector("a,1").is_err());
    }
}
