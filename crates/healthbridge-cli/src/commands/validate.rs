use anyhow::{bail, Result};

use healthbridge_core::validate::{validate_field, FieldKind};

pub fn run(kind: &str, value: &str) -> Result<()> {
    let kind: FieldKind = kind.parse()?;

    match validate_field(kind, true, value) {
        Ok(()) => {
            println!("valid");
            Ok(())
        }
        Err(e) => bail!("{}", e),
    }
}
